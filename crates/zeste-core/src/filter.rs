//! Neighborhood pruning.

use std::collections::HashSet;

use zeste_types::{KeepPolicy, Neighborhood, RelationFilter, SimilarityKind};

/// Prune a neighborhood by relation kind and similarity.
///
/// Relation pruning runs first: unless `allowed_rels` is `all`, a word
/// survives only if some relation on any of its provenance edges is allowed.
/// The similarity cutoff then ranks the remaining words by `variant`
/// (descending, ties by insertion order) and keeps:
/// - `top N`: the N best
/// - `top P%`: the floor(P/100 * n) best
/// - `thresh T`: every word scoring strictly above T
///
/// The input is left untouched; survivors keep their insertion order.
pub fn filter(
    neighborhood: &Neighborhood,
    allowed_rels: &RelationFilter,
    variant: SimilarityKind,
    keep: &KeepPolicy,
) -> Neighborhood {
    if allowed_rels.is_all() && *keep == KeepPolicy::All {
        return neighborhood.clone();
    }

    let candidates: Vec<(&str, f32)> = neighborhood
        .iter()
        .filter(|(_, entry)| {
            allowed_rels.is_all() || allowed_rels.allows(&entry.all_rels().copied().collect::<Vec<_>>())
        })
        .map(|(word, entry)| (word.as_str(), entry.sim.get(variant)))
        .collect();

    let survivors: HashSet<&str> = match *keep {
        KeepPolicy::All => candidates.iter().map(|(w, _)| *w).collect(),
        KeepPolicy::Threshold(t) => candidates
            .iter()
            .filter(|(_, score)| *score > t)
            .map(|(w, _)| *w)
            .collect(),
        KeepPolicy::Top(n) => best(&candidates, n),
        KeepPolicy::TopPercent(p) => {
            let n = ((p / 100.0) * candidates.len() as f64).floor() as usize;
            best(&candidates, n)
        }
    };

    neighborhood.retain_words(&survivors)
}

/// The `n` highest-scoring words, ties broken by position.
fn best<'a>(candidates: &[(&'a str, f32)], n: usize) -> HashSet<&'a str> {
    let mut ranked: Vec<&(&str, f32)> = candidates.iter().collect();
    // Stable sort keeps insertion order among equal scores
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.into_iter().take(n).map(|(w, _)| *w).collect()
}
