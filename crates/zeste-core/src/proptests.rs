//! Property tests for filtering, scoring and expansion.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use zeste_embeddings::{EmbeddingStore, EmbeddingTable};
use zeste_storage::MemoryGraph;
use zeste_types::{
    KeepPolicy, Neighborhood, NeighborhoodEntry, Normalization, RelationFilter, RelationKind,
    SimilarityKind, SimilarityScores, Word,
};

use crate::expander::Expander;
use crate::filter::filter;
use crate::scorer::{normalize_scores, Scorer};

const WORDS: usize = 8;

fn word(i: usize) -> Word {
    format!("w{}", i)
}

fn arb_neighborhood() -> impl Strategy<Value = Neighborhood> {
    prop::collection::vec(-1.0f32..1.0, 0..20).prop_map(|sims| {
        let mut n = Neighborhood::new();
        for (i, sim) in sims.into_iter().enumerate() {
            n.insert(
                word(i),
                NeighborhoodEntry::new("w0", vec![RelationKind::RelatedTo], SimilarityScores::uniform(sim)),
            );
        }
        n
    })
}

fn arb_graph() -> impl Strategy<Value = (Vec<Vec<f32>>, Vec<(usize, usize)>)> {
    (
        prop::collection::vec(prop::collection::vec(0.1f32..1.0, 3), WORDS),
        prop::collection::vec((0..WORDS, 0..WORDS), 0..24),
    )
}

fn expander(vectors: Vec<Vec<f32>>, edges: &[(usize, usize)]) -> Expander {
    let embeddings = EmbeddingTable::from_vectors(
        vectors.into_iter().enumerate().map(|(i, v)| (word(i), v)),
    )
    .unwrap();
    let mut graph = MemoryGraph::new();
    for &(a, b) in edges {
        if a != b {
            let sim = embeddings.similarity(&word(a), &word(b)).unwrap_or(0.0);
            graph.add_assertion(&word(a), RelationKind::RelatedTo, &word(b), sim);
        }
    }
    Expander::new(Arc::new(graph), Arc::new(embeddings))
}

proptest! {
    #[test]
    fn filter_all_is_identity(n in arb_neighborhood()) {
        let out = filter(&n, &RelationFilter::All, SimilarityKind::Simple, &KeepPolicy::All);
        prop_assert_eq!(out, n);
    }

    #[test]
    fn top_n_keeps_the_best(n in arb_neighborhood(), keep in 0usize..25) {
        let out = filter(&n, &RelationFilter::All, SimilarityKind::Simple, &KeepPolicy::Top(keep));
        prop_assert_eq!(out.len(), keep.min(n.len()));

        let kept_min = out.iter().map(|(_, e)| e.sim.simple).fold(f32::INFINITY, f32::min);
        for (w, entry) in n.iter() {
            if !out.contains(w) {
                prop_assert!(entry.sim.simple <= kept_min);
            }
        }
    }

    #[test]
    fn score_ignores_token_order(
        n in arb_neighborhood(),
        picks in prop::collection::vec(0usize..25, 0..12),
    ) {
        let tokens: Vec<Word> = picks.into_iter().map(word).collect();
        let mut reversed = tokens.clone();
        reversed.reverse();
        for normalize in [Normalization::None, Normalization::InterLen, Normalization::MaxScore] {
            let scorer = Scorer::new(SimilarityKind::Simple, normalize);
            let a = scorer.score(&tokens, &n);
            let b = scorer.score(&reversed, &n);
            prop_assert!((a - b).abs() < 1e-5, "{} != {}", a, b);
        }
    }

    #[test]
    fn normalized_scores_sum_to_one(mut scores in prop::collection::vec(0.0f64..5.0, 1..10)) {
        let positive = scores.iter().sum::<f64>() > 0.0;
        normalize_scores(&mut scores);
        if positive {
            prop_assert!((scores.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn deeper_expansion_only_adds_words((vectors, edges) in arb_graph(), depth in 1usize..3) {
        let expander = expander(vectors, &edges);
        let seed = word(0);
        let shallow = expander.expand_word(&seed, depth, &RelationFilter::All).unwrap();
        let deep = expander.expand_word(&seed, depth + 1, &RelationFilter::All).unwrap();
        let deep_words: HashSet<&Word> = deep.words().collect();
        for w in shallow.words() {
            prop_assert!(deep_words.contains(w), "{} lost at depth {}", w, depth + 1);
        }
    }
}
