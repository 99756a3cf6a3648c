//! Document scoring against a label neighborhood.

use zeste_types::{Neighborhood, Normalization, OovTokens, ScoringConfig, SimilarityKind, Word};

/// Append every n-gram whose words occur consecutively in `tokens`.
///
/// N-grams are underscore-joined (`television_show`); a match must start
/// and end on token boundaries.
pub fn augment_tokens(tokens: &[Word], ngrams: &[Word]) -> Vec<Word> {
    let mut out = tokens.to_vec();
    if ngrams.is_empty() || tokens.is_empty() {
        return out;
    }
    let text = format!(" {} ", tokens.join(" "));
    for ngram in ngrams {
        let phrase = format!(" {} ", ngram.replace('_', " "));
        if text.contains(&phrase) {
            out.push(ngram.clone());
        }
    }
    out
}

fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// Scores documents with a fixed variant, normalization and n-gram list.
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    pub variant: SimilarityKind,
    pub normalize: Normalization,
    pub oov_tokens: OovTokens,
    pub ngrams: Vec<Word>,
}

impl Scorer {
    pub fn new(variant: SimilarityKind, normalize: Normalization) -> Self {
        Self {
            variant,
            normalize,
            ..Self::default()
        }
    }

    pub fn from_config(config: &ScoringConfig, ngrams: Vec<Word>) -> Self {
        Self {
            variant: config.similarity,
            normalize: config.normalize,
            oov_tokens: config.oov_tokens,
            ngrams,
        }
    }

    pub fn with_oov_tokens(mut self, oov_tokens: OovTokens) -> Self {
        self.oov_tokens = oov_tokens;
        self
    }

    pub fn with_ngrams(mut self, ngrams: Vec<Word>) -> Self {
        self.ngrams = ngrams;
        self
    }

    /// Tokens after n-gram augmentation.
    pub fn augment(&self, tokens: &[Word]) -> Vec<Word> {
        augment_tokens(tokens, &self.ngrams)
    }

    /// Score a document, rounded to 6 decimals.
    ///
    /// Sums the variant over tokens present in the neighborhood, then
    /// normalizes:
    /// - `none`: raw sum
    /// - `inter_len`: divided by the number of matches (at least 1)
    /// - `max_score`: divided by the sum over the whole neighborhood,
    ///   0 when that sum is not positive
    pub fn score(&self, tokens: &[Word], neighborhood: &Neighborhood) -> f64 {
        let tokens = self.augment(tokens);
        let mut sum = 0.0f64;
        let mut matches = 0usize;
        for token in &tokens {
            let Some(entry) = neighborhood.get(token) else {
                continue;
            };
            let value = entry.sim.get(self.variant);
            sum += value as f64;
            if value != 0.0 || self.oov_tokens == OovTokens::CountAsZero {
                matches += 1;
            }
        }

        let score = match self.normalize {
            Normalization::None => sum,
            Normalization::InterLen => sum / matches.max(1) as f64,
            Normalization::MaxScore => {
                let total = neighborhood.total(self.variant);
                if total > 0.0 {
                    sum / total
                } else {
                    0.0
                }
            }
        };
        round6(score)
    }
}

/// Divide each score by their sum when the sum is positive; otherwise the
/// scores are left unchanged.
pub fn normalize_scores(scores: &mut [f64]) {
    let total: f64 = scores.iter().sum();
    if total > 0.0 {
        for score in scores.iter_mut() {
            *score /= total;
        }
    }
}
