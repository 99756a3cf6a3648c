//! Embedding vector and store trait.

/// Vector embedding - a normalized float array.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    /// The embedding vector (normalized to unit length)
    pub values: Vec<f32>,
}

impl Embedding {
    /// Create a new embedding from a vector.
    /// Normalizes the vector to unit length.
    pub fn new(values: Vec<f32>) -> Self {
        let norm: f32 = values.iter().map(|x| x * x).sum::<f32>().sqrt();
        let normalized = if norm > 0.0 {
            values.iter().map(|x| x / norm).collect()
        } else {
            values
        };
        Self { values: normalized }
    }

    /// Get the embedding dimension
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Compute cosine similarity with another embedding.
    /// Returns value in [-1, 1] range (1 = identical).
    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        if self.values.len() != other.values.len() {
            return 0.0;
        }
        // Both are normalized, dot product = cosine similarity
        let dot: f32 = self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a * b)
            .sum();
        dot.clamp(-1.0, 1.0)
    }
}

/// Read-only word -> vector lookup.
///
/// Implementations are loaded once and shared across requests, so they must
/// be thread-safe (Send + Sync).
pub trait EmbeddingStore: Send + Sync {
    /// Embedding dimension
    fn dimension(&self) -> usize;

    /// Number of words in the vocabulary
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector of `word`, if in vocabulary
    fn get(&self, word: &str) -> Option<&Embedding>;

    /// Whether `word` is in vocabulary
    fn has(&self, word: &str) -> bool {
        self.get(word).is_some()
    }

    /// Cosine similarity of two words.
    ///
    /// `None` when either word is out of vocabulary; callers treat that as 0.
    fn similarity(&self, a: &str, b: &str) -> Option<f32> {
        let ea = self.get(a)?;
        let eb = self.get(b)?;
        Some(ea.cosine_similarity(eb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_normalization() {
        let emb = Embedding::new(vec![3.0, 4.0]);
        // 3-4-5 triangle: normalized should be [0.6, 0.8]
        assert!((emb.values[0] - 0.6).abs() < 0.001);
        assert!((emb.values[1] - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_zero_vector_stays_zero() {
        let emb = Embedding::new(vec![0.0, 0.0]);
        assert_eq!(emb.values, vec![0.0, 0.0]);
        assert_eq!(emb.cosine_similarity(&Embedding::new(vec![1.0, 0.0])), 0.0);
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let emb1 = Embedding::new(vec![1.0, 0.0, 0.0]);
        let emb2 = Embedding::new(vec![2.0, 0.0, 0.0]);
        assert!((emb1.cosine_similarity(&emb2) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let emb1 = Embedding::new(vec![1.0, 0.0]);
        let emb2 = Embedding::new(vec![0.0, 1.0]);
        assert!(emb1.cosine_similarity(&emb2).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let emb1 = Embedding::new(vec![1.0, 0.0]);
        let emb2 = Embedding::new(vec![-1.0, 0.0]);
        assert!((emb1.cosine_similarity(&emb2) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_dimension_mismatch() {
        let emb1 = Embedding::new(vec![1.0, 0.0]);
        let emb2 = Embedding::new(vec![1.0, 0.0, 0.0]);
        assert_eq!(emb1.cosine_similarity(&emb2), 0.0);
    }
}
