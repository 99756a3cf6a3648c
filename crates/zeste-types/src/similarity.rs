//! Similarity variants tracked per neighborhood word.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Which similarity formula to score and filter with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityKind {
    /// Direct seed-word cosine similarity
    #[default]
    Simple,
    /// Product of seed-bridge and bridge-word similarities
    Compound,
    /// Simple similarity divided by hop distance
    Depth,
    /// Harmonic mean of the two compound factors
    Harmonized,
}

impl SimilarityKind {
    /// All variants, in storage order.
    pub fn all() -> &'static [SimilarityKind] {
        &[
            SimilarityKind::Simple,
            SimilarityKind::Compound,
            SimilarityKind::Depth,
            SimilarityKind::Harmonized,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityKind::Simple => "simple",
            SimilarityKind::Compound => "compound",
            SimilarityKind::Depth => "depth",
            SimilarityKind::Harmonized => "harmonized",
        }
    }
}

impl fmt::Display for SimilarityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SimilarityKind {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(SimilarityKind::Simple),
            "compound" => Ok(SimilarityKind::Compound),
            "depth" => Ok(SimilarityKind::Depth),
            "harmonized" => Ok(SimilarityKind::Harmonized),
            other => Err(TypesError::InvalidInput(format!(
                "unknown similarity '{}' (expected simple, compound, depth or harmonized)",
                other
            ))),
        }
    }
}

/// The four similarity variants of one neighborhood word.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SimilarityScores {
    pub simple: f32,
    pub compound: f32,
    pub depth: f32,
    pub harmonized: f32,
}

impl SimilarityScores {
    /// Same value for every variant (direct neighbors, seeds).
    pub fn uniform(value: f32) -> Self {
        Self {
            simple: value,
            compound: value,
            depth: value,
            harmonized: value,
        }
    }

    /// Value of one variant.
    pub fn get(&self, kind: SimilarityKind) -> f32 {
        match kind {
            SimilarityKind::Simple => self.simple,
            SimilarityKind::Compound => self.compound,
            SimilarityKind::Depth => self.depth,
            SimilarityKind::Harmonized => self.harmonized,
        }
    }

    /// Keep the per-variant maximum of `self` and `other`.
    pub fn absorb(&mut self, other: &SimilarityScores) {
        self.simple = self.simple.max(other.simple);
        self.compound = self.compound.max(other.compound);
        self.depth = self.depth.max(other.depth);
        self.harmonized = self.harmonized.max(other.harmonized);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!(
            "Harmonized".parse::<SimilarityKind>().unwrap(),
            SimilarityKind::Harmonized
        );
        assert!("cosine".parse::<SimilarityKind>().is_err());
    }

    #[test]
    fn test_absorb_takes_max_per_variant() {
        let mut a = SimilarityScores {
            simple: 0.5,
            compound: 0.1,
            depth: 0.25,
            harmonized: 0.2,
        };
        let b = SimilarityScores {
            simple: 0.3,
            compound: 0.4,
            depth: 0.3,
            harmonized: 0.1,
        };
        a.absorb(&b);
        assert_eq!(a.simple, 0.5);
        assert_eq!(a.compound, 0.4);
        assert_eq!(a.depth, 0.3);
        assert_eq!(a.harmonized, 0.2);
    }

    #[test]
    fn test_uniform_get() {
        let s = SimilarityScores::uniform(0.7);
        for kind in SimilarityKind::all() {
            assert!((s.get(*kind) - 0.7).abs() < f32::EPSILON);
        }
    }
}
