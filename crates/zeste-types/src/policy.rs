//! Filtering and scoring policies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// How many neighborhood words survive the similarity cutoff.
///
/// Textual forms: `all`, `top20` / `top-20`, `top5%` / `top-5%`,
/// `thresh0.3` / `thresh-0.3`. A negative threshold needs the explicit
/// separator (`thresh--0.1`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum KeepPolicy {
    /// No pruning
    #[default]
    All,
    /// The N highest-scoring words
    Top(usize),
    /// The top P percent of words
    TopPercent(f64),
    /// Words scoring strictly above T
    Threshold(f32),
}

impl fmt::Display for KeepPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeepPolicy::All => write!(f, "all"),
            KeepPolicy::Top(n) => write!(f, "top{}", n),
            KeepPolicy::TopPercent(p) => write!(f, "top{}%", p),
            KeepPolicy::Threshold(t) => write!(f, "thresh-{}", t),
        }
    }
}

impl FromStr for KeepPolicy {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let invalid = || TypesError::InvalidInput(format!("invalid keep policy '{}'", s));

        if s == "all" {
            return Ok(KeepPolicy::All);
        }
        if let Some(rest) = s.strip_prefix("top") {
            let rest = rest.strip_prefix('-').unwrap_or(rest);
            if let Some(pct) = rest.strip_suffix('%') {
                let p: f64 = pct.parse().map_err(|_| invalid())?;
                if !(0.0..=100.0).contains(&p) {
                    return Err(invalid());
                }
                return Ok(KeepPolicy::TopPercent(p));
            }
            return rest.parse().map(KeepPolicy::Top).map_err(|_| invalid());
        }
        if let Some(rest) = s.strip_prefix("thresh") {
            let rest = rest.strip_prefix('-').unwrap_or(rest);
            return rest.parse().map(KeepPolicy::Threshold).map_err(|_| invalid());
        }
        Err(invalid())
    }
}

impl TryFrom<String> for KeepPolicy {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeepPolicy> for String {
    fn from(policy: KeepPolicy) -> Self {
        policy.to_string()
    }
}

/// How a label score is normalized against the label's neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Raw sum of matched similarities
    #[default]
    None,
    /// Divide by the number of matched tokens
    InterLen,
    /// Divide by the sum of every similarity in the neighborhood
    MaxScore,
}

impl FromStr for Normalization {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Normalization::None),
            "inter_len" => Ok(Normalization::InterLen),
            "max_score" => Ok(Normalization::MaxScore),
            other => Err(TypesError::InvalidInput(format!(
                "unknown normalization '{}' (expected none, inter_len or max_score)",
                other
            ))),
        }
    }
}

/// Treatment of matched tokens whose similarity is zero (out of vocabulary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OovTokens {
    /// Count them as matches contributing 0.0
    #[default]
    CountAsZero,
    /// Leave them out of the match count
    Exclude,
}

impl FromStr for OovTokens {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "count_as_zero" => Ok(OovTokens::CountAsZero),
            "exclude" => Ok(OovTokens::Exclude),
            other => Err(TypesError::InvalidInput(format!(
                "unknown oov token policy '{}' (expected count_as_zero or exclude)",
                other
            ))),
        }
    }
}
