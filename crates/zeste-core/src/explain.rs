//! Path explanations.
//!
//! A document token that scores against a label is explained by the
//! relation chain that brought it into the label's neighborhood, up to two
//! hops:
//!
//! ```text
//! star --located-at--> space
//! love --is-a--> television_show --is-a--> space
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use zeste_types::{Neighborhood, RelationKind, Word};

/// Marker shown when the token is the label itself.
pub const IS_LABEL: &str = "is-label";

/// Relation chain from a token to a label word.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "Vec<String>")]
pub enum Path {
    /// The token is the label word
    IsLabel { word: Word },
    /// One hop: `word --rel--> label`
    Direct {
        word: Word,
        rel: RelationKind,
        label: Word,
    },
    /// Two hops through a bridge word
    Bridge {
        word: Word,
        rel: RelationKind,
        bridge: Word,
        bridge_rel: RelationKind,
        label: Word,
    },
}

impl Path {
    /// Flat form: `[word, "is-label"]`, `[word, rel, label]` or
    /// `[word, rel, bridge, rel, label]`.
    pub fn elements(&self) -> Vec<String> {
        match self {
            Path::IsLabel { word } => vec![word.clone(), IS_LABEL.to_string()],
            Path::Direct { word, rel, label } => {
                vec![word.clone(), rel.label().to_string(), label.clone()]
            }
            Path::Bridge {
                word,
                rel,
                bridge,
                bridge_rel,
                label,
            } => vec![
                word.clone(),
                rel.label().to_string(),
                bridge.clone(),
                bridge_rel.label().to_string(),
                label.clone(),
            ],
        }
    }

    /// Displayable edges: `[[word, rel, bridge], [bridge, rel, label]]`.
    pub fn edges(&self) -> Vec<Vec<String>> {
        let e = self.elements();
        match self {
            Path::IsLabel { .. } => vec![e],
            Path::Direct { .. } => vec![e],
            Path::Bridge { .. } => vec![e[0..3].to_vec(), e[2..5].to_vec()],
        }
    }

    /// Number of hops (0 for the label itself).
    pub fn hops(&self) -> usize {
        match self {
            Path::IsLabel { .. } => 0,
            Path::Direct { .. } => 1,
            Path::Bridge { .. } => 2,
        }
    }

    /// Plain-English reading, one clause per hop.
    pub fn describe(&self) -> String {
        match self {
            Path::IsLabel { word } => format!("{} is the label", word),
            Path::Direct { word, rel, label } => {
                format!("{} {} {}", word, rel.description(), label)
            }
            Path::Bridge {
                word,
                rel,
                bridge,
                bridge_rel,
                label,
            } => format!(
                "{} {} {}, which {} {}",
                word,
                rel.description(),
                bridge,
                bridge_rel.description(),
                label
            ),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::IsLabel { word } => write!(f, "{} ({})", word, IS_LABEL),
            Path::Direct { word, rel, label } => write!(f, "{} --{}--> {}", word, rel, label),
            Path::Bridge {
                word,
                rel,
                bridge,
                bridge_rel,
                label,
            } => write!(
                f,
                "{} --{}--> {} --{}--> {}",
                word, rel, bridge, bridge_rel, label
            ),
        }
    }
}

impl From<Path> for Vec<String> {
    fn from(path: Path) -> Self {
        path.elements()
    }
}

/// Last relation recorded on the provenance edge from `from`.
fn last_rel(neighborhood: &Neighborhood, word: &str, from: &str) -> Option<RelationKind> {
    neighborhood
        .get(word)?
        .rels_from(from)
        .and_then(|rels| rels.last().copied())
}

/// Best relation chain from `word` to `label` within two hops.
///
/// When several bridges qualify, the one most similar to the label seed
/// (`simple`) wins; ties go to the earliest provenance.
pub fn best_path(word: &str, label: &str, neighborhood: &Neighborhood) -> Option<Path> {
    if word == label {
        return Some(Path::IsLabel {
            word: word.to_string(),
        });
    }
    let entry = neighborhood.get(word)?;

    if let Some(rel) = last_rel(neighborhood, word, label) {
        return Some(Path::Direct {
            word: word.to_string(),
            rel,
            label: label.to_string(),
        });
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut best: Option<(f32, Path)> = None;
    for bridge in &entry.from {
        if bridge == word || bridge == label || !seen.insert(bridge.as_str()) {
            continue;
        }
        let Some(bridge_entry) = neighborhood.get(bridge) else {
            continue;
        };
        let Some(bridge_rel) = last_rel(neighborhood, bridge, label) else {
            continue;
        };
        let Some(rel) = last_rel(neighborhood, word, bridge) else {
            continue;
        };
        let sim = bridge_entry.sim.simple;
        if best.as_ref().map_or(true, |(s, _)| sim > *s) {
            best = Some((
                sim,
                Path::Bridge {
                    word: word.to_string(),
                    rel,
                    bridge: bridge.clone(),
                    bridge_rel,
                    label: label.to_string(),
                },
            ));
        }
    }
    best.map(|(_, path)| path)
}
