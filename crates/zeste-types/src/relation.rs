//! Relation vocabulary.
//!
//! Every kind has a storage code (the lowercased ConceptNet relation name),
//! a display label used in explanation paths, an inverse and a short
//! description. In the record of word `A`, a neighbor `B` tagged with kind `k`
//! reads `B --k--> A`; the importer writes the inverse kind into the record of
//! `B` so traversal works in both directions.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

macro_rules! relation_kinds {
    ($($variant:ident => $code:literal, $label:literal, $inverse:ident, $desc:literal;)*) => {
        /// Kind of a relation edge.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "&'static str")]
        pub enum RelationKind {
            $($variant,)*
        }

        impl RelationKind {
            /// Every kind in the vocabulary.
            pub const ALL: &'static [RelationKind] = &[$(RelationKind::$variant,)*];

            /// Storage code (`atlocation`, `dbpedia/genre`).
            pub fn code(&self) -> &'static str {
                match self {
                    $(RelationKind::$variant => $code,)*
                }
            }

            /// Display label used in explanation paths (`located-at`).
            pub fn label(&self) -> &'static str {
                match self {
                    $(RelationKind::$variant => $label,)*
                }
            }

            /// The kind written on the reverse edge.
            pub fn inverse(&self) -> RelationKind {
                match self {
                    $(RelationKind::$variant => RelationKind::$inverse,)*
                }
            }

            /// Human-readable description.
            pub fn description(&self) -> &'static str {
                match self {
                    $(RelationKind::$variant => $desc,)*
                }
            }

            /// Parse from storage code.
            pub fn from_code(code: &str) -> Option<Self> {
                match code {
                    $($code => Some(RelationKind::$variant),)*
                    _ => None,
                }
            }

            fn from_label(label: &str) -> Option<Self> {
                match label {
                    $($label => Some(RelationKind::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

relation_kinds! {
    SameAs => "sameas", "same-as", SameAs, "is the same as";
    RelatedTo => "relatedto", "related-to", RelatedTo, "is related to";
    FormOf => "formof", "form-of", HasForm, "is a form of";
    HasForm => "hasform", "has-form", FormOf, "has the form";
    IsA => "isa", "is-a", HasSubtype, "is a";
    HasSubtype => "hassubtype", "has-subtype", IsA, "has the subtype";
    PartOf => "partof", "part-of", HasA, "is part of";
    HasA => "hasa", "has-a", PartOf, "has";
    UsedFor => "usedfor", "used-for", Uses, "is used for";
    Uses => "uses", "uses", UsedFor, "uses";
    CapableOf => "capableof", "capable-of", DoableBy, "is capable of";
    DoableBy => "doableby", "doable-by", CapableOf, "can be done by";
    AtLocation => "atlocation", "located-at", LocationOf, "is located at";
    LocationOf => "locationof", "location-of", AtLocation, "is the location of";
    Causes => "causes", "causes", CausedBy, "causes";
    CausedBy => "causedby", "caused-by", Causes, "is caused by";
    HasSubevent => "hassubevent", "has-subevent", SubeventOf, "has the subevent";
    SubeventOf => "subeventof", "subevent-of", HasSubevent, "is a subevent of";
    HasFirstSubevent => "hasfirstsubevent", "has-first-subevent", FirstSubeventOf, "begins with";
    FirstSubeventOf => "firstsubeventof", "first-subevent-of", HasFirstSubevent, "is the beginning of";
    HasLastSubevent => "haslastsubevent", "has-last-subevent", LastSubeventOf, "ends with";
    LastSubeventOf => "lastsubeventof", "last-subevent-of", HasLastSubevent, "is the end of";
    HasPrerequisite => "hasprerequisite", "has-prerequisite", PrerequisiteOf, "requires";
    PrerequisiteOf => "prerequisiteof", "prerequisite-of", HasPrerequisite, "is required for";
    HasProperty => "hasproperty", "has-property", PropertyOf, "has the property";
    PropertyOf => "propertyof", "property-of", HasProperty, "is a property of";
    MotivatedByGoal => "motivatedbygoal", "motivated-by", Motivates, "is motivated by";
    Motivates => "motivates", "motivates", MotivatedByGoal, "motivates";
    ObstructedBy => "obstructedby", "obstructed-by", Obstructs, "is obstructed by";
    Obstructs => "obstructs", "obstructs", ObstructedBy, "obstructs";
    Desires => "desires", "desires", DesiredBy, "desires";
    DesiredBy => "desiredby", "desired-by", Desires, "is desired by";
    CreatedBy => "createdby", "created-by", Created, "is created by";
    Created => "created", "created", CreatedBy, "created";
    Synonym => "synonym", "synonym", Synonym, "is a synonym of";
    Antonym => "antonym", "antonym", Antonym, "is the opposite of";
    DistinctFrom => "distinctfrom", "distinct-from", DistinctFrom, "is distinct from";
    DerivedFrom => "derivedfrom", "derived-from", Derives, "is derived from";
    Derives => "derives", "derives", DerivedFrom, "is the root of";
    SymbolOf => "symbolof", "symbol-of", SymbolizedBy, "is a symbol of";
    SymbolizedBy => "symbolizedby", "symbolized-by", SymbolOf, "is symbolized by";
    DefinedAs => "definedas", "defined-as", DefinitionOf, "is defined as";
    DefinitionOf => "definitionof", "definition-of", DefinedAs, "is the definition of";
    MannerOf => "mannerof", "manner-of", HasManner, "is a way of";
    HasManner => "hasmanner", "has-manner", MannerOf, "can be done by way of";
    LocatedNear => "locatednear", "located-near", LocatedNear, "is located near";
    HasContext => "hascontext", "has-context", ContextOf, "is used in the context of";
    ContextOf => "contextof", "context-of", HasContext, "is the context of";
    SimilarTo => "similarto", "similar-to", SimilarTo, "is similar to";
    EtymologicallyRelatedTo => "etymologicallyrelatedto", "etymologically-related-to", EtymologicallyRelatedTo, "shares an etymology with";
    EtymologicallyDerivedFrom => "etymologicallyderivedfrom", "etymologically-derived-from", EtymologicallyDerives, "is etymologically derived from";
    EtymologicallyDerives => "etymologicallyderives", "etymologically-derives", EtymologicallyDerivedFrom, "is the etymological root of";
    CausesDesire => "causesdesire", "causes-desire", DesireCausedBy, "makes someone want";
    DesireCausedBy => "desirecausedby", "desire-caused-by", CausesDesire, "is wanted because of";
    MadeOf => "madeof", "made-of", MaterialOf, "is made of";
    MaterialOf => "materialof", "material-of", MadeOf, "is the material of";
    ReceivesAction => "receivesaction", "receives-action", ActsOn, "can be";
    ActsOn => "actson", "acts-on", ReceivesAction, "can be applied to";
    InstanceOf => "instanceof", "instance-of", HasInstance, "is an instance of";
    HasInstance => "hasinstance", "has-instance", InstanceOf, "has the instance";
    Entails => "entails", "entails", EntailedBy, "entails";
    EntailedBy => "entailedby", "entailed-by", Entails, "is entailed by";
    NotDesires => "notdesires", "not-desires", NotDesiredBy, "does not want";
    NotDesiredBy => "notdesiredby", "not-desired-by", NotDesires, "is not wanted by";
    NotCapableOf => "notcapableof", "not-capable-of", NotDoableBy, "is not capable of";
    NotDoableBy => "notdoableby", "not-doable-by", NotCapableOf, "cannot be done by";
    NotHasProperty => "nothasproperty", "not-has-property", NotPropertyOf, "does not have the property";
    NotPropertyOf => "notpropertyof", "not-property-of", NotHasProperty, "is not a property of";
    NotUsedFor => "notusedfor", "not-used-for", NotUses, "is not used for";
    NotUses => "notuses", "not-uses", NotUsedFor, "does not use";
    DbpediaCapital => "dbpedia/capital", "capital", DbpediaCapital, "has the capital";
    DbpediaField => "dbpedia/field", "field", DbpediaField, "works in the field of";
    DbpediaGenre => "dbpedia/genre", "genre", DbpediaGenre, "belongs to the genre";
    DbpediaGenus => "dbpedia/genus", "genus", DbpediaGenus, "belongs to the genus";
    DbpediaInfluencedBy => "dbpedia/influencedby", "influenced-by", DbpediaInfluencedBy, "is influenced by";
    DbpediaKnownFor => "dbpedia/knownfor", "known-for", DbpediaKnownFor, "is known for";
    DbpediaLanguage => "dbpedia/language", "language", DbpediaLanguage, "has the language";
    DbpediaLeader => "dbpedia/leader", "leader", DbpediaLeader, "is led by";
    DbpediaOccupation => "dbpedia/occupation", "occupation", DbpediaOccupation, "has the occupation";
    DbpediaProduct => "dbpedia/product", "product", DbpediaProduct, "makes the product";
}

impl RelationKind {
    /// Parse a ConceptNet relation URI (`/r/AtLocation`, `/r/dbpedia/genre`).
    ///
    /// `ExternalURL` and unknown relations yield `None`.
    pub fn from_conceptnet_uri(uri: &str) -> Option<Self> {
        let name = uri.strip_prefix("/r/")?;
        Self::from_code(&name.to_lowercase())
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for RelationKind {
    type Err = TypesError;

    /// Accepts the storage code or the display label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Self::from_code(&s)
            .or_else(|| Self::from_label(&s))
            .ok_or(TypesError::UnknownRelation(s))
    }
}

impl TryFrom<String> for RelationKind {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RelationKind> for &'static str {
    fn from(kind: RelationKind) -> Self {
        kind.code()
    }
}

/// Relations accepted by the `related` shorthand.
pub const RELATED_RELATIONS: &[RelationKind] = &[
    RelationKind::DefinedAs,
    RelationKind::DerivedFrom,
    RelationKind::HasA,
    RelationKind::InstanceOf,
    RelationKind::IsA,
    RelationKind::PartOf,
    RelationKind::RelatedTo,
    RelationKind::SimilarTo,
    RelationKind::Synonym,
    RelationKind::Antonym,
];

/// Which relation kinds a traversal or filter may follow.
///
/// Parsed from `all`, `related`, or a comma-separated list of codes/labels.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RelationFilter {
    /// No restriction
    #[default]
    All,
    /// Only the listed kinds
    Only(BTreeSet<RelationKind>),
}

impl RelationFilter {
    /// The `related` shorthand.
    pub fn related() -> Self {
        RelationFilter::Only(RELATED_RELATIONS.iter().copied().collect())
    }

    /// Whether this filter leaves everything through.
    pub fn is_all(&self) -> bool {
        matches!(self, RelationFilter::All)
    }

    /// Whether an edge tagged with `kinds` may be kept.
    ///
    /// Self entries (`sameas`) always pass so a seed survives any filter.
    pub fn allows(&self, kinds: &[RelationKind]) -> bool {
        match self {
            RelationFilter::All => true,
            RelationFilter::Only(allowed) => kinds
                .iter()
                .any(|k| *k == RelationKind::SameAs || allowed.contains(k)),
        }
    }

    /// Path-safe identifier, `None` for `All`.
    ///
    /// Used to namespace cache directories per relation configuration.
    pub fn fingerprint(&self) -> Option<String> {
        match self {
            RelationFilter::All => None,
            RelationFilter::Only(allowed) => Some(
                allowed
                    .iter()
                    .map(|k| k.code().replace('/', "."))
                    .collect::<Vec<_>>()
                    .join("+"),
            ),
        }
    }
}

impl fmt::Display for RelationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationFilter::All => write!(f, "all"),
            RelationFilter::Only(allowed) => {
                let codes: Vec<&str> = allowed.iter().map(|k| k.code()).collect();
                write!(f, "{}", codes.join(","))
            }
        }
    }
}

impl FromStr for RelationFilter {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" | "" => Ok(RelationFilter::All),
            "related" => Ok(RelationFilter::related()),
            list => {
                let kinds = list
                    .split(',')
                    .filter(|p| !p.trim().is_empty())
                    .map(str::parse)
                    .collect::<Result<BTreeSet<RelationKind>, _>>()?;
                Ok(RelationFilter::Only(kinds))
            }
        }
    }
}

impl TryFrom<String> for RelationFilter {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RelationFilter> for String {
    fn from(filter: RelationFilter) -> Self {
        filter.to_string()
    }
}
