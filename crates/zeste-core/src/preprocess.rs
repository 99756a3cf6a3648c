//! Text preprocessing.
//!
//! Turns raw text into the token form used by the graph: lowercase words,
//! underscores for hyphenated compounds, English stopwords removed, nouns
//! reduced to their lemma.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use zeste_embeddings::EmbeddingStore;
use zeste_types::Word;

/// ASCII punctuation stripped from documents. Underscore is kept.
const PUNCTUATION: &str = "!\"#$%&'()*+,./:;<=>?@[\\]^`{|}~";

/// NLTK English stopword list.
const STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

fn stopword_set() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOPWORDS.iter().copied().collect())
}

/// Whether `word` is an English stopword.
pub fn is_stopword(word: &str) -> bool {
    stopword_set().contains(word)
}

/// Irregular plural -> singular.
const NOUN_EXCEPTIONS: &[(&str, &str)] = &[
    ("alumni", "alumnus"),
    ("analyses", "analysis"),
    ("appendices", "appendix"),
    ("bacteria", "bacterium"),
    ("cacti", "cactus"),
    ("calves", "calf"),
    ("children", "child"),
    ("corpora", "corpus"),
    ("crises", "crisis"),
    ("criteria", "criterion"),
    ("curricula", "curriculum"),
    ("diagnoses", "diagnosis"),
    ("elves", "elf"),
    ("feet", "foot"),
    ("fungi", "fungus"),
    ("geese", "goose"),
    ("halves", "half"),
    ("hypotheses", "hypothesis"),
    ("indices", "index"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("lice", "louse"),
    ("lives", "life"),
    ("loaves", "loaf"),
    ("matrices", "matrix"),
    ("mice", "mouse"),
    ("nuclei", "nucleus"),
    ("oases", "oasis"),
    ("oxen", "ox"),
    ("parentheses", "parenthesis"),
    ("phenomena", "phenomenon"),
    ("radii", "radius"),
    ("selves", "self"),
    ("shelves", "shelf"),
    ("stimuli", "stimulus"),
    ("strata", "stratum"),
    ("teeth", "tooth"),
    ("theses", "thesis"),
    ("thieves", "thief"),
    ("vertices", "vertex"),
    ("wives", "wife"),
    ("wolves", "wolf"),
];

/// Detachment rules tried in order: (suffix, replacement).
const NOUN_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ses", "s"),
    ("ves", "f"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

/// Nouns ending in `s` that are not plurals.
const SINGULAR_S: &[&str] = &[
    "news", "series", "species", "physics", "mathematics", "politics", "economics", "means",
    "lens", "gas", "atlas", "canvas",
];

/// WordNet-style noun lemmatizer.
///
/// With a vocabulary, every candidate lemma (the word itself, its exception
/// entry, each rule application) is checked against it and the shortest
/// known candidate wins; unknown words are returned unchanged. Without one,
/// a conservative subset of the rules applies.
#[derive(Clone, Default)]
pub struct Lemmatizer {
    vocabulary: Option<Arc<dyn EmbeddingStore>>,
}

impl Lemmatizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vocabulary(vocabulary: Arc<dyn EmbeddingStore>) -> Self {
        Self {
            vocabulary: Some(vocabulary),
        }
    }

    fn exception(word: &str) -> Option<&'static str> {
        NOUN_EXCEPTIONS
            .iter()
            .find(|(plural, _)| *plural == word)
            .map(|(_, singular)| *singular)
    }

    /// Lemma of a single lowercase token.
    pub fn lemmatize(&self, word: &str) -> Word {
        match &self.vocabulary {
            Some(vocabulary) => Self::lemmatize_known(word, vocabulary.as_ref()),
            None => Self::lemmatize_rules(word),
        }
    }

    fn lemmatize_known(word: &str, vocabulary: &dyn EmbeddingStore) -> Word {
        let mut candidates: Vec<String> = vec![word.to_string()];
        if let Some(singular) = Self::exception(word) {
            candidates.push(singular.to_string());
        }
        for (suffix, replacement) in NOUN_RULES {
            if let Some(stem) = word.strip_suffix(suffix) {
                if !stem.is_empty() {
                    candidates.push(format!("{}{}", stem, replacement));
                }
            }
        }
        candidates
            .into_iter()
            .filter(|c| vocabulary.has(c))
            .min_by_key(|c| c.len())
            .unwrap_or_else(|| word.to_string())
    }

    fn lemmatize_rules(word: &str) -> Word {
        if let Some(singular) = Self::exception(word) {
            return singular.to_string();
        }
        if word.len() <= 3
            || SINGULAR_S.contains(&word)
            || word.ends_with("ss")
            || word.ends_with("us")
            || word.ends_with("is")
        {
            return word.to_string();
        }
        if let Some(stem) = word.strip_suffix("ies") {
            if stem.len() > 1 {
                return format!("{}y", stem);
            }
        }
        for suffix in ["sses", "ches", "shes", "xes", "zes"] {
            if word.ends_with(suffix) {
                return word[..word.len() - 2].to_string();
            }
        }
        if let Some(stem) = word.strip_suffix('s') {
            return stem.to_string();
        }
        word.to_string()
    }
}

impl std::fmt::Debug for Lemmatizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lemmatizer")
            .field("vocabulary", &self.vocabulary.as_ref().map(|v| v.len()))
            .finish()
    }
}

/// Text -> token pipeline.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    lemmatizer: Lemmatizer,
}

impl Preprocessor {
    /// Preprocessor with rule-based lemmatization.
    pub fn new() -> Self {
        Self::default()
    }

    /// Preprocessor whose lemmas are checked against `vocabulary`.
    pub fn with_vocabulary(vocabulary: Arc<dyn EmbeddingStore>) -> Self {
        Self {
            lemmatizer: Lemmatizer::with_vocabulary(vocabulary),
        }
    }

    /// Contractions, hyphens, punctuation and case.
    ///
    /// `'ll` becomes ` will`, a plural possessive `s' ` becomes `s `, `'s`
    /// is dropped and hyphens join compounds with underscores.
    pub fn normalize(text: &str) -> String {
        let text = text
            .replace("'ll", " will")
            .replace("s' ", "s ")
            .replace("'s", "")
            .replace('-', "_");
        text.chars()
            .filter(|c| !PUNCTUATION.contains(*c))
            .collect::<String>()
            .to_lowercase()
    }

    /// Tokenize a document.
    pub fn tokenize(&self, text: &str) -> Vec<Word> {
        Self::normalize(text)
            .split_whitespace()
            .filter(|w| !is_stopword(w))
            .filter(|w| w.chars().any(|c| c != '_'))
            .map(|w| self.lemmatizer.lemmatize(w))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zeste_embeddings::EmbeddingTable;

    #[test]
    fn test_stopword_list() {
        assert_eq!(STOPWORDS.len(), 179);
        assert!(is_stopword("the"));
        assert!(is_stopword("will"));
        assert!(!is_stopword("space"));
    }

    #[test]
    fn test_normalize_contractions_and_punctuation() {
        assert_eq!(
            Preprocessor::normalize("We'll see the Star's light!"),
            "we will see the star light"
        );
        assert_eq!(
            Preprocessor::normalize("the players' ball"),
            "the players ball"
        );
        assert_eq!(
            Preprocessor::normalize("Science-Fiction, (really)?"),
            "science_fiction really"
        );
    }

    #[test]
    fn test_tokenize_drops_stopwords_and_lemmatizes() {
        let pre = Preprocessor::new();
        assert_eq!(
            pre.tokenize("The stars are in the sky"),
            vec!["star".to_string(), "sky".to_string()]
        );
        assert_eq!(
            pre.tokenize("I love television shows"),
            vec!["love".to_string(), "television".to_string(), "show".to_string()]
        );
    }

    #[test]
    fn test_tokenize_drops_bare_underscores() {
        let pre = Preprocessor::new();
        assert_eq!(pre.tokenize("space - time"), vec!["space".to_string(), "time".to_string()]);
    }

    #[test]
    fn test_rule_lemmas() {
        let lem = Lemmatizer::new();
        assert_eq!(lem.lemmatize("cities"), "city");
        assert_eq!(lem.lemmatize("boxes"), "box");
        assert_eq!(lem.lemmatize("churches"), "church");
        assert_eq!(lem.lemmatize("classes"), "class");
        assert_eq!(lem.lemmatize("glass"), "glass");
        assert_eq!(lem.lemmatize("bus"), "bus");
        assert_eq!(lem.lemmatize("news"), "news");
        assert_eq!(lem.lemmatize("children"), "child");
        assert_eq!(lem.lemmatize("gas"), "gas");
    }

    #[test]
    fn test_vocabulary_lemmas_pick_shortest_known() {
        let vocab = EmbeddingTable::from_vectors(vec![
            ("glass", vec![1.0, 0.0]),
            ("glasses", vec![0.0, 1.0]),
            ("woman", vec![1.0, 1.0]),
            ("star", vec![1.0, 0.5]),
        ])
        .unwrap();
        let lem = Lemmatizer::with_vocabulary(Arc::new(vocab));
        assert_eq!(lem.lemmatize("glasses"), "glass");
        assert_eq!(lem.lemmatize("women"), "woman");
        assert_eq!(lem.lemmatize("stars"), "star");
        // Unknown words pass through
        assert_eq!(lem.lemmatize("quasars"), "quasars");
    }
}
