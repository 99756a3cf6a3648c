//! Key encoding and decoding for file-backed stores.
//!
//! Key format: `{encoded}.json`
//! - bytes in `[A-Za-z0-9_-]` are kept as is
//! - every other byte is written as `%XX` (uppercase hex)
//!
//! Words such as `c++`, `rock'n'roll` or `a/b` therefore map to a single,
//! portable file name and decode back to the original word.

use crate::error::StorageError;

const EXTENSION: &str = ".json";

/// Key addressing one word (or label) inside a store directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WordKey {
    pub word: String,
}

impl WordKey {
    pub fn new(word: impl Into<String>) -> Self {
        Self { word: word.into() }
    }

    /// Encode the word for use as a path component (without extension).
    pub fn encoded(&self) -> String {
        encode(&self.word)
    }

    /// File name of the record: `{encoded}.json`
    pub fn file_name(&self) -> String {
        format!("{}{}", self.encoded(), EXTENSION)
    }

    /// Decode a key from a record file name.
    pub fn from_file_name(name: &str) -> Result<Self, StorageError> {
        let stem = name
            .strip_suffix(EXTENSION)
            .ok_or_else(|| StorageError::Key(format!("Missing {} extension: {}", EXTENSION, name)))?;
        Ok(Self { word: decode(stem)? })
    }
}

fn is_safe(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// Percent-encode bytes outside `[A-Za-z0-9_-]`.
pub fn encode(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    for b in word.bytes() {
        if is_safe(b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

/// Reverse of [`encode`].
pub fn decode(encoded: &str) -> Result<String, StorageError> {
    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = encoded
                    .get(i + 1..i + 3)
                    .ok_or_else(|| StorageError::Key(format!("Truncated escape in: {}", encoded)))?;
                if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err(StorageError::Key(format!("Invalid escape %{}", hex)));
                }
                let value = u8::from_str_radix(hex, 16)
                    .map_err(|e| StorageError::Key(format!("Invalid escape %{}: {}", hex, e)))?;
                out.push(value);
                i += 3;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|e| StorageError::Key(format!("Invalid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_word_unchanged() {
        let key = WordKey::new("science_fiction");
        assert_eq!(key.file_name(), "science_fiction.json");
        assert_eq!(WordKey::new("music-art").encoded(), "music-art");
    }

    #[test]
    fn test_special_bytes_escaped() {
        assert_eq!(encode("c++"), "c%2B%2B");
        assert_eq!(encode("a/b"), "a%2Fb");
        assert_eq!(encode("rock'n'roll"), "rock%27n%27roll");
        assert_eq!(encode("."), "%2E");
    }

    #[test]
    fn test_key_roundtrip() {
        for word in ["space", "c++", "a/b", "café", "100%", ".."] {
            let key = WordKey::new(word);
            let decoded = WordKey::from_file_name(&key.file_name()).unwrap();
            assert_eq!(key, decoded);
        }
    }

    #[test]
    fn test_decode_rejects_bad_escapes() {
        assert!(decode("abc%2").is_err());
        assert!(decode("abc%ZZ").is_err());
        // from_str_radix alone would accept a sign
        assert!(decode("abc%+1").is_err());
        assert!(decode("%-1").is_err());
        assert!(WordKey::from_file_name("space.txt").is_err());
    }
}
