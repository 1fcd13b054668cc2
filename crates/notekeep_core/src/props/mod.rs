//! Flat `key=value` property format used for note records.
//!
//! # Responsibility
//! - Serialize a string-to-string mapping into a line-oriented text record.
//! - Parse such records back, including files written by `java.util.Properties`.
//!
//! # Invariants
//! - `load(&store(map, ..))` yields `map` for every key and value, including
//!   embedded newlines and control characters.
//! - Comment lines are cosmetic and never parsed back.
//! - Duplicate keys on load resolve to the last occurrence.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod decode;
mod encode;

pub use decode::load;
pub use encode::store;

/// Ordered string-to-string mapping persisted as one record.
pub type PropertyMap = BTreeMap<String, String>;

pub type PropsResult<T> = Result<T, PropsError>;

/// Fatal parse errors for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropsError {
    /// `\u` not followed by four hex digits.
    MalformedUnicodeEscape { line: usize },
    /// UTF-16 surrogate escape without its pair.
    UnpairedSurrogate { line: usize },
}

impl Display for PropsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedUnicodeEscape { line } => {
                write!(f, "malformed \\uXXXX escape on line {line}")
            }
            Self::UnpairedSurrogate { line } => {
                write!(f, "unpaired UTF-16 surrogate escape on line {line}")
            }
        }
    }
}

impl Error for PropsError {}

#[cfg(test)]
mod tests {
    use super::{load, store, PropertyMap};

    fn map(entries: &[(&str, &str)]) -> PropertyMap {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn store_then_load_preserves_awkward_values() {
        let original = map(&[
            ("title", "  leading spaces"),
            ("content", "line one\nline two\r\n\ttabbed = a: b # c ! d\\"),
            ("weird key=with:separators", "\u{1}\u{1f}\u{7f}bell"),
            ("unicode", "naïve 日本語 🙂"),
            ("empty", ""),
        ]);

        let text = store(&original, Some("Note Properties"), "now");
        let decoded = load(&text).expect("stored text should load");
        assert_eq!(decoded, original);
    }

    #[test]
    fn stored_record_is_one_line_per_entry_after_comments() {
        let original = map(&[("content", "a\nb\nc"), ("title", "t")]);
        let text = store(&original, Some("Note Properties"), "Sat Oct 18 2026");
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "#Note Properties");
        assert_eq!(lines[1], "#Sat Oct 18 2026");
        assert_eq!(lines[2], "content=a\\nb\\nc");
        assert_eq!(lines[3], "title=t");
        assert_eq!(lines.len(), 4);
    }
}
