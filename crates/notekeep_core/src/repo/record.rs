//! Mapping between `Note` and its flat property record.
//!
//! # Invariants
//! - `title` and `content` round-trip verbatim.
//! - One `highlight_<start>` key per range, value `<length>,<color>`.
//! - Malformed highlight entries are skipped, never fatal.
//! - Records without `id` get a deterministic id derived from the file stem.

use crate::model::note::{Highlight, HighlightColor, HighlightSet, Note, NoteId};
use crate::props::PropertyMap;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

pub const KEY_ID: &str = "id";
pub const KEY_TITLE: &str = "title";
pub const KEY_CONTENT: &str = "content";
pub const KEY_CREATED_AT: &str = "created_at";
pub const HIGHLIGHT_KEY_PREFIX: &str = "highlight_";
/// Header comment written at the top of every record.
pub const RECORD_HEADER: &str = "Note Properties";

static HIGHLIGHT_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^highlight_([0-9]+)$").expect("valid highlight key regex"));
static HIGHLIGHT_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([0-9]+)\s*(?:,\s*([A-Za-z]+)\s*)?$").expect("valid highlight value regex")
});

/// Fallback identity for records that predate the `id`/`created_at` keys.
#[derive(Debug, Clone, Copy)]
pub struct RecordOrigin<'a> {
    /// Record file name without extension.
    pub file_stem: &'a str,
    /// File modification time in epoch milliseconds.
    pub modified_ms: Option<i64>,
}

/// Decoded note plus counts of entries that were ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    pub note: Note,
    /// Highlight keys/values that did not parse.
    pub skipped_highlights: usize,
    /// Parsed highlights that extend past the content.
    pub dropped_highlights: usize,
}

/// Encodes a note into its record mapping.
pub fn encode_note(note: &Note) -> PropertyMap {
    let mut map = PropertyMap::new();
    map.insert(KEY_ID.to_string(), note.id().hyphenated().to_string());
    map.insert(KEY_TITLE.to_string(), note.title.clone());
    map.insert(KEY_CONTENT.to_string(), note.content.clone());
    map.insert(KEY_CREATED_AT.to_string(), note.created_at_ms().to_string());
    for highlight in note.highlights.iter() {
        map.insert(
            format!("{HIGHLIGHT_KEY_PREFIX}{}", highlight.start),
            format!("{},{}", highlight.length, highlight.color.as_str()),
        );
    }
    map
}

/// Decodes a record mapping into a note.
///
/// # Errors
/// - Returns a reason string when the mandatory `title` key is absent.
pub fn decode_note(map: &PropertyMap, origin: RecordOrigin<'_>) -> Result<DecodedRecord, String> {
    let title = map
        .get(KEY_TITLE)
        .ok_or_else(|| format!("missing `{KEY_TITLE}` key"))?;
    let content = map.get(KEY_CONTENT).cloned().unwrap_or_default();

    let id = map
        .get(KEY_ID)
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
        .unwrap_or_else(|| legacy_note_id(origin.file_stem));
    let created_at_ms = map
        .get(KEY_CREATED_AT)
        .and_then(|value| value.trim().parse::<i64>().ok())
        .or(origin.modified_ms)
        .unwrap_or(0);

    let mut skipped_highlights = 0;
    let mut highlights = HighlightSet::new();
    for (key, value) in map.range(HIGHLIGHT_KEY_PREFIX.to_string()..) {
        if !key.starts_with(HIGHLIGHT_KEY_PREFIX) {
            break;
        }
        match parse_highlight(key, value) {
            Some(highlight) => {
                highlights.insert(highlight);
            }
            None => {
                skipped_highlights += 1;
                debug!(
                    "event=record_decode module=repo status=skip reason=bad_highlight file_stem={}",
                    origin.file_stem
                );
            }
        }
    }

    let mut note = Note::with_identity(id, created_at_ms, title.clone(), content);
    let dropped_highlights = highlights.retain_fitting(&note.content);
    note.highlights = highlights;

    Ok(DecodedRecord {
        note,
        skipped_highlights,
        dropped_highlights,
    })
}

/// Deterministic id for a record file that carries no `id` key.
pub fn legacy_note_id(file_stem: &str) -> NoteId {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, file_stem.as_bytes())
}

fn parse_highlight(key: &str, value: &str) -> Option<Highlight> {
    let start = HIGHLIGHT_KEY_RE
        .captures(key)?
        .get(1)?
        .as_str()
        .parse::<usize>()
        .ok()?;
    let captures = HIGHLIGHT_VALUE_RE.captures(value)?;
    let length = captures.get(1)?.as_str().parse::<usize>().ok()?;
    let color = match captures.get(2) {
        Some(label) => HighlightColor::parse(label.as_str())?,
        None => HighlightColor::default(),
    };
    Some(Highlight::new(start, length, color))
}

#[cfg(test)]
mod tests {
    use super::{decode_note, encode_note, legacy_note_id, RecordOrigin};
    use crate::model::note::{Highlight, HighlightColor, Note};
    use crate::props::PropertyMap;

    const ORIGIN: RecordOrigin<'static> = RecordOrigin {
        file_stem: "Shopping",
        modified_ms: Some(1_700_000_000_000),
    };

    fn record(entries: &[(&str, &str)]) -> PropertyMap {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn encode_writes_one_key_per_highlight() {
        let mut note = Note::new("t", "hello world");
        note.highlights.insert(Highlight::new(0, 5, HighlightColor::Pink));
        note.highlights.insert(Highlight::new(6, 5, HighlightColor::Yellow));

        let map = encode_note(&note);
        assert_eq!(map["highlight_0"], "5,pink");
        assert_eq!(map["highlight_6"], "5,yellow");
        assert_eq!(map["title"], "t");
        assert_eq!(map["content"], "hello world");
        assert_eq!(map["id"], note.id().to_string());
    }

    #[test]
    fn legacy_record_uses_stem_id_and_mtime_and_default_color() {
        let map = record(&[
            ("title", "Shopping"),
            ("content", "milk and eggs"),
            ("highlight_0", "4"),
        ]);
        let decoded = decode_note(&map, ORIGIN).unwrap();
        assert_eq!(decoded.note.id(), legacy_note_id("Shopping"));
        assert_eq!(decoded.note.created_at_ms(), 1_700_000_000_000);
        let highlights = decoded.note.highlights.iter().copied().collect::<Vec<_>>();
        assert_eq!(
            highlights,
            vec![Highlight::new(0, 4, HighlightColor::Yellow)]
        );
    }

    #[test]
    fn malformed_highlights_are_skipped_individually() {
        let map = record(&[
            ("title", "t"),
            ("content", "0123456789"),
            ("highlight_abc", "3"),
            ("highlight_1", "two"),
            ("highlight_2", "3,purple"),
            ("highlight_-4", "1"),
            ("highlight_5", "2,cyan"),
            ("highlight_7", "99"),
        ]);
        let decoded = decode_note(&map, ORIGIN).unwrap();
        assert_eq!(decoded.skipped_highlights, 4);
        assert_eq!(decoded.dropped_highlights, 1);
        let highlights = decoded.note.highlights.iter().copied().collect::<Vec<_>>();
        assert_eq!(highlights, vec![Highlight::new(5, 2, HighlightColor::Cyan)]);
    }

    #[test]
    fn missing_title_is_rejected() {
        let err = decode_note(&record(&[("content", "x")]), ORIGIN).unwrap_err();
        assert!(err.contains("title"));
    }
}
