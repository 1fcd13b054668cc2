//! Note domain model.
//!
//! # Responsibility
//! - Define the note record and its highlight ranges.
//! - Validate a note before it is persisted.
//!
//! # Invariants
//! - `id` and `created_at_ms` are fixed at construction.
//! - Highlight offsets count `char`s of `content`, not bytes.
//! - `HighlightSet` is keyed by start offset; inserting a range with an
//!   existing start replaces the previous one.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a note, used as its storage key.
pub type NoteId = Uuid;

/// Display format for note timestamps in list views.
pub const CREATED_AT_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Paint color picked when a range was highlighted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightColor {
    #[default]
    Yellow,
    Pink,
    Cyan,
}

impl HighlightColor {
    /// Stable lowercase label used in records and across FFI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Pink => "pink",
            Self::Cyan => "cyan",
        }
    }

    /// Parses a label produced by [`HighlightColor::as_str`], case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yellow" => Some(Self::Yellow),
            "pink" => Some(Self::Pink),
            // Older records and callers say `blue`.
            "cyan" | "blue" => Some(Self::Cyan),
            _ => None,
        }
    }
}

/// Contiguous span of note content to be visually emphasized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Highlight {
    /// Offset of the first highlighted char.
    pub start: usize,
    /// Number of highlighted chars.
    pub length: usize,
    pub color: HighlightColor,
}

impl Highlight {
    pub fn new(start: usize, length: usize, color: HighlightColor) -> Self {
        Self {
            start,
            length,
            color,
        }
    }

    /// Builds a highlight from a `[start, end)` selection.
    ///
    /// Returns `None` for a reversed selection.
    pub fn from_selection(start: usize, end: usize, color: HighlightColor) -> Option<Self> {
        end.checked_sub(start)
            .map(|length| Self::new(start, length, color))
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.length)
    }

    /// Returns whether the range lies within `content`.
    pub fn fits(&self, content: &str) -> bool {
        self.end() <= content.chars().count()
    }
}

/// Highlight ranges of one note, ordered by start offset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Highlight>", into = "Vec<Highlight>")]
pub struct HighlightSet {
    ranges: BTreeMap<usize, Highlight>,
}

impl HighlightSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `highlight`, returning the range it replaced at the same start.
    pub fn insert(&mut self, highlight: Highlight) -> Option<Highlight> {
        self.ranges.insert(highlight.start, highlight)
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Highlight> {
        self.ranges.values()
    }

    /// Drops ranges that extend past `content`; returns how many were dropped.
    pub fn retain_fitting(&mut self, content: &str) -> usize {
        let content_len = content.chars().count();
        let before = self.ranges.len();
        self.ranges.retain(|_, highlight| highlight.end() <= content_len);
        before - self.ranges.len()
    }
}

impl FromIterator<Highlight> for HighlightSet {
    fn from_iter<T: IntoIterator<Item = Highlight>>(iter: T) -> Self {
        let mut set = Self::new();
        for highlight in iter {
            set.insert(highlight);
        }
        set
    }
}

impl From<Vec<Highlight>> for HighlightSet {
    fn from(value: Vec<Highlight>) -> Self {
        value.into_iter().collect()
    }
}

impl From<HighlightSet> for Vec<Highlight> {
    fn from(value: HighlightSet) -> Self {
        value.ranges.into_values().collect()
    }
}

/// Validation errors for notes and highlight edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Title is empty.
    EmptyTitle,
    /// Content is empty.
    EmptyContent,
    /// Selection covers no characters.
    EmptyHighlight { start: usize },
    /// Selection extends past the end of content.
    HighlightOutOfRange {
        start: usize,
        end: usize,
        content_len: usize,
    },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title cannot be empty"),
            Self::EmptyContent => write!(f, "note content cannot be empty"),
            Self::EmptyHighlight { start } => {
                write!(f, "highlight at {start} must cover at least one character")
            }
            Self::HighlightOutOfRange {
                start,
                end,
                content_len,
            } => write!(
                f,
                "highlight {start}..{end} exceeds content length {content_len}"
            ),
        }
    }
}

impl Error for NoteValidationError {}

/// A titled text note with highlight ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    id: NoteId,
    pub title: String,
    pub content: String,
    created_at_ms: i64,
    pub highlights: HighlightSet,
}

impl Note {
    /// Creates a note with a fresh id, stamped with the current time.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_identity(
            Uuid::new_v4(),
            Utc::now().timestamp_millis(),
            title,
            content,
        )
    }

    /// Rebuilds a note whose identity already exists, e.g. from a record.
    pub fn with_identity(
        id: NoteId,
        created_at_ms: i64,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            created_at_ms,
            highlights: HighlightSet::new(),
        }
    }

    pub fn id(&self) -> NoteId {
        self.id
    }

    /// Creation time in Unix epoch milliseconds.
    pub fn created_at_ms(&self) -> i64 {
        self.created_at_ms
    }

    /// Creation time as `yyyy-MM-dd HH:mm:ss` in local time.
    pub fn formatted_created_at(&self) -> String {
        format_epoch_ms(self.created_at_ms)
    }

    /// Checks that the note can be persisted.
    ///
    /// Highlights are not checked here; out-of-range ranges are dropped by the
    /// editor session and the record decoder instead.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_note_fields(&self.title, &self.content)
    }
}

/// Title and content must be non-empty; title is checked first.
///
/// Whitespace counts as text, so a title of spaces is accepted.
pub fn validate_note_fields(title: &str, content: &str) -> Result<(), NoteValidationError> {
    if title.is_empty() {
        return Err(NoteValidationError::EmptyTitle);
    }
    if content.is_empty() {
        return Err(NoteValidationError::EmptyContent);
    }
    Ok(())
}

/// Formats epoch milliseconds for list display.
pub fn format_epoch_ms(epoch_ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(epoch_ms) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format(CREATED_AT_DISPLAY_FORMAT)
            .to_string(),
        None => "unknown".to_string(),
    }
}
