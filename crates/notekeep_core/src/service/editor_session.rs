//! In-memory state of the note being edited.
//!
//! # Responsibility
//! - Scope highlight ranges to exactly one draft.
//! - Turn the draft into a `Note` for saving.
//!
//! # Invariants
//! - Switching notes (`open`, `begin_new`) replaces the whole draft, so
//!   highlights never carry over between notes.
//! - A draft opened from a stored note keeps that note's id, so saving it
//!   overwrites the same record.

use crate::model::note::{
    Highlight, HighlightColor, HighlightSet, Note, NoteId, NoteValidationError,
};
use chrono::Utc;
use log::warn;
use uuid::Uuid;

/// Editable fields of one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub id: NoteId,
    pub created_at_ms: i64,
    pub title: String,
    pub content: String,
    pub highlights: HighlightSet,
    /// Whether the draft was opened from a stored note.
    pub from_store: bool,
}

impl NoteDraft {
    fn blank() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at_ms: Utc::now().timestamp_millis(),
            title: String::new(),
            content: String::new(),
            highlights: HighlightSet::new(),
            from_store: false,
        }
    }
}

/// Holder of the current draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSession {
    draft: NoteDraft,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    pub fn new() -> Self {
        Self {
            draft: NoteDraft::blank(),
        }
    }

    pub fn draft(&self) -> &NoteDraft {
        &self.draft
    }

    /// Starts an empty draft with a fresh identity.
    pub fn begin_new(&mut self) {
        self.draft = NoteDraft::blank();
    }

    /// Replaces the draft with a stored note, highlights included.
    pub fn open(&mut self, note: Note) {
        self.draft = NoteDraft {
            id: note.id(),
            created_at_ms: note.created_at_ms(),
            title: note.title,
            content: note.content,
            highlights: note.highlights,
            from_store: true,
        };
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.draft.content = content.into();
    }

    /// Highlights the `[start, end)` char selection of the current content.
    pub fn add_highlight(
        &mut self,
        start: usize,
        end: usize,
        color: HighlightColor,
    ) -> Result<Highlight, NoteValidationError> {
        let highlight = Highlight::from_selection(start, end, color)
            .filter(|highlight| highlight.length > 0)
            .ok_or(NoteValidationError::EmptyHighlight { start })?;
        if !highlight.fits(&self.draft.content) {
            return Err(NoteValidationError::HighlightOutOfRange {
                start,
                end,
                content_len: self.draft.content.chars().count(),
            });
        }
        self.draft.highlights.insert(highlight);
        Ok(highlight)
    }

    pub fn clear_highlights(&mut self) {
        self.draft.highlights.clear();
    }

    /// Builds the note to persist from the current draft.
    ///
    /// Highlights that no longer fit the edited content are dropped.
    pub fn to_note(&self) -> Note {
        let mut note = Note::with_identity(
            self.draft.id,
            self.draft.created_at_ms,
            self.draft.title.clone(),
            self.draft.content.clone(),
        );
        let mut highlights = self.draft.highlights.clone();
        let dropped = highlights.retain_fitting(&note.content);
        if dropped > 0 {
            warn!(
                "event=draft_highlights module=service status=skip reason=out_of_range note_id={} dropped={}",
                note.id(),
                dropped
            );
        }
        note.highlights = highlights;
        note
    }
}
