//! Folder domain model.
//!
//! # Responsibility
//! - Hold the notes discovered in one directory, in discovery order.
//! - Remember which record file backs each note.
//!
//! # Invariants
//! - Note ids are unique within a folder.
//! - Re-saving a known note replaces it in place; new notes are appended.
//! - The folder is a snapshot; it does not follow external file changes.

use crate::model::note::{Note, NoteId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A directory treated as a collection of note records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    path: PathBuf,
    notes: Vec<Note>,
    record_files: HashMap<NoteId, PathBuf>,
}

impl Folder {
    /// Creates an empty folder snapshot for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            notes: Vec::new(),
            record_files: HashMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last path component, used as the folder's display name.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// First note in folder order whose title equals `title`.
    pub fn note_by_title(&self, title: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.title == title)
    }

    pub fn note_by_id(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id() == id)
    }

    /// Record file currently backing note `id`, if it was scanned or saved.
    pub fn record_file(&self, id: NoteId) -> Option<&Path> {
        self.record_files.get(&id).map(PathBuf::as_path)
    }

    /// List rows shaped as `"<title> - <yyyy-MM-dd HH:mm:ss>"`.
    pub fn list_entries(&self) -> Vec<String> {
        self.notes
            .iter()
            .map(|note| format!("{} - {}", note.title, note.formatted_created_at()))
            .collect()
    }

    /// Inserts or replaces `note` and records its backing file.
    pub(crate) fn upsert(&mut self, note: Note, record_file: PathBuf) {
        let id = note.id();
        match self.notes.iter_mut().find(|existing| existing.id() == id) {
            Some(existing) => *existing = note,
            None => self.notes.push(note),
        }
        self.record_files.insert(id, record_file);
    }
}
