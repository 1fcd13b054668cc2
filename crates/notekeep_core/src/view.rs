//! Presentation collaborator contracts.
//!
//! The UI layer implements these; core pushes full snapshots after every
//! mutation and never diffs.

use crate::model::todo::TodoItem;

/// Receives the note list of the current folder after every open/save.
pub trait NoteListView {
    /// `entries` are `"<title> - <yyyy-MM-dd HH:mm:ss>"` rows in folder order.
    fn render_note_list(&mut self, entries: &[String]);
}

/// Receives the sorted to-do list after every mutation.
pub trait TodoListView {
    fn render_todo_list(&mut self, items: &[TodoItem]);
}

/// View that keeps the last pushed snapshot, for callers that poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotView {
    pub note_entries: Vec<String>,
    pub todo_items: Vec<TodoItem>,
    /// Number of renders received, both lists combined.
    pub renders: usize,
}

impl NoteListView for SnapshotView {
    fn render_note_list(&mut self, entries: &[String]) {
        self.note_entries = entries.to_vec();
        self.renders += 1;
    }
}

impl TodoListView for SnapshotView {
    fn render_todo_list(&mut self, items: &[TodoItem]) {
        self.todo_items = items.to_vec();
        self.renders += 1;
    }
}
