//! Core domain logic for NoteKeep.
//! This crate is the single source of truth for note and to-do invariants.

pub mod logging;
pub mod model;
pub mod props;
pub mod repo;
pub mod service;
pub mod settings;
pub mod view;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::folder::Folder;
pub use model::note::{
    Highlight, HighlightColor, HighlightSet, Note, NoteId, NoteValidationError,
};
pub use model::todo::{
    compare_due_dates, parse_due_date, sanitize_due_date_input, TodoId, TodoItem,
};
pub use repo::note_repo::{FileNoteRepository, NoteRepository, RepoError, RepoResult};
pub use service::editor_session::{EditorSession, NoteDraft};
pub use service::export_service::{
    default_export_file_name, export_note_image, ExportError, ExportRequest, RasterExporter,
};
pub use service::note_service::{NoteService, NoteServiceError};
pub use service::note_session::{NoteSession, NoteSessionError};
pub use service::todo_service::{TodoService, TodoSorter};
pub use settings::{ExportSettings, Settings, SettingsError};
pub use view::{NoteListView, SnapshotView, TodoListView};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
