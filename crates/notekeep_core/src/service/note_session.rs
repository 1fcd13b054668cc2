//! Note-taking session facade driven by the UI.
//!
//! # Responsibility
//! - Track the current folder and the draft under edit.
//! - Push the note list to the view after every folder open and save.
//!
//! # Invariants
//! - A failed save leaves the draft and the current folder untouched.
//! - A successful save resets the editor to a fresh draft.
//! - Cancelling the folder chooser changes nothing.
//! - The current folder is remembered by its cache key, so later lookups
//!   hit the cached entry even after the directory disappears.

use crate::model::folder::Folder;
use crate::model::note::NoteValidationError;
use crate::repo::note_repo::{NoteRepository, RepoError};
use crate::service::editor_session::{EditorSession, NoteDraft};
use crate::service::export_service::{
    export_note_image, ExportError, ExportRequest, RasterExporter,
};
use crate::service::note_service::{cache_key, NoteService, NoteServiceError};
use crate::view::NoteListView;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Errors surfaced to the UI by session operations.
#[derive(Debug)]
pub enum NoteSessionError {
    /// An operation needs a folder but none was chosen yet.
    NoFolderSelected,
    Validation(NoteValidationError),
    /// No note with this title in the current folder.
    NotFound(String),
    Repo(RepoError),
    Export(ExportError),
}

impl NoteSessionError {
    /// Whether the failure came from the file system.
    pub fn is_io_failure(&self) -> bool {
        match self {
            Self::Repo(err) => err.is_io_failure(),
            Self::Export(ExportError::Io { .. }) => true,
            _ => false,
        }
    }
}

impl Display for NoteSessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoFolderSelected => write!(f, "no folder selected"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(title) => write!(f, "note not found: `{title}`"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteSessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Export(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoteServiceError> for NoteSessionError {
    fn from(value: NoteServiceError) -> Self {
        match value {
            NoteServiceError::Validation(err) => Self::Validation(err),
            NoteServiceError::FolderNotOpen(_) => Self::NoFolderSelected,
            NoteServiceError::NoteNotFound(title) => Self::NotFound(title),
            NoteServiceError::Repo(err) => Self::Repo(err),
        }
    }
}

impl From<NoteValidationError> for NoteSessionError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ExportError> for NoteSessionError {
    fn from(value: ExportError) -> Self {
        match value {
            ExportError::Validation(err) => Self::Validation(err),
            other => Self::Export(other),
        }
    }
}

/// Folder selection, note list and editor state for one UI.
pub struct NoteSession<R: NoteRepository, V: NoteListView> {
    notes: NoteService<R>,
    view: V,
    current: Option<PathBuf>,
    editor: EditorSession,
}

impl<R: NoteRepository, V: NoteListView> NoteSession<R, V> {
    pub fn new(repo: R, view: V) -> Self {
        Self {
            notes: NoteService::new(repo),
            view,
            current: None,
            editor: EditorSession::new(),
        }
    }

    /// Opens the folder picked in the chooser dialog.
    ///
    /// `None` means the dialog was cancelled; returns whether a folder opened.
    pub fn choose_folder(&mut self, choice: Option<PathBuf>) -> Result<bool, NoteSessionError> {
        let Some(path) = choice else {
            info!("event=folder_choose module=service status=skip reason=cancelled");
            return Ok(false);
        };
        let folder = self.notes.open_folder(&path)?;
        info!(
            "event=folder_choose module=service status=ok notes={}",
            folder.len()
        );
        self.view.render_note_list(&folder.list_entries());
        self.current = Some(cache_key(&path));
        Ok(true)
    }

    /// Makes a previously chosen folder current, reusing its cached scan.
    pub fn switch_folder(&mut self, path: &Path) -> Result<&Folder, NoteSessionError> {
        let folder = self.notes.select_folder(path)?;
        self.view.render_note_list(&folder.list_entries());
        self.current = Some(cache_key(path));
        Ok(folder)
    }

    /// Drops the cached scan of `path` so the next switch rescans it.
    ///
    /// Forgetting the current folder also deselects it. Returns whether a
    /// cached entry existed.
    pub fn forget_folder(&mut self, path: &Path) -> bool {
        let key = cache_key(path);
        let forgotten = self.notes.forget_folder(&key);
        if forgotten && self.current.as_deref() == Some(key.as_path()) {
            self.current = None;
            self.view.render_note_list(&[]);
        }
        forgotten
    }

    /// Loads the note titled `title` into the editor, replacing the draft.
    pub fn open_note(&mut self, title: &str) -> Result<&NoteDraft, NoteSessionError> {
        let path = self
            .current
            .as_deref()
            .ok_or(NoteSessionError::NoFolderSelected)?;
        let note = self.notes.load_note(path, title)?;
        info!(
            "event=note_open module=service status=ok note_id={} highlights={}",
            note.id(),
            note.highlights.len()
        );
        self.editor.open(note);
        Ok(self.editor.draft())
    }

    /// Saves the draft into the current folder and starts a new one.
    pub fn save_draft(&mut self) -> Result<PathBuf, NoteSessionError> {
        let draft = self.editor.draft();
        NoteService::<R>::validate_draft(&draft.title, &draft.content)?;
        let Some(path) = self.current.as_deref() else {
            warn!("event=note_save module=service status=error error_code=no_folder");
            return Err(NoteSessionError::NoFolderSelected);
        };

        let note = self.editor.to_note();
        let written = self.notes.save_note(path, &note)?;
        if let Some(folder) = self.notes.folder(path) {
            self.view.render_note_list(&folder.list_entries());
        }
        info!(
            "event=note_save module=service status=ok note_id={} highlights={}",
            note.id(),
            note.highlights.len()
        );
        self.editor.begin_new();
        Ok(written)
    }

    /// Exports the visible draft text as an image.
    pub fn export_draft(
        &self,
        exporter: &dyn RasterExporter,
        output: &Path,
        width: u32,
        height: u32,
    ) -> Result<PathBuf, NoteSessionError> {
        let draft = self.editor.draft();
        let request = ExportRequest {
            title: &draft.title,
            content: &draft.content,
            output,
            width,
            height,
        };
        Ok(export_note_image(exporter, &request)?)
    }

    pub fn current_folder(&self) -> Option<&Folder> {
        self.current
            .as_deref()
            .and_then(|path| self.notes.folder(path))
    }

    pub fn current_folder_path(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    pub fn known_folders(&self) -> Vec<&Path> {
        self.notes.known_folders()
    }

    pub fn editor(&self) -> &EditorSession {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut EditorSession {
        &mut self.editor
    }

    pub fn view(&self) -> &V {
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::{NoteSession, NoteSessionError};
    use crate::model::note::{HighlightColor, NoteValidationError};
    use crate::repo::note_repo::FileNoteRepository;
    use crate::view::SnapshotView;

    fn session() -> NoteSession<FileNoteRepository, SnapshotView> {
        NoteSession::new(FileNoteRepository::new(), SnapshotView::default())
    }

    #[test]
    fn cancelled_chooser_is_a_no_op() {
        let mut session = session();
        assert!(!session.choose_folder(None).unwrap());
        assert!(session.current_folder().is_none());
        assert_eq!(session.view().renders, 0);
    }

    #[test]
    fn save_without_folder_keeps_draft() {
        let mut session = session();
        session.editor_mut().set_title("title");
        session.editor_mut().set_content("body");

        let err = session.save_draft().unwrap_err();
        assert!(matches!(err, NoteSessionError::NoFolderSelected));
        assert_eq!(session.editor().draft().title, "title");
    }

    #[test]
    fn validation_runs_before_folder_check() {
        let mut session = session();
        session.editor_mut().set_title("title");
        let err = session.save_draft().unwrap_err();
        assert!(matches!(
            err,
            NoteSessionError::Validation(NoteValidationError::EmptyContent)
        ));
    }

    #[test]
    fn save_renders_list_and_resets_draft() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session();
        session.choose_folder(Some(dir.path().to_path_buf())).unwrap();
        assert!(session.view().note_entries.is_empty());

        session.editor_mut().set_title("groceries");
        session.editor_mut().set_content("milk\neggs");
        session
            .editor_mut()
            .add_highlight(0, 4, HighlightColor::Pink)
            .unwrap();
        let written = session.save_draft().unwrap();

        assert!(written.exists());
        assert_eq!(session.view().note_entries.len(), 1);
        assert!(session.view().note_entries[0].starts_with("groceries - "));
        assert!(session.editor().draft().title.is_empty());
        assert!(session.editor().draft().highlights.is_empty());

        let draft = session.open_note("groceries").unwrap();
        assert_eq!(draft.content, "milk\neggs");
        assert_eq!(draft.highlights.len(), 1);
    }

    #[test]
    fn forgetting_current_folder_deselects_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session();
        session.choose_folder(Some(dir.path().to_path_buf())).unwrap();

        assert!(session.forget_folder(dir.path()));
        assert!(session.current_folder_path().is_none());
        assert!(session.known_folders().is_empty());
        assert!(!session.forget_folder(dir.path()));
    }

    #[test]
    fn save_into_vanished_folder_is_an_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes");
        std::fs::create_dir(&notes).unwrap();
        // A non-canonical spelling of the same directory.
        let spelled = dir.path().join("notes").join("..").join("notes");
        let mut session = session();
        session.choose_folder(Some(spelled)).unwrap();
        std::fs::remove_dir_all(&notes).unwrap();

        session.editor_mut().set_title("t");
        session.editor_mut().set_content("c");
        let err = session.save_draft().unwrap_err();
        assert!(err.is_io_failure(), "unexpected error: {err}");
        assert_eq!(session.editor().draft().title, "t");
    }

    #[test]
    fn open_missing_note_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session();
        session.choose_folder(Some(dir.path().to_path_buf())).unwrap();
        let err = session.open_note("absent").unwrap_err();
        assert!(matches!(err, NoteSessionError::NotFound(title) if title == "absent"));
    }
}
