//! Note use-case service.
//!
//! # Responsibility
//! - Validate note drafts before any I/O.
//! - Cache opened folders by path so selection changes do not rescan disk.
//! - Delegate open/save/load to a `NoteRepository`.
//!
//! # Invariants
//! - `open_folder` and `refresh_folder` always rescan; `select_folder` only
//!   scans on a cache miss.
//! - Saves and loads require the folder to be open.
//! - Cache order is first-open order.

use crate::model::folder::Folder;
use crate::model::note::{validate_note_fields, Note, NoteValidationError};
use crate::repo::note_repo::{NoteRepository, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Draft or note failed validation; nothing was written.
    Validation(NoteValidationError),
    /// Folder was never opened in this session.
    FolderNotOpen(PathBuf),
    /// No note with the requested title.
    NoteNotFound(String),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::FolderNotOpen(path) => write!(f, "folder not open: `{}`", path.display()),
            Self::NoteNotFound(title) => write!(f, "note not found: `{title}`"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(title) => Self::NoteNotFound(title),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Note service facade with a per-path folder cache.
pub struct NoteService<R: NoteRepository> {
    repo: R,
    folders: Vec<(PathBuf, Folder)>,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            folders: Vec::new(),
        }
    }

    /// Checks title/content of a draft the way `save` would.
    pub fn validate_draft(title: &str, content: &str) -> Result<(), NoteValidationError> {
        validate_note_fields(title, content)
    }

    /// Opens (creating if needed) and scans `path`, replacing any cached copy.
    pub fn open_folder(&mut self, path: &Path) -> Result<&Folder, NoteServiceError> {
        let folder = self.repo.open(path)?;
        let key = cache_key(path);
        let index = match self.position(&key) {
            Some(index) => {
                self.folders[index].1 = folder;
                index
            }
            None => {
                self.folders.push((key, folder));
                self.folders.len() - 1
            }
        };
        Ok(&self.folders[index].1)
    }

    /// Returns the cached folder, scanning only when `path` was never opened.
    pub fn select_folder(&mut self, path: &Path) -> Result<&Folder, NoteServiceError> {
        match self.position(&cache_key(path)) {
            Some(index) => Ok(&self.folders[index].1),
            None => self.open_folder(path),
        }
    }

    /// Rescans a folder that is already open.
    pub fn refresh_folder(&mut self, path: &Path) -> Result<&Folder, NoteServiceError> {
        if self.position(&cache_key(path)).is_none() {
            return Err(NoteServiceError::FolderNotOpen(path.to_path_buf()));
        }
        self.open_folder(path)
    }

    /// Drops the cached copy of `path`; returns whether one existed.
    pub fn forget_folder(&mut self, path: &Path) -> bool {
        match self.position(&cache_key(path)) {
            Some(index) => {
                self.folders.remove(index);
                info!("event=folder_forget module=service status=ok");
                true
            }
            None => false,
        }
    }

    pub fn folder(&self, path: &Path) -> Option<&Folder> {
        self.position(&cache_key(path))
            .map(|index| &self.folders[index].1)
    }

    /// Paths of cached folders in first-open order.
    pub fn known_folders(&self) -> Vec<&Path> {
        self.folders
            .iter()
            .map(|(_, folder)| folder.path())
            .collect()
    }

    /// Persists `note` into the open folder at `path`.
    pub fn save_note(&mut self, path: &Path, note: &Note) -> Result<PathBuf, NoteServiceError> {
        note.validate()?;
        let index = self
            .position(&cache_key(path))
            .ok_or_else(|| NoteServiceError::FolderNotOpen(path.to_path_buf()))?;
        let folder = &mut self.folders[index].1;
        Ok(self.repo.save(folder, note)?)
    }

    /// Re-reads the note titled `title` from the open folder at `path`.
    pub fn load_note(&self, path: &Path, title: &str) -> Result<Note, NoteServiceError> {
        let folder = self
            .folder(path)
            .ok_or_else(|| NoteServiceError::FolderNotOpen(path.to_path_buf()))?;
        Ok(self.repo.load(folder, title)?)
    }

    fn position(&self, key: &Path) -> Option<usize> {
        self.folders
            .iter()
            .position(|(cached, _)| cached.as_path() == key)
    }
}

/// Key a folder is cached under: its canonical path while it exists.
///
/// Once the directory is gone, `path` itself is the key, so callers should
/// hold on to the key taken while the folder was open.
pub fn cache_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
