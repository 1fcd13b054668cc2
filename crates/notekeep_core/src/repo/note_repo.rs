//! Note repository contract and property-file implementation.
//!
//! # Responsibility
//! - Open a directory as a folder of note records.
//! - Persist one note per record file, keyed by note id.
//! - Re-read a single record on demand.
//!
//! # Invariants
//! - `save` validates before any I/O and never truncates a record in place.
//! - A broken record file is skipped during `open`, not fatal.
//! - Scan order is sorted by file name, so repeated opens are identical.
//!
//! # See also
//! - `crate::repo::record` for the key layout.

use crate::model::folder::Folder;
use crate::model::note::{Note, NoteId, NoteValidationError};
use crate::props::{self, PropsError};
use crate::repo::file_ops::{modified_epoch_ms, write_atomically};
use crate::repo::record::{decode_note, encode_note, RecordOrigin, RECORD_HEADER};
use chrono::Local;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// File extension of note records.
pub const RECORD_EXTENSION: &str = "properties";
const RECORD_TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %Z %Y";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Note failed validation; nothing was written.
    Validation(NoteValidationError),
    /// Directory or file operation failed.
    Io { path: PathBuf, source: io::Error },
    /// No note with the requested title.
    NotFound(String),
    /// Record parsed but does not describe a note.
    InvalidRecord { path: PathBuf, reason: String },
    /// Record text could not be parsed.
    Props { path: PathBuf, source: PropsError },
}

impl RepoError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether this is a filesystem failure the user may retry.
    pub fn is_io_failure(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Io { path, source } => write!(f, "I/O failure at `{}`: {source}", path.display()),
            Self::NotFound(title) => write!(f, "note not found: `{title}`"),
            Self::InvalidRecord { path, reason } => {
                write!(f, "invalid note record `{}`: {reason}", path.display())
            }
            Self::Props { path, source } => {
                write!(f, "unreadable note record `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Props { source, .. } => Some(source),
            Self::NotFound(_) | Self::InvalidRecord { .. } => None,
        }
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Repository interface for folder/note persistence.
pub trait NoteRepository {
    /// Ensures the directory exists and returns its decoded notes.
    fn open(&self, folder_path: &Path) -> RepoResult<Folder>;
    /// Writes `note` into `folder` and updates the folder snapshot.
    fn save(&self, folder: &mut Folder, note: &Note) -> RepoResult<PathBuf>;
    /// Re-reads the record of the first note titled `title`.
    fn load(&self, folder: &Folder, title: &str) -> RepoResult<Note>;
}

/// Property-file backed note repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileNoteRepository;

impl FileNoteRepository {
    pub fn new() -> Self {
        Self
    }
}

impl NoteRepository for FileNoteRepository {
    fn open(&self, folder_path: &Path) -> RepoResult<Folder> {
        let started_at = Instant::now();
        info!("event=folder_open module=repo status=start");

        if let Err(err) = ensure_directory(folder_path) {
            error!(
                "event=folder_open module=repo status=error duration_ms={} error_code=dir_unavailable error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }

        let mut folder = Folder::new(folder_path);
        let mut skipped = 0usize;
        for record_path in list_record_files(folder_path)? {
            match read_record(&record_path) {
                Ok(note) if folder.note_by_id(note.id()).is_some() => {
                    skipped += 1;
                    warn!(
                        "event=record_scan module=repo status=skip reason=duplicate_id note_id={}",
                        note.id()
                    );
                }
                Ok(note) => folder.upsert(note, record_path),
                Err(err) => {
                    skipped += 1;
                    warn!(
                        "event=record_scan module=repo status=skip reason=unreadable error={}",
                        err
                    );
                }
            }
        }

        info!(
            "event=folder_open module=repo status=ok notes={} skipped={} duration_ms={}",
            folder.len(),
            skipped,
            started_at.elapsed().as_millis()
        );
        Ok(folder)
    }

    fn save(&self, folder: &mut Folder, note: &Note) -> RepoResult<PathBuf> {
        note.validate()?;

        let started_at = Instant::now();
        let target = folder
            .record_file(note.id())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| folder.path().join(record_file_name(note.id())));
        let timestamp = Local::now().format(RECORD_TIMESTAMP_FORMAT).to_string();
        let text = props::store(&encode_note(note), Some(RECORD_HEADER), &timestamp);

        if let Err(err) = write_atomically(&target, text.as_bytes()) {
            error!(
                "event=note_save module=repo status=error note_id={} duration_ms={} error_code=write_failed error={}",
                note.id(),
                started_at.elapsed().as_millis(),
                err
            );
            return Err(RepoError::io(&target, err));
        }

        folder.upsert(note.clone(), target.clone());
        info!(
            "event=note_save module=repo status=ok note_id={} highlights={} duration_ms={}",
            note.id(),
            note.highlights.len(),
            started_at.elapsed().as_millis()
        );
        Ok(target)
    }

    fn load(&self, folder: &Folder, title: &str) -> RepoResult<Note> {
        let not_found = || RepoError::NotFound(title.to_string());
        let known = folder.note_by_title(title).ok_or_else(not_found)?;
        let path = folder.record_file(known.id()).ok_or_else(not_found)?;

        match read_record(path) {
            Ok(note) => {
                debug!("event=note_load module=repo status=ok note_id={}", note.id());
                Ok(note)
            }
            Err(RepoError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Err(not_found())
            }
            Err(err) => Err(err),
        }
    }
}

/// Record file name for a note that has no backing file yet.
pub fn record_file_name(id: NoteId) -> String {
    format!("{}.{RECORD_EXTENSION}", id.simple())
}

fn ensure_directory(path: &Path) -> RepoResult<()> {
    if path.exists() && !path.is_dir() {
        return Err(RepoError::io(
            path,
            io::Error::new(
                io::ErrorKind::AlreadyExists,
                "path exists but is not a directory",
            ),
        ));
    }
    std::fs::create_dir_all(path).map_err(|err| RepoError::io(path, err))
}

fn list_record_files(dir: &Path) -> RepoResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|err| RepoError::io(dir, err))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| RepoError::io(dir, err))?;
        let path = entry.path();
        let is_record = path
            .extension()
            .is_some_and(|extension| extension == RECORD_EXTENSION);
        if is_record && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read_record(path: &Path) -> RepoResult<Note> {
    let text = std::fs::read_to_string(path).map_err(|err| RepoError::io(path, err))?;
    let map = props::load(&text).map_err(|source| RepoError::Props {
        path: path.to_path_buf(),
        source,
    })?;

    let file_stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let origin = RecordOrigin {
        file_stem: &file_stem,
        modified_ms: modified_epoch_ms(path),
    };
    let decoded = decode_note(&map, origin).map_err(|reason| RepoError::InvalidRecord {
        path: path.to_path_buf(),
        reason,
    })?;

    if decoded.dropped_highlights > 0 {
        warn!(
            "event=record_decode module=repo status=skip reason=highlight_out_of_range note_id={} dropped={}",
            decoded.note.id(),
            decoded.dropped_highlights
        );
    }
    Ok(decoded.note)
}

#[cfg(test)]
mod tests {
    use super::{record_file_name, FileNoteRepository, NoteRepository, RepoError};
    use crate::model::note::Note;

    #[test]
    fn record_file_name_uses_simple_uuid() {
        let note = Note::new("title", "body");
        let name = record_file_name(note.id());
        assert_eq!(name.len(), 32 + ".properties".len());
        assert!(name.ends_with(".properties"));
    }

    #[test]
    fn open_rejects_plain_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, "x").unwrap();

        let err = FileNoteRepository::new().open(&file).unwrap_err();
        assert!(err.is_io_failure(), "unexpected error: {err}");
        assert!(matches!(err, RepoError::Io { .. }));
    }

    #[test]
    fn failed_save_leaves_existing_records_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileNoteRepository::new();
        let mut folder = repo.open(dir.path()).unwrap();
        let first = Note::new("first", "kept as is");
        let mut second = Note::new("second", "v1");
        let first_path = repo.save(&mut folder, &first).unwrap();
        let second_path = repo.save(&mut folder, &second).unwrap();
        let first_bytes = std::fs::read(&first_path).unwrap();
        let second_bytes = std::fs::read(&second_path).unwrap();

        // Point the second note at a non-empty directory so the final rename fails.
        let blocker = dir.path().join("blocker.properties");
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("inner"), "inner").unwrap();
        folder.upsert(second.clone(), blocker.clone());
        second.content = "v2".to_string();

        let err = repo.save(&mut folder, &second).unwrap_err();
        assert!(err.is_io_failure(), "unexpected error: {err}");
        assert_eq!(std::fs::read(&first_path).unwrap(), first_bytes);
        assert_eq!(std::fs::read(&second_path).unwrap(), second_bytes);
        assert_eq!(std::fs::read_to_string(blocker.join("inner")).unwrap(), "inner");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
        assert_eq!(folder.note_by_id(second.id()).unwrap().content, "v1");
    }

    #[test]
    fn invalid_edit_does_not_touch_existing_record() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileNoteRepository::new();
        let mut folder = repo.open(dir.path()).unwrap();
        let mut note = Note::new("title", "body");
        let path = repo.save(&mut folder, &note).unwrap();
        let before = std::fs::read(&path).unwrap();

        note.title.clear();
        let err = repo.save(&mut folder, &note).unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }
}
