//! Note image export use-case.
//!
//! # Responsibility
//! - Validate export input before asking the UI to rasterize.
//! - Normalize the output file name and write the image atomically.
//!
//! # Invariants
//! - Nothing is rendered or written when validation fails.
//! - Output files always end in `.jpg` or `.jpeg`.

use crate::model::note::{validate_note_fields, NoteValidationError};
use crate::repo::file_ops::write_atomically;
use log::{error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

const EXPORT_EXTENSION: &str = "jpg";
const FALLBACK_FILE_STEM: &str = "note";

static UNSAFE_FILE_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9 ._-]").expect("valid file name regex"));

/// Rasterizes visible note text; implemented by the UI layer.
pub trait RasterExporter {
    /// Returns encoded image bytes (JPEG) for `text` at `width`×`height`.
    fn export_visible_text(&self, text: &str, width: u32, height: u32)
        -> Result<Vec<u8>, ExportError>;
}

/// Errors from image export.
#[derive(Debug)]
pub enum ExportError {
    /// Title or content is empty.
    Validation(NoteValidationError),
    /// Requested image has a zero dimension.
    InvalidSize { width: u32, height: u32 },
    /// Rasterizer failed.
    Render(String),
    /// Image file could not be written.
    Io { path: PathBuf, source: io::Error },
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidSize { width, height } => {
                write!(f, "invalid export size {width}x{height}")
            }
            Self::Render(message) => write!(f, "render failed: {message}"),
            Self::Io { path, source } => {
                write!(f, "failed to write image `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<NoteValidationError> for ExportError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Input for one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest<'a> {
    pub title: &'a str,
    pub content: &'a str,
    /// User-chosen destination; `.jpg` is appended when missing.
    pub output: &'a Path,
    pub width: u32,
    pub height: u32,
}

/// Validates, renders and writes one note image; returns the written path.
pub fn export_note_image(
    exporter: &dyn RasterExporter,
    request: &ExportRequest<'_>,
) -> Result<PathBuf, ExportError> {
    validate_note_fields(request.title, request.content)?;
    if request.width == 0 || request.height == 0 {
        return Err(ExportError::InvalidSize {
            width: request.width,
            height: request.height,
        });
    }

    let output = normalize_export_path(request.output);
    let bytes = exporter.export_visible_text(request.content, request.width, request.height)?;
    if let Err(err) = write_atomically(&output, &bytes) {
        error!(
            "event=note_export module=service status=error error_code=write_failed error={}",
            err
        );
        return Err(ExportError::Io {
            path: output,
            source: err,
        });
    }

    info!(
        "event=note_export module=service status=ok bytes={} width={} height={}",
        bytes.len(),
        request.width,
        request.height
    );
    Ok(output)
}

/// Appends `.jpg` unless the file name already ends in `.jpg`/`.jpeg`.
pub fn normalize_export_path(path: &Path) -> PathBuf {
    let Some(name) = path.file_name().map(|name| name.to_string_lossy().into_owned()) else {
        return path.join(format!("{FALLBACK_FILE_STEM}.{EXPORT_EXTENSION}"));
    };
    let lowered = name.to_ascii_lowercase();
    if lowered.ends_with(".jpg") || lowered.ends_with(".jpeg") {
        path.to_path_buf()
    } else {
        path.with_file_name(format!("{name}.{EXPORT_EXTENSION}"))
    }
}

/// Suggested export file name derived from a note title.
pub fn default_export_file_name(title: &str) -> String {
    let sanitized = UNSAFE_FILE_CHARS_RE.replace_all(title.trim(), "_");
    let stem = sanitized.trim();
    if stem.is_empty() {
        format!("{FALLBACK_FILE_STEM}.{EXPORT_EXTENSION}")
    } else {
        format!("{stem}.{EXPORT_EXTENSION}")
    }
}
