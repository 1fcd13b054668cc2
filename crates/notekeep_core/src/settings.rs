//! Host-provided runtime settings.
//!
//! # Responsibility
//! - Parse the JSON settings document shared by the CLI and the FFI host.
//! - Supply defaults for every field so partial documents are accepted.
//!
//! # Invariants
//! - A missing settings file yields `Settings::default()`.
//! - Unknown keys are ignored; known keys with the wrong type are errors.

use crate::logging::{self, default_log_level};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

/// Default export image width in pixels.
pub const DEFAULT_EXPORT_WIDTH: u32 = 900;
/// Default export image height in pixels.
pub const DEFAULT_EXPORT_HEIGHT: u32 = 700;

/// Image export defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub width: u32,
    pub height: u32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_EXPORT_WIDTH,
            height: DEFAULT_EXPORT_HEIGHT,
        }
    }
}

/// Top-level settings document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute log directory; file logging stays off when absent.
    pub log_dir: Option<String>,
    pub export: ExportSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            export: ExportSettings::default(),
        }
    }
}

/// Settings loading failures.
#[derive(Debug)]
pub enum SettingsError {
    Io { path: PathBuf, source: io::Error },
    Parse(serde_json::Error),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read settings `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid settings document: {err}"),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl Settings {
    pub fn from_json_str(text: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads settings from `path`, falling back to defaults when it is absent.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_json_str(&text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(SettingsError::Io {
                path: path.to_path_buf(),
                source: err,
            }),
        }
    }

    /// Starts file logging when `log_dir` is set; returns whether it is active.
    pub fn init_logging(&self) -> Result<bool, String> {
        match self.log_dir.as_deref() {
            Some(log_dir) => logging::init_logging(&self.log_level, log_dir).map(|()| true),
            None => Ok(false),
        }
    }
}
