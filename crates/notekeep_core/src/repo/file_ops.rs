//! Low-level file helpers shared by record and export writers.

use std::io::{self, Write};
use std::path::Path;
use std::time::UNIX_EPOCH;
use tempfile::NamedTempFile;

/// Replaces `target` with `bytes` without ever truncating it in place.
///
/// Data goes to a temp file in the same directory, is synced, then renamed
/// over `target`. On any error the temp file is removed and `target` is left
/// as it was.
pub(crate) fn write_atomically(target: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(target).map_err(|err| err.error)?;
    Ok(())
}

/// File modification time in epoch milliseconds, if the platform reports one.
pub(crate) fn modified_epoch_ms(path: &Path) -> Option<i64> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    let millis = modified.duration_since(UNIX_EPOCH).ok()?.as_millis();
    i64::try_from(millis).ok()
}

#[cfg(test)]
mod tests {
    use super::write_atomically;

    #[test]
    fn write_atomically_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("note.properties");
        std::fs::write(&target, "old").unwrap();

        write_atomically(&target, b"new").unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new");
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn write_atomically_fails_without_touching_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("note.properties");
        assert!(write_atomically(&target, b"x").is_err());
        assert!(!target.exists());
    }
}
