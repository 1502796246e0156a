use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Sibling backup path: `<destination>.bak.<YYYYMMDD-HHMMSS>`.
pub fn backup_path(destination: &Path, at: NaiveDateTime) -> PathBuf {
    let mut name: OsString = destination.as_os_str().to_os_string();
    name.push(".bak.");
    name.push(at.format(BACKUP_TIMESTAMP_FORMAT).to_string());
    PathBuf::from(name)
}

/// Copies the current bytes of `destination` to its backup path.
///
/// Returns `Ok(None)` when there is nothing to back up.
pub fn write_backup(destination: &Path, at: NaiveDateTime) -> io::Result<Option<PathBuf>> {
    if !destination.is_file() {
        return Ok(None);
    }
    let backup = backup_path(destination, at);
    fs::copy(destination, &backup)?;
    Ok(Some(backup))
}
