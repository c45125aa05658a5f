//! Shared filesystem helpers for the file-backed stores.

use std::fs;
use std::path::Path;

use crate::error::StorageError;

/// Make sure `dir` exists and is writable before a store touches it.
///
/// Writability is probed with a throwaway file — directory metadata alone
/// lies on FAT mounts.  On failure the caller skips its write and reports;
/// it never retries or aborts the session.
pub fn ensure_dir(dir: &Path) -> Result<(), StorageError> {
    fs::create_dir_all(dir).map_err(|_| StorageError::DirUnavailable)?;

    let probe = dir.join(".write_probe");
    fs::write(&probe, b"").map_err(|_| StorageError::DirUnavailable)?;
    let _ = fs::remove_file(&probe);
    Ok(())
}
