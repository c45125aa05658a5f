//! File-backed stable-reading store.
//!
//! Writes the latest stable weight as a five-line plain-text record.  The
//! line keys are the legacy field names the downstream collector parses —
//! they are an external interface and must not change:
//!
//! ```text
//! Waktu: 2026-08-07 09:30:15.123
//! Tanggal: 2026-08-07
//! Jam: 09:30:15.123
//! Berat: 1.234 kg
//! Timestamp: 2026-08-07 09:30:15.123
//! ```
//!
//! The file is overwritten on every stable event — never appended.

use std::fs;
use std::path::{Path, PathBuf};

use crate::app::ports::ReadingStore;
use crate::error::StorageError;
use crate::scale::StableReading;

use super::utils::ensure_dir;

const READING_FILE: &str = "last_reading.txt";

pub struct FileReadingStore {
    path: PathBuf,
}

impl FileReadingStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(READING_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReadingStore for FileReadingStore {
    fn save(&mut self, reading: &StableReading) -> Result<(), StorageError> {
        let dir = self.path.parent().ok_or(StorageError::DirUnavailable)?;
        ensure_dir(dir)?;

        let timestamp = reading.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let date = reading.timestamp.format("%Y-%m-%d");
        let time = reading.timestamp.format("%H:%M:%S%.3f");
        let content = format!(
            "Waktu: {timestamp}\nTanggal: {date}\nJam: {time}\nBerat: {:.3} kg\nTimestamp: {timestamp}\n",
            reading.weight_kg
        );

        fs::write(&self.path, content).map_err(|_| StorageError::Io)
    }
}
