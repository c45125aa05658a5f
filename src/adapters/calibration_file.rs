//! File-backed calibration store.
//!
//! Persists the single [`CalibrationProfile`] as a pretty-printed JSON
//! record.  The record is an external interface: field names are stable and
//! downstream tooling reads the file directly.
//!
//! - Validation happens here, at the persistence boundary — a degenerate
//!   scale factor must never reach disk.
//! - Saves are read-before-write: `load_cell_type` / `max_capacity_kg`
//!   already recorded on disk survive a save from a profile that does not
//!   carry them (the hardware description outlives recalibration).
//! - Writes go through a temp file + rename, so a power cut mid-save leaves
//!   either the old record or the new one, never a torn file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::warn;

use crate::app::ports::CalibrationStore;
use crate::error::StorageError;
use crate::scale::calibration::CalibrationProfile;

use super::utils::ensure_dir;

const CALIBRATION_FILE: &str = "calibration.json";

/// Scale factors below this magnitude cannot come from a real span
/// calibration and would make every reading collapse to ~0.
const MIN_SCALE_FACTOR: f64 = 1e-12;

pub struct FileCalibrationStore {
    path: PathBuf,
}

impl FileCalibrationStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(CALIBRATION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read whatever record is on disk, tolerating absence and corruption.
    /// Used by the save-time merge, where a bad existing record must not
    /// block writing a good new one.
    fn read_existing(&self) -> Option<CalibrationProfile> {
        match self.load() {
            Ok(existing) => existing,
            Err(e) => {
                warn!("ignoring unreadable calibration record during save: {e}");
                None
            }
        }
    }
}

fn validate_profile(profile: &CalibrationProfile) -> Result<(), StorageError> {
    if !profile.tare_value.is_finite() {
        return Err(StorageError::ValidationFailed("tare_value must be finite"));
    }
    if !profile.scale_factor.is_finite() {
        return Err(StorageError::ValidationFailed("scale_factor must be finite"));
    }
    if profile.scale_factor.abs() < MIN_SCALE_FACTOR {
        return Err(StorageError::ValidationFailed(
            "scale_factor must be non-zero",
        ));
    }
    Ok(())
}

impl CalibrationStore for FileCalibrationStore {
    fn load(&self) -> Result<Option<CalibrationProfile>, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(_) => return Err(StorageError::Io),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|_| StorageError::Corrupted)
    }

    fn save(&mut self, profile: &CalibrationProfile) -> Result<(), StorageError> {
        validate_profile(profile)?;

        let dir = self.path.parent().ok_or(StorageError::DirUnavailable)?;
        ensure_dir(dir)?;

        let mut record = profile.clone();

        // Preserve hardware metadata already on disk.
        if let Some(existing) = self.read_existing() {
            if !existing.load_cell_type.is_empty() {
                record.load_cell_type = existing.load_cell_type;
            }
            if existing.max_capacity_kg > 0.0 {
                record.max_capacity_kg = existing.max_capacity_kg;
            }
        }

        // The record carries the instant it was written, not the instant
        // the calibration math ran.
        let now = Local::now();
        record.calibrated_date = now.format("%Y-%m-%d %H:%M:%S%.3f").to_string();
        record.calibrated_date_iso = now.to_rfc3339();

        let json = serde_json::to_string_pretty(&record).map_err(|_| StorageError::Io)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|_| StorageError::Io)?;
        fs::rename(&tmp, &self.path).map_err(|_| StorageError::Io)?;
        Ok(())
    }
}
