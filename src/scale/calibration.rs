//! Calibration profile — the single persisted calibration record.
//!
//! Field names match the on-disk JSON record one-for-one; downstream tooling
//! reads the file directly, so the names are part of the external interface.

use serde::{Deserialize, Serialize};

/// The only calibration method this firmware performs.
pub const CALIBRATION_METHOD_AUTO: &str = "auto";

/// Tare point and scale factor for one load-cell channel, plus provenance
/// metadata.  Exactly one profile exists at a time; each save overwrites the
/// previous record wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationProfile {
    /// Raw-code value corresponding to an empty platter.
    pub tare_value: f64,
    /// Kilograms per raw count.  Never zero once calibration has run —
    /// enforced at the persistence boundary.
    pub scale_factor: f64,
    /// Local timestamp of the last save, millisecond precision.
    #[serde(default)]
    pub calibrated_date: String,
    /// Same instant in ISO-8601 form.
    #[serde(default)]
    pub calibrated_date_iso: String,
    #[serde(default)]
    pub load_cell_type: String,
    #[serde(default)]
    pub max_capacity_kg: f64,
    #[serde(default = "default_method")]
    pub calibration_method: String,
    /// Raw reads averaged in the batch that produced `tare_value`.
    #[serde(default)]
    pub samples_taken: u32,
}

fn default_method() -> String {
    CALIBRATION_METHOD_AUTO.to_string()
}

impl CalibrationProfile {
    /// Fresh profile for a unit that has never been span-calibrated.
    pub fn initial(
        default_scale_factor: f64,
        load_cell_type: &str,
        max_capacity_kg: f64,
    ) -> Self {
        Self {
            tare_value: 0.0,
            scale_factor: default_scale_factor,
            calibrated_date: String::new(),
            calibrated_date_iso: String::new(),
            load_cell_type: load_cell_type.to_string(),
            max_capacity_kg,
            calibration_method: default_method(),
            samples_taken: 0,
        }
    }

    /// Convert one raw ADC code to kilograms.
    ///
    /// Pure arithmetic with no failure modes; degenerate scale factors are
    /// rejected upstream before they can reach a stored profile.
    pub fn weight_kg(&self, raw: i32) -> f64 {
        (f64::from(raw) - self.tare_value) * self.scale_factor
    }
}
