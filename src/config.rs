//! System configuration parameters
//!
//! All tunable parameters for the weighscale firmware.  Construction-time
//! only: the binary builds one `ScaleConfig` at boot and injects it into the
//! session — there is no ambient global configuration.

use serde::{Deserialize, Serialize};

use crate::app::ports::SampleRate;
use crate::scale::stability::MAX_WINDOW;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleConfig {
    // --- Sampling ---
    /// Session loop cadence (milliseconds between weight reads).
    pub sample_interval_ms: u32,
    /// Converter sample rate (LOW = 10 SPS low-noise, HIGH = 80 SPS).
    pub sample_rate: SampleRate,

    // --- Calibration ---
    /// Raw reads averaged per tare / span batch.
    pub calibration_samples: u32,
    /// Settle delay between calibration reads (milliseconds).
    pub settle_delay_ms: u32,
    /// Scale factor used until a span calibration has run (kg per count).
    pub default_scale_factor: f64,
    /// Skip the stored profile and re-tare from scratch at startup.
    pub force_calibration: bool,

    // --- Stability detection ---
    /// Maximum deviation from the window mean to count as stable (kg).
    pub stability_threshold_kg: f64,
    /// Consecutive readings required before stability is evaluated.
    pub stable_count: usize,

    // --- Persistence ---
    /// Directory holding the calibration record and the stable-reading file.
    pub data_dir: String,

    // --- Load cell ---
    /// Load cell model fitted to this unit.
    pub load_cell_type: String,
    /// Rated capacity of the fitted load cell (kg).
    pub max_capacity_kg: f64,

    // --- Backend ---
    /// Use the deterministic simulated transport instead of hardware.
    pub simulation: bool,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            // Sampling
            sample_interval_ms: 100, // 10 Hz display update
            sample_rate: SampleRate::Low,

            // Calibration
            calibration_samples: 10,
            settle_delay_ms: 100,
            default_scale_factor: 0.000_001_5,
            force_calibration: false,

            // Stability
            stability_threshold_kg: 0.005, // ±5 g
            stable_count: 5,

            // Persistence
            data_dir: "/spiflash/scale".to_string(),

            // Load cell
            load_cell_type: "BENZ WERKZ BZ6150".to_string(),
            max_capacity_kg: 50.0,

            // Backend
            simulation: false,
        }
    }
}

impl ScaleConfig {
    /// Range-check the configuration before the session is built.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.sample_interval_ms == 0 {
            return Err("sample_interval_ms must be > 0");
        }
        if self.calibration_samples == 0 {
            return Err("calibration_samples must be > 0");
        }
        if !(self.stability_threshold_kg > 0.0) {
            return Err("stability_threshold_kg must be > 0");
        }
        if self.stable_count < 2 {
            return Err("stable_count must be >= 2");
        }
        if self.stable_count > MAX_WINDOW {
            return Err("stable_count exceeds window capacity");
        }
        if self.default_scale_factor == 0.0 || !self.default_scale_factor.is_finite() {
            return Err("default_scale_factor must be finite and non-zero");
        }
        if !(self.max_capacity_kg > 0.0) {
            return Err("max_capacity_kg must be > 0");
        }
        if self.data_dir.is_empty() {
            return Err("data_dir must not be empty");
        }
        Ok(())
    }
}
