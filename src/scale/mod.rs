//! Domain types and algorithms for the weighing scale.
//!
//! Pure logic only — conversion math and stability detection.  All I/O
//! (ADC transport, persistence) lives behind the port traits in
//! [`crate::app::ports`].

pub mod calibration;
pub mod stability;

use chrono::{DateTime, Local};

/// A weight the stability detector judged worth recording.
///
/// Overwrites the single persisted "latest reading" record — no history.
#[derive(Debug, Clone, PartialEq)]
pub struct StableReading {
    pub weight_kg: f64,
    /// Wall-clock instant of the stable event, millisecond precision.
    pub timestamp: DateTime<Local>,
}
