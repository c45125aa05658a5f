//! Startup diagnostics.
//!
//! Currently a single check: whether the system wall clock is plausible.
//! Timestamps end up inside the calibration record and the stable-reading
//! file, so an unset RTC (epoch 1970) produces records that downstream
//! consumers silently mis-order.  The check is diagnostic only — it never
//! gates startup.

use chrono::{DateTime, Datelike, Local};

/// Earliest year the firmware could plausibly be running in.
const MIN_YEAR: i32 = 2020;
/// Latest year before we assume the RTC has wrapped or been mis-set.
const MAX_YEAR: i32 = 2100;

/// Snapshot of the system clock taken at startup.
#[derive(Debug, Clone)]
pub struct ClockReport {
    /// Whether the clock falls inside the plausible window.
    pub valid: bool,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM:SS.mmm`
    pub time: String,
    /// Full local timestamp with millisecond precision.
    pub timestamp: String,
    /// ISO-8601 / RFC 3339 form.
    pub iso: String,
}

/// Check the clock at an explicit instant (injectable for tests).
pub fn check_clock_at(now: DateTime<Local>) -> ClockReport {
    let year = now.year();
    ClockReport {
        valid: (MIN_YEAR..=MAX_YEAR).contains(&year),
        date: now.format("%Y-%m-%d").to_string(),
        time: now.format("%H:%M:%S%.3f").to_string(),
        timestamp: now.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
        iso: now.to_rfc3339(),
    }
}

/// Check the current system clock.
pub fn check_clock() -> ClockReport {
    check_clock_at(Local::now())
}
