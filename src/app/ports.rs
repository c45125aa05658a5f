//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Session (domain)
//! ```
//!
//! Driven adapters (ADC transport, stores, event sinks, controls) implement
//! these traits.  The [`Session`](super::session::Session) consumes them via
//! generics, so the domain core never touches hardware directly.

use serde::{Deserialize, Serialize};

use crate::error::{StorageError, TransportError};
use crate::scale::calibration::CalibrationProfile;
use crate::scale::StableReading;

// ───────────────────────────────────────────────────────────────
// ADC transport port (driven adapter: converter → domain)
// ───────────────────────────────────────────────────────────────

/// Converter sample-rate selection (SPEED line level).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleRate {
    /// 10 SPS — slower, lower noise.  The right choice for a scale.
    Low,
    /// 80 SPS — faster, noisier.
    High,
}

/// One load-cell channel of a 24-bit converter.
///
/// The converter has no dedicated ready pin: DOUT doubles as the data-ready
/// indicator (low = conversion available) and as the serial data output.
/// Implementations must preserve that multiplexing — no second pin exists.
pub trait AdcTransport {
    /// Drive the power-down line high.  Called once at session start.
    fn power_up(&mut self) -> Result<(), TransportError>;

    /// Drive the power-down line low.  Called once at teardown.
    fn power_down(&mut self) -> Result<(), TransportError>;

    /// Select the converter's internal sample rate.
    fn set_sample_rate(&mut self, rate: SampleRate) -> Result<(), TransportError>;

    /// Whether a conversion result is waiting to be shifted out.
    fn data_ready(&mut self) -> Result<bool, TransportError>;

    /// Block until data-ready (bounded by a 1-second deadline), then perform
    /// exactly one 3-byte transfer and decode it as big-endian 24-bit
    /// two's complement.  [`TransportError::Timeout`] on deadline or on a
    /// short frame; no retries.
    fn read_raw(&mut self) -> Result<i32, TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Persistence ports (driven adapters: domain ↔ files)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the single calibration profile.
pub trait CalibrationStore {
    /// `Ok(None)` when no profile has ever been saved.
    /// `Err(Corrupted)` on malformed content — the caller logs it and
    /// proceeds as if no calibration existed.
    fn load(&self) -> Result<Option<CalibrationProfile>, StorageError>;

    /// Validate and persist the full profile, overwriting any prior record
    /// atomically.  `load_cell_type` / `max_capacity_kg` already present in
    /// the stored record are preserved (read-before-write).
    fn save(&mut self, profile: &CalibrationProfile) -> Result<(), StorageError>;
}

/// Persists the latest stable reading.  Overwrite-only, never appended.
pub trait ReadingStore {
    fn save(&mut self, reading: &StableReading) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → console / logging)
// ───────────────────────────────────────────────────────────────

/// The session emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port at defined lifecycle points (sample read, stability
/// event, persist, error).  Adapters decide where they go — console line,
/// serial log, future telemetry channel.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Control port (driven adapter: operator input → domain)
// ───────────────────────────────────────────────────────────────

/// Commands the operator can issue while the session loop runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Re-zero the scale now (button short press).
    Tare,
    /// Orderly shutdown (button long press, or host-side abort).
    Shutdown,
}

/// Polled once per tick, between samples — cooperative cancellation point.
pub trait ControlPort {
    fn poll(&mut self) -> Option<SessionCommand>;
}
