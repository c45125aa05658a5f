//! Unified error types for the weighscale firmware.
//!
//! Follows embedded best practice: a single `Error` enum that every subsystem
//! can convert into, keeping the top-level session loop's error handling
//! uniform. All variants are `Copy` so they can be cheaply passed through the
//! event sink without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The ADC transport failed to deliver a sample.
    Transport(TransportError),
    /// A calibration procedure could not complete.
    Calibration(CalibrationError),
    /// A persistence operation failed.
    Storage(StorageError),
    /// The pin map has a hard conflict. Fatal at startup only.
    PinSafety(&'static str),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Calibration(e) => write!(f, "calibration: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::PinSafety(msg) => write!(f, "pin safety: {msg}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// ADC transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// No data-ready within the deadline, or the frame came back short.
    /// Recoverable: the session treats it as "no reading this tick".
    Timeout,
    /// A pin operation failed at the GPIO layer.
    Gpio,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "ADC read timed out"),
            Self::Gpio => write!(f, "GPIO operation failed"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Calibration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationError {
    /// The persisted profile exists but could not be parsed.
    LoadFailed,
    /// Every raw read in a calibration batch timed out.
    NoSamples,
    /// Span calibration measured too small a deflection to derive a scale
    /// factor — the reference mass is probably not on the platter.
    Degenerate,
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadFailed => write!(f, "stored profile unreadable"),
            Self::NoSamples => write!(f, "no usable samples collected"),
            Self::Degenerate => write!(f, "adjusted raw value too small"),
        }
    }
}

impl From<CalibrationError> for Error {
    fn from(e: CalibrationError) -> Self {
        Self::Calibration(e)
    }
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested record does not exist.
    NotFound,
    /// The data directory is missing and could not be created, or is not
    /// writable. The pending write is skipped, not retried.
    DirUnavailable,
    /// Stored record failed the deserialization check.
    Corrupted,
    /// A record field failed range validation before persistence.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the filesystem.
    Io,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "record not found"),
            Self::DirUnavailable => write!(f, "data directory unavailable"),
            Self::Corrupted => write!(f, "record corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::Io => write!(f, "I/O error"),
        }
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
