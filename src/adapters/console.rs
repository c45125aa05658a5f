//! Console event sink adapter.
//!
//! Implements [`EventSink`] for an operator watching the serial console:
//! the live weight is redrawn in place on one line, everything else goes
//! through the logger.  A future telemetry adapter would implement the same
//! trait.

use std::io::{self, Write};

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that renders every [`AppEvent`] for the console.
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for ConsoleSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::SampleRead { weight_kg, stable } => {
                let marker = if *stable { "STABLE" } else { "      " };
                print!("\rWeight: {weight_kg:8.3} kg  [{marker}]  ");
                let _ = io::stdout().flush();
            }
            AppEvent::ReadFailed => {
                print!("\rWeight: -- no reading --          ");
                let _ = io::stdout().flush();
            }
            AppEvent::StableWeight { weight_kg } => {
                // Newline ends the in-place weight line before the log entry.
                println!();
                info!("STABLE | {weight_kg:.3} kg");
            }
            AppEvent::ReadingPersisted { weight_kg } => {
                info!("SAVED  | {weight_kg:.3} kg");
            }
            AppEvent::TareComplete { tare_value, samples } => {
                info!("TARE   | zero point {tare_value:.2} ({samples} samples)");
            }
            AppEvent::TareFailed(e) => {
                warn!("TARE   | failed: {e}");
            }
            AppEvent::SpanCalibrated {
                scale_factor,
                adjusted,
            } => {
                info!("SPAN   | scale factor {scale_factor:.8} (adjusted {adjusted:.2})");
            }
            AppEvent::StoreFailed { what, err } => {
                warn!("STORE  | {what}: {err}");
            }
        }
    }
}
