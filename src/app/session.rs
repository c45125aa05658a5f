//! Weighing session — the hexagonal core.
//!
//! [`Session`] owns the ADC transport, the calibration profile, the stability
//! detector, and the persistence stores for the process lifetime.  All I/O
//! flows through port traits injected at construction, making the entire
//! session testable with mock adapters.
//!
//! ```text
//!  AdcTransport ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                   │           Session            │
//!  ControlPort  ──▶ │  calibration · stability     │ ──▶ CalibrationStore
//!                   │  counters                    │ ──▶ ReadingStore
//!                   └──────────────────────────────┘
//! ```

use std::thread;
use std::time::Duration;

use chrono::Local;
use log::{info, warn};

use crate::config::ScaleConfig;
use crate::error::{CalibrationError, Error, Result, TransportError};
use crate::scale::calibration::CalibrationProfile;
use crate::scale::stability::StabilityDetector;
use crate::scale::StableReading;

use super::events::{AppEvent, SessionStats};
use super::ports::{
    AdcTransport, CalibrationStore, ControlPort, EventSink, ReadingStore, SampleRate,
    SessionCommand,
};

/// Span calibration rejects deflections at or below this many raw counts —
/// a guard against deriving a scale factor from noise when no reference
/// mass is actually on the platter.
const SPAN_MIN_ADJUSTED: f64 = 100.0;

pub struct Session<T, C, R, E>
where
    T: AdcTransport,
    C: CalibrationStore,
    R: ReadingStore,
    E: EventSink,
{
    transport: T,
    calibration_store: C,
    reading_store: R,
    sink: E,
    profile: CalibrationProfile,
    detector: StabilityDetector,
    sample_rate: SampleRate,
    sample_interval_ms: u32,
    settle_delay_ms: u32,
    calibration_samples: u32,
    force_calibration: bool,
    stats: SessionStats,
}

impl<T, C, R, E> Session<T, C, R, E>
where
    T: AdcTransport,
    C: CalibrationStore,
    R: ReadingStore,
    E: EventSink,
{
    /// Construct the session from configuration and injected adapters.
    ///
    /// Does **not** touch hardware — call [`startup`](Self::startup) next.
    pub fn new(
        config: &ScaleConfig,
        transport: T,
        calibration_store: C,
        reading_store: R,
        sink: E,
    ) -> Self {
        Self {
            transport,
            calibration_store,
            reading_store,
            sink,
            profile: CalibrationProfile::initial(
                config.default_scale_factor,
                &config.load_cell_type,
                config.max_capacity_kg,
            ),
            detector: StabilityDetector::new(config.stability_threshold_kg, config.stable_count),
            sample_rate: config.sample_rate,
            sample_interval_ms: config.sample_interval_ms,
            settle_delay_ms: config.settle_delay_ms,
            calibration_samples: config.calibration_samples,
            force_calibration: config.force_calibration,
            stats: SessionStats::default(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Power the converter, select the sample rate, and establish the zero
    /// point.  With a stored profile the scale factor is adopted and only the
    /// tare is refreshed; otherwise a fresh profile is created around the
    /// configured default factor.  `force_calibration` skips the load.
    ///
    /// Precondition (not enforceable from software): the platter is empty.
    /// Tare-at-boot with a load present shifts the zero by that load.
    pub fn startup(&mut self) -> Result<()> {
        self.transport
            .power_up()
            .map_err(|_| Error::Init("ADC power-up failed"))?;
        self.transport
            .set_sample_rate(self.sample_rate)
            .map_err(|_| Error::Init("ADC sample-rate select failed"))?;

        let loaded = if self.force_calibration {
            info!("forced recalibration requested, ignoring stored profile");
            None
        } else {
            match self.calibration_store.load() {
                Ok(Some(profile)) => Some(profile),
                Ok(None) => {
                    info!("no stored calibration, starting fresh");
                    None
                }
                Err(e) => {
                    warn!("stored calibration unreadable ({e}), starting fresh");
                    self.sink.emit(&AppEvent::StoreFailed {
                        what: "calibration load",
                        err: e,
                    });
                    None
                }
            }
        };

        if let Some(profile) = loaded {
            info!(
                "calibration loaded: tare={:.2} scale={:.8} ({})",
                profile.tare_value, profile.scale_factor, profile.calibrated_date
            );
            self.profile = profile;
        }

        // Refresh the zero point for the current mounting and temperature
        // conditions.  A completely failed tare keeps the previous value and
        // is reported, not fatal.
        let _ = self.tare();
        self.persist_profile();
        Ok(())
    }

    /// Power the converter down and return the final counters.
    pub fn shutdown(&mut self) -> SessionStats {
        if self.transport.power_down().is_err() {
            warn!("ADC power-down failed");
        }
        self.stats
    }

    // ── Calibration ───────────────────────────────────────────

    /// Zero-point calibration: average a batch of raw reads with the platter
    /// empty.  Timed-out reads are skipped; if every read times out the tare
    /// value is left unchanged and [`CalibrationError::NoSamples`] is
    /// returned (and reported through the sink).
    pub fn tare(&mut self) -> core::result::Result<(), CalibrationError> {
        match self.collect_raw_mean() {
            Some((mean, samples)) => {
                self.profile.tare_value = mean;
                self.profile.samples_taken = samples;
                self.sink.emit(&AppEvent::TareComplete {
                    tare_value: mean,
                    samples,
                });
                Ok(())
            }
            None => {
                self.sink.emit(&AppEvent::TareFailed(CalibrationError::NoSamples));
                Err(CalibrationError::NoSamples)
            }
        }
    }

    /// Span calibration against a known reference mass already on the
    /// platter.  Rejects (and persists nothing) when the tared deflection is
    /// within the noise floor — the usual cause is a missing reference mass.
    pub fn span_calibrate(&mut self, known_weight_kg: f64) -> Result<()> {
        if !(known_weight_kg > 0.0) {
            return Err(CalibrationError::Degenerate.into());
        }

        let (mean, _) = self
            .collect_raw_mean()
            .ok_or(CalibrationError::NoSamples)?;
        let adjusted = mean - self.profile.tare_value;

        if adjusted.abs() <= SPAN_MIN_ADJUSTED {
            warn!("span calibration rejected: adjusted={adjusted:.2} counts");
            return Err(CalibrationError::Degenerate.into());
        }

        self.profile.scale_factor = known_weight_kg / adjusted;
        self.sink.emit(&AppEvent::SpanCalibrated {
            scale_factor: self.profile.scale_factor,
            adjusted,
        });
        self.persist_profile();
        Ok(())
    }

    fn collect_raw_mean(&mut self) -> Option<(f64, u32)> {
        let mut sum = 0.0;
        let mut count: u32 = 0;
        for i in 0..self.calibration_samples {
            match self.transport.read_raw() {
                Ok(raw) => {
                    sum += f64::from(raw);
                    count += 1;
                }
                Err(TransportError::Timeout | TransportError::Gpio) => {}
            }
            // Settle between reads, but not after the last one.
            if self.settle_delay_ms > 0 && i + 1 < self.calibration_samples {
                thread::sleep(Duration::from_millis(u64::from(self.settle_delay_ms)));
            }
        }
        (count > 0).then(|| (sum / f64::from(count), count))
    }

    // ── Sampling ──────────────────────────────────────────────

    /// One sampling tick: raw read → weight conversion → stability check →
    /// persistence, strictly in that order.
    pub fn tick(&mut self) {
        self.stats.read_count += 1;

        let raw = match self.transport.read_raw() {
            Ok(raw) => raw,
            Err(_) => {
                self.sink.emit(&AppEvent::ReadFailed);
                return;
            }
        };

        let weight_kg = self.profile.weight_kg(raw);
        let stable = self.detector.add_reading(weight_kg);
        self.sink.emit(&AppEvent::SampleRead { weight_kg, stable });

        if !stable {
            return;
        }

        // Window is full whenever an event fires.
        let Some(stable_weight) = self.detector.get_stable_weight() else {
            return;
        };
        self.sink.emit(&AppEvent::StableWeight {
            weight_kg: stable_weight,
        });

        let reading = StableReading {
            weight_kg: stable_weight,
            timestamp: Local::now(),
        };
        match self.reading_store.save(&reading) {
            Ok(()) => {
                self.stats.save_count += 1;
                self.sink.emit(&AppEvent::ReadingPersisted {
                    weight_kg: stable_weight,
                });
            }
            Err(e) => self.sink.emit(&AppEvent::StoreFailed {
                what: "stable reading",
                err: e,
            }),
        }
    }

    /// Fixed-cadence sampling loop.  Controls are polled between ticks:
    /// shutdown ends the loop cooperatively; a tare request re-zeroes and
    /// persists in place.  Runs until shutdown is requested.
    pub fn run(&mut self, controls: &mut impl ControlPort) -> SessionStats {
        loop {
            match controls.poll() {
                Some(SessionCommand::Shutdown) => break,
                Some(SessionCommand::Tare) => {
                    info!("operator tare requested");
                    if self.tare().is_ok() {
                        self.persist_profile();
                    }
                    self.detector.reset();
                }
                None => {}
            }

            self.tick();

            if self.sample_interval_ms > 0 {
                thread::sleep(Duration::from_millis(u64::from(self.sample_interval_ms)));
            }
        }
        self.shutdown()
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn profile(&self) -> &CalibrationProfile {
        &self.profile
    }

    // ── Internal ──────────────────────────────────────────────

    fn persist_profile(&mut self) {
        match self.calibration_store.save(&self.profile) {
            Ok(()) => info!(
                "calibration persisted: tare={:.2} scale={:.8}",
                self.profile.tare_value, self.profile.scale_factor
            ),
            Err(e) => {
                warn!("calibration save failed: {e}");
                self.sink.emit(&AppEvent::StoreFailed {
                    what: "calibration save",
                    err: e,
                });
            }
        }
    }
}
