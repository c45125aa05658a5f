//! Weighscale Firmware — Main Entry Point
//!
//! Hexagonal architecture with a synchronous, single-threaded session loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  Ads1232 / SimAdc   FileCalibrationStore   FileReadingStore  │
//! │  (AdcTransport)     (CalibrationStore)     (ReadingStore)    │
//! │  ConsoleSink        ButtonControls                           │
//! │  (EventSink)        (ControlPort)                            │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ───────────────────    │
//! │                                                              │
//! │  ┌──────────────────────────────────────────────────────┐    │
//! │  │            Session (pure logic)                      │    │
//! │  │  calibration · stability · counters                  │    │
//! │  └──────────────────────────────────────────────────────┘    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{bail, Context, Result};
use embedded_hal::digital::InputPin;
use log::{error, info, warn};

use esp_idf_hal::delay::Delay;
use esp_idf_hal::gpio::{PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;

use weighscale::adapters::calibration_file::FileCalibrationStore;
use weighscale::adapters::console::ConsoleSink;
use weighscale::adapters::reading_file::FileReadingStore;
use weighscale::adapters::time::Uptime;
use weighscale::adapters::utils::ensure_dir;
use weighscale::app::events::SessionStats;
use weighscale::app::ports::{AdcTransport, ControlPort, SessionCommand};
use weighscale::app::session::Session;
use weighscale::config::ScaleConfig;
use weighscale::diagnostics;
use weighscale::drivers::ads1232::Ads1232;
use weighscale::drivers::button::{ButtonDriver, ButtonEvent};
use weighscale::drivers::sim::SimAdc;
use weighscale::pins;

// ── Button → session command bridge ───────────────────────────
//
// The button driver knows nothing about the session; this adapter
// translates its gestures into session commands: short press = tare,
// long press = orderly shutdown.

struct ButtonControls<P: InputPin> {
    pin: P,
    driver: ButtonDriver,
    uptime: Uptime,
}

impl<P: InputPin> ButtonControls<P> {
    fn new(pin: P) -> Self {
        Self {
            pin,
            driver: ButtonDriver::new(),
            uptime: Uptime::new(),
        }
    }
}

impl<P: InputPin> ControlPort for ButtonControls<P> {
    fn poll(&mut self) -> Option<SessionCommand> {
        // Active low: pressed pulls the line to ground.
        let pressed = self.pin.is_low().unwrap_or(false);
        match self.driver.tick(self.uptime.millis(), pressed)? {
            ButtonEvent::ShortPress => Some(SessionCommand::Tare),
            ButtonEvent::LongPress => Some(SessionCommand::Shutdown),
        }
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("weighscale v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Pin safety — the only fatal startup check ──────────
    let pin_report = pins::validate();
    for w in &pin_report.warnings {
        warn!("pin map: {w}");
    }
    if !pin_report.is_safe() {
        for e in &pin_report.errors {
            error!("pin map: {e}");
        }
        bail!("pin safety violation — fix the pin map before powering the board");
    }

    // ── 3. Clock sanity — diagnostic only ─────────────────────
    let clock = diagnostics::check_clock();
    if clock.valid {
        info!("system clock: {}", clock.timestamp);
    } else {
        warn!(
            "system clock implausible ({}) — timestamps in saved records will be wrong until the RTC is set",
            clock.date
        );
    }

    // ── 4. Configuration ──────────────────────────────────────
    let config = ScaleConfig::default();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("config: {e}"))?;

    // ── 5. Data directory bootstrap (reported, not fatal) ─────
    match ensure_dir(std::path::Path::new(&config.data_dir)) {
        Ok(()) => info!("data directory ready: {}", config.data_dir),
        Err(e) => warn!(
            "data directory {} unavailable ({e}) — readings will not be persisted until the mount is fixed",
            config.data_dir
        ),
    }

    // ── 6. Peripherals + transport selection ──────────────────
    let peripherals = Peripherals::take().context("peripheral takeover failed")?;

    let mut button_pin = PinDriver::input(peripherals.pins.gpio16)?;
    button_pin.set_pull(Pull::Up)?;
    let mut controls = ButtonControls::new(button_pin);

    let stats = if config.simulation {
        info!("SIMULATION MODE — deterministic transport, no converter attached");
        let transport = SimAdc::noisy(2_000_000, 800, 5, 0xC0FF_EE00);
        run_session(&config, transport, &mut controls)?
    } else {
        // Pin numbers here must match the map in `pins.rs` — the validator
        // in step 2 checked that map, not these bindings.
        let pdwn = PinDriver::output(peripherals.pins.gpio10)?;
        let speed = PinDriver::output(peripherals.pins.gpio11)?;
        let sclk = PinDriver::output(peripherals.pins.gpio12)?;
        let dout = PinDriver::input(peripherals.pins.gpio13)?;
        let transport = Ads1232::new(pdwn, speed, sclk, dout, Delay::new_default());
        run_session(&config, transport, &mut controls)?
    };

    // ── 7. Shutdown report ────────────────────────────────────
    info!(
        "session ended: {} reads, {} saves, {:.1}% writes avoided",
        stats.read_count,
        stats.save_count,
        stats.efficiency_percent()
    );
    Ok(())
}

/// Wire the stores and sink to the chosen transport and drive the session
/// to completion.
fn run_session<T: AdcTransport>(
    config: &ScaleConfig,
    transport: T,
    controls: &mut impl ControlPort,
) -> Result<SessionStats> {
    let calibration_store = FileCalibrationStore::new(&config.data_dir);
    let reading_store = FileReadingStore::new(&config.data_dir);
    let sink = ConsoleSink::new();

    let mut session = Session::new(config, transport, calibration_store, reading_store, sink);
    session
        .startup()
        .map_err(|e| anyhow::anyhow!("session startup failed: {e}"))?;

    info!("session running — short press to tare, hold 3s to shut down");
    Ok(session.run(controls))
}
