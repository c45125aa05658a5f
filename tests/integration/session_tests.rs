//! Session lifecycle tests: startup calibration policy, the per-tick
//! pipeline, persistence gating, and the run loop.

use weighscale::app::events::AppEvent;
use weighscale::app::ports::{SampleRate, SessionCommand};
use weighscale::app::session::Session;
use weighscale::config::ScaleConfig;
use weighscale::error::StorageError;
use weighscale::scale::calibration::CalibrationProfile;

use crate::mock_hw::{
    ScriptedControls, SharedAdc, SharedCalibrationStore, SharedReadingStore, SharedSink,
};

/// Fast test config: no settle delays, no loop sleeps, small tare batches.
fn config(calibration_samples: u32) -> ScaleConfig {
    ScaleConfig {
        sample_interval_ms: 0,
        settle_delay_ms: 0,
        calibration_samples,
        ..ScaleConfig::default()
    }
}

struct Rig {
    adc: SharedAdc,
    calibration: SharedCalibrationStore,
    readings: SharedReadingStore,
    sink: SharedSink,
}

impl Rig {
    fn new(adc: SharedAdc) -> Self {
        Self {
            adc,
            calibration: SharedCalibrationStore::default(),
            readings: SharedReadingStore::default(),
            sink: SharedSink::default(),
        }
    }

    fn session(
        &self,
        cfg: &ScaleConfig,
    ) -> Session<SharedAdc, SharedCalibrationStore, SharedReadingStore, SharedSink> {
        Session::new(
            cfg,
            self.adc.clone(),
            self.calibration.clone(),
            self.readings.clone(),
            self.sink.clone(),
        )
    }
}

#[test]
fn startup_powers_transport_and_selects_rate() {
    let rig = Rig::new(SharedAdc::from_raw([100, 100, 100, 100]));
    let cfg = ScaleConfig {
        sample_rate: SampleRate::High,
        ..config(4)
    };
    let mut session = rig.session(&cfg);
    session.startup().unwrap();

    assert!(rig.adc.is_powered());
    assert_eq!(rig.adc.rate(), SampleRate::High);
    assert_eq!(session.profile().tare_value, 100.0);
}

#[test]
fn startup_fresh_persists_default_scale_factor() {
    let rig = Rig::new(SharedAdc::from_raw([10, 20, 30, 40]));
    let cfg = config(4);
    let mut session = rig.session(&cfg);
    session.startup().unwrap();

    let saved = rig.calibration.saved().expect("profile must be persisted");
    assert_eq!(saved.tare_value, 25.0);
    assert_eq!(saved.scale_factor, cfg.default_scale_factor);
    assert_eq!(saved.samples_taken, 4);
    assert_eq!(rig.calibration.save_count(), 1);
}

#[test]
fn startup_adopts_stored_scale_and_refreshes_tare() {
    let stored = CalibrationProfile {
        tare_value: 5.0,
        scale_factor: 0.002,
        ..CalibrationProfile::initial(0.002, "stored cell", 50.0)
    };
    let mut rig = Rig::new(SharedAdc::from_raw([100, 100, 100, 100]));
    rig.calibration = SharedCalibrationStore::preloaded(stored);

    let mut session = rig.session(&config(4));
    session.startup().unwrap();

    // Scale factor survives; only the zero point is refreshed.
    assert_eq!(session.profile().scale_factor, 0.002);
    assert_eq!(session.profile().tare_value, 100.0);
    assert_eq!(rig.calibration.saved().unwrap().tare_value, 100.0);
}

#[test]
fn startup_forced_recalibration_ignores_store() {
    let stored = CalibrationProfile {
        tare_value: 5.0,
        scale_factor: 0.002,
        ..CalibrationProfile::initial(0.002, "stored cell", 50.0)
    };
    let mut rig = Rig::new(SharedAdc::from_raw([100, 100, 100, 100]));
    rig.calibration = SharedCalibrationStore::preloaded(stored);

    let cfg = ScaleConfig {
        force_calibration: true,
        ..config(4)
    };
    let mut session = rig.session(&cfg);
    session.startup().unwrap();

    assert_eq!(session.profile().scale_factor, cfg.default_scale_factor);
}

#[test]
fn startup_with_corrupt_record_starts_fresh() {
    let mut rig = Rig::new(SharedAdc::from_raw([100, 100, 100, 100]));
    rig.calibration = SharedCalibrationStore::failing_load(StorageError::Corrupted);

    let cfg = config(4);
    let mut session = rig.session(&cfg);
    session.startup().unwrap();

    assert_eq!(session.profile().scale_factor, cfg.default_scale_factor);
    assert!(rig.sink.0.borrow().count_store_failures() >= 1);
}

#[test]
fn tick_pipeline_fires_stable_on_window_fill() {
    // tare 1_000_000, scale 0.0000015, raw reads [1_000_000]*4 +
    // [1_000_003]: the stable event must land exactly on the 5th tick.
    let stored = CalibrationProfile {
        tare_value: 1_000_000.0,
        scale_factor: 0.000_001_5,
        ..CalibrationProfile::initial(0.000_001_5, "cell", 50.0)
    };
    let mut rig = Rig::new(SharedAdc::from_raw([1_000_000; 4]));
    rig.calibration = SharedCalibrationStore::preloaded(stored);

    let mut session = rig.session(&config(4));
    session.startup().unwrap();

    for raw in [1_000_000, 1_000_000, 1_000_000, 1_000_000, 1_000_003] {
        rig.adc.push_raw(raw);
        session.tick();
    }

    assert_eq!(
        rig.sink.0.borrow().stable_flags(),
        vec![false, false, false, false, true]
    );
    let saved = rig.readings.saved_weights();
    assert_eq!(saved.len(), 1);
    assert!(saved[0].abs() < 0.005, "plateau is ~0 kg, got {}", saved[0]);

    let stats = session.stats();
    assert_eq!(stats.read_count, 5);
    assert_eq!(stats.save_count, 1);
    assert!((stats.efficiency_percent() - 80.0).abs() < 1e-9);
}

#[test]
fn same_plateau_is_saved_once() {
    let mut rig = Rig::new(SharedAdc::from_raw([0; 4]));
    rig.calibration = SharedCalibrationStore::preloaded(CalibrationProfile {
        tare_value: 0.0,
        scale_factor: 0.001,
        ..CalibrationProfile::initial(0.001, "cell", 50.0)
    });
    let mut session = rig.session(&config(4));
    session.startup().unwrap();

    for _ in 0..10 {
        rig.adc.push_raw(500);
        session.tick();
    }

    // Ten flat ticks on one plateau: one event, one file write.
    assert_eq!(rig.readings.saved_weights().len(), 1);
    assert_eq!(session.stats().save_count, 1);
    assert_eq!(session.stats().read_count, 10);
}

#[test]
fn read_timeout_is_reported_not_fatal() {
    let rig = Rig::new(SharedAdc::from_raw([100, 100, 100, 100]));
    let mut session = rig.session(&config(4));
    session.startup().unwrap();

    session.tick(); // script exhausted -> timeout
    assert!(rig
        .sink
        .0
        .borrow()
        .events
        .contains(&AppEvent::ReadFailed));
    assert_eq!(session.stats().read_count, 1);

    // The loop keeps going: a later good sample is processed normally.
    rig.adc.push_raw(100);
    session.tick();
    assert_eq!(session.stats().read_count, 2);
    assert_eq!(rig.sink.0.borrow().stable_flags().len(), 1);
}

#[test]
fn persist_failure_reported_and_loop_continues() {
    let mut rig = Rig::new(SharedAdc::from_raw([0; 4]));
    rig.readings = SharedReadingStore::failing(StorageError::Io);
    rig.calibration = SharedCalibrationStore::preloaded(CalibrationProfile {
        tare_value: 0.0,
        scale_factor: 0.001,
        ..CalibrationProfile::initial(0.001, "cell", 50.0)
    });

    let mut session = rig.session(&config(4));
    session.startup().unwrap();

    for _ in 0..6 {
        rig.adc.push_raw(500);
        session.tick();
    }

    assert_eq!(session.stats().save_count, 0);
    assert!(rig.sink.0.borrow().count_store_failures() >= 1);
    assert_eq!(session.stats().read_count, 6, "loop must keep ticking");
}

#[test]
fn run_loop_handles_tare_command_and_shutdown() {
    let raws = [
        100, 100, 100, 100, // startup tare batch
        100, // iteration 1 tick
        200, 200, 200, 200, // operator tare batch
        200, // iteration 2 tick
    ];
    let rig = Rig::new(SharedAdc::from_raw(raws));
    let mut session = rig.session(&config(4));
    session.startup().unwrap();

    let mut controls = ScriptedControls::new([
        None,
        Some(SessionCommand::Tare),
        Some(SessionCommand::Shutdown),
    ]);
    let stats = session.run(&mut controls);

    assert_eq!(stats.read_count, 2);
    assert_eq!(rig.sink.0.borrow().tare_values(), vec![100.0, 200.0]);
    assert_eq!(rig.calibration.save_count(), 2); // startup + operator tare
    assert!(!rig.adc.is_powered(), "shutdown must power the converter down");
}

#[test]
fn shutdown_without_run_reports_counters() {
    let rig = Rig::new(SharedAdc::from_raw([100, 100, 100, 100]));
    let mut session = rig.session(&config(4));
    session.startup().unwrap();

    let stats = session.shutdown();
    assert_eq!(stats.read_count, 0);
    assert_eq!(stats.save_count, 0);
    assert!(!rig.adc.is_powered());
}
