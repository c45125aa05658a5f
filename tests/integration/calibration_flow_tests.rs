//! Tare and span calibration flows, including every rejection path.

use std::cell::RefCell;
use std::rc::Rc;

use weighscale::app::session::Session;
use weighscale::config::ScaleConfig;
use weighscale::drivers::ads1232::encode_frame;
use weighscale::drivers::sim::{SimAdc, SimFrame};
use weighscale::error::{CalibrationError, Error};

use crate::mock_hw::{SharedAdc, SharedCalibrationStore, SharedReadingStore, SharedSink};

fn config(calibration_samples: u32) -> ScaleConfig {
    ScaleConfig {
        sample_interval_ms: 0,
        settle_delay_ms: 0,
        calibration_samples,
        ..ScaleConfig::default()
    }
}

fn session_with(
    adc: SharedAdc,
    calibration: SharedCalibrationStore,
    sink: SharedSink,
    cfg: &ScaleConfig,
) -> Session<SharedAdc, SharedCalibrationStore, SharedReadingStore, SharedSink> {
    Session::new(
        cfg,
        adc,
        calibration,
        SharedReadingStore::default(),
        sink,
    )
}

#[test]
fn tare_with_all_timeouts_keeps_previous_zero_point() {
    let adc = SharedAdc::from_raw([500, 500, 500, 500]);
    let sink = SharedSink::default();
    let mut session = session_with(
        adc.clone(),
        SharedCalibrationStore::default(),
        sink.clone(),
        &config(4),
    );
    session.startup().unwrap();
    assert_eq!(session.profile().tare_value, 500.0);

    // Script exhausted: every read in the next batch times out.
    assert_eq!(session.tare(), Err(CalibrationError::NoSamples));
    assert_eq!(session.profile().tare_value, 500.0);

    let events = sink.0.borrow();
    assert!(events
        .events
        .iter()
        .any(|e| matches!(e, weighscale::app::events::AppEvent::TareFailed(_))));
}

#[test]
fn tare_skips_timeouts_within_a_batch() {
    let adc = SharedAdc(Rc::new(RefCell::new(SimAdc::scripted([
        SimFrame::Frame(encode_frame(100)),
        SimFrame::Timeout,
        SimFrame::Frame(encode_frame(200)),
        SimFrame::Short,
    ]))));
    let mut session = session_with(
        adc,
        SharedCalibrationStore::default(),
        SharedSink::default(),
        &config(4),
    );
    session.startup().unwrap();

    // Two good reads out of four: mean of the survivors.
    assert_eq!(session.profile().tare_value, 150.0);
    assert_eq!(session.profile().samples_taken, 2);
}

#[test]
fn span_rejects_deflection_at_noise_floor() {
    let adc = SharedAdc::from_raw([1_000, 1_000, 1_000, 1_000]);
    let store = SharedCalibrationStore::default();
    let cfg = config(4);
    let mut session = session_with(adc.clone(), store.clone(), SharedSink::default(), &cfg);
    session.startup().unwrap();
    assert_eq!(store.save_count(), 1);

    // Mean 1_100 - tare 1_000 = 100 counts: exactly at the guard, rejected.
    for _ in 0..4 {
        adc.push_raw(1_100);
    }
    assert_eq!(
        session.span_calibrate(2.0),
        Err(Error::Calibration(CalibrationError::Degenerate))
    );
    assert_eq!(session.profile().scale_factor, cfg.default_scale_factor);
    assert_eq!(store.save_count(), 1, "nothing may be persisted on rejection");
}

#[test]
fn span_rejects_nonpositive_reference_mass() {
    let adc = SharedAdc::from_raw([1_000, 1_000, 1_000, 1_000]);
    let mut session = session_with(
        adc,
        SharedCalibrationStore::default(),
        SharedSink::default(),
        &config(4),
    );
    session.startup().unwrap();

    assert_eq!(
        session.span_calibrate(0.0),
        Err(Error::Calibration(CalibrationError::Degenerate))
    );
}

#[test]
fn span_with_all_timeouts_fails_without_mutation() {
    let adc = SharedAdc::from_raw([1_000, 1_000, 1_000, 1_000]);
    let cfg = config(4);
    let mut session = session_with(
        adc,
        SharedCalibrationStore::default(),
        SharedSink::default(),
        &cfg,
    );
    session.startup().unwrap();

    assert_eq!(
        session.span_calibrate(2.0),
        Err(Error::Calibration(CalibrationError::NoSamples))
    );
    assert_eq!(session.profile().scale_factor, cfg.default_scale_factor);
}

#[test]
fn span_derives_and_persists_scale_factor() {
    let adc = SharedAdc::from_raw([1_000, 1_000, 1_000, 1_000]);
    let store = SharedCalibrationStore::default();
    let mut session = session_with(adc.clone(), store.clone(), SharedSink::default(), &config(4));
    session.startup().unwrap();

    // 2 kg reference deflects 1_000 counts above tare.
    for _ in 0..4 {
        adc.push_raw(2_000);
    }
    session.span_calibrate(2.0).unwrap();

    assert_eq!(session.profile().scale_factor, 0.002);
    assert_eq!(store.saved().unwrap().scale_factor, 0.002);
    assert_eq!(store.save_count(), 2); // startup tare + span
}

#[test]
fn span_supports_inverted_wiring() {
    // A load cell wired backwards deflects downward; the derived factor is
    // negative and readings still come out positive.
    let adc = SharedAdc::from_raw([10_000, 10_000, 10_000, 10_000]);
    let mut session = session_with(
        adc.clone(),
        SharedCalibrationStore::default(),
        SharedSink::default(),
        &config(4),
    );
    session.startup().unwrap();

    for _ in 0..4 {
        adc.push_raw(8_000);
    }
    session.span_calibrate(2.0).unwrap();
    assert_eq!(session.profile().scale_factor, -0.001);

    assert_eq!(session.profile().weight_kg(8_000), 2.0);
}
