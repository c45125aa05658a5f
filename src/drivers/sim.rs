//! Deterministic simulated ADC transport.
//!
//! Two modes, both reproducible:
//!
//! - **Scripted** — replays an explicit frame sequence, including injected
//!   faults (short frames, timeouts).  Used by the integration tests.
//! - **Noise model** — an endless drifting-weight signal driven by a seeded
//!   xorshift PRNG, approximating a real platter: slow drift plus per-sample
//!   noise.  Used when the firmware runs with `simulation = true`.
//!
//! Frames pass through the same wire codec as the hardware driver
//! ([`encode_frame`]/[`decode_frame`]), so the 3-byte transfer path is
//! exercised even in simulation.

use std::collections::VecDeque;

use crate::app::ports::{AdcTransport, SampleRate};
use crate::drivers::ads1232::{decode_frame, encode_frame, RAW_MAX, RAW_MIN};
use crate::error::TransportError;

/// One scripted transport exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimFrame {
    /// A complete 3-byte frame.
    Frame([u8; 3]),
    /// The transfer yields fewer than 3 bytes — surfaces as a timeout.
    Short,
    /// No data-ready within the deadline.
    Timeout,
}

// ── Seeded PRNG ───────────────────────────────────────────────

/// xorshift64* — tiny, deterministic, plenty for a noise model.
struct XorShift64(u64);

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform value in `[-bound, bound]`.
    fn next_signed(&mut self, bound: i32) -> i32 {
        if bound <= 0 {
            return 0;
        }
        let span = u64::from(bound as u32) * 2 + 1;
        ((self.next_u64() % span) as i64 - i64::from(bound)) as i32
    }
}

struct NoiseModel {
    base_raw: f64,
    noise_counts: i32,
    drift_counts: i32,
    rng: XorShift64,
}

impl NoiseModel {
    fn next(&mut self) -> i32 {
        self.base_raw += f64::from(self.rng.next_signed(self.drift_counts));
        let raw = self.base_raw + f64::from(self.rng.next_signed(self.noise_counts));
        (raw as i32).clamp(RAW_MIN, RAW_MAX)
    }
}

// ── Simulated transport ───────────────────────────────────────

pub struct SimAdc {
    script: VecDeque<SimFrame>,
    model: Option<NoiseModel>,
    powered: bool,
    rate: SampleRate,
}

impl SimAdc {
    /// Replay an explicit frame script; exhaustion reads time out.
    pub fn scripted(frames: impl IntoIterator<Item = SimFrame>) -> Self {
        Self {
            script: frames.into_iter().collect(),
            model: None,
            powered: false,
            rate: SampleRate::Low,
        }
    }

    /// Script built from raw codes, each encoded to its wire frame.
    pub fn from_raw(values: impl IntoIterator<Item = i32>) -> Self {
        Self::scripted(values.into_iter().map(|v| SimFrame::Frame(encode_frame(v))))
    }

    /// Endless drifting-weight signal around `base_raw`.
    pub fn noisy(base_raw: i32, noise_counts: i32, drift_counts: i32, seed: u64) -> Self {
        Self {
            script: VecDeque::new(),
            model: Some(NoiseModel {
                base_raw: f64::from(base_raw),
                noise_counts,
                drift_counts,
                rng: XorShift64::new(seed),
            }),
            powered: false,
            rate: SampleRate::Low,
        }
    }

    /// Append one raw code to the script (tests extend a running scenario).
    pub fn push_raw(&mut self, raw: i32) {
        self.script.push_back(SimFrame::Frame(encode_frame(raw)));
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    pub fn rate(&self) -> SampleRate {
        self.rate
    }
}

impl AdcTransport for SimAdc {
    fn power_up(&mut self) -> Result<(), TransportError> {
        self.powered = true;
        Ok(())
    }

    fn power_down(&mut self) -> Result<(), TransportError> {
        self.powered = false;
        Ok(())
    }

    fn set_sample_rate(&mut self, rate: SampleRate) -> Result<(), TransportError> {
        self.rate = rate;
        Ok(())
    }

    fn data_ready(&mut self) -> Result<bool, TransportError> {
        Ok(self.powered && (!self.script.is_empty() || self.model.is_some()))
    }

    fn read_raw(&mut self) -> Result<i32, TransportError> {
        if !self.powered {
            return Err(TransportError::Timeout);
        }
        if let Some(frame) = self.script.pop_front() {
            return match frame {
                SimFrame::Frame(bytes) => Ok(decode_frame(bytes)),
                SimFrame::Short | SimFrame::Timeout => Err(TransportError::Timeout),
            };
        }
        match &mut self.model {
            Some(model) => Ok(model.next()),
            None => Err(TransportError::Timeout),
        }
    }
}
