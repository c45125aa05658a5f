//! Windowed weight-stability detection.
//!
//! A bounded FIFO window of the most recent readings is checked for flatness
//! on every new sample.  A flat window fires a stable event at most once per
//! plateau:
//!
//! | State      | Condition                        | Event                  |
//! |------------|----------------------------------|------------------------|
//! | Filling    | window shorter than stable_count | never                  |
//! | Evaluating | max dev ≤ threshold, new plateau | stable (once)          |
//! | Evaluating | max dev ≤ threshold, same plateau| suppressed             |
//! | Evaluating | max dev > threshold              | none                   |
//!
//! "New plateau" means the window average differs from the last reported
//! stable weight by more than the threshold, or none was ever reported.

use heapless::Deque;

/// Fixed storage capacity of the window; the runtime length limit
/// (`stable_count`, config-driven) must not exceed this.
pub const MAX_WINDOW: usize = 16;

/// Detector phase, exposed for display purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// Not enough samples collected yet; always reports "not stable".
    Filling,
    /// Window full; flatness checked on every new sample.
    Evaluating,
}

pub struct StabilityDetector {
    threshold_kg: f64,
    stable_count: usize,
    window: Deque<f64, MAX_WINDOW>,
    last_stable_weight: Option<f64>,
}

impl StabilityDetector {
    /// `threshold_kg`: maximum deviation from the window mean to count as
    /// flat. `stable_count`: window length, 2..=[`MAX_WINDOW`] (validated
    /// upstream in [`ScaleConfig::validate`](crate::config::ScaleConfig)).
    pub fn new(threshold_kg: f64, stable_count: usize) -> Self {
        debug_assert!((2..=MAX_WINDOW).contains(&stable_count));
        Self {
            threshold_kg,
            stable_count,
            window: Deque::new(),
            last_stable_weight: None,
        }
    }

    pub fn state(&self) -> DetectorState {
        if self.window.len() < self.stable_count {
            DetectorState::Filling
        } else {
            DetectorState::Evaluating
        }
    }

    /// Feed one weight reading.  Returns `true` exactly once per plateau,
    /// on the sample that completes a flat window at a new level.
    pub fn add_reading(&mut self, weight_kg: f64) -> bool {
        if self.window.len() == self.stable_count {
            self.window.pop_front();
        }
        // Cannot overflow: length is capped at stable_count <= MAX_WINDOW.
        let _ = self.window.push_back(weight_kg);

        if self.window.len() < self.stable_count {
            return false;
        }

        let avg = self.average();
        let max_dev = self
            .window
            .iter()
            .map(|w| (w - avg).abs())
            .fold(0.0_f64, f64::max);

        if max_dev > self.threshold_kg {
            return false;
        }

        match self.last_stable_weight {
            Some(last) if (avg - last).abs() <= self.threshold_kg => false,
            _ => {
                self.last_stable_weight = Some(avg);
                true
            }
        }
    }

    /// Current window average, or `None` while the window is still filling.
    /// Independent of whether an event just fired.
    pub fn get_stable_weight(&self) -> Option<f64> {
        if self.window.len() < self.stable_count {
            None
        } else {
            Some(self.average())
        }
    }

    /// Last weight a stable event was reported for.
    pub fn last_stable_weight(&self) -> Option<f64> {
        self.last_stable_weight
    }

    /// Clear the window.  Deliberately does NOT clear the last stable weight:
    /// after a reset the same plateau will not re-fire until the weight first
    /// moves away by more than the threshold and comes back.
    pub fn reset(&mut self) {
        self.window.clear();
    }

    fn average(&self) -> f64 {
        let sum: f64 = self.window.iter().sum();
        sum / self.window.len() as f64
    }
}
