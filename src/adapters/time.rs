//! Monotonic uptime adapter.
//!
//! - **`target_os = "espidf"`** — wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic).
//! - **`not(target_os = "espidf")`** — uses `std::time::Instant` for
//!   host-side testing and simulation.
//!
//! Wall-clock timestamps come straight from `chrono` where they are needed;
//! this adapter only supplies the monotonic milliseconds the button gesture
//! driver ticks on.

pub struct Uptime {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Uptime {
    fn default() -> Self {
        Self::new()
    }
}

impl Uptime {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot (monotonic, wraps with `u32`).
    #[cfg(target_os = "espidf")]
    pub fn millis(&self) -> u32 {
        ((unsafe { esp_idf_svc::sys::esp_timer_get_time() }) / 1_000) as u32
    }

    /// Milliseconds since construction (monotonic, wraps with `u32`).
    #[cfg(not(target_os = "espidf"))]
    pub fn millis(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}
