//! Integration test driver for the `tests/integration/` tree.
//!
//! One module per subsystem flow, all driven through the mock adapters in
//! `mock_hw` — no converter, button, or filesystem required; everything
//! runs on the host.

mod calibration_flow_tests;
mod session_tests;
