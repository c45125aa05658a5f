//! Peripheral drivers: the real bit-banged converter, its deterministic
//! simulation twin, and the user button.

pub mod ads1232;
pub mod button;
pub mod sim;
