//! GPIO pin assignments for the weighscale main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.
//!
//! The ADS1232 is wired in its 18-pin configuration: there is no dedicated
//! DRDY pin, so DOUT doubles as the data-ready indicator (low = conversion
//! available) and as the serial data output.

// ---------------------------------------------------------------------------
// ADS1232 24-bit load-cell ADC
// ---------------------------------------------------------------------------

/// Power-down control line (active low: HIGH = converter powered).
pub const ADC_PDWN_GPIO: i32 = 10;
/// Sample-rate select line: LOW = 10 SPS (low noise), HIGH = 80 SPS.
pub const ADC_SPEED_GPIO: i32 = 11;
/// Serial clock output to the converter.
pub const ADC_SCLK_GPIO: i32 = 12;
/// Serial data input from the converter; also the data-ready line.
pub const ADC_DOUT_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// User button (active-low with external pull-up)
// ---------------------------------------------------------------------------

/// Momentary push-button: short press = tare, long press = shutdown.
pub const BUTTON_GPIO: i32 = 16;

// ---------------------------------------------------------------------------
// Pin-safety validation
// ---------------------------------------------------------------------------

/// GPIO 26–32 are bonded to the SPI flash on every ESP32-S3 module.
/// Driving them from firmware corrupts flash access.
const RESERVED_FLASH: core::ops::RangeInclusive<i32> = 26..=32;
/// GPIO 22–25 do not exist on the ESP32-S3 die.
const NONEXISTENT: core::ops::RangeInclusive<i32> = 22..=25;
/// Strapping pins sampled at reset — usable, but worth a warning.
const STRAPPING: [i32; 4] = [0, 3, 45, 46];
/// USB-JTAG pins — reassigning them loses the debug port.
const USB_JTAG: [i32; 2] = [19, 20];
/// Highest GPIO number on the ESP32-S3.
const GPIO_MAX: i32 = 48;

/// Outcome of validating a pin map.
///
/// `errors` are hard conflicts — the caller must abort before any peripheral
/// is initialised.  `warnings` are advisory and logged only.
#[derive(Debug, Default)]
pub struct PinSafetyReport {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl PinSafetyReport {
    pub fn is_safe(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate an arbitrary named pin map.
pub fn validate_pins(pins: &[(&str, i32)]) -> PinSafetyReport {
    let mut report = PinSafetyReport::default();

    for &(name, pin) in pins {
        if !(0..=GPIO_MAX).contains(&pin) {
            report
                .errors
                .push(format!("{name} (GPIO {pin}) outside valid range 0-{GPIO_MAX}"));
        } else if NONEXISTENT.contains(&pin) {
            report
                .errors
                .push(format!("{name} (GPIO {pin}) does not exist on the ESP32-S3"));
        } else if RESERVED_FLASH.contains(&pin) {
            report
                .errors
                .push(format!("{name} (GPIO {pin}) is reserved for SPI flash"));
        }

        if STRAPPING.contains(&pin) {
            report
                .warnings
                .push(format!("{name} (GPIO {pin}) is a strapping pin"));
        }
        if USB_JTAG.contains(&pin) {
            report
                .warnings
                .push(format!("{name} (GPIO {pin}) disables USB-JTAG debugging"));
        }
    }

    // Duplicate assignments: one physical line cannot serve two functions.
    for (i, &(name_a, pin_a)) in pins.iter().enumerate() {
        for &(name_b, pin_b) in &pins[i + 1..] {
            if pin_a == pin_b {
                report
                    .errors
                    .push(format!("{name_a} and {name_b} both mapped to GPIO {pin_a}"));
            }
        }
    }

    report
}

/// Validate the board's own pin map (the constants above).
pub fn validate() -> PinSafetyReport {
    validate_pins(&[
        ("ADC_PDWN", ADC_PDWN_GPIO),
        ("ADC_SPEED", ADC_SPEED_GPIO),
        ("ADC_SCLK", ADC_SCLK_GPIO),
        ("ADC_DOUT", ADC_DOUT_GPIO),
        ("BUTTON", BUTTON_GPIO),
    ])
}
