//! Bit-banged driver for the ADS1232 24-bit load-cell ADC.
//!
//! Wired in the 18-pin configuration: no dedicated DRDY pin exists, so DOUT
//! is multiplexed — it signals data-ready by going low, then shifts the
//! conversion result out under SCLK.  Generic over `embedded-hal` 1.0 pin
//! and delay traits, so the same driver runs against `esp-idf-hal` pin
//! drivers on hardware and against mock pins in unit tests.
//!
//! Read sequence per sample:
//! 1. poll DOUT every 1 ms until low, bounded by a 1-second deadline;
//! 2. clock out exactly one 3-byte frame (24 SCLK cycles, MSB first);
//! 3. sign-extend bit 23 (big-endian two's complement).

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::{AdcTransport, SampleRate};
use crate::error::TransportError;

/// Smallest representable 24-bit code.
pub const RAW_MIN: i32 = -8_388_608;
/// Largest representable 24-bit code.
pub const RAW_MAX: i32 = 8_388_607;

/// Interval between data-ready polls.
const READY_POLL_INTERVAL_US: u32 = 1_000;
/// Deadline for a conversion to become ready.
const READY_DEADLINE_MS: u32 = 1_000;
/// Half of one SCLK period.  1 µs keeps the clock well inside the
/// converter's minimum pulse width at any core speed.
const SCLK_HALF_PERIOD_US: u32 = 1;
/// Bits in one conversion frame.
const FRAME_BITS: u32 = 24;

/// Decode one big-endian 3-byte frame as 24-bit two's complement.
pub fn decode_frame(frame: [u8; 3]) -> i32 {
    let value =
        (u32::from(frame[0]) << 16) | (u32::from(frame[1]) << 8) | u32::from(frame[2]);
    if value & 0x0080_0000 != 0 {
        value as i32 - 0x0100_0000
    } else {
        value as i32
    }
}

/// Encode a 24-bit code back into its wire frame.  Inverse of
/// [`decode_frame`]; the simulation backend uses it to script frames.
pub fn encode_frame(raw: i32) -> [u8; 3] {
    let value = (raw as u32) & 0x00FF_FFFF;
    [(value >> 16) as u8, (value >> 8) as u8, value as u8]
}

pub struct Ads1232<PDWN, SPEED, SCLK, DOUT, D> {
    pdwn: PDWN,
    speed: SPEED,
    sclk: SCLK,
    dout: DOUT,
    delay: D,
}

impl<PDWN, SPEED, SCLK, DOUT, D> Ads1232<PDWN, SPEED, SCLK, DOUT, D>
where
    PDWN: OutputPin,
    SPEED: OutputPin,
    SCLK: OutputPin,
    DOUT: InputPin,
    D: DelayNs,
{
    pub fn new(pdwn: PDWN, speed: SPEED, sclk: SCLK, dout: DOUT, delay: D) -> Self {
        Self {
            pdwn,
            speed,
            sclk,
            dout,
            delay,
        }
    }

    /// Shift one 24-bit frame out of the converter.  DOUT must already be
    /// low (data ready) when this is called.
    fn read_frame(&mut self) -> Result<[u8; 3], TransportError> {
        let mut value: u32 = 0;
        for _ in 0..FRAME_BITS {
            value <<= 1;
            self.sclk.set_high().map_err(|_| TransportError::Gpio)?;
            self.delay.delay_us(SCLK_HALF_PERIOD_US);
            self.sclk.set_low().map_err(|_| TransportError::Gpio)?;
            if self.dout.is_high().map_err(|_| TransportError::Gpio)? {
                value |= 1;
            }
            self.delay.delay_us(SCLK_HALF_PERIOD_US);
        }
        Ok([(value >> 16) as u8, (value >> 8) as u8, value as u8])
    }
}

impl<PDWN, SPEED, SCLK, DOUT, D> AdcTransport for Ads1232<PDWN, SPEED, SCLK, DOUT, D>
where
    PDWN: OutputPin,
    SPEED: OutputPin,
    SCLK: OutputPin,
    DOUT: InputPin,
    D: DelayNs,
{
    fn power_up(&mut self) -> Result<(), TransportError> {
        // SCLK must idle low before releasing power-down, otherwise the
        // converter interprets the high clock as a pending power-down request.
        self.sclk.set_low().map_err(|_| TransportError::Gpio)?;
        self.pdwn.set_high().map_err(|_| TransportError::Gpio)?;
        Ok(())
    }

    fn power_down(&mut self) -> Result<(), TransportError> {
        self.pdwn.set_low().map_err(|_| TransportError::Gpio)
    }

    fn set_sample_rate(&mut self, rate: SampleRate) -> Result<(), TransportError> {
        match rate {
            SampleRate::Low => self.speed.set_low(),
            SampleRate::High => self.speed.set_high(),
        }
        .map_err(|_| TransportError::Gpio)
    }

    fn data_ready(&mut self) -> Result<bool, TransportError> {
        self.dout.is_low().map_err(|_| TransportError::Gpio)
    }

    fn read_raw(&mut self) -> Result<i32, TransportError> {
        let max_polls = READY_DEADLINE_MS * 1_000 / READY_POLL_INTERVAL_US;
        let mut ready = false;
        for _ in 0..max_polls {
            if self.data_ready()? {
                ready = true;
                break;
            }
            self.delay.delay_us(READY_POLL_INTERVAL_US);
        }
        if !ready {
            return Err(TransportError::Timeout);
        }

        let frame = self.read_frame()?;
        Ok(decode_frame(frame))
    }
}
