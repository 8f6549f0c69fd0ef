//! Embedded real-time clock.
//!
//! A 64-bit count of seconds at `0x11E030..=0x11E037` (little-endian). The
//! clock advances with the emulated time passed to `tick`, not wall time, so
//! runs are reproducible. Writing a byte sets that byte of the counter.

use super::AddressHandler;
use crate::state::{Reader, StateError};

/// First address of the RTC counter.
pub const RTC_BASE: u32 = 0x11_E030;

/// Bytes occupied by the RTC counter.
pub const RTC_SIZE: u32 = 8;

const STATE_SIZE: usize = 8 + 8 + 8;

/// Seconds counter driven by emulated time.
#[derive(Debug, Clone)]
pub struct Rtc {
    epoch: u64,
    seconds: u64,
    fraction: f64,
}

impl Rtc {
    /// Creates a clock that starts counting at `epoch` seconds.
    pub fn new(epoch: u64) -> Self {
        Self {
            epoch,
            seconds: epoch,
            fraction: 0.0,
        }
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }
}

impl AddressHandler for Rtc {
    fn read_byte(&mut self, offset: u32) -> u8 {
        self.seconds.to_le_bytes().get(offset as usize).copied().unwrap_or(0)
    }

    fn write_byte(&mut self, offset: u32, value: u8) {
        let mut bytes = self.seconds.to_le_bytes();
        if let Some(byte) = bytes.get_mut(offset as usize) {
            *byte = value;
            self.seconds = u64::from_le_bytes(bytes);
        }
    }

    fn reset(&mut self) {
        self.seconds = self.epoch;
        self.fraction = 0.0;
    }

    fn tick(&mut self, _cycles: u32, delta: f64) {
        self.fraction += delta;
        if self.fraction >= 1.0 {
            let whole = self.fraction.floor();
            self.seconds = self.seconds.wrapping_add(whole as u64);
            self.fraction -= whole;
        }
    }

    fn save_state(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(STATE_SIZE);
        out.extend_from_slice(&self.epoch.to_le_bytes());
        out.extend_from_slice(&self.seconds.to_le_bytes());
        out.extend_from_slice(&self.fraction.to_bits().to_le_bytes());
        out
    }

    fn load_state(&mut self, state: &[u8]) -> Result<(), StateError> {
        if state.len() != STATE_SIZE {
            return Err(StateError::SizeMismatch {
                expected: STATE_SIZE,
                actual: state.len(),
            });
        }
        let mut reader = Reader::new(state);
        self.epoch = reader.u64()?;
        self.seconds = reader.u64()?;
        self.fraction = f64::from_bits(reader.u64()?);
        Ok(())
    }
}
