//! Embedded beeper.
//!
//! A single 16-bit frequency register at `0x11E020` (little-endian). Zero
//! means silent. The machine only stores the value; producing sound is up to
//! the host, which reads it back through
//! [`Computer::beep_frequency`](crate::Computer::beep_frequency).

use super::AddressHandler;
use crate::state::StateError;

/// First address of the frequency register.
pub const BEEPER_BASE: u32 = 0x11_E020;

/// Bytes occupied by the frequency register.
pub const BEEPER_SIZE: u32 = 2;

/// Beeper frequency register.
#[derive(Debug, Clone, Default)]
pub struct Beeper {
    frequency: u16,
}

impl Beeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current frequency in Hz (0 = silent).
    pub fn frequency(&self) -> u16 {
        self.frequency
    }
}

impl AddressHandler for Beeper {
    fn read_byte(&mut self, offset: u32) -> u8 {
        self.frequency.to_le_bytes().get(offset as usize).copied().unwrap_or(0)
    }

    fn write_byte(&mut self, offset: u32, value: u8) {
        let mut bytes = self.frequency.to_le_bytes();
        if let Some(byte) = bytes.get_mut(offset as usize) {
            *byte = value;
            self.frequency = u16::from_le_bytes(bytes);
        }
    }

    fn reset(&mut self) {
        self.frequency = 0;
    }

    fn save_state(&self) -> Vec<u8> {
        self.frequency.to_le_bytes().to_vec()
    }

    fn load_state(&mut self, state: &[u8]) -> Result<(), StateError> {
        match state {
            [lo, hi] => {
                self.frequency = u16::from_le_bytes([*lo, *hi]);
                Ok(())
            }
            _ => Err(StateError::SizeMismatch {
                expected: 2,
                actual: state.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_register() {
        let mut beeper = Beeper::new();
        beeper.write_byte(0, 0xB8);
        beeper.write_byte(1, 0x01);
        assert_eq!(beeper.frequency(), 440);
        assert_eq!(beeper.read_byte(1), 0x01);
        assert_eq!(beeper.read_byte(2), 0);

        beeper.reset();
        assert_eq!(beeper.frequency(), 0);
    }
}
