//! Programmable interval timer.
//!
//! Two independent 32-bit down-counters clocked by the processor clock. The
//! registers live at `0x11E000..=0x11E010`:
//!
//! | Offset | Register |
//! |--------|----------|
//! | 0x00-0x03 | timer 0 reload value (writing the high byte also loads the counter) |
//! | 0x04-0x07 | timer 1 reload value |
//! | 0x08-0x0B | timer 0 counter |
//! | 0x0C-0x0F | timer 1 counter |
//! | 0x10 | control |
//!
//! Control bits: bit 0 enables timer 0, bit 1 enables its interrupt, bit 2
//! enables timer 1, bit 3 enables its interrupt.
//!
//! A running counter that reaches zero reloads and, if its interrupt is
//! enabled, asserts [`TIMER0_MSG`] or [`TIMER1_MSG`] until acknowledged. The
//! timer is the first handler registered on the bus, so it has the highest
//! interrupt priority.

use super::AddressHandler;
use crate::state::{Reader, StateError};

/// First address of the timer registers.
pub const TIMER_BASE: u32 = 0x11_E000;

/// Bytes occupied by the timer registers.
pub const TIMER_SIZE: u32 = 17;

/// Interrupt message of timer 0.
pub const TIMER0_MSG: u16 = 0x0001;

/// Interrupt message of timer 1.
pub const TIMER1_MSG: u16 = 0x0002;

const CONTROL: u32 = 0x10;
const STATE_SIZE: usize = 2 * (4 + 4 + 1) + 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Counter {
    reload: u32,
    count: u32,
    pending: bool,
}

impl Counter {
    /// One clock; returns true when the counter wraps.
    fn clock(&mut self) -> bool {
        if self.count <= 1 {
            self.count = self.reload;
            true
        } else {
            self.count -= 1;
            false
        }
    }
}

/// Two-channel interval timer.
///
/// # Examples
///
/// ```rust
/// use tr3200::{AddressHandler, Timer};
/// use tr3200::devices::timer::TIMER0_MSG;
///
/// let mut timer = Timer::new();
/// // Reload timer 0 with 10 cycles, run it with its interrupt enabled
/// for (i, b) in 10u32.to_le_bytes().into_iter().enumerate() {
///     timer.write_byte(i as u32, b);
/// }
/// timer.write_byte(0x10, 0b11);
///
/// timer.tick(9, 0.0);
/// assert_eq!(timer.does_interrupt(), None);
/// timer.tick(1, 0.0);
/// assert_eq!(timer.does_interrupt(), Some(TIMER0_MSG));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Timer {
    counters: [Counter; 2],
    control: u8,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    fn running(&self, channel: usize) -> bool {
        self.control & (1 << (channel * 2)) != 0
    }

    fn interrupt_enabled(&self, channel: usize) -> bool {
        self.control & (2 << (channel * 2)) != 0
    }

    /// Current counter value of a channel (0 or 1).
    pub fn count(&self, channel: usize) -> u32 {
        self.counters.get(channel).map_or(0, |c| c.count)
    }
}

impl AddressHandler for Timer {
    fn read_byte(&mut self, offset: u32) -> u8 {
        let (word, byte) = match offset {
            0x00..=0x03 => (self.counters[0].reload, offset),
            0x04..=0x07 => (self.counters[1].reload, offset - 0x04),
            0x08..=0x0B => (self.counters[0].count, offset - 0x08),
            0x0C..=0x0F => (self.counters[1].count, offset - 0x0C),
            CONTROL => return self.control,
            _ => return 0,
        };
        word.to_le_bytes()[byte as usize]
    }

    fn write_byte(&mut self, offset: u32, value: u8) {
        let (channel, field, byte) = match offset {
            0x00..=0x07 => ((offset / 4) as usize, 0, offset % 4),
            0x08..=0x0F => (((offset - 0x08) / 4) as usize, 1, offset % 4),
            CONTROL => {
                self.control = value & 0x0F;
                return;
            }
            _ => return,
        };

        let counter = &mut self.counters[channel];
        let target = if field == 0 {
            &mut counter.reload
        } else {
            &mut counter.count
        };
        let mut bytes = target.to_le_bytes();
        bytes[byte as usize] = value;
        *target = u32::from_le_bytes(bytes);

        if field == 0 && byte == 3 {
            counter.count = counter.reload;
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn tick(&mut self, cycles: u32, _delta: f64) {
        for channel in 0..2 {
            if !self.running(channel) {
                continue;
            }
            let irq = self.interrupt_enabled(channel);
            let counter = &mut self.counters[channel];
            for _ in 0..cycles {
                if counter.clock() && irq {
                    counter.pending = true;
                }
            }
        }
    }

    fn does_interrupt(&self) -> Option<u16> {
        if self.counters[0].pending {
            Some(TIMER0_MSG)
        } else if self.counters[1].pending {
            Some(TIMER1_MSG)
        } else {
            None
        }
    }

    fn iack(&mut self) {
        if self.counters[0].pending {
            self.counters[0].pending = false;
        } else {
            self.counters[1].pending = false;
        }
    }

    fn save_state(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(STATE_SIZE);
        for c in &self.counters {
            out.extend_from_slice(&c.reload.to_le_bytes());
            out.extend_from_slice(&c.count.to_le_bytes());
            out.push(c.pending as u8);
        }
        out.push(self.control);
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
        for c in self.counters.iter_mut() {
            c.reload = reader.u32()?;
            c.count = reader.u32()?;
            c.pending = reader.u8()? != 0;
        }
        self.control = reader.u8()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_reload(timer: &mut Timer, channel: u32, value: u32) {
        for (i, b) in value.to_le_bytes().into_iter().enumerate() {
            timer.write_byte(channel * 4 + i as u32, b);
        }
    }

    #[test]
    fn test_stopped_timer_does_not_count() {
        let mut timer = Timer::new();
        load_reload(&mut timer, 0, 5);
        timer.tick(100, 0.0);
        assert_eq!(timer.count(0), 5);
        assert_eq!(timer.does_interrupt(), None);
    }

    #[test]
    fn test_wrap_without_interrupt_enable() {
        let mut timer = Timer::new();
        load_reload(&mut timer, 1, 4);
        timer.write_byte(0x10, 0b0100);
        timer.tick(4, 0.0);
        assert_eq!(timer.count(1), 4);
        assert_eq!(timer.does_interrupt(), None);
    }

    #[test]
    fn test_timer0_has_priority_and_iack_clears_one() {
        let mut timer = Timer::new();
        load_reload(&mut timer, 0, 3);
        load_reload(&mut timer, 1, 3);
        timer.write_byte(0x10, 0x0F);
        timer.tick(3, 0.0);

        assert_eq!(timer.does_interrupt(), Some(TIMER0_MSG));
        timer.iack();
        assert_eq!(timer.does_interrupt(), Some(TIMER1_MSG));
        timer.iack();
        assert_eq!(timer.does_interrupt(), None);
    }

    #[test]
    fn test_counter_readback() {
        let mut timer = Timer::new();
        load_reload(&mut timer, 0, 0x100);
        timer.write_byte(0x10, 0b01);
        timer.tick(0x10, 0.0);
        assert_eq!(timer.read_byte(0x08), 0xF0);
        assert_eq!(timer.read_byte(0x09), 0x00);
        assert_eq!(timer.read_byte(0x01), 0x01);
    }

    #[test]
    fn test_state_round_trip() {
        let mut timer = Timer::new();
        load_reload(&mut timer, 0, 7);
        timer.write_byte(0x10, 0b11);
        timer.tick(9, 0.0);

        let mut copy = Timer::new();
        copy.load_state(&timer.save_state()).unwrap();
        assert_eq!(copy.count(0), timer.count(0));
        assert_eq!(copy.does_interrupt(), Some(TIMER0_MSG));
    }
}
