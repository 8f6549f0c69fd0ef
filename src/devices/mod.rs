//! Peripheral support for the TR3200 machine.
//!
//! This module defines the two ways hardware attaches to the
//! [`AddressSpace`](crate::AddressSpace):
//!
//! # Architecture
//!
//! - **Device trait**: the uniform protocol every slot peripheral implements
//!   (reset, command register, five data registers, identification, tick,
//!   interrupt assertion and acknowledge, state snapshot). Software reaches a
//!   device only through its generated [`EnumerationBlock`].
//! - **AddressHandler trait**: a raw listener bound to a fixed address range.
//!   The embedded peripherals (timer, beeper, RTC, RNG) are handlers.
//! - **Storage**: RAM and the ROM window, which the address space resolves
//!   before any range.
//!
//! # Example
//!
//! ```rust
//! use tr3200::{AddressSpace, Device, MemoryBus, Rom};
//!
//! struct Lamp {
//!     on: bool,
//! }
//!
//! impl Device for Lamp {
//!     fn reset(&mut self) {
//!         self.on = false;
//!     }
//!     fn send_cmd(&mut self, cmd: u16) {
//!         self.on = cmd != 0;
//!     }
//!     fn a(&self) -> u16 {
//!         self.on as u16
//!     }
//!     fn dev_type(&self) -> u8 { 0x0E }
//!     fn dev_subtype(&self) -> u8 { 0x01 }
//!     fn dev_id(&self) -> u8 { 0x01 }
//!     fn vendor_id(&self) -> u32 { 0x1C6C_8B36 }
//! }
//!
//! let mut bus = AddressSpace::new(128 * 1024, Rom::empty());
//! bus.add_device(0, Box::new(Lamp { on: false })).unwrap();
//!
//! assert_eq!(bus.read_byte(0x110000), 0xFF);
//! bus.write_half(0x110008, 1); // command register
//! assert_eq!(bus.read_half(0x11000A), 1); // register A
//! ```

use thiserror::Error;

use crate::memory::ADDRESS_MASK;
use crate::state::StateError;

pub mod beeper;
pub mod enumeration;
pub mod interrupts;
pub mod ram;
pub mod rng;
pub mod rom;
pub mod rtc;
pub mod timer;

pub use beeper::Beeper;
pub use enumeration::{slot_base, EnumerationBlock, ENUMERATION_BASE, ENUMERATION_SIZE, SLOT_COUNT};
pub use interrupts::{InterruptRequest, InterruptSource};
pub use ram::Ram;
pub use rng::Rng;
pub use rom::Rom;
pub use rtc::Rtc;
pub use timer::Timer;

/// The device protocol every slot peripheral implements.
///
/// Identification is surfaced verbatim through the enumeration block. The
/// five data registers default to reading 0 and ignoring writes, for devices
/// that use fewer of them.
///
/// Devices that return `true` from [`Device::is_synchronous`] are ticked on
/// every bus tick. Interrupts are level-style: [`Device::does_interrupt`] keeps
/// returning the message until [`Device::iack`] is called, so an interrupt the
/// processor could not take is offered again on the next tick.
pub trait Device {
    /// Returns the device to its power-on state.
    fn reset(&mut self);

    /// Invoked once per command, when the command register's high byte is written.
    fn send_cmd(&mut self, cmd: u16);

    fn a(&self) -> u16 {
        0
    }
    fn b(&self) -> u16 {
        0
    }
    fn c(&self) -> u16 {
        0
    }
    fn d(&self) -> u16 {
        0
    }
    fn e(&self) -> u16 {
        0
    }

    fn set_a(&mut self, _value: u16) {}
    fn set_b(&mut self, _value: u16) {}
    fn set_c(&mut self, _value: u16) {}
    fn set_d(&mut self, _value: u16) {}
    fn set_e(&mut self, _value: u16) {}

    fn dev_type(&self) -> u8;
    fn dev_subtype(&self) -> u8;
    fn dev_id(&self) -> u8;
    fn vendor_id(&self) -> u32;

    /// Whether the bus must tick this device on every bus tick.
    fn is_synchronous(&self) -> bool {
        false
    }

    /// Advances the device by `cycles` processor cycles (`delta` seconds).
    fn tick(&mut self, _cycles: u32, _delta: f64) {}

    /// Returns the message of an asserted interrupt, if any.
    fn does_interrupt(&self) -> Option<u16> {
        None
    }

    /// Acknowledges the interrupt last returned by `does_interrupt`.
    fn iack(&mut self) {}

    /// Serializes the device's internal state into an opaque blob.
    fn save_state(&self) -> Vec<u8> {
        Vec::new()
    }

    /// Restores a blob produced by [`Device::save_state`].
    fn load_state(&mut self, _state: &[u8]) -> Result<(), StateError> {
        Ok(())
    }
}

/// Returns data register `index` (0 = A .. 4 = E).
pub(crate) fn get_register(device: &dyn Device, index: usize) -> u16 {
    match index {
        0 => device.a(),
        1 => device.b(),
        2 => device.c(),
        3 => device.d(),
        4 => device.e(),
        _ => 0,
    }
}

/// Sets data register `index` (0 = A .. 4 = E).
pub(crate) fn set_register(device: &mut dyn Device, index: usize, value: u16) {
    match index {
        0 => device.set_a(value),
        1 => device.set_b(value),
        2 => device.set_c(value),
        3 => device.set_d(value),
        4 => device.set_e(value),
        _ => {}
    }
}

/// A listener bound to a fixed address range.
///
/// Offsets are relative to the start of the range, so a handler does not
/// depend on where it is mapped. Reads take `&mut self` because reading a
/// register may have side effects (the RNG draws a new number).
pub trait AddressHandler {
    /// Reads the byte at `offset` within the range.
    fn read_byte(&mut self, offset: u32) -> u8;

    /// Writes the byte at `offset` within the range.
    fn write_byte(&mut self, offset: u32, value: u8);

    /// Returns the handler to its power-on state.
    fn reset(&mut self) {}

    /// Advances the handler; called on every bus tick.
    fn tick(&mut self, _cycles: u32, _delta: f64) {}

    /// Returns the message of an asserted interrupt, if any.
    fn does_interrupt(&self) -> Option<u16> {
        None
    }

    /// Acknowledges the interrupt last returned by `does_interrupt`.
    fn iack(&mut self) {}

    /// Serializes the handler's internal state into an opaque blob.
    fn save_state(&self) -> Vec<u8> {
        Vec::new()
    }

    /// Restores a blob produced by [`AddressHandler::save_state`].
    fn load_state(&mut self, _state: &[u8]) -> Result<(), StateError> {
        Ok(())
    }
}

/// An inclusive 24-bit address range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressRange {
    start: u32,
    end: u32,
}

impl AddressRange {
    /// Creates the range `start..=end`.
    pub fn new(start: u32, end: u32) -> Result<Self, BusError> {
        if start > end || end > ADDRESS_MASK {
            return Err(BusError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a range of `len` bytes starting at `start`.
    pub fn with_len(start: u32, len: u32) -> Result<Self, BusError> {
        if len == 0 {
            return Err(BusError::InvalidRange { start, end: start });
        }
        let end = start
            .checked_add(len - 1)
            .ok_or(BusError::InvalidRange { start, end: u32::MAX })?;
        Self::new(start, end)
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn contains(&self, addr: u32) -> bool {
        self.start <= addr && addr <= self.end
    }

    pub fn overlaps(&self, other: &AddressRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Identifier of a registered address range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RangeId(pub(crate) u32);

/// Error returned when a range or device registration fails.
///
/// A failed registration leaves the address space unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// `start > end`, or the range leaves the 24-bit address space.
    #[error("invalid address range 0x{start:06X}-0x{end:06X}")]
    InvalidRange { start: u32, end: u32 },

    /// The range overlaps an already registered range.
    #[error(
        "address range 0x{start:06X}-0x{end:06X} overlaps registered range \
         0x{existing_start:06X}-0x{existing_end:06X}"
    )]
    Overlap {
        start: u32,
        end: u32,
        existing_start: u32,
        existing_end: u32,
    },

    /// The range overlaps the RAM or ROM window.
    #[error("address range 0x{start:06X}-0x{end:06X} overlaps {window}")]
    ReservedWindow {
        start: u32,
        end: u32,
        window: &'static str,
    },

    /// Slot index outside `0..32`.
    #[error("slot {0} does not exist")]
    SlotOutOfRange(usize),

    /// The slot already holds a device.
    #[error("slot {0} is already occupied")]
    SlotOccupied(usize),

    /// No factory is registered under the name.
    #[error("no device named {0:?} in the registry")]
    UnknownDevice(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_overlap() {
        let a = AddressRange::new(0x1000, 0x10FF).unwrap();
        let b = AddressRange::new(0x1080, 0x117F).unwrap();
        let c = AddressRange::new(0x1100, 0x11FF).unwrap();

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert_eq!(AddressRange::with_len(0x1000, 0x100).unwrap(), a);
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(AddressRange::new(0x20, 0x10).is_err());
        assert!(AddressRange::new(0xFF_FFF0, 0x100_0000).is_err());
        assert!(AddressRange::with_len(0x100, 0).is_err());
        assert_eq!(
            AddressRange::with_len(0x11E000, 17).unwrap().end(),
            0x11E010
        );
    }

    #[test]
    fn test_register_helpers_default_to_zero() {
        struct Bare;
        impl Device for Bare {
            fn reset(&mut self) {}
            fn send_cmd(&mut self, _cmd: u16) {}
            fn dev_type(&self) -> u8 {
                1
            }
            fn dev_subtype(&self) -> u8 {
                2
            }
            fn dev_id(&self) -> u8 {
                3
            }
            fn vendor_id(&self) -> u32 {
                4
            }
        }

        let mut dev = Bare;
        set_register(&mut dev, 2, 0x1234);
        assert_eq!(get_register(&dev, 2), 0);
        assert_eq!(dev.does_interrupt(), None);
        assert!(!dev.is_synchronous());
    }
}
