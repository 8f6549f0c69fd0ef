//! # Memory Bus Abstraction
//!
//! This module provides the `MemoryBus` trait that decouples the processor from
//! specific memory implementations:
//!
//! - Flat RAM covering the whole address space (`FlatMemory`, for tests and tools)
//! - The full machine address space with RAM, ROM and device ranges
//!   ([`AddressSpace`](crate::AddressSpace))
//!
//! ## Design Principles
//!
//! - Addresses are masked to the 24-bit architectural width before use
//! - No bus errors: unmapped reads return 0, unmapped writes are dropped
//! - Half-words and words are little-endian
//! - Reads take `&mut self` because device registers may change when read

/// Mask applied to every address before resolution.
pub const ADDRESS_MASK: u32 = 0x00FF_FFFF;

/// Size of the architectural address space in bytes.
pub const ADDRESS_SPACE_SIZE: usize = 1 << 24;

/// Memory bus trait for the processor to read/write memory.
///
/// Implementors only have to provide byte access. Half-word and word access
/// default to composing bytes in little-endian order, one byte address at a
/// time, so accesses that straddle a region boundary still resolve each byte
/// on its own. Implementations may override them with faster paths as long as
/// the result is identical.
///
/// # Examples
///
/// ```
/// use tr3200::{FlatMemory, MemoryBus};
///
/// let mut mem = FlatMemory::new();
/// mem.write_word(0x1000, 0xDEAD_BEEF);
///
/// assert_eq!(mem.read_byte(0x1000), 0xEF);
/// assert_eq!(mem.read_half(0x1002), 0xDEAD);
/// assert_eq!(mem.read_word(0x1000), 0xDEAD_BEEF);
/// ```
pub trait MemoryBus {
    /// Reads a byte. Must never panic.
    fn read_byte(&mut self, addr: u32) -> u8;

    /// Writes a byte. Must never panic; read-only or unmapped targets ignore it.
    fn write_byte(&mut self, addr: u32, value: u8);

    /// Reads a little-endian half-word.
    fn read_half(&mut self, addr: u32) -> u16 {
        let lo = self.read_byte(addr) as u16;
        let hi = self.read_byte(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Reads a little-endian word.
    fn read_word(&mut self, addr: u32) -> u32 {
        let mut bytes = [0u8; 4];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = self.read_byte(addr.wrapping_add(i as u32));
        }
        u32::from_le_bytes(bytes)
    }

    /// Writes a little-endian half-word.
    fn write_half(&mut self, addr: u32, value: u16) {
        self.write_byte(addr, value as u8);
        self.write_byte(addr.wrapping_add(1), (value >> 8) as u8);
    }

    /// Writes a little-endian word.
    fn write_word(&mut self, addr: u32, value: u32) {
        for (i, byte) in value.to_le_bytes().into_iter().enumerate() {
            self.write_byte(addr.wrapping_add(i as u32), byte);
        }
    }
}

/// RAM covering the whole 24-bit address space.
///
/// Useful for:
/// - Processor unit tests that do not need devices or ROM
/// - Tools that only run code
///
/// # Examples
///
/// ```
/// use tr3200::{FlatMemory, MemoryBus, Processor};
///
/// let mut memory = FlatMemory::new();
/// memory.load(0x100000, &[0x00, 0x00, 0x00, 0x00]); // SLEEP
///
/// let mut cpu = Processor::new(memory);
/// assert_eq!(cpu.pc(), 0x100000);
/// assert_eq!(cpu.step(), 3);
/// assert!(cpu.is_sleeping());
/// ```
pub struct FlatMemory {
    data: Vec<u8>,
}

impl FlatMemory {
    /// Creates a FlatMemory instance with all bytes initialized to zero.
    pub fn new() -> Self {
        Self {
            data: vec![0; ADDRESS_SPACE_SIZE],
        }
    }

    /// Copies `bytes` into memory starting at `addr`, wrapping at the top.
    pub fn load(&mut self, addr: u32, bytes: &[u8]) {
        for (i, &byte) in bytes.iter().enumerate() {
            self.write_byte(addr.wrapping_add(i as u32), byte);
        }
    }

    /// Copies encoded instruction words into memory starting at `addr`.
    pub fn load_words(&mut self, addr: u32, words: &[u32]) {
        for (i, &word) in words.iter().enumerate() {
            self.write_word(addr.wrapping_add(4 * i as u32), word);
        }
    }
}

impl Default for FlatMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus for FlatMemory {
    fn read_byte(&mut self, addr: u32) -> u8 {
        self.data[(addr & ADDRESS_MASK) as usize]
    }

    fn write_byte(&mut self, addr: u32, value: u8) {
        self.data[(addr & ADDRESS_MASK) as usize] = value;
    }
}
