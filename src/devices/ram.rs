//! RAM storage.
//!
//! The machine's RAM starts at address 0 and is owned exclusively by the
//! [`AddressSpace`](crate::AddressSpace). Devices never get a direct reference
//! to it.

/// Largest RAM the memory map leaves room for (up to the ROM window).
pub const MAX_RAM_SIZE: usize = 1024 * 1024;

/// Zero-initialized RAM buffer.
///
/// # Examples
///
/// ```rust
/// use tr3200::Ram;
///
/// let mut ram = Ram::new(256);
/// ram.write(0x10, 0x42);
/// assert_eq!(ram.read(0x10), 0x42);
/// assert_eq!(ram.len(), 256);
/// ```
#[derive(Debug, Clone)]
pub struct Ram {
    data: Vec<u8>,
}

impl Ram {
    /// Creates `size` bytes of zeroed RAM, clamped to [`MAX_RAM_SIZE`].
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size.min(MAX_RAM_SIZE)],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns true if `addr` falls inside the RAM window.
    pub fn contains(&self, addr: u32) -> bool {
        (addr as usize) < self.data.len()
    }

    /// Reads a byte; out-of-range reads return 0.
    pub fn read(&self, addr: u32) -> u8 {
        self.data.get(addr as usize).copied().unwrap_or(0)
    }

    /// Writes a byte; out-of-range writes are dropped.
    pub fn write(&mut self, addr: u32, value: u8) {
        if let Some(byte) = self.data.get_mut(addr as usize) {
            *byte = value;
        }
    }

    /// Copies `bytes` starting at `addr`, dropping whatever does not fit.
    pub fn load(&mut self, addr: u32, bytes: &[u8]) {
        let start = (addr as usize).min(self.data.len());
        let end = start.saturating_add(bytes.len()).min(self.data.len());
        self.data[start..end].copy_from_slice(&bytes[..end - start]);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}
