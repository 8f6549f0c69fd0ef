//! ROM window.
//!
//! The ROM image is supplied by the host and shared, never copied into the
//! machine. It is mapped read-only at [`ROM_BASE`]; writes to the window are
//! silently dropped and bytes past the end of a short image read as 0.

use std::sync::Arc;

/// First address of the ROM window (also the reset vector).
pub const ROM_BASE: u32 = 0x10_0000;

/// Size of the ROM window and largest accepted image.
pub const ROM_WINDOW_SIZE: usize = 64 * 1024;

/// Read-only ROM image.
///
/// # Examples
///
/// ```rust
/// use tr3200::Rom;
///
/// let rom = Rom::new(vec![0x01, 0x02, 0x03]);
///
/// assert_eq!(rom.read(0x10_0000), 0x01);
/// assert_eq!(rom.read(0x10_0003), 0x00); // past the image
/// assert!(rom.contains(0x10_FFFF));
/// assert!(!rom.contains(0x11_0000));
/// ```
#[derive(Debug, Clone)]
pub struct Rom {
    image: Arc<[u8]>,
}

impl Rom {
    /// Wraps a ROM image. Bytes beyond the 64 KiB window are unreachable.
    pub fn new(image: impl Into<Arc<[u8]>>) -> Self {
        Self {
            image: image.into(),
        }
    }

    /// A ROM window that reads all zeros.
    pub fn empty() -> Self {
        Self::new(Vec::<u8>::new())
    }

    /// Returns true if `addr` falls inside the ROM window.
    pub fn contains(&self, addr: u32) -> bool {
        (ROM_BASE..ROM_BASE + ROM_WINDOW_SIZE as u32).contains(&addr)
    }

    /// Reads the byte at absolute address `addr` (must be inside the window).
    pub fn read(&self, addr: u32) -> u8 {
        let offset = addr.wrapping_sub(ROM_BASE) as usize;
        self.image.get(offset).copied().unwrap_or(0)
    }

    /// The shared image.
    pub fn image(&self) -> &Arc<[u8]> {
        &self.image
    }
}

impl Default for Rom {
    fn default() -> Self {
        Self::empty()
    }
}
