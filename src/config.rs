//! Machine configuration.

use std::sync::Arc;

use thiserror::Error;

use crate::devices::ram::MAX_RAM_SIZE;
use crate::devices::rom::ROM_WINDOW_SIZE;
use crate::devices::BusError;

/// Default RAM size (128 KiB).
pub const DEFAULT_RAM_SIZE: usize = 128 * 1024;

/// Default processor clock (100 kHz).
pub const DEFAULT_CLOCK_HZ: u32 = 100_000;

/// Errors reported for an invalid [`ComputerConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("RAM size {0} is outside 1..={max}", max = MAX_RAM_SIZE)]
    RamSize(usize),

    #[error("ROM image is {0} bytes, the window holds {max}", max = ROM_WINDOW_SIZE)]
    RomTooLarge(usize),

    #[error("clock frequency must be non-zero")]
    ZeroClock,

    #[error("embedded peripheral could not be mapped: {0}")]
    Bus(#[from] BusError),
}

/// Machine configuration.
///
/// # Examples
///
/// ```
/// use tr3200::ComputerConfig;
///
/// let config = ComputerConfig::default()
///     .with_ram_size(64 * 1024)
///     .with_rom(vec![0u8; 16])
///     .with_rng_seed(42);
///
/// assert!(config.validate().is_ok());
/// assert!(ComputerConfig::default().with_ram_size(0).validate().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ComputerConfig {
    /// RAM size in bytes, at most 1 MiB.
    pub ram_size: usize,

    /// ROM image mapped at 0x100000, at most 64 KiB.
    pub rom: Arc<[u8]>,

    /// Processor clock; converts cycles to the seconds passed to device ticks.
    pub clock_hz: u32,

    /// Fixed RNG seed, or `None` to seed from host entropy.
    pub rng_seed: Option<u64>,

    /// Value the real-time clock starts from, in seconds.
    pub rtc_epoch: u64,
}

impl Default for ComputerConfig {
    fn default() -> Self {
        Self {
            ram_size: DEFAULT_RAM_SIZE,
            rom: Arc::from(Vec::<u8>::new()),
            clock_hz: DEFAULT_CLOCK_HZ,
            rng_seed: None,
            rtc_epoch: 0,
        }
    }
}

impl ComputerConfig {
    pub fn with_ram_size(mut self, ram_size: usize) -> Self {
        self.ram_size = ram_size;
        self
    }

    pub fn with_rom(mut self, rom: impl Into<Arc<[u8]>>) -> Self {
        self.rom = rom.into();
        self
    }

    pub fn with_clock_hz(mut self, clock_hz: u32) -> Self {
        self.clock_hz = clock_hz;
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_rtc_epoch(mut self, seconds: u64) -> Self {
        self.rtc_epoch = seconds;
        self
    }

    /// Checks the configuration without building a machine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ram_size == 0 || self.ram_size > MAX_RAM_SIZE {
            return Err(ConfigError::RamSize(self.ram_size));
        }
        if self.rom.len() > ROM_WINDOW_SIZE {
            return Err(ConfigError::RomTooLarge(self.rom.len()));
        }
        if self.clock_hz == 0 {
            return Err(ConfigError::ZeroClock);
        }
        Ok(())
    }
}
