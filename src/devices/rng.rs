//! Embedded random number generator.
//!
//! Four bytes at `0x11E040`. Reading offset 0 draws a new 32-bit number and
//! returns its low byte; offsets 1-3 return the rest of the same number, so a
//! word load sees one fresh value. Writing the four bytes (high byte last)
//! reseeds the generator.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::AddressHandler;
use crate::state::{Reader, StateError};

/// First address of the RNG registers.
pub const RNG_BASE: u32 = 0x11_E040;

/// Bytes occupied by the RNG registers.
pub const RNG_SIZE: u32 = 4;

const STATE_SIZE: usize = 8 + 32 + 16 + 4 + 4;

/// Seedable random number generator.
///
/// # Examples
///
/// ```rust
/// use tr3200::{AddressHandler, Rng};
///
/// let mut a = Rng::new(7);
/// let mut b = Rng::new(7);
/// let first: Vec<u8> = (0..4).map(|o| a.read_byte(o)).collect();
/// let again: Vec<u8> = (0..4).map(|o| b.read_byte(o)).collect();
/// assert_eq!(first, again);
/// ```
#[derive(Debug, Clone)]
pub struct Rng {
    seed: u64,
    rng: ChaCha8Rng,
    value: u32,
    seed_buf: [u8; 4],
}

impl Rng {
    /// Creates a generator with a fixed seed, for reproducible runs.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            value: 0,
            seed_buf: [0; 4],
        }
    }

    /// Creates a generator seeded from the host's entropy source.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.value = 0;
        tracing::trace!(seed, "rng reseeded");
    }
}

impl AddressHandler for Rng {
    fn read_byte(&mut self, offset: u32) -> u8 {
        if offset == 0 {
            self.value = self.rng.next_u32();
        }
        self.value.to_le_bytes().get(offset as usize).copied().unwrap_or(0)
    }

    fn write_byte(&mut self, offset: u32, value: u8) {
        if let Some(byte) = self.seed_buf.get_mut(offset as usize) {
            *byte = value;
        }
        if offset == 3 {
            self.reseed(u32::from_le_bytes(self.seed_buf) as u64);
        }
    }

    fn reset(&mut self) {
        self.reseed(self.seed);
        self.seed_buf = [0; 4];
    }

    fn save_state(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(STATE_SIZE);
        out.extend_from_slice(&self.seed.to_le_bytes());
        out.extend_from_slice(&self.rng.get_seed());
        out.extend_from_slice(&self.rng.get_word_pos().to_le_bytes());
        out.extend_from_slice(&self.value.to_le_bytes());
        out.extend_from_slice(&self.seed_buf);
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
        let seed = reader.u64()?;
        let mut key = [0u8; 32];
        key.copy_from_slice(reader.take(32)?);
        let mut pos = [0u8; 16];
        pos.copy_from_slice(reader.take(16)?);
        let value = reader.u32()?;
        let mut seed_buf = [0u8; 4];
        seed_buf.copy_from_slice(reader.take(4)?);

        self.seed = seed;
        self.rng = ChaCha8Rng::from_seed(key);
        self.rng.set_word_pos(u128::from_le_bytes(pos));
        self.value = value;
        self.seed_buf = seed_buf;
        Ok(())
    }
}
