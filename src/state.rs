//! # Execution State Snapshots
//!
//! [`ProcessorState`] is the fixed-size record of everything the processor
//! needs to resume execution. [`Snapshot`] bundles it with the RAM image and
//! the opaque blobs produced by peripherals into one flat byte layout.
//!
//! No versioning is done beyond size checks: a snapshot can only be loaded
//! into a machine with the same RAM size and peripheral set.

use thiserror::Error;

use crate::devices::enumeration::BLOCK_STATE_SIZE;
use crate::registers::REGISTER_COUNT;

/// Errors reported while decoding or applying saved state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// A fixed-size record had the wrong length.
    #[error("state record is {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    /// The buffer ended in the middle of a record.
    #[error("snapshot truncated at byte {offset}")]
    Truncated { offset: usize },

    /// The RAM image does not match the machine's RAM size.
    #[error("snapshot RAM is {actual} bytes, machine has {expected}")]
    RamSize { expected: usize, actual: usize },

    /// A blob belongs to a slot or handler that does not exist here.
    #[error("no peripheral to restore state for {0}")]
    UnknownTarget(String),
}

/// Size in bytes of an encoded [`ProcessorState`].
pub const PROCESSOR_STATE_SIZE: usize = REGISTER_COUNT * 4 + 4 + 4 + 8 + 2 + 1;

const PENDING_BIT: u8 = 1 << 0;
const SKIPPING_BIT: u8 = 1 << 1;
const SLEEPING_BIT: u8 = 1 << 2;

/// Complete execution state of a processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorState {
    pub registers: [u32; REGISTER_COUNT],
    pub pc: u32,
    pub wait_cycles: u32,
    pub cycles: u64,
    pub interrupt_msg: u16,
    pub interrupt_pending: bool,
    pub skipping: bool,
    pub sleeping: bool,
}

impl ProcessorState {
    /// Encodes the record as little-endian bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PROCESSOR_STATE_SIZE);
        for r in &self.registers {
            out.extend_from_slice(&r.to_le_bytes());
        }
        out.extend_from_slice(&self.pc.to_le_bytes());
        out.extend_from_slice(&self.wait_cycles.to_le_bytes());
        out.extend_from_slice(&self.cycles.to_le_bytes());
        out.extend_from_slice(&self.interrupt_msg.to_le_bytes());

        let mut bits = 0;
        if self.interrupt_pending {
            bits |= PENDING_BIT;
        }
        if self.skipping {
            bits |= SKIPPING_BIT;
        }
        if self.sleeping {
            bits |= SLEEPING_BIT;
        }
        out.push(bits);
        out
    }

    /// Decodes a record produced by [`ProcessorState::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StateError> {
        if bytes.len() != PROCESSOR_STATE_SIZE {
            return Err(StateError::SizeMismatch {
                expected: PROCESSOR_STATE_SIZE,
                actual: bytes.len(),
            });
        }

        let mut reader = Reader::new(bytes);
        let mut registers = [0; REGISTER_COUNT];
        for r in registers.iter_mut() {
            *r = reader.u32()?;
        }
        let pc = reader.u32()?;
        let wait_cycles = reader.u32()?;
        let cycles = reader.u64()?;
        let interrupt_msg = reader.u16()?;
        let bits = reader.u8()?;

        Ok(Self {
            registers,
            pc,
            wait_cycles,
            cycles,
            interrupt_msg,
            interrupt_pending: bits & PENDING_BIT != 0,
            skipping: bits & SKIPPING_BIT != 0,
            sleeping: bits & SLEEPING_BIT != 0,
        })
    }
}

/// Saved state of one occupied device slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotState {
    pub slot: u8,
    /// Enumeration block write buffers (command low byte, A-E low bytes).
    pub block: [u8; BLOCK_STATE_SIZE],
    /// Opaque blob from the device.
    pub device: Vec<u8>,
}

/// Whole-machine snapshot.
///
/// Layout: processor record, RAM length (u32) and image, handler blob count
/// (u32) and blobs, slot count (u32) and per slot its index (u8), block
/// buffers and blob. Every blob is prefixed by its u32 length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub processor: ProcessorState,
    pub ram: Vec<u8>,
    /// Embedded peripheral blobs, in registration order.
    pub handlers: Vec<Vec<u8>>,
    /// Occupied slots, ascending.
    pub slots: Vec<SlotState>,
}

impl Snapshot {
    /// Encodes the snapshot into one flat buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.processor.to_bytes();
        put_blob(&mut out, &self.ram);
        put_count(&mut out, self.handlers.len());
        for blob in &self.handlers {
            put_blob(&mut out, blob);
        }
        put_count(&mut out, self.slots.len());
        for slot in &self.slots {
            out.push(slot.slot);
            out.extend_from_slice(&slot.block);
            put_blob(&mut out, &slot.device);
        }
        out
    }

    /// Decodes a buffer produced by [`Snapshot::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StateError> {
        if bytes.len() < PROCESSOR_STATE_SIZE {
            return Err(StateError::Truncated {
                offset: bytes.len(),
            });
        }
        let processor = ProcessorState::from_bytes(&bytes[..PROCESSOR_STATE_SIZE])?;

        let mut reader = Reader::new(bytes);
        reader.pos = PROCESSOR_STATE_SIZE;
        let ram = reader.blob()?.to_vec();

        // Counts are not trusted for preallocation; a bad one runs out of
        // bytes instead.
        let handler_count = reader.u32()?;
        let mut handlers = Vec::new();
        for _ in 0..handler_count {
            handlers.push(reader.blob()?.to_vec());
        }

        let slot_count = reader.u32()?;
        let mut slots = Vec::new();
        for _ in 0..slot_count {
            let slot = reader.u8()?;
            let mut block = [0; BLOCK_STATE_SIZE];
            block.copy_from_slice(reader.take(BLOCK_STATE_SIZE)?);
            let device = reader.blob()?.to_vec();
            slots.push(SlotState {
                slot,
                block,
                device,
            });
        }

        Ok(Self {
            processor,
            ram,
            handlers,
            slots,
        })
    }
}

fn put_count(out: &mut Vec<u8>, count: usize) {
    out.extend_from_slice(&(count as u32).to_le_bytes());
}

fn put_blob(out: &mut Vec<u8>, blob: &[u8]) {
    out.extend_from_slice(&(blob.len() as u32).to_le_bytes());
    out.extend_from_slice(blob);
}

/// Little-endian cursor over a state buffer.
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8], StateError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(StateError::Truncated { offset: self.pos })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, StateError> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u16(&mut self) -> Result<u16, StateError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub(crate) fn u32(&mut self) -> Result<u32, StateError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn u64(&mut self) -> Result<u64, StateError> {
        let lo = self.u32()? as u64;
        let hi = self.u32()? as u64;
        Ok((hi << 32) | lo)
    }

    fn blob(&mut self) -> Result<&'a [u8], StateError> {
        let len = self.u32()? as usize;
        self.take(len)
    }
}
