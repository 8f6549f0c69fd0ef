//! # TR3200 Virtual Computer
//!
//! A deterministic, cycle-counted emulator of a small 32-bit computer: the
//! TR3200 processor core plus a memory-mapped bus with RAM, ROM, embedded
//! peripherals and 32 enumerable device slots.
//!
//! ## Quick Start
//!
//! ```rust
//! use tr3200::encode::{self, Arg};
//! use tr3200::{opcodes, Computer, ComputerConfig, MemoryBus};
//!
//! // MOV r3, 0x1234 (big literal); STORE [0x2000], r3; LOAD r4, [0x2000]
//! let mut program = encode::two(opcodes::MOV, 3, Arg::Big(0x1234));
//! program.extend(encode::two(opcodes::STORE2, 3, Arg::Lit(0x2000)));
//! program.extend(encode::two(opcodes::LOAD2, 4, Arg::Lit(0x2000)));
//!
//! let config = ComputerConfig::default().with_rom(encode::to_bytes(&program));
//! let mut computer = Computer::new(config).unwrap();
//!
//! let cycles: u32 = (0..3).map(|_| computer.step()).sum();
//! assert_eq!(cycles, 4 + 3 + 3);
//! assert_eq!(computer.processor().register(4), 0x1234);
//! assert_eq!(computer.bus_mut().read_word(0x2000), 0x1234);
//! ```
//!
//! ## Architecture
//!
//! - **Processor**: fetch/decode/execute over any [`MemoryBus`]; `step()` runs
//!   one instruction, `tick(n)` runs exactly `n` cycles
//! - **AddressSpace**: RAM, the ROM window and registered address ranges
//! - **Devices**: the [`Device`] protocol fronted by per-slot
//!   [`EnumerationBlock`]s, and raw [`AddressHandler`]s for embedded peripherals
//! - **Computer**: wires it all together and routes interrupts
//!
//! Emulation never fails: undefined instructions, unmapped addresses,
//! division by zero and refused interrupts all degrade to defined behavior.
//! Only setup (configuration, device registration, snapshot loading) returns
//! errors.
//!
//! ## Modules
//!
//! - `cpu` - Processor state and execution loop
//! - `decode` / `encode` - Instruction word formats
//! - `opcodes` - Opcode constants and metadata table
//! - `registers` - Register roles and flag bits
//! - `memory` - MemoryBus trait and FlatMemory
//! - `bus` - AddressSpace and interrupt polling
//! - `devices` - Device protocol, enumeration blocks, embedded peripherals
//! - `computer` / `config` / `registry` - Machine assembly
//! - `state` - Snapshots

pub mod bus;
pub mod computer;
pub mod config;
pub mod cpu;
pub mod decode;
pub mod devices;
pub mod encode;
pub mod memory;
pub mod opcodes;
pub mod registers;
pub mod registry;
pub mod state;

// Internal instruction implementations (not part of public API)
mod instructions;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export public API
pub use bus::AddressSpace;
pub use computer::Computer;
pub use config::{ComputerConfig, ConfigError};
pub use cpu::{Processor, RESET_VECTOR};
pub use decode::{Decoded, Format, Operand};
pub use devices::{
    AddressHandler, AddressRange, Beeper, BusError, Device, EnumerationBlock, InterruptRequest,
    InterruptSource, Ram, RangeId, Rng, Rom, Rtc, Timer,
};
pub use memory::{FlatMemory, MemoryBus};
pub use opcodes::{OpcodeMetadata, OPCODE_TABLE};
pub use registry::DeviceRegistry;
pub use state::{ProcessorState, SlotState, Snapshot, StateError};
