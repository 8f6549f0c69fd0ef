//! Tests for processor and machine snapshots.
//!
//! Tests cover:
//! - Restoring a processor state mid-program onto a fresh processor
//! - Internal fields (skip, sleep, latch, tick debit) surviving a round trip
//! - Rejection of malformed buffers
//! - Whole-machine snapshots including peripheral state
//! - Half-written enumeration block registers surviving a snapshot
//! - A rejected peripheral blob leaving the machine untouched

use std::cell::Cell;
use std::rc::Rc;

use tr3200::devices::timer::TIMER_BASE;
use tr3200::encode::{self, Arg};
use tr3200::registers::{flag, FLAGS, SP};
use tr3200::state::PROCESSOR_STATE_SIZE;
use tr3200::{
    opcodes, Computer, ComputerConfig, Device, FlatMemory, MemoryBus, Processor, ProcessorState,
    Snapshot, StateError, RESET_VECTOR,
};

const SLOT0_CMD_LOW: u32 = 0x11_0008;
const SLOT0_CMD_HIGH: u32 = 0x11_0009;
const SLOT0_A_LOW: u32 = 0x11_000A;
const SLOT0_A_HIGH: u32 = 0x11_000B;

/// Device whose only state is register A; its blob must be exactly 2 bytes.
#[derive(Default)]
struct Latch {
    value: Rc<Cell<u16>>,
    last_cmd: Rc<Cell<u16>>,
}

impl Device for Latch {
    fn reset(&mut self) {
        self.value.set(0);
    }

    fn send_cmd(&mut self, cmd: u16) {
        self.last_cmd.set(cmd);
    }

    fn a(&self) -> u16 {
        self.value.get()
    }

    fn set_a(&mut self, value: u16) {
        self.value.set(value);
    }

    fn dev_type(&self) -> u8 {
        0x0E
    }
    fn dev_subtype(&self) -> u8 {
        0x00
    }
    fn dev_id(&self) -> u8 {
        0x01
    }
    fn vendor_id(&self) -> u32 {
        0
    }

    fn save_state(&self) -> Vec<u8> {
        self.value.get().to_le_bytes().to_vec()
    }

    fn load_state(&mut self, state: &[u8]) -> Result<(), StateError> {
        let bytes: [u8; 2] = state.try_into().map_err(|_| StateError::SizeMismatch {
            expected: 2,
            actual: state.len(),
        })?;
        self.value.set(u16::from_le_bytes(bytes));
        Ok(())
    }
}

/// A machine with a `Latch` in slot 0; returns its value and command cells.
fn machine_with_latch() -> (Computer, Rc<Cell<u16>>, Rc<Cell<u16>>) {
    let mut computer =
        Computer::new(ComputerConfig::default().with_rng_seed(9)).unwrap();
    let latch = Latch::default();
    let (value, cmd) = (Rc::clone(&latch.value), Rc::clone(&latch.last_cmd));
    computer.add_device(0, Box::new(latch)).unwrap();
    (computer, value, cmd)
}

fn program() -> Vec<u32> {
    let mut program = encode::two(opcodes::MOV, 1, Arg::Lit(3));
    program.extend(encode::three(opcodes::MUL, 2, 1, Arg::Lit(7)));
    program.extend(encode::two(opcodes::IFEQ, 2, Arg::Lit(0)));
    program.extend(encode::two(opcodes::MOV, 3, Arg::Big(0xBAD)));
    program.extend(encode::one(opcodes::PUSH, Arg::Reg(2)));
    program.extend(encode::three(opcodes::ADD, 1, 1, Arg::Reg(2)));
    program
}

fn setup_cpu() -> Processor<FlatMemory> {
    let mut memory = FlatMemory::new();
    memory.load_words(RESET_VECTOR, &program());
    let mut cpu = Processor::new(memory);
    cpu.set_register(SP, 0x9000);
    cpu
}

#[test]
fn test_restored_processor_continues_identically() {
    let mut original = setup_cpu();
    original.step();
    original.step();
    original.step(); // skip armed

    let saved = ProcessorState::from_bytes(&original.state().to_bytes()).unwrap();
    assert!(saved.skipping);

    let mut copy = setup_cpu();
    copy.set_register(SP, 0);
    copy.set_state(&saved);
    assert_eq!(copy.sp(), 0x9000);

    for _ in 0..3 {
        assert_eq!(original.step(), copy.step());
        assert_eq!(original.state(), copy.state());
    }
    assert_eq!(copy.register(1), 24);
    assert_eq!(copy.register(3), 0);
}

#[test]
fn test_internal_fields_round_trip() {
    let mut cpu = setup_cpu();
    cpu.set_register(FLAGS, flag::EI);
    cpu.tick(2);
    cpu.send_interrupt(0x0102);

    let state = cpu.state();
    assert_eq!(state.wait_cycles, 1);
    assert!(state.interrupt_pending);
    assert_eq!(state.interrupt_msg, 0x0102);

    let bytes = state.to_bytes();
    assert_eq!(bytes.len(), PROCESSOR_STATE_SIZE);
    assert_eq!(ProcessorState::from_bytes(&bytes).unwrap(), state);
}

#[test]
fn test_sleeping_state_round_trip() {
    let mut memory = FlatMemory::new();
    memory.load_words(RESET_VECTOR, &encode::zero(opcodes::SLEEP));
    let mut cpu = Processor::new(memory);
    cpu.step();

    let state = ProcessorState::from_bytes(&cpu.state().to_bytes()).unwrap();
    assert!(state.sleeping);
    assert_eq!(state.pc, RESET_VECTOR + 4);
}

#[test]
fn test_wrong_size_rejected() {
    let bytes = setup_cpu().state().to_bytes();

    assert_eq!(
        ProcessorState::from_bytes(&bytes[1..]),
        Err(StateError::SizeMismatch {
            expected: PROCESSOR_STATE_SIZE,
            actual: PROCESSOR_STATE_SIZE - 1,
        })
    );
}

#[test]
fn test_truncated_snapshot_rejected() {
    let config = ComputerConfig::default()
        .with_ram_size(1024)
        .with_rng_seed(5);
    let computer = Computer::new(config).unwrap();
    let bytes = computer.save_snapshot().to_bytes();

    assert!(Snapshot::from_bytes(&bytes).is_ok());
    assert!(matches!(
        Snapshot::from_bytes(&bytes[..bytes.len() - 1]),
        Err(StateError::Truncated { .. })
    ));
    assert!(Snapshot::from_bytes(&bytes[..10]).is_err());
}

#[test]
fn test_machine_snapshot_restores_peripherals() {
    let config = ComputerConfig::default()
        .with_rom(encode::to_bytes(&encode::zero(opcodes::SLEEP)))
        .with_rng_seed(11);
    let mut computer = Computer::new(config).unwrap();
    computer.bus_mut().write_word(TIMER_BASE, 1000);
    computer.bus_mut().write_byte(TIMER_BASE + 0x10, 0b01);
    computer.tick(100);

    let snapshot = computer.save_snapshot();
    let count = computer.bus_mut().read_word(TIMER_BASE + 0x08);
    computer.tick(100);
    assert_ne!(computer.bus_mut().read_word(TIMER_BASE + 0x08), count);

    computer.load_snapshot(&snapshot).unwrap();
    assert_eq!(computer.bus_mut().read_word(TIMER_BASE + 0x08), count);
    assert_eq!(computer.processor().cycles(), 100);
}

#[test]
fn test_snapshot_with_wrong_ram_size_rejected() {
    let small = Computer::new(ComputerConfig::default().with_ram_size(1024).with_rng_seed(1))
        .unwrap();
    let mut large =
        Computer::new(ComputerConfig::default().with_ram_size(2048).with_rng_seed(1)).unwrap();
    large.bus_mut().write_byte(0, 0x42);

    let result = large.load_snapshot(&small.save_snapshot());
    assert_eq!(
        result,
        Err(StateError::RamSize {
            expected: 2048,
            actual: 1024
        })
    );
    assert_eq!(large.bus_mut().read_byte(0), 0x42);
}

// ========== Device Slots ==========

#[test]
fn test_half_written_registers_survive_snapshot() {
    let (mut original, _, original_cmd) = machine_with_latch();
    original.bus_mut().write_byte(SLOT0_CMD_LOW, 0x34);
    original.bus_mut().write_byte(SLOT0_A_LOW, 0xCD);

    let snapshot = Snapshot::from_bytes(&original.save_snapshot().to_bytes()).unwrap();
    let (mut restored, restored_value, restored_cmd) = machine_with_latch();
    restored.load_snapshot(&snapshot).unwrap();

    for computer in [&mut original, &mut restored] {
        let bus = computer.bus_mut();
        bus.write_byte(SLOT0_CMD_HIGH, 0x12);
        bus.write_byte(SLOT0_A_HIGH, 0xAB);
    }
    assert_eq!(original_cmd.get(), 0x1234);
    assert_eq!(restored_cmd.get(), 0x1234);
    assert_eq!(restored_value.get(), 0xABCD);
}

#[test]
fn test_rejected_device_blob_leaves_machine_untouched() {
    let (mut computer, first_value, first_cmd) = machine_with_latch();
    let second = Latch::default();
    computer.add_device(1, Box::new(second)).unwrap();

    let bus = computer.bus_mut();
    bus.write_word(TIMER_BASE, 100);
    bus.write_byte(SLOT0_CMD_LOW, 0x34);
    bus.write_word(0x40, 0xAAAA);
    first_value.set(0x1111);

    // Slot 0 and the timer would load fine; slot 1 refuses its blob.
    let mut snapshot = computer.save_snapshot();
    snapshot.slots[1].device = vec![0; 5];

    let bus = computer.bus_mut();
    bus.write_word(TIMER_BASE, 7);
    bus.write_byte(SLOT0_CMD_LOW, 0x56);
    bus.write_word(0x40, 0xBBBB);
    first_value.set(0x2222);

    assert_eq!(
        computer.load_snapshot(&snapshot),
        Err(StateError::SizeMismatch {
            expected: 2,
            actual: 5
        })
    );

    let bus = computer.bus_mut();
    assert_eq!(bus.read_word(TIMER_BASE), 7);
    assert_eq!(bus.read_word(0x40), 0xBBBB);
    assert_eq!(first_value.get(), 0x2222);
    bus.write_byte(SLOT0_CMD_HIGH, 0x12);
    assert_eq!(first_cmd.get(), 0x1256);
}
