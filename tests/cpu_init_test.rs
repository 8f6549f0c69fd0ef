//! Tests for processor construction and reset.
//!
//! Tests cover:
//! - Power-on register, flag and PC values
//! - Reset clearing registers, skip, sleep and the interrupt latch
//! - Reset leaving memory untouched

use tr3200::encode::{self, Arg};
use tr3200::registers::{flag, FLAGS, SP};
use tr3200::{opcodes, FlatMemory, MemoryBus, Processor, RESET_VECTOR};

fn setup_cpu(program: &[u32]) -> Processor<FlatMemory> {
    let mut memory = FlatMemory::new();
    memory.load_words(RESET_VECTOR, program);
    Processor::new(memory)
}

#[test]
fn test_power_on_state() {
    let cpu = setup_cpu(&[]);

    assert_eq!(cpu.pc(), 0x0010_0000);
    assert!(cpu.registers().iter().all(|&r| r == 0));
    assert_eq!(cpu.flags(), 0);
    assert_eq!(cpu.sp(), 0);
    assert_eq!(cpu.cycles(), 0);
    assert_eq!(cpu.wait_cycles(), 0);
    assert!(!cpu.is_sleeping());
    assert!(!cpu.is_skipping());
    assert_eq!(cpu.pending_interrupt(), None);
}

#[test]
fn test_reset_clears_execution_state() {
    let mut program = encode::two(opcodes::IFEQ, 1, Arg::Lit(1));
    program.extend(encode::zero(opcodes::SLEEP));
    let mut cpu = setup_cpu(&program);

    cpu.set_register(5, 0xDEAD);
    cpu.set_register(SP, 0x8000);
    cpu.set_register(FLAGS, flag::EI);
    assert!(cpu.send_interrupt(7));
    cpu.step();
    assert!(cpu.is_skipping());

    cpu.reset();

    assert_eq!(cpu.pc(), RESET_VECTOR);
    assert_eq!(cpu.register(5), 0);
    assert_eq!(cpu.sp(), 0);
    assert_eq!(cpu.flags(), 0);
    assert!(!cpu.is_skipping());
    assert_eq!(cpu.pending_interrupt(), None);
}

#[test]
fn test_reset_wakes_sleeping_processor() {
    let mut cpu = setup_cpu(&encode::zero(opcodes::SLEEP));
    cpu.step();
    assert!(cpu.is_sleeping());

    cpu.reset();
    assert!(!cpu.is_sleeping());
}

#[test]
fn test_reset_preserves_memory() {
    let mut cpu = setup_cpu(&[]);
    cpu.memory_mut().write_word(0x1000, 0xCAFE_BABE);

    cpu.reset();
    assert_eq!(cpu.memory_mut().read_word(0x1000), 0xCAFE_BABE);
}

#[test]
fn test_register_index_wraps() {
    let mut cpu = setup_cpu(&[]);
    cpu.set_register(33, 9);
    assert_eq!(cpu.register(1), 9);
}
