//! Fuzz target for processor step execution.
//!
//! Builds an arbitrary register file and instruction stream, then runs a few
//! instruction slots. Malformed programs must never panic.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tr3200::{FlatMemory, MemoryBus, Processor};

/// Arbitrary processor state for fuzzing
#[derive(Debug, Arbitrary)]
struct FuzzCpuState {
    /// General-purpose registers (flags and stack pointer included)
    registers: [u32; 32],
    /// Program counter
    pc: u32,
    /// Interrupt offered before the first step, if any
    interrupt: Option<u16>,
}

/// Memory regions for fuzzing
#[derive(Debug, Arbitrary)]
struct FuzzMemory {
    /// Instruction words at the PC
    program: [u32; 8],
    /// Words around the stack pointer
    stack: [u32; 8],
    /// Start of the vector table at IA
    vectors: [u32; 4],
}

/// Complete fuzz input
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    cpu_state: FuzzCpuState,
    memory: FuzzMemory,
    steps: u8,
}

fuzz_target!(|input: FuzzInput| {
    let state = &input.cpu_state;
    let mut memory = FlatMemory::new();

    memory.load_words(state.pc, &input.memory.program);
    memory.load_words(state.registers[31].wrapping_sub(16), &input.memory.stack);
    memory.load_words(state.registers[28], &input.memory.vectors);

    let mut cpu = Processor::new(memory);
    for (i, &value) in state.registers.iter().enumerate() {
        cpu.set_register(i, value);
    }
    cpu.set_pc(state.pc);
    if let Some(msg) = state.interrupt {
        let _ = cpu.send_interrupt(msg);
    }

    let mut total = 0u64;
    for _ in 0..(input.steps % 16) {
        let cycles = cpu.step();
        // No slot is free, none costs more than a divide with a big literal
        assert!((1..=28).contains(&cycles));
        total += cycles as u64;
    }
    assert_eq!(cpu.cycles(), total);

    // Memory stays addressable after arbitrary execution
    let _ = cpu.memory_mut().read_word(cpu.pc());
});
