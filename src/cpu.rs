//! # Processor State and Execution
//!
//! This module contains the `Processor` struct representing the TR3200 core and
//! its fetch-decode-execute loop.
//!
//! ## Processor State
//!
//! The processor maintains:
//! - **Registers**: 32 general-purpose words; r27-r31 carry conventional roles
//!   (see [`registers`](crate::registers))
//! - **Program counter** (PC): address of the next instruction
//! - **Skip flag**: set while a failed conditional suppresses the next instruction
//! - **Sleep flag**: set by SLEEP, cleared when an interrupt is serviced
//! - **Interrupt latch**: at most one accepted interrupt message in flight
//! - **Wait cycles**: the outstanding debit of the instruction `tick` is paying off
//!
//! ## Execution Model
//!
//! - `step()`: execute one instruction slot and return its cycle cost
//! - `tick(n)`: advance exactly `n` clock cycles, decoding a new instruction only
//!   when the previous one has been fully paid for

use crate::decode::Decoded;
use crate::instructions::{self, branches};
use crate::opcodes::{SKIPPED_CYCLES, SLEEP_CYCLES};
use crate::registers::{flag, FLAGS, IA, REGISTER_COUNT, SP};
use crate::state::ProcessorState;
use crate::MemoryBus;

/// Address the program counter is loaded with on reset (start of ROM).
pub const RESET_VECTOR: u32 = 0x0010_0000;

/// TR3200 processor state and execution context.
///
/// The processor is generic over the memory implementation via the
/// `MemoryBus` trait and owns its bus: every fetch, load, store and stack
/// access goes through it.
///
/// # Examples
///
/// ```
/// use tr3200::encode::{self, Arg};
/// use tr3200::{opcodes, FlatMemory, Processor};
///
/// let mut memory = FlatMemory::new();
/// let program = encode::two(opcodes::MOV, 1, Arg::Lit(42));
/// memory.load_words(0x100000, &program);
///
/// let mut cpu = Processor::new(memory);
/// assert_eq!(cpu.step(), 3);
/// assert_eq!(cpu.register(1), 42);
/// assert_eq!(cpu.pc(), 0x100004);
/// ```
pub struct Processor<M: MemoryBus> {
    /// General-purpose registers
    pub(crate) r: [u32; REGISTER_COUNT],

    /// Program counter (address of next instruction)
    pub(crate) pc: u32,

    /// Next instruction is decoded for length only
    pub(crate) skipping: bool,

    /// Waiting for an interrupt
    pub(crate) sleeping: bool,

    /// An accepted interrupt waits to be serviced
    pub(crate) interrupt_pending: bool,

    /// Message of the latched interrupt
    pub(crate) interrupt_msg: u16,

    /// Cycles `tick` still owes to the last decoded instruction
    pub(crate) wait_cycles: u32,

    /// Total cycles executed since construction
    pub(crate) cycles: u64,

    /// Memory bus implementation
    pub(crate) memory: M,
}

impl<M: MemoryBus> Processor<M> {
    /// Creates a processor over the given bus, in the reset state.
    pub fn new(memory: M) -> Self {
        let mut cpu = Self {
            r: [0; REGISTER_COUNT],
            pc: RESET_VECTOR,
            skipping: false,
            sleeping: false,
            interrupt_pending: false,
            interrupt_msg: 0,
            wait_cycles: 0,
            cycles: 0,
            memory,
        };
        cpu.reset();
        cpu
    }

    /// Resets the processor.
    ///
    /// Zeroes every register (flags included), clears the skip, sleep and
    /// interrupt state and loads the PC with [`RESET_VECTOR`]. Memory is left
    /// untouched.
    pub fn reset(&mut self) {
        self.r = [0; REGISTER_COUNT];
        self.pc = RESET_VECTOR;
        self.skipping = false;
        self.sleeping = false;
        self.interrupt_pending = false;
        self.interrupt_msg = 0;
        self.wait_cycles = 0;
        tracing::debug!(pc = RESET_VECTOR, "processor reset");
    }

    /// Executes one instruction slot and returns its cycle cost.
    ///
    /// A sleeping processor only idles (1 cycle) until an interrupt is latched.
    /// A slot consumed by a skipped instruction costs 1 cycle. Any debit left
    /// over from `tick` is dropped.
    pub fn step(&mut self) -> u32 {
        self.wait_cycles = 0;
        let cycles = self.execute_slot();
        self.cycles += cycles as u64;
        cycles
    }

    /// Advances exactly `n` clock cycles.
    ///
    /// An instruction is decoded and executed on the first cycle of its slot;
    /// the remaining cycles of its cost are then debited one tick at a time
    /// without decoding again.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            if self.wait_cycles == 0 {
                self.wait_cycles = self.execute_slot();
            }
            self.wait_cycles -= 1;
            self.cycles += 1;
        }
    }

    /// Offers an interrupt message to the processor.
    ///
    /// The message is latched (and `true` returned) only if interrupts are
    /// enabled, nothing is latched yet and no interrupt is being serviced.
    /// A rejected message leaves the processor untouched; its source must
    /// offer it again later.
    pub fn send_interrupt(&mut self, msg: u16) -> bool {
        if !self.flag(flag::EI) || self.interrupt_pending || self.flag(flag::IF) {
            return false;
        }
        self.interrupt_pending = true;
        self.interrupt_msg = msg;
        tracing::trace!(msg, "interrupt accepted");
        true
    }

    /// Captures the full execution state.
    pub fn state(&self) -> ProcessorState {
        ProcessorState {
            registers: self.r,
            pc: self.pc,
            wait_cycles: self.wait_cycles,
            cycles: self.cycles,
            interrupt_msg: self.interrupt_msg,
            interrupt_pending: self.interrupt_pending,
            skipping: self.skipping,
            sleeping: self.sleeping,
        }
    }

    /// Restores an execution state captured by [`Processor::state`].
    pub fn set_state(&mut self, state: &ProcessorState) {
        self.r = state.registers;
        self.pc = state.pc;
        self.wait_cycles = state.wait_cycles;
        self.cycles = state.cycles;
        self.interrupt_msg = state.interrupt_msg;
        self.interrupt_pending = state.interrupt_pending;
        self.skipping = state.skipping;
        self.sleeping = state.sleeping;
    }

    fn execute_slot(&mut self) -> u32 {
        if self.sleeping {
            if self.interrupt_pending {
                self.service_interrupt();
            }
            return SLEEP_CYCLES;
        }

        let decoded = Decoded::new(self.memory.read_word(self.pc));

        if self.skipping {
            self.pc = self.pc.wrapping_add(decoded.length());
            // A skipped conditional drags the instruction after it along.
            self.skipping = branches::is_conditional(decoded.opcode);
            return SKIPPED_CYCLES;
        }

        // Instructions run inside a handler (RFI included) are not traced.
        let in_service = self.flag(flag::IF);
        let cycles = instructions::execute(self, &decoded);

        if self.flag(flag::ESS) && !in_service && !self.interrupt_pending {
            self.interrupt_pending = true;
            self.interrupt_msg = 0;
        }

        if !self.skipping {
            self.service_interrupt();
        }

        cycles
    }

    /// Enters the handler of the latched interrupt, if interrupts are enabled.
    fn service_interrupt(&mut self) {
        if !self.interrupt_pending || !self.flag(flag::EI) {
            return;
        }
        let msg = self.interrupt_msg;
        self.interrupt_pending = false;
        self.sleeping = false;

        let vector = self.r[IA].wrapping_add((msg as u32 & 0xFF) * 4);
        let handler = self.memory.read_word(vector);
        if handler == 0 {
            tracing::trace!(msg, vector, "no handler installed, interrupt dropped");
            return;
        }

        self.push_word(self.pc);
        self.push_word(self.r[0]);
        self.r[0] = msg as u32;
        self.pc = handler;
        self.set_flag(flag::IF, true);
        tracing::trace!(msg, handler, "interrupt dispatched");
    }

    pub(crate) fn push_word(&mut self, value: u32) {
        let sp = self.r[SP].wrapping_sub(4);
        self.memory.write_word(sp, value);
        self.r[SP] = sp;
    }

    pub(crate) fn pop_word(&mut self) -> u32 {
        let value = self.memory.read_word(self.r[SP]);
        self.r[SP] = self.r[SP].wrapping_add(4);
        value
    }

    pub(crate) fn flag(&self, mask: u32) -> bool {
        self.r[FLAGS] & mask != 0
    }

    pub(crate) fn set_flag(&mut self, mask: u32, value: bool) {
        if value {
            self.r[FLAGS] |= mask;
        } else {
            self.r[FLAGS] &= !mask;
        }
    }

    // ========== Register Access ==========

    /// Returns the value of register `index` (taken modulo 32).
    pub fn register(&self, index: usize) -> u32 {
        self.r[index % REGISTER_COUNT]
    }

    /// Sets register `index` (taken modulo 32).
    pub fn set_register(&mut self, index: usize, value: u32) {
        self.r[index % REGISTER_COUNT] = value;
    }

    /// Returns the whole register file.
    pub fn registers(&self) -> &[u32; REGISTER_COUNT] {
        &self.r
    }

    /// Returns the program counter value.
    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// Sets the program counter.
    pub fn set_pc(&mut self, addr: u32) {
        self.pc = addr;
    }

    /// Returns the stack pointer (r31).
    pub fn sp(&self) -> u32 {
        self.r[SP]
    }

    /// Returns the flags word (r29).
    pub fn flags(&self) -> u32 {
        self.r[FLAGS]
    }

    /// Returns the total number of cycles executed since construction.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Cycles `tick` still owes to the instruction it last decoded.
    pub fn wait_cycles(&self) -> u32 {
        self.wait_cycles
    }

    // ========== Execution State ==========

    /// Returns true while a SLEEP waits for an interrupt.
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Returns true if the next instruction will be skipped.
    pub fn is_skipping(&self) -> bool {
        self.skipping
    }

    /// Returns the latched interrupt message, if any.
    pub fn pending_interrupt(&self) -> Option<u16> {
        self.interrupt_pending.then_some(self.interrupt_msg)
    }

    // ========== Flags ==========

    /// Returns true if the Carry flag is set.
    pub fn flag_carry(&self) -> bool {
        self.flag(flag::CF)
    }

    /// Returns true if the Overflow flag is set.
    pub fn flag_overflow(&self) -> bool {
        self.flag(flag::OF)
    }

    /// Returns true if a division by zero was attempted.
    pub fn flag_divide_error(&self) -> bool {
        self.flag(flag::DE)
    }

    /// Returns true while an interrupt is being serviced.
    pub fn flag_interrupt(&self) -> bool {
        self.flag(flag::IF)
    }

    /// Returns true if interrupts are accepted.
    pub fn interrupts_enabled(&self) -> bool {
        self.flag(flag::EI)
    }

    /// Returns true if single-step trace interrupts are enabled.
    pub fn single_step_enabled(&self) -> bool {
        self.flag(flag::ESS)
    }

    // ========== Bus Access ==========

    /// Returns a reference to the memory bus.
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Returns a mutable reference to the memory bus.
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }
}
