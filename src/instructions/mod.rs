//! # TR3200 Instruction Implementations
//!
//! This module contains the implementations of all TR3200 instructions,
//! organized by category. [`execute`] fetches the operands of a decoded word,
//! advances the program counter past the instruction and dispatches to the
//! category that owns the opcode.
//!
//! ## Categories
//!
//! - **alu**: Logic, arithmetic, shifts, MUL/DIV (AND .. SDIV)
//! - **branches**: Conditional skips (IFEQ .. IFCLEAR)
//! - **load_store**: Memory access (LOAD, LOADH, LOADB, STORE, STOREH, STOREB)
//! - **control**: Control flow (SLEEP, RET, RFI, JMP, CALL, RJMP, RCALL, INT)
//! - **stack**: Stack operations (PUSH, POP)
//! - **transfer**: Register moves and conversions (MOV, SWP, SIGXB, NOT, GETF, ...)
//!
//! Every handler runs with the PC already pointing at the next instruction,
//! which is what CALL pushes, GETPC reads and relative jumps are based on.

pub mod alu;
pub mod branches;
pub mod control;
pub mod load_store;
pub mod stack;
pub mod transfer;

use crate::decode::{Decoded, Format, Operand};
use crate::opcodes::{self as op, BIG_LITERAL_CYCLES, MISS_CYCLES, OPCODE_TABLE, SKIP_ARM_CYCLES};
use crate::{MemoryBus, Processor};

/// How an instruction finished, for cycle accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Executed normally.
    Next,
    /// A conditional failed and armed the skip.
    SkipArmed,
    /// Undefined opcode or an operand form the instruction cannot take.
    Miss,
}

/// The resolved last operand of an instruction.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Source {
    /// Operand value (register contents or literal).
    pub value: u32,
    /// Register the value came from, if any.
    pub register: Option<usize>,
}

/// Executes a decoded instruction and returns its cycle cost.
pub(crate) fn execute<M: MemoryBus>(cpu: &mut Processor<M>, decoded: &Decoded) -> u32 {
    let mut next_pc = cpu.pc.wrapping_add(4);
    let mut surcharge = 0;

    let source = if decoded.needs_big_literal() {
        let value = cpu.memory.read_word(next_pc);
        next_pc = next_pc.wrapping_add(4);
        surcharge = BIG_LITERAL_CYCLES;
        Source {
            value,
            register: None,
        }
    } else {
        match decoded.inline_operand() {
            Some(Operand::Register(r)) => Source {
                value: cpu.r[r],
                register: Some(r),
            },
            Some(Operand::Literal(value)) => Source {
                value,
                register: None,
            },
            None => Source {
                value: 0,
                register: None,
            },
        }
    };
    cpu.pc = next_pc;

    let flow = dispatch(cpu, decoded, source);
    let metadata = &OPCODE_TABLE[decoded.opcode as usize];

    match flow {
        Flow::Next => metadata.base_cycles + surcharge,
        Flow::SkipArmed => metadata.base_cycles + surcharge + SKIP_ARM_CYCLES,
        Flow::Miss => {
            tracing::trace!(
                word = decoded.word,
                pc = cpu.pc,
                mnemonic = metadata.mnemonic,
                "decode miss"
            );
            MISS_CYCLES + surcharge
        }
    }
}

fn dispatch<M: MemoryBus>(cpu: &mut Processor<M>, d: &Decoded, src: Source) -> Flow {
    match d.format {
        Format::ThreeOperand => {
            let base = cpu.r[d.rs];
            match d.opcode {
                op::AND..=op::SDIV => alu::execute(cpu, d.opcode, d.rd, base, src.value),
                op::LOAD3..=op::STOREB3 => {
                    load_store::execute(cpu, d.opcode, d.rd, base.wrapping_add(src.value))
                }
                _ => Flow::Miss,
            }
        }
        Format::TwoOperand => match d.opcode {
            op::MOV..=op::NOT => transfer::execute_two(cpu, d.opcode, d.rd, src),
            op::LOAD2..=op::STOREB2 => load_store::execute(cpu, d.opcode, d.rd, src.value),
            op::IFEQ..=op::IFCLEAR => {
                let a = cpu.r[d.rd];
                branches::execute(cpu, d.opcode, a, src.value)
            }
            op::JMP2 | op::CALL2 => {
                let target = cpu.r[d.rd].wrapping_add(src.value);
                control::execute_jump(cpu, d.opcode == op::CALL2, target)
            }
            _ => Flow::Miss,
        },
        Format::OneOperand => match d.opcode {
            op::POP | op::PUSH => stack::execute(cpu, d.opcode, src),
            op::JMP1..=op::INT => control::execute_one(cpu, d.opcode, src.value),
            op::XCHGB | op::XCHGW | op::GETPC | op::GETF..=op::SETIA => {
                transfer::execute_one(cpu, d.opcode, src)
            }
            _ => Flow::Miss,
        },
        Format::NoOperand => control::execute_zero(cpu, d.opcode),
    }
}
