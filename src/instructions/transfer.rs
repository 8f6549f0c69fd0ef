//! # Register Transfer Instructions
//!
//! This module implements register moves and in-place conversions:
//! - MOV, SWP, NOT, SIGXB, SIGXH (2-operand)
//! - XCHGB, XCHGW, GETPC (1-operand, register destination)
//! - GETF/SETF, GETY/SETY, GETIA/SETIA (special register access)
//!
//! Instructions that write their single operand require it to be a register;
//! with a literal they are a decode miss. None of these touch the flags,
//! except SETF which replaces them.

use super::{Flow, Source};
use crate::opcodes as op;
use crate::registers::{FLAGS, IA, Y};
use crate::{MemoryBus, Processor};

/// Executes MOV, SWP, SIGXB, SIGXH or NOT.
pub(crate) fn execute_two<M: MemoryBus>(
    cpu: &mut Processor<M>,
    opcode: u8,
    rd: usize,
    src: Source,
) -> Flow {
    let value = src.value;
    match opcode {
        op::MOV => cpu.r[rd] = value,
        op::NOT => cpu.r[rd] = !value,
        op::SIGXB => cpu.r[rd] = value as u8 as i8 as i32 as u32,
        op::SIGXH => cpu.r[rd] = value as u16 as i16 as i32 as u32,
        op::SWP => match src.register {
            Some(rs) => cpu.r.swap(rd, rs),
            None => return Flow::Miss,
        },
        _ => return Flow::Miss,
    }
    Flow::Next
}

/// Executes the 1-operand transfers.
pub(crate) fn execute_one<M: MemoryBus>(cpu: &mut Processor<M>, opcode: u8, src: Source) -> Flow {
    match opcode {
        op::SETF => cpu.r[FLAGS] = src.value,
        op::SETY => cpu.r[Y] = src.value,
        op::SETIA => cpu.r[IA] = src.value,
        _ => {
            let Some(r) = src.register else {
                return Flow::Miss;
            };
            cpu.r[r] = match opcode {
                op::XCHGB => {
                    let v = cpu.r[r];
                    (v & 0xFFFF_0000) | ((v & 0xFF) << 8) | ((v >> 8) & 0xFF)
                }
                op::XCHGW => cpu.r[r].rotate_left(16),
                op::GETPC => cpu.pc,
                op::GETF => cpu.r[FLAGS],
                op::GETY => cpu.r[Y],
                op::GETIA => cpu.r[IA],
                _ => return Flow::Miss,
            };
        }
    }
    Flow::Next
}
