//! # Load and Store Instructions
//!
//! Memory access in word, half-word and byte widths. The 3-operand forms
//! address `Rs + operand`; the 2-operand forms address the operand directly.
//! Narrow loads zero-extend. Stores write the low bytes of `Rd`.

use super::Flow;
use crate::opcodes as op;
use crate::{MemoryBus, Processor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Width {
    Word,
    Half,
    Byte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Load(Width),
    Store(Width),
}

fn access(opcode: u8) -> Option<Access> {
    let access = match opcode {
        op::LOAD2 | op::LOAD3 => Access::Load(Width::Word),
        op::LOADH2 | op::LOADH3 => Access::Load(Width::Half),
        op::LOADB2 | op::LOADB3 => Access::Load(Width::Byte),
        op::STORE2 | op::STORE3 => Access::Store(Width::Word),
        op::STOREH2 | op::STOREH3 => Access::Store(Width::Half),
        op::STOREB2 | op::STOREB3 => Access::Store(Width::Byte),
        _ => return None,
    };
    Some(access)
}

/// Executes a load into, or a store from, `Rd` at `addr`.
pub(crate) fn execute<M: MemoryBus>(cpu: &mut Processor<M>, opcode: u8, rd: usize, addr: u32) -> Flow {
    let Some(access) = access(opcode) else {
        return Flow::Miss;
    };

    match access {
        Access::Load(width) => {
            cpu.r[rd] = match width {
                Width::Word => cpu.memory.read_word(addr),
                Width::Half => cpu.memory.read_half(addr) as u32,
                Width::Byte => cpu.memory.read_byte(addr) as u32,
            };
        }
        Access::Store(width) => {
            let value = cpu.r[rd];
            match width {
                Width::Word => cpu.memory.write_word(addr, value),
                Width::Half => cpu.memory.write_half(addr, value as u16),
                Width::Byte => cpu.memory.write_byte(addr, value as u8),
            }
        }
    }
    Flow::Next
}
