//! # ALU Instructions
//!
//! This module implements the 3-operand arithmetic and logic operations:
//! - Logic: AND, OR, XOR, BITC (AND NOT)
//! - Arithmetic: ADD, ADDC, SUB, SUBB, RSB, RSBB
//! - Shifts and rotates: LLS, RLS, ARS, ROTL, ROTR
//! - Multiply and divide: MUL, SMUL, DIV, SDIV
//!
//! Only the add/subtract family touches CF and OF. MUL leaves the high word of
//! the 64-bit product in Y; DIV leaves the remainder in Y and reports a zero
//! divisor through DE instead of trapping.

use super::Flow;
use crate::opcodes as op;
use crate::registers::{flag, Y};
use crate::{MemoryBus, Processor};

/// Executes one ALU instruction: `Rd = a op b`.
pub(crate) fn execute<M: MemoryBus>(
    cpu: &mut Processor<M>,
    opcode: u8,
    rd: usize,
    a: u32,
    b: u32,
) -> Flow {
    let carry = cpu.flag(flag::CF) as u32;

    let result = match opcode {
        op::AND => a & b,
        op::OR => a | b,
        op::XOR => a ^ b,
        op::BITC => a & !b,

        op::ADD => add(cpu, a, b, 0),
        op::ADDC => add(cpu, a, b, carry),
        op::SUB => sub(cpu, a, b, 0),
        op::SUBB => sub(cpu, a, b, carry),
        op::RSB => sub(cpu, b, a, 0),
        op::RSBB => sub(cpu, b, a, carry),

        op::LLS => a.checked_shl(b).unwrap_or(0),
        op::RLS => a.checked_shr(b).unwrap_or(0),
        op::ARS => ((a as i32) >> b.min(31)) as u32,
        op::ROTL => a.rotate_left(b),
        op::ROTR => a.rotate_right(b),

        op::MUL => {
            let product = a as u64 * b as u64;
            cpu.r[Y] = (product >> 32) as u32;
            product as u32
        }
        op::SMUL => {
            let product = (a as i32 as i64 * b as i32 as i64) as u64;
            cpu.r[Y] = (product >> 32) as u32;
            product as u32
        }
        op::DIV => {
            if b == 0 {
                cpu.set_flag(flag::DE, true);
                return Flow::Next;
            }
            cpu.set_flag(flag::DE, false);
            cpu.r[Y] = a % b;
            a / b
        }
        op::SDIV => {
            if b == 0 {
                cpu.set_flag(flag::DE, true);
                return Flow::Next;
            }
            cpu.set_flag(flag::DE, false);
            let (a, b) = (a as i32, b as i32);
            cpu.r[Y] = a.wrapping_rem(b) as u32;
            a.wrapping_div(b) as u32
        }

        _ => return Flow::Miss,
    };

    cpu.r[rd] = result;
    Flow::Next
}

/// `a + b + carry_in`, updating CF and OF.
fn add<M: MemoryBus>(cpu: &mut Processor<M>, a: u32, b: u32, carry_in: u32) -> u32 {
    let wide = a as u64 + b as u64 + carry_in as u64;
    let result = wide as u32;
    cpu.set_flag(flag::CF, wide > u32::MAX as u64);
    cpu.set_flag(flag::OF, ((a ^ result) & (b ^ result)) >> 31 != 0);
    result
}

/// `a - b - borrow_in`, updating CF (as borrow) and OF.
fn sub<M: MemoryBus>(cpu: &mut Processor<M>, a: u32, b: u32, borrow_in: u32) -> u32 {
    let wide = (a as u64).wrapping_sub(b as u64 + borrow_in as u64);
    let result = wide as u32;
    cpu.set_flag(flag::CF, (wide >> 32) & 1 != 0);
    cpu.set_flag(flag::OF, ((a ^ b) & (a ^ result)) >> 31 != 0);
    result
}
