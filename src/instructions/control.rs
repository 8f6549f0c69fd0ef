//! # Control Flow Instructions
//!
//! This module implements:
//! - SLEEP: idle until an interrupt is serviced
//! - RET: pop the return address
//! - RFI: pop r0 and the return address, leave interrupt service
//! - JMP / CALL: absolute jump (1-operand) or `Rd + operand` (2-operand)
//! - RJMP / RCALL: jump relative to the next instruction
//! - INT: raise a software interrupt

use super::Flow;
use crate::opcodes as op;
use crate::registers::flag;
use crate::{MemoryBus, Processor};

/// Executes a 0-operand instruction.
pub(crate) fn execute_zero<M: MemoryBus>(cpu: &mut Processor<M>, opcode: u8) -> Flow {
    match opcode {
        op::SLEEP => {
            cpu.sleeping = true;
        }
        op::RET => {
            cpu.pc = cpu.pop_word();
        }
        op::RFI => {
            cpu.r[0] = cpu.pop_word();
            cpu.pc = cpu.pop_word();
            cpu.set_flag(flag::IF, false);
        }
        _ => return Flow::Miss,
    }
    Flow::Next
}

/// Executes JMP1, CALL1, RJMP, RCALL or INT.
pub(crate) fn execute_one<M: MemoryBus>(cpu: &mut Processor<M>, opcode: u8, value: u32) -> Flow {
    match opcode {
        op::JMP1 => execute_jump(cpu, false, value),
        op::CALL1 => execute_jump(cpu, true, value),
        op::RJMP | op::RCALL => {
            let target = cpu.pc.wrapping_add(value);
            execute_jump(cpu, opcode == op::RCALL, target)
        }
        op::INT => {
            // Ignored rather than queued when it cannot be accepted.
            if !cpu.send_interrupt(value as u16) {
                tracing::trace!(msg = value as u16, "software interrupt ignored");
            }
            Flow::Next
        }
        _ => Flow::Miss,
    }
}

/// Jumps to `target`, pushing the return address first for calls.
pub(crate) fn execute_jump<M: MemoryBus>(cpu: &mut Processor<M>, call: bool, target: u32) -> Flow {
    if call {
        cpu.push_word(cpu.pc);
    }
    cpu.pc = target;
    Flow::Next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::SP;
    use crate::FlatMemory;

    #[test]
    fn test_call_then_ret() {
        let mut cpu = Processor::new(FlatMemory::new());
        cpu.r[SP] = 0x1000;
        cpu.pc = 0x100008;

        execute_jump(&mut cpu, true, 0x2000);
        assert_eq!(cpu.pc, 0x2000);
        assert_eq!(cpu.r[SP], 0x0FFC);
        assert_eq!(cpu.memory.read_word(0x0FFC), 0x100008);

        execute_zero(&mut cpu, op::RET);
        assert_eq!(cpu.pc, 0x100008);
        assert_eq!(cpu.r[SP], 0x1000);
    }

    #[test]
    fn test_rjmp_is_relative_to_next_instruction() {
        let mut cpu = Processor::new(FlatMemory::new());
        cpu.pc = 0x100004;
        execute_one(&mut cpu, op::RJMP, -8i32 as u32);
        assert_eq!(cpu.pc, 0x0FFFFC);
    }

    #[test]
    fn test_int_ignored_without_enable() {
        let mut cpu = Processor::new(FlatMemory::new());
        assert_eq!(execute_one(&mut cpu, op::INT, 5), Flow::Next);
        assert_eq!(cpu.pending_interrupt(), None);

        cpu.set_flag(flag::EI, true);
        execute_one(&mut cpu, op::INT, 5);
        assert_eq!(cpu.pending_interrupt(), Some(5));
    }

    #[test]
    fn test_undefined_zero_operand() {
        let mut cpu = Processor::new(FlatMemory::new());
        assert_eq!(execute_zero(&mut cpu, 0x07), Flow::Miss);
        assert_eq!(execute_zero(&mut cpu, 0x80), Flow::Miss);
    }
}
