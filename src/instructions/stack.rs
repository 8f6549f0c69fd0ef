//! # Stack Instructions
//!
//! PUSH and POP move whole words through the full-descending stack at SP
//! (r31). PUSH pre-decrements SP by 4; POP reads then post-increments.

use super::{Flow, Source};
use crate::opcodes as op;
use crate::{MemoryBus, Processor};

/// Executes PUSH or POP.
///
/// POP needs a destination register; a literal operand is a decode miss.
pub(crate) fn execute<M: MemoryBus>(cpu: &mut Processor<M>, opcode: u8, src: Source) -> Flow {
    match opcode {
        op::PUSH => {
            cpu.push_word(src.value);
            Flow::Next
        }
        op::POP => match src.register {
            Some(r) => {
                let value = cpu.pop_word();
                cpu.r[r] = value;
                Flow::Next
            }
            None => Flow::Miss,
        },
        _ => Flow::Miss,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::SP;
    use crate::FlatMemory;

    #[test]
    fn test_push_pop_round_trip() {
        let mut cpu = Processor::new(FlatMemory::new());
        cpu.r[SP] = 0x8000;

        let lit = Source {
            value: 0xCAFE_F00D,
            register: None,
        };
        assert_eq!(execute(&mut cpu, op::PUSH, lit), Flow::Next);
        assert_eq!(cpu.r[SP], 0x7FFC);

        let dest = Source {
            value: 0,
            register: Some(6),
        };
        assert_eq!(execute(&mut cpu, op::POP, dest), Flow::Next);
        assert_eq!(cpu.r[6], 0xCAFE_F00D);
        assert_eq!(cpu.r[SP], 0x8000);
    }

    #[test]
    fn test_pop_into_literal_is_a_miss() {
        let mut cpu = Processor::new(FlatMemory::new());
        cpu.r[SP] = 0x8000;
        let lit = Source {
            value: 1,
            register: None,
        };
        assert_eq!(execute(&mut cpu, op::POP, lit), Flow::Miss);
        assert_eq!(cpu.r[SP], 0x8000);
    }
}
