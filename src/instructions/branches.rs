//! # Conditional Instructions
//!
//! The IFx family compares `Rd` with the operand. A true condition lets the
//! next instruction run; a false one arms the skip flag, costs one extra cycle
//! and suppresses the next instruction. Conditionals chain: a skipped IFx
//! re-arms the skip, so the whole chain after a failed test is suppressed.

use super::Flow;
use crate::opcodes as op;
use crate::{MemoryBus, Processor};

/// Returns true for opcodes of the IFx family.
pub(crate) fn is_conditional(opcode: u8) -> bool {
    (op::IFEQ..=op::IFCLEAR).contains(&opcode)
}

/// Evaluates a conditional and arms the skip when it fails.
pub(crate) fn execute<M: MemoryBus>(cpu: &mut Processor<M>, opcode: u8, a: u32, b: u32) -> Flow {
    let (sa, sb) = (a as i32, b as i32);

    let taken = match opcode {
        op::IFEQ => a == b,
        op::IFNEQ => a != b,
        op::IFL => a < b,
        op::IFSL => sa < sb,
        op::IFLE => a <= b,
        op::IFSLE => sa <= sb,
        op::IFG => a > b,
        op::IFSG => sa > sb,
        op::IFGE => a >= b,
        op::IFSGE => sa >= sb,
        op::IFBITS => a & b != 0,
        op::IFCLEAR => a & b == 0,
        _ => return Flow::Miss,
    };

    if taken {
        Flow::Next
    } else {
        cpu.skipping = true;
        Flow::SkipArmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlatMemory;

    #[test]
    fn test_signed_and_unsigned_compare_differ() {
        let mut cpu = Processor::new(FlatMemory::new());
        let minus_one = -1i32 as u32;

        assert_eq!(execute(&mut cpu, op::IFL, minus_one, 1), Flow::SkipArmed);
        assert!(cpu.is_skipping());

        cpu.skipping = false;
        assert_eq!(execute(&mut cpu, op::IFSL, minus_one, 1), Flow::Next);
        assert!(!cpu.is_skipping());
    }

    #[test]
    fn test_bit_tests() {
        let mut cpu = Processor::new(FlatMemory::new());
        assert_eq!(execute(&mut cpu, op::IFBITS, 0b1010, 0b0010), Flow::Next);
        assert_eq!(execute(&mut cpu, op::IFCLEAR, 0b1010, 0b0101), Flow::Next);
        assert_eq!(execute(&mut cpu, op::IFCLEAR, 0b1010, 0b0010), Flow::SkipArmed);
    }

    #[test]
    fn test_is_conditional() {
        assert!(is_conditional(op::IFEQ));
        assert!(is_conditional(op::IFCLEAR));
        assert!(!is_conditional(op::JMP2));
        assert!(!is_conditional(op::NOT));
    }
}
