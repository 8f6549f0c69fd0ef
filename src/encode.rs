//! # Instruction Encoding
//!
//! Builds instruction words for every format. Literals that fit the inline
//! field are embedded; anything else (or an explicit [`Arg::Big`]) is emitted as
//! the big-literal sentinel followed by the full word.
//!
//! ```
//! use tr3200::encode::{self, Arg};
//! use tr3200::opcodes;
//!
//! // MOV r3, 0x1234 in trailing-literal form, then STORE [0x2000], r3
//! let mut program = encode::two(opcodes::MOV, 3, Arg::Big(0x1234));
//! program.extend(encode::two(opcodes::STORE2, 3, Arg::Lit(0x2000)));
//! assert_eq!(program.len(), 3);
//! assert_eq!(program[1], 0x1234);
//! ```

use crate::decode::Format;

const LITERAL_BIT: u32 = 0x0080_0000;

/// The last operand of an instruction being encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    /// Register index (only the low five bits are used).
    Reg(usize),
    /// Immediate value; inline when it fits, big literal otherwise.
    Lit(u32),
    /// Immediate value that is always emitted as a trailing big literal.
    Big(u32),
}

fn fits(value: u32, width: u32) -> bool {
    let min = -(1i64 << (width - 1));
    let max = (1i64 << (width - 1)) - 1;
    let signed = value as i32 as i64;
    // The most negative value is reserved for the sentinel.
    signed > min && signed <= max
}

fn last_field(format: Format, arg: Arg) -> (u32, Option<u32>) {
    let width = match format.literal_width() {
        Some(width) => width,
        None => return (0, None),
    };
    let mask = (1u32 << width) - 1;
    let sentinel = LITERAL_BIT | (1 << (width - 1));

    match arg {
        Arg::Reg(r) => ((r as u32) & 0x1F, None),
        Arg::Lit(value) if fits(value, width) => (LITERAL_BIT | (value & mask), None),
        Arg::Lit(value) | Arg::Big(value) => (sentinel, Some(value)),
    }
}

fn emit(word: u32, literal: Option<u32>) -> Vec<u32> {
    let mut words = vec![word];
    words.extend(literal);
    words
}

/// Encodes a 3-operand instruction: `Rd = Rs op last`.
pub fn three(opcode: u8, rd: usize, rs: usize, arg: Arg) -> Vec<u32> {
    let (last, literal) = last_field(Format::ThreeOperand, arg);
    let word = ((opcode as u32) << 24)
        | (((rd as u32) & 0x1F) << 18)
        | (((rs as u32) & 0x1F) << 13)
        | last;
    emit(word, literal)
}

/// Encodes a 2-operand instruction: `Rd, last`.
pub fn two(opcode: u8, rd: usize, arg: Arg) -> Vec<u32> {
    let (last, literal) = last_field(Format::TwoOperand, arg);
    let word = ((opcode as u32) << 24) | (((rd as u32) & 0x1F) << 18) | last;
    emit(word, literal)
}

/// Encodes a 1-operand instruction.
pub fn one(opcode: u8, arg: Arg) -> Vec<u32> {
    let (last, literal) = last_field(Format::OneOperand, arg);
    emit(((opcode as u32) << 24) | last, literal)
}

/// Encodes a 0-operand instruction.
pub fn zero(opcode: u8) -> Vec<u32> {
    vec![(opcode as u32) << 24]
}

/// Flattens a list of encoded instructions into little-endian bytes.
pub fn to_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}
