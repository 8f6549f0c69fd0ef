//! # Instruction Decoding
//!
//! An instruction is one 32-bit word. Its top bits select one of four formats:
//!
//! ```text
//! 3-operand  01oooooo M ddddd sssss nnnnnnnnnnnnn   Rd = Rs op (Rn | lit13)
//! 2-operand  001ooooo M ddddd ssssssssssssssssss    Rd, (Rs | lit18)
//! 1-operand  0001oooo M nnnnnnnnnnnnnnnnnnnnnnn     (Rn | lit23)
//! 0-operand  0000oooo x xxxxxxxxxxxxxxxxxxxxxxx
//! ```
//!
//! When `M` is set the last field is a sign-extended literal. A literal field
//! holding only its sign bit is the big-literal sentinel: the real value is the
//! next word of the instruction stream.

/// Instruction format, in decode priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Two source operands and a destination register.
    ThreeOperand,
    /// Destination register and one source operand.
    TwoOperand,
    /// A single operand.
    OneOperand,
    /// No operands.
    NoOperand,
}

const THREE_OPERAND_MASK: u32 = 0x4000_0000;
const TWO_OPERAND_MASK: u32 = 0x2000_0000;
const ONE_OPERAND_MASK: u32 = 0x1000_0000;
const LITERAL_BIT: u32 = 0x0080_0000;

impl Format {
    /// Returns the format selected by an instruction word's top bits.
    pub const fn of(word: u32) -> Self {
        if word & THREE_OPERAND_MASK != 0 {
            Format::ThreeOperand
        } else if word & TWO_OPERAND_MASK != 0 {
            Format::TwoOperand
        } else if word & ONE_OPERAND_MASK != 0 {
            Format::OneOperand
        } else {
            Format::NoOperand
        }
    }

    /// Width in bits of the inline literal field, if the format has one.
    pub const fn literal_width(self) -> Option<u32> {
        match self {
            Format::ThreeOperand => Some(13),
            Format::TwoOperand => Some(18),
            Format::OneOperand => Some(23),
            Format::NoOperand => None,
        }
    }

    /// The literal value that requests a trailing big-literal word.
    pub const fn big_literal_sentinel(self) -> Option<u32> {
        match self.literal_width() {
            Some(width) => Some(1 << (width - 1)),
            None => None,
        }
    }
}

/// The last operand of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Register index (0-31).
    Register(usize),
    /// Immediate value, already sign-extended or fetched from the next word.
    Literal(u32),
}

/// A decoded instruction word.
///
/// The big literal (if any) is not part of the word, so decode only reports
/// that one is needed through [`Decoded::needs_big_literal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub word: u32,
    pub opcode: u8,
    pub format: Format,
    pub rd: usize,
    pub rs: usize,
    /// Raw last field: a register index or the literal bits.
    last: u32,
    literal: bool,
}

impl Decoded {
    /// Splits an instruction word into its fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use tr3200::{Decoded, Format, Operand};
    ///
    /// // ADD r1, r2, 5
    /// let d = Decoded::new(0x4484_4005);
    /// assert_eq!(d.format, Format::ThreeOperand);
    /// assert_eq!(d.opcode, 0x44);
    /// assert_eq!((d.rd, d.rs), (1, 2));
    /// assert_eq!(d.inline_operand(), Some(Operand::Literal(5)));
    /// ```
    pub fn new(word: u32) -> Self {
        let format = Format::of(word);
        let opcode = (word >> 24) as u8;
        let literal = format != Format::NoOperand && word & LITERAL_BIT != 0;

        let (rd, rs, last) = match format {
            Format::ThreeOperand => (
                ((word >> 18) & 0x1F) as usize,
                ((word >> 13) & 0x1F) as usize,
                if literal { word & 0x1FFF } else { word & 0x1F },
            ),
            Format::TwoOperand => (
                ((word >> 18) & 0x1F) as usize,
                0,
                if literal { word & 0x3FFFF } else { word & 0x1F },
            ),
            Format::OneOperand => (0, 0, if literal { word & 0x7F_FFFF } else { word & 0x1F }),
            Format::NoOperand => (0, 0, 0),
        };

        Self {
            word,
            opcode,
            format,
            rd,
            rs,
            last,
            literal,
        }
    }

    /// Returns true if the last operand is a literal.
    pub fn has_literal(&self) -> bool {
        self.literal
    }

    /// Returns true if the instruction is followed by a big-literal word.
    pub fn needs_big_literal(&self) -> bool {
        self.literal && Some(self.last) == self.format.big_literal_sentinel()
    }

    /// Bytes the program counter advances past this instruction.
    pub fn length(&self) -> u32 {
        if self.needs_big_literal() {
            8
        } else {
            4
        }
    }

    /// Returns the last operand when it can be resolved from the word alone.
    ///
    /// Returns `None` for no-operand instructions and for big literals, whose
    /// value must be fetched by the caller.
    pub fn inline_operand(&self) -> Option<Operand> {
        if self.format == Format::NoOperand || self.needs_big_literal() {
            return None;
        }
        if !self.literal {
            return Some(Operand::Register(self.last as usize));
        }
        let width = self.format.literal_width()?;
        Some(Operand::Literal(sign_extend(self.last, width)))
    }
}

/// Sign-extends the low `width` bits of `value`.
pub fn sign_extend(value: u32, width: u32) -> u32 {
    let shift = 32 - width;
    (((value << shift) as i32) >> shift) as u32
}
