//! # Opcode Metadata Table
//!
//! This module contains the opcode byte constants and the 256-entry metadata
//! table that serves as the single source of truth for decode and cycle costs.
//!
//! The opcode byte is bits 31..24 of the instruction word. The format is not
//! stored separately: it follows from the word's top bits (see
//! [`Format::of`](crate::decode::Format::of)), and every defined opcode lives in
//! the byte range its format selects.
//!
//! Each entry includes:
//! - Mnemonic (instruction name, `"???"` for undefined bytes)
//! - Format (number of operands)
//! - Base cycle cost (excluding the big-literal and skip surcharges)
//! - Whether the byte names a defined instruction

use crate::decode::Format;

/// Base cost of every defined instruction.
pub const BASE_CYCLES: u32 = 3;

/// Surcharge for fetching a trailing big-literal word.
pub const BIG_LITERAL_CYCLES: u32 = 1;

/// Surcharge charged by a conditional whose condition fails.
pub const SKIP_ARM_CYCLES: u32 = 1;

/// Cost of an instruction that is decoded only to be skipped.
pub const SKIPPED_CYCLES: u32 = 1;

/// Cost of an idle step while the processor sleeps.
pub const SLEEP_CYCLES: u32 = 1;

/// Cost of a decode-miss (undefined opcode or invalid operand form).
pub const MISS_CYCLES: u32 = 1;

/// Total cost of MUL / SMUL.
pub const MUL_CYCLES: u32 = 20;

/// Total cost of DIV / SDIV.
pub const DIV_CYCLES: u32 = 27;

// ========== 0-operand ==========
pub const SLEEP: u8 = 0x00;
pub const RET: u8 = 0x01;
pub const RFI: u8 = 0x02;

// ========== 1-operand ==========
pub const XCHGB: u8 = 0x10;
pub const XCHGW: u8 = 0x11;
pub const GETPC: u8 = 0x12;
pub const POP: u8 = 0x13;
pub const PUSH: u8 = 0x14;
pub const JMP1: u8 = 0x15;
pub const CALL1: u8 = 0x16;
pub const RJMP: u8 = 0x17;
pub const RCALL: u8 = 0x18;
pub const INT: u8 = 0x19;
pub const GETF: u8 = 0x1A;
pub const SETF: u8 = 0x1B;
pub const GETY: u8 = 0x1C;
pub const SETY: u8 = 0x1D;
pub const GETIA: u8 = 0x1E;
pub const SETIA: u8 = 0x1F;

// ========== 2-operand ==========
pub const MOV: u8 = 0x20;
pub const SWP: u8 = 0x21;
pub const SIGXB: u8 = 0x22;
pub const SIGXH: u8 = 0x23;
pub const NOT: u8 = 0x24;
pub const LOAD2: u8 = 0x25;
pub const LOADH2: u8 = 0x26;
pub const LOADB2: u8 = 0x27;
pub const STORE2: u8 = 0x28;
pub const STOREH2: u8 = 0x29;
pub const STOREB2: u8 = 0x2A;
pub const IFEQ: u8 = 0x2B;
pub const IFNEQ: u8 = 0x2C;
pub const IFL: u8 = 0x2D;
pub const IFSL: u8 = 0x2E;
pub const IFLE: u8 = 0x2F;
pub const IFSLE: u8 = 0x30;
pub const IFG: u8 = 0x31;
pub const IFSG: u8 = 0x32;
pub const IFGE: u8 = 0x33;
pub const IFSGE: u8 = 0x34;
pub const IFBITS: u8 = 0x35;
pub const IFCLEAR: u8 = 0x36;
pub const JMP2: u8 = 0x37;
pub const CALL2: u8 = 0x38;

// ========== 3-operand ==========
pub const AND: u8 = 0x40;
pub const OR: u8 = 0x41;
pub const XOR: u8 = 0x42;
pub const BITC: u8 = 0x43;
pub const ADD: u8 = 0x44;
pub const ADDC: u8 = 0x45;
pub const SUB: u8 = 0x46;
pub const SUBB: u8 = 0x47;
pub const RSB: u8 = 0x48;
pub const RSBB: u8 = 0x49;
pub const LLS: u8 = 0x4A;
pub const RLS: u8 = 0x4B;
pub const ARS: u8 = 0x4C;
pub const ROTL: u8 = 0x4D;
pub const ROTR: u8 = 0x4E;
pub const MUL: u8 = 0x4F;
pub const SMUL: u8 = 0x50;
pub const DIV: u8 = 0x51;
pub const SDIV: u8 = 0x52;
pub const LOAD3: u8 = 0x53;
pub const LOADH3: u8 = 0x54;
pub const LOADB3: u8 = 0x55;
pub const STORE3: u8 = 0x56;
pub const STOREH3: u8 = 0x57;
pub const STOREB3: u8 = 0x58;

/// Metadata for a single opcode byte.
///
/// # Examples
///
/// ```
/// use tr3200::{Format, OPCODE_TABLE};
///
/// let add = &OPCODE_TABLE[0x44];
/// assert_eq!(add.mnemonic, "ADD");
/// assert_eq!(add.format, Format::ThreeOperand);
/// assert_eq!(add.base_cycles, 3);
/// assert!(add.defined);
///
/// let hole = &OPCODE_TABLE[0x03];
/// assert_eq!(hole.mnemonic, "???");
/// assert!(!hole.defined);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeMetadata {
    /// Instruction mnemonic (`"???"` for undefined bytes).
    pub mnemonic: &'static str,

    /// Operand format selected by the opcode byte's top bits.
    pub format: Format,

    /// Cycle cost before big-literal and skip surcharges.
    ///
    /// Undefined bytes carry the decode-miss cost.
    pub base_cycles: u32,

    /// Whether this byte names a defined instruction.
    pub defined: bool,
}

const fn undefined(opcode: u8) -> OpcodeMetadata {
    OpcodeMetadata {
        mnemonic: "???",
        format: Format::of((opcode as u32) << 24),
        base_cycles: MISS_CYCLES,
        defined: false,
    }
}

const fn def(opcode: u8, mnemonic: &'static str, base_cycles: u32) -> OpcodeMetadata {
    OpcodeMetadata {
        mnemonic,
        format: Format::of((opcode as u32) << 24),
        base_cycles,
        defined: true,
    }
}

const fn build_table() -> [OpcodeMetadata; 256] {
    let mut table = [undefined(0); 256];
    let mut i = 0;
    while i < 256 {
        table[i] = undefined(i as u8);
        i += 1;
    }

    const DEFINED: [(u8, &str, u32); 69] = [
        (SLEEP, "SLEEP", BASE_CYCLES),
        (RET, "RET", BASE_CYCLES),
        (RFI, "RFI", BASE_CYCLES),
        (XCHGB, "XCHGB", BASE_CYCLES),
        (XCHGW, "XCHGW", BASE_CYCLES),
        (GETPC, "GETPC", BASE_CYCLES),
        (POP, "POP", BASE_CYCLES),
        (PUSH, "PUSH", BASE_CYCLES),
        (JMP1, "JMP", BASE_CYCLES),
        (CALL1, "CALL", BASE_CYCLES),
        (RJMP, "RJMP", BASE_CYCLES),
        (RCALL, "RCALL", BASE_CYCLES),
        (INT, "INT", BASE_CYCLES),
        (GETF, "GETF", BASE_CYCLES),
        (SETF, "SETF", BASE_CYCLES),
        (GETY, "GETY", BASE_CYCLES),
        (SETY, "SETY", BASE_CYCLES),
        (GETIA, "GETIA", BASE_CYCLES),
        (SETIA, "SETIA", BASE_CYCLES),
        (MOV, "MOV", BASE_CYCLES),
        (SWP, "SWP", BASE_CYCLES),
        (SIGXB, "SIGXB", BASE_CYCLES),
        (SIGXH, "SIGXH", BASE_CYCLES),
        (NOT, "NOT", BASE_CYCLES),
        (LOAD2, "LOAD", BASE_CYCLES),
        (LOADH2, "LOADH", BASE_CYCLES),
        (LOADB2, "LOADB", BASE_CYCLES),
        (STORE2, "STORE", BASE_CYCLES),
        (STOREH2, "STOREH", BASE_CYCLES),
        (STOREB2, "STOREB", BASE_CYCLES),
        (IFEQ, "IFEQ", BASE_CYCLES),
        (IFNEQ, "IFNEQ", BASE_CYCLES),
        (IFL, "IFL", BASE_CYCLES),
        (IFSL, "IFSL", BASE_CYCLES),
        (IFLE, "IFLE", BASE_CYCLES),
        (IFSLE, "IFSLE", BASE_CYCLES),
        (IFG, "IFG", BASE_CYCLES),
        (IFSG, "IFSG", BASE_CYCLES),
        (IFGE, "IFGE", BASE_CYCLES),
        (IFSGE, "IFSGE", BASE_CYCLES),
        (IFBITS, "IFBITS", BASE_CYCLES),
        (IFCLEAR, "IFCLEAR", BASE_CYCLES),
        (JMP2, "JMP", BASE_CYCLES),
        (CALL2, "CALL", BASE_CYCLES),
        (AND, "AND", BASE_CYCLES),
        (OR, "OR", BASE_CYCLES),
        (XOR, "XOR", BASE_CYCLES),
        (BITC, "BITC", BASE_CYCLES),
        (ADD, "ADD", BASE_CYCLES),
        (ADDC, "ADDC", BASE_CYCLES),
        (SUB, "SUB", BASE_CYCLES),
        (SUBB, "SUBB", BASE_CYCLES),
        (RSB, "RSB", BASE_CYCLES),
        (RSBB, "RSBB", BASE_CYCLES),
        (LLS, "LLS", BASE_CYCLES),
        (RLS, "RLS", BASE_CYCLES),
        (ARS, "ARS", BASE_CYCLES),
        (ROTL, "ROTL", BASE_CYCLES),
        (ROTR, "ROTR", BASE_CYCLES),
        (MUL, "MUL", MUL_CYCLES),
        (SMUL, "SMUL", MUL_CYCLES),
        (DIV, "DIV", DIV_CYCLES),
        (SDIV, "SDIV", DIV_CYCLES),
        (LOAD3, "LOAD", BASE_CYCLES),
        (LOADH3, "LOADH", BASE_CYCLES),
        (LOADB3, "LOADB", BASE_CYCLES),
        (STORE3, "STORE", BASE_CYCLES),
        (STOREH3, "STOREH", BASE_CYCLES),
        (STOREB3, "STOREB", BASE_CYCLES),
    ];

    let mut j = 0;
    while j < DEFINED.len() {
        let (opcode, mnemonic, cycles) = DEFINED[j];
        table[opcode as usize] = def(opcode, mnemonic, cycles);
        j += 1;
    }
    table
}

/// Complete 256-entry opcode metadata table indexed by opcode byte value.
pub const OPCODE_TABLE: [OpcodeMetadata; 256] = build_table();
