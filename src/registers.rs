//! # Register File Conventions and Flag Bits
//!
//! The processor has 32 general-purpose 32-bit registers. None is hard-wired;
//! a few carry conventional roles that instructions rely on:
//!
//! | Register | Role |
//! |----------|------|
//! | r27 (`Y`) | secondary result of MUL/DIV |
//! | r28 (`IA`) | interrupt vector table base |
//! | r29 (`FLAGS`) | flags word |
//! | r30 (`BP`) | frame/base pointer |
//! | r31 (`SP`) | stack pointer |

/// Number of general-purpose registers.
pub const REGISTER_COUNT: usize = 32;

/// Secondary result register for MUL/DIV.
pub const Y: usize = 27;

/// Interrupt vector base address register.
pub const IA: usize = 28;

/// Flags word register.
pub const FLAGS: usize = 29;

/// Frame/base pointer.
pub const BP: usize = 30;

/// Stack pointer.
pub const SP: usize = 31;

/// Bit masks of the flags word.
pub mod flag {
    /// Carry (or borrow) out of bit 31.
    pub const CF: u32 = 1 << 0;
    /// Signed overflow.
    pub const OF: u32 = 1 << 1;
    /// A division by zero happened.
    pub const DE: u32 = 1 << 2;
    /// An interrupt is being serviced.
    pub const IF: u32 = 1 << 3;
    /// Interrupts are accepted.
    pub const EI: u32 = 1 << 8;
    /// Single-step trace interrupt after each instruction.
    pub const ESS: u32 = 1 << 9;
}
