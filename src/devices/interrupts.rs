//! Interrupt routing types.
//!
//! Peripherals assert interrupts by returning a message from
//! `does_interrupt()`. Each bus tick the machine polls the sources in a fixed
//! priority order and offers the first asserted message to the processor:
//!
//! 1. Range handlers, in registration order (the interval timer is registered
//!    first and therefore wins)
//! 2. Occupied device slots, ascending
//!
//! At most one interrupt is forwarded per tick. A source is acknowledged only
//! when the processor accepts its message; otherwise it keeps asserting and is
//! offered again on a later tick.
//!
//! The processor uses the low byte of the message to index the vector table at
//! `IA`, and hands the full message to the handler in r0.

use super::RangeId;

/// Where an interrupt request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterruptSource {
    /// A range handler (embedded peripheral).
    Handler(RangeId),
    /// The device in the given slot.
    Slot(usize),
}

/// An asserted interrupt found by polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptRequest {
    pub source: InterruptSource,
    pub message: u16,
}
