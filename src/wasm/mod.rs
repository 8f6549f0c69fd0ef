//! WebAssembly bindings for the TR3200 machine.
//!
//! This module provides JavaScript-callable interfaces to the emulator, for
//! browser front-ends that render a display or debugger around it.

pub mod api;

pub use api::Emulator;
