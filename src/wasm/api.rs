//! WASM API for the TR3200 machine.
//!
//! Provides JavaScript-callable interfaces for machine control, register and
//! memory inspection, and snapshots.

use wasm_bindgen::prelude::*;

use crate::{Computer, ComputerConfig, MemoryBus, Snapshot};

/// JavaScript-compatible error wrapper
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsError {
    message: String,
}

#[wasm_bindgen]
impl JsError {
    #[wasm_bindgen(constructor)]
    pub fn new(message: &str) -> JsError {
        JsError {
            message: message.to_string(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }
}

impl<E: std::error::Error> From<E> for JsError {
    fn from(err: E) -> Self {
        JsError {
            message: err.to_string(),
        }
    }
}

/// Browser-facing handle to a complete machine.
#[wasm_bindgen]
pub struct Emulator {
    computer: Computer,
}

#[wasm_bindgen]
impl Emulator {
    /// Creates a machine running `rom`, with `ram_size` bytes of RAM.
    #[wasm_bindgen(constructor)]
    pub fn new(rom: &[u8], ram_size: usize) -> Result<Emulator, JsError> {
        let seed = (js_sys::Math::random() * u32::MAX as f64) as u64;
        let config = ComputerConfig::default()
            .with_rom(rom.to_vec())
            .with_ram_size(ram_size)
            .with_rng_seed(seed);
        Ok(Emulator {
            computer: Computer::new(config)?,
        })
    }

    /// Runs one instruction and returns its cycle cost.
    pub fn step(&mut self) -> u32 {
        self.computer.step()
    }

    /// Runs exactly `cycles` clock cycles.
    pub fn tick(&mut self, cycles: u32) {
        self.computer.tick(cycles);
    }

    pub fn reset(&mut self) {
        self.computer.reset();
    }

    // ========== State Inspection ==========

    #[wasm_bindgen(getter)]
    pub fn pc(&self) -> u32 {
        self.computer.processor().pc()
    }

    #[wasm_bindgen(getter)]
    pub fn sp(&self) -> u32 {
        self.computer.processor().sp()
    }

    #[wasm_bindgen(getter)]
    pub fn flags(&self) -> u32 {
        self.computer.processor().flags()
    }

    /// Total cycles (as f64, JavaScript numbers have no u64).
    #[wasm_bindgen(getter)]
    pub fn cycles(&self) -> f64 {
        self.computer.processor().cycles() as f64
    }

    #[wasm_bindgen(getter)]
    pub fn sleeping(&self) -> bool {
        self.computer.processor().is_sleeping()
    }

    pub fn beep_frequency(&mut self) -> u16 {
        self.computer.beep_frequency()
    }

    pub fn register(&self, index: usize) -> u32 {
        self.computer.processor().register(index)
    }

    /// All 32 registers, r0 first.
    pub fn registers(&self) -> Vec<u32> {
        self.computer.processor().registers().to_vec()
    }

    // ========== Memory ==========

    pub fn read_byte(&mut self, addr: u32) -> u8 {
        self.computer.bus_mut().read_byte(addr)
    }

    pub fn write_byte(&mut self, addr: u32, value: u8) {
        self.computer.bus_mut().write_byte(addr, value);
    }

    /// Reads `len` bytes starting at `addr` (for display buffers in RAM).
    pub fn read_block(&mut self, addr: u32, len: u32) -> Vec<u8> {
        let bus = self.computer.bus_mut();
        (0..len).map(|i| bus.read_byte(addr.wrapping_add(i))).collect()
    }

    /// Copies a program or data into RAM.
    pub fn load_ram(&mut self, addr: u32, bytes: &[u8]) {
        self.computer.load_ram(addr, bytes);
    }

    // ========== Snapshots ==========

    pub fn save_snapshot(&self) -> Vec<u8> {
        self.computer.save_snapshot().to_bytes()
    }

    pub fn load_snapshot(&mut self, bytes: &[u8]) -> Result<(), JsError> {
        let snapshot = Snapshot::from_bytes(bytes)?;
        self.computer.load_snapshot(&snapshot)?;
        Ok(())
    }
}
