//! Fuzz target for whole-machine execution.
//!
//! Runs an arbitrary ROM image for an arbitrary number of cycles with the
//! embedded peripherals mapped. Tick and step must never panic, whatever the
//! program pokes into the timer, RNG or enumeration space.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tr3200::{Computer, ComputerConfig};

fuzz_target!(|input: (Vec<u8>, u16, u8)| {
    let (rom, cycles, steps) = input;
    let rom = rom.into_iter().take(64 * 1024).collect::<Vec<u8>>();
    let config = ComputerConfig::default().with_rom(rom).with_rng_seed(0);
    let Ok(mut computer) = Computer::new(config) else {
        return;
    };

    computer.tick(cycles as u32);
    for _ in 0..steps {
        computer.step();
    }
});
