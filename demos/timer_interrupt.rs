//! Example: Timer-Driven Interrupt Handler
//!
//! Builds a machine whose ROM programs the embedded interval timer, installs
//! a handler in the RAM vector table and sleeps. Every timer expiry wakes the
//! processor, the handler counts the tick in r5 and returns with RFI.
//!
//! ```text
//! 0x001004: vector for message 1 (timer 0) -> HANDLER
//! 0x100000: main program (setup, then SLEEP / RJMP loop)
//! 0x100100: HANDLER (ADD r5, r5, 1; RFI)
//! 0x11E000: timer reload (write) / 0x11E010: timer control
//! ```
//!
//! Run with `RUST_LOG=tr3200=trace` to watch interrupts being dispatched.

use tr3200::devices::rom::ROM_BASE;
use tr3200::devices::timer::{TIMER0_MSG, TIMER_BASE};
use tr3200::encode::{self, Arg};
use tr3200::registers::{flag, SP};
use tr3200::{opcodes, Computer, ComputerConfig};
use tracing_subscriber::EnvFilter;

const VECTOR_TABLE: u32 = 0x1000;
const HANDLER_OFFSET: usize = 0x100;
const TIMER_PERIOD: u32 = 1_000;

fn build_rom() -> Vec<u8> {
    let handler_addr = ROM_BASE + HANDLER_OFFSET as u32;
    let vector = VECTOR_TABLE + TIMER0_MSG as u32 * 4;

    let mut main = encode::two(opcodes::MOV, SP, Arg::Lit(0x1_F000));
    main.extend(encode::one(opcodes::SETIA, Arg::Lit(VECTOR_TABLE)));
    main.extend(encode::two(opcodes::MOV, 1, Arg::Lit(handler_addr)));
    main.extend(encode::two(opcodes::STORE2, 1, Arg::Lit(vector)));
    // Reload timer 0 and start it with its interrupt enabled
    main.extend(encode::two(opcodes::MOV, 1, Arg::Lit(TIMER_PERIOD)));
    main.extend(encode::two(opcodes::STORE2, 1, Arg::Lit(TIMER_BASE)));
    main.extend(encode::two(opcodes::MOV, 1, Arg::Lit(0b11)));
    main.extend(encode::two(opcodes::STOREB2, 1, Arg::Lit(TIMER_BASE + 0x10)));
    main.extend(encode::one(opcodes::SETF, Arg::Lit(flag::EI)));
    // idle: SLEEP; RJMP idle
    main.extend(encode::zero(opcodes::SLEEP));
    main.extend(encode::one(opcodes::RJMP, Arg::Lit(-8i32 as u32)));

    let mut handler = encode::three(opcodes::ADD, 5, 5, Arg::Lit(1));
    handler.extend(encode::zero(opcodes::RFI));

    let mut rom = encode::to_bytes(&main);
    rom.resize(HANDLER_OFFSET, 0);
    rom.extend(encode::to_bytes(&handler));
    rom
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== TR3200 Timer Interrupt Example ===\n");

    let config = ComputerConfig::default()
        .with_rom(build_rom())
        .with_rng_seed(0);
    let mut computer = match Computer::new(config) {
        Ok(computer) => computer,
        Err(err) => {
            eprintln!("failed to build machine: {err}");
            return;
        }
    };

    println!("Timer period: {} cycles", TIMER_PERIOD);
    println!("Running 10 slices of 2500 cycles...\n");

    for slice in 1..=10 {
        computer.tick(2_500);
        let cpu = computer.processor();
        println!(
            "slice {:2}: cycles={:6} pc=0x{:06X} sleeping={:5} timer interrupts={}",
            slice,
            cpu.cycles(),
            cpu.pc(),
            cpu.is_sleeping(),
            cpu.register(5)
        );
    }

    let expected = computer.processor().cycles() / TIMER_PERIOD as u64;
    println!(
        "\nHandled {} interrupts (about {} expected)",
        computer.processor().register(5),
        expected
    );
}
