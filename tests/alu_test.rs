//! Tests for the 3-operand ALU instructions run through the fetch loop.
//!
//! Tests cover:
//! - Register and literal operands, inline and trailing
//! - Carry and overflow on the add/subtract family
//! - MUL/DIV secondary results in Y and their cycle costs
//! - Division by zero
//! - Shift counts of 32 and above

use tr3200::encode::{self, Arg};
use tr3200::registers::{flag, FLAGS, Y};
use tr3200::{opcodes, FlatMemory, Processor, RESET_VECTOR};

fn setup_cpu(program: &[u32]) -> Processor<FlatMemory> {
    let mut memory = FlatMemory::new();
    memory.load_words(RESET_VECTOR, program);
    Processor::new(memory)
}

// ========== Logic ==========

#[test]
fn test_logic_with_register_operand() {
    let mut program = encode::three(opcodes::AND, 3, 1, Arg::Reg(2));
    program.extend(encode::three(opcodes::OR, 4, 1, Arg::Reg(2)));
    program.extend(encode::three(opcodes::XOR, 5, 1, Arg::Reg(2)));
    program.extend(encode::three(opcodes::BITC, 6, 1, Arg::Reg(2)));
    let mut cpu = setup_cpu(&program);
    cpu.set_register(1, 0b1100);
    cpu.set_register(2, 0b1010);

    for _ in 0..4 {
        assert_eq!(cpu.step(), 3);
    }

    assert_eq!(cpu.register(3), 0b1000);
    assert_eq!(cpu.register(4), 0b1110);
    assert_eq!(cpu.register(5), 0b0110);
    assert_eq!(cpu.register(6), 0b0100);
    assert_eq!(cpu.flags(), 0);
}

#[test]
fn test_inline_literal_is_sign_extended() {
    let program = encode::three(opcodes::ADD, 1, 1, Arg::Lit(-2i32 as u32));
    assert_eq!(program.len(), 1);
    let mut cpu = setup_cpu(&program);
    cpu.set_register(1, 10);

    assert_eq!(cpu.step(), 3);
    assert_eq!(cpu.register(1), 8);
    assert!(cpu.flag_carry());
}

#[test]
fn test_big_literal_costs_extra_cycle() {
    let program = encode::three(opcodes::XOR, 2, 0, Arg::Big(0xDEAD_BEEF));
    let mut cpu = setup_cpu(&program);

    assert_eq!(cpu.step(), 4);
    assert_eq!(cpu.register(2), 0xDEAD_BEEF);
    assert_eq!(cpu.pc(), RESET_VECTOR + 8);
}

// ========== Add / Subtract ==========

#[test]
fn test_add_sets_carry_and_overflow() {
    let mut program = encode::three(opcodes::ADD, 3, 1, Arg::Reg(2));
    program.extend(encode::three(opcodes::ADD, 4, 2, Arg::Reg(2)));
    let mut cpu = setup_cpu(&program);
    cpu.set_register(1, 0xFFFF_FFFF);
    cpu.set_register(2, 0x4000_0000);

    cpu.step();
    assert_eq!(cpu.register(3), 0x3FFF_FFFF);
    assert!(cpu.flag_carry());
    assert!(!cpu.flag_overflow());

    cpu.step();
    assert_eq!(cpu.register(4), 0x8000_0000);
    assert!(!cpu.flag_carry());
    assert!(cpu.flag_overflow());
}

#[test]
fn test_addc_chains_64_bit_add() {
    // (0x1_FFFF_FFFF + 1): low word in r1, high word in r2
    let mut program = encode::three(opcodes::ADD, 1, 1, Arg::Lit(1));
    program.extend(encode::three(opcodes::ADDC, 2, 2, Arg::Lit(0)));
    let mut cpu = setup_cpu(&program);
    cpu.set_register(1, 0xFFFF_FFFF);
    cpu.set_register(2, 1);

    cpu.step();
    cpu.step();
    assert_eq!(cpu.register(1), 0);
    assert_eq!(cpu.register(2), 2);
    assert!(!cpu.flag_carry());
}

#[test]
fn test_sub_and_reverse_sub() {
    let mut program = encode::three(opcodes::SUB, 3, 1, Arg::Lit(7));
    program.extend(encode::three(opcodes::RSB, 4, 1, Arg::Lit(7)));
    let mut cpu = setup_cpu(&program);
    cpu.set_register(1, 5);

    cpu.step();
    assert_eq!(cpu.register(3), -2i32 as u32);
    assert!(cpu.flag_carry());

    cpu.step();
    assert_eq!(cpu.register(4), 2);
    assert!(!cpu.flag_carry());
}

#[test]
fn test_subb_consumes_borrow() {
    let program = encode::three(opcodes::SUBB, 1, 1, Arg::Lit(1));
    let mut cpu = setup_cpu(&program);
    cpu.set_register(1, 10);
    cpu.set_register(FLAGS, flag::CF);

    cpu.step();
    assert_eq!(cpu.register(1), 8);
    assert!(!cpu.flag_carry());
}

#[test]
fn test_logic_leaves_carry_alone() {
    let program = encode::three(opcodes::AND, 1, 1, Arg::Lit(0));
    let mut cpu = setup_cpu(&program);
    cpu.set_register(FLAGS, flag::CF | flag::OF);

    cpu.step();
    assert!(cpu.flag_carry());
    assert!(cpu.flag_overflow());
}

// ========== Multiply / Divide ==========

#[test]
fn test_mul_high_word_in_y() {
    let program = encode::three(opcodes::MUL, 3, 1, Arg::Reg(2));
    let mut cpu = setup_cpu(&program);
    cpu.set_register(1, 0x8000_0000);
    cpu.set_register(2, 6);

    assert_eq!(cpu.step(), 20);
    assert_eq!(cpu.register(3), 0);
    assert_eq!(cpu.register(Y), 3);
}

#[test]
fn test_smul_sign_extends_high_word() {
    let program = encode::three(opcodes::SMUL, 3, 1, Arg::Lit(3));
    let mut cpu = setup_cpu(&program);
    cpu.set_register(1, -5i32 as u32);

    assert_eq!(cpu.step(), 20);
    assert_eq!(cpu.register(3), -15i32 as u32);
    assert_eq!(cpu.register(Y), 0xFFFF_FFFF);
}

#[test]
fn test_div_remainder_in_y() {
    let program = encode::three(opcodes::DIV, 3, 1, Arg::Lit(7));
    let mut cpu = setup_cpu(&program);
    cpu.set_register(1, 100);

    assert_eq!(cpu.step(), 27);
    assert_eq!(cpu.register(3), 14);
    assert_eq!(cpu.register(Y), 2);
    assert!(!cpu.flag_divide_error());
}

#[test]
fn test_sdiv_truncates_toward_zero() {
    let program = encode::three(opcodes::SDIV, 3, 1, Arg::Lit(2));
    let mut cpu = setup_cpu(&program);
    cpu.set_register(1, -7i32 as u32);

    cpu.step();
    assert_eq!(cpu.register(3), -3i32 as u32);
    assert_eq!(cpu.register(Y), -1i32 as u32);
}

#[test]
fn test_divide_by_zero_sets_de_and_keeps_rd() {
    let mut program = encode::three(opcodes::DIV, 3, 1, Arg::Reg(2));
    program.extend(encode::three(opcodes::DIV, 3, 1, Arg::Lit(5)));
    let mut cpu = setup_cpu(&program);
    cpu.set_register(1, 50);
    cpu.set_register(3, 0x1234);

    assert_eq!(cpu.step(), 27);
    assert_eq!(cpu.register(3), 0x1234);
    assert!(cpu.flag_divide_error());

    // A successful division clears DE again
    cpu.step();
    assert_eq!(cpu.register(3), 10);
    assert!(!cpu.flag_divide_error());
}

#[test]
fn test_sdiv_min_by_minus_one_wraps() {
    let program = encode::three(opcodes::SDIV, 3, 1, Arg::Lit(-1i32 as u32));
    let mut cpu = setup_cpu(&program);
    cpu.set_register(1, 0x8000_0000);

    cpu.step();
    assert_eq!(cpu.register(3), 0x8000_0000);
    assert_eq!(cpu.register(Y), 0);
}

// ========== Shifts / Rotates ==========

#[test]
fn test_shift_counts_of_32_and_more() {
    let mut program = encode::three(opcodes::LLS, 3, 1, Arg::Lit(32));
    program.extend(encode::three(opcodes::RLS, 4, 1, Arg::Lit(40)));
    program.extend(encode::three(opcodes::ARS, 5, 2, Arg::Lit(100)));
    let mut cpu = setup_cpu(&program);
    cpu.set_register(1, 0xFFFF_FFFF);
    cpu.set_register(2, 0x8000_0000);

    cpu.step();
    cpu.step();
    cpu.step();
    assert_eq!(cpu.register(3), 0);
    assert_eq!(cpu.register(4), 0);
    assert_eq!(cpu.register(5), 0xFFFF_FFFF);
}

#[test]
fn test_rotates() {
    let mut program = encode::three(opcodes::ROTL, 3, 1, Arg::Lit(4));
    program.extend(encode::three(opcodes::ROTR, 4, 1, Arg::Lit(36)));
    let mut cpu = setup_cpu(&program);
    cpu.set_register(1, 0x1234_5678);

    cpu.step();
    cpu.step();
    assert_eq!(cpu.register(3), 0x2345_6781);
    assert_eq!(cpu.register(4), 0x8123_4567);
}
