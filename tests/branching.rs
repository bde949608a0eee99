//! Branch translation tests.

mod common;

use armlift::condition::Condition;
use armlift::instruction::ArmInstruction;
use armlift::operands::Operand;
use armlift::registers::RegisterIndex::{Lr, R2};
use common::ReilVm;

fn branch(mnemonic: &str, target: Operand, address: u32) -> ArmInstruction {
    ArmInstruction {
        address,
        ..ArmInstruction::new(mnemonic, vec![target])
    }
}

#[test]
fn test_b_immediate() {
    let mut vm = ReilVm::new();
    let exit = vm.execute(&branch("b", Operand::imm(0x2000), 0x1000));
    assert_eq!(exit, Some(0x2000 << 8));
}

#[test]
fn test_conditional_branch_from_suffix() {
    let mut vm = ReilVm::new();
    vm.set_flag("zf", false);
    // bne with Z clear branches.
    let exit = vm.execute(&branch("bne", Operand::imm(0x2000), 0x1000));
    assert_eq!(exit, Some(0x2000 << 8));
    // bne with Z set falls through.
    vm.set_flag("zf", true);
    let exit = vm.execute(&branch("bne", Operand::imm(0x2000), 0x1000));
    assert_eq!(exit, None);
}

#[test]
fn test_conditional_branch_from_condition_code() {
    let mut vm = ReilVm::new();
    vm.set_flag("cf", true);
    vm.set_flag("zf", false);
    let ins = ArmInstruction {
        condition: Some(Condition::Higher),
        ..branch("b", Operand::imm(0x3000), 0x1000)
    };
    assert_eq!(vm.execute(&ins), Some(0x3000 << 8));
    // HI fails when Z is set.
    vm.set_flag("zf", true);
    assert_eq!(vm.execute(&ins), None);
}

#[test]
fn test_bl_links_and_branches() {
    let mut vm = ReilVm::new();
    let exit = vm.execute(&branch("bl", Operand::imm(0x8000), 0x1000));
    assert_eq!(exit, Some(0x8000 << 8));
    assert_eq!(vm.reg("r14"), 0x1004);
}

#[test]
fn test_conditional_bl_untaken_leaves_link_register() {
    let mut vm = ReilVm::new();
    vm.set_reg("r14", 0xdead);
    vm.set_flag("zf", true);
    let ins = ArmInstruction {
        condition: Some(Condition::NotEqual),
        ..branch("bl", Operand::imm(0x8000), 0x1000)
    };
    let exit = vm.execute(&ins);
    // The skip prologue exits at the next instruction.
    assert_eq!(exit, Some(0x1004 << 8));
    assert_eq!(vm.reg("r14"), 0xdead);
}

#[test]
fn test_bx_register() {
    let mut vm = ReilVm::new();
    vm.set_reg("r14", 0x3000);
    let exit = vm.execute(&branch("bx", Operand::reg(Lr), 0x1000));
    assert_eq!(exit, Some(0x3000 << 8));
}

#[test]
fn test_blx_register_links() {
    let mut vm = ReilVm::new();
    vm.set_reg("r2", 0x5000);
    let exit = vm.execute(&branch("blx", Operand::reg(R2), 0x1000));
    assert_eq!(exit, Some(0x5000 << 8));
    assert_eq!(vm.reg("r14"), 0x1004);
}

#[test]
fn test_bal_branches_unconditionally() {
    let mut vm = ReilVm::new();
    let exit = vm.execute(&branch("bal", Operand::imm(0x2000), 0x1000));
    assert_eq!(exit, Some(0x2000 << 8));
}

#[test]
fn test_untaken_branch_preserves_state() {
    let mut vm = ReilVm::new();
    vm.set_reg("r14", 7);
    vm.set_flags(false, false, false, false);
    let exit = vm.execute(&branch("beq", Operand::imm(0x2000), 0x1000));
    assert_eq!(exit, None);
    assert_eq!(vm.reg("r14"), 7);
    assert!(!vm.flag("zf"));
}
