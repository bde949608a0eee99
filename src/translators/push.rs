//! PUSH translation.
//!
//! Equivalent to a store-multiple-decrement-before with SP writeback: the
//! registers land below the current stack pointer, lowest register at the
//! lowest address, and SP drops by four bytes per register.

use super::operands1;
use crate::builder::TranslationBuilder;
use crate::instruction::ArmInstruction;
use crate::operands::{Operand, WORD_SIZE};
use crate::reil::{ReilInstruction, ReilOperand, ReilRegister};
use crate::translator::TranslateError;

pub(crate) fn translate(
    tb: &mut TranslationBuilder,
    instruction: &ArmInstruction,
) -> Result<(), TranslateError> {
    let Operand::RegList(list) = operands1(instruction)? else {
        return Err(TranslateError::InvalidOperand(
            "push needs a register list",
        ));
    };
    let registers = tb.register_list(list)?;
    let sp = ReilRegister::new("r13", WORD_SIZE);
    let new_sp = tb.temporal(WORD_SIZE);
    tb.add(ReilInstruction::sub(
        sp.clone(),
        tb.immediate(4 * registers.len() as u64, WORD_SIZE),
        new_sp.clone(),
    ));
    let mut address = ReilOperand::Reg(new_sp.clone());
    for register in registers {
        tb.add(ReilInstruction::stm(register, address.clone()));
        let next = tb.temporal(WORD_SIZE);
        tb.add(ReilInstruction::add(
            address,
            tb.immediate(4, WORD_SIZE),
            next.clone(),
        ));
        address = ReilOperand::Reg(next);
    }
    // SP is updated once, after the stores.
    tb.add(ReilInstruction::str(new_sp, sp));
    Ok(())
}
