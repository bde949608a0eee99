//! POP translation.
//!
//! Equivalent to a load-multiple-increment-after from SP with writeback:
//! the lowest register comes from the lowest address and SP rises by four
//! bytes per register.

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
            "pop needs a register list",
        ));
    };
    let registers = tb.register_list(list)?;
    let sp = ReilRegister::new("r13", WORD_SIZE);
    let mut address = ReilOperand::Reg(sp.clone());
    for register in registers {
        let value = tb.temporal(register.size);
        tb.add(ReilInstruction::ldm(address.clone(), value.clone()));
        tb.add(ReilInstruction::str(value, register));
        let next = tb.temporal(WORD_SIZE);
        tb.add(ReilInstruction::add(
            address,
            tb.immediate(4, WORD_SIZE),
            next.clone(),
        ));
        address = ReilOperand::Reg(next);
    }
    tb.add(ReilInstruction::str(address, sp));
    Ok(())
}
