//! STM (store multiple, increment after) translation.

use super::operands2;
use crate::builder::TranslationBuilder;
use crate::instruction::ArmInstruction;
use crate::operands::{Operand, WORD_SIZE};
use crate::reil::{ReilInstruction, ReilOperand};
use crate::translator::TranslateError;

pub(crate) fn translate(
    tb: &mut TranslationBuilder,
    instruction: &ArmInstruction,
) -> Result<(), TranslateError> {
    let (base, list) = operands2(instruction)?;
    let Operand::RegList(list) = list else {
        return Err(TranslateError::InvalidOperand(
            "store multiple needs a register list",
        ));
    };
    let registers = tb.register_list(list)?;
    let mut address = tb.read(base)?;
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
    if instruction.writeback {
        tb.write(base, address)?;
    }
    Ok(())
}
