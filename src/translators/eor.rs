//! EOR (exclusive or) translation.

use super::{flag_setting, operands3};
use crate::builder::TranslationBuilder;
use crate::flags;
use crate::instruction::ArmInstruction;
use crate::operands::WORD_SIZE;
use crate::reil::ReilOperand;
use crate::translator::TranslateError;

pub(crate) fn translate(
    tb: &mut TranslationBuilder,
    instruction: &ArmInstruction,
) -> Result<(), TranslateError> {
    let (rd, rn, rm) = operands3(instruction)?;
    let a = tb.read(rn)?;
    let b = tb.read(rm)?;
    let result = ReilOperand::Reg(tb.xor_regs(a, b));
    tb.write(rd, result.clone())?;
    if flag_setting(instruction) {
        flags::data_proc_logical(tb, rm, WORD_SIZE, &result)?;
    }
    Ok(())
}
