//! MVN (bitwise not) translation.

use super::{flag_setting, operands2};
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
    let (rd, src) = operands2(instruction)?;
    let value = tb.read(src)?;
    let result = ReilOperand::Reg(tb.negate_reg(value));
    tb.write(rd, result.clone())?;
    if flag_setting(instruction) {
        flags::data_proc_logical(tb, src, WORD_SIZE, &result)?;
    }
    Ok(())
}
