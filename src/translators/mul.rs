//! MUL translation.

use super::{flag_setting, operands3};
use crate::builder::TranslationBuilder;
use crate::flags;
use crate::instruction::ArmInstruction;
use crate::operands::WORD_SIZE;
use crate::reil::ReilInstruction;
use crate::translator::TranslateError;

pub(crate) fn translate(
    tb: &mut TranslationBuilder,
    instruction: &ArmInstruction,
) -> Result<(), TranslateError> {
    let (rd, rn, rm) = operands3(instruction)?;
    let a = tb.read(rn)?;
    let b = tb.read(rm)?;
    let result = tb.temporal(2 * WORD_SIZE);
    tb.add(ReilInstruction::mul(a, b, result.clone()));
    tb.write(rd, result.clone())?;
    if flag_setting(instruction) {
        // C and V are untouched.
        flags::data_proc_nz(tb, WORD_SIZE, &result.into());
    }
    Ok(())
}
