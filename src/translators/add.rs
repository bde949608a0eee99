//! ADD translation.

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
    // The result is computed double width so the carry is observable.
    let result = tb.temporal(2 * WORD_SIZE);
    tb.add(ReilInstruction::add(a.clone(), b.clone(), result.clone()));
    tb.write(rd, result.clone())?;
    if flag_setting(instruction) {
        flags::data_proc_add(tb, &a, &b, &result.into());
    }
    Ok(())
}
