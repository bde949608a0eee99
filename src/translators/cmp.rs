//! CMP translation. Flags of a subtraction, no destination.

use super::operands2;
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
    let (rn, rm) = operands2(instruction)?;
    let a = tb.read(rn)?;
    let b = tb.read(rm)?;
    let result = tb.temporal(2 * WORD_SIZE);
    tb.add(ReilInstruction::sub(a.clone(), b.clone(), result.clone()));
    flags::data_proc_sub(tb, &a, &b, &result.into());
    Ok(())
}
