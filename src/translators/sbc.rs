//! SBC (subtract with carry) translation.

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
    let diff = tb.temporal(2 * WORD_SIZE);
    tb.add(ReilInstruction::sub(a.clone(), b.clone(), diff.clone()));
    // A clear carry borrows one more.
    let borrow = tb.negate_reg(flags::cf());
    let result = tb.temporal(2 * WORD_SIZE);
    tb.add(ReilInstruction::sub(diff, borrow, result.clone()));
    tb.write(rd, result.clone())?;
    if flag_setting(instruction) {
        flags::data_proc_sub(tb, &a, &b, &result.into());
    }
    Ok(())
}
