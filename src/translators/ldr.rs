//! LDR, LDRB and LDRH translation.
//!
//! The access width comes from the memory operand, so one routine covers
//! the word, byte and halfword loads. Narrow loads zero-extend into the
//! destination register.

use super::operands2;
use crate::builder::TranslationBuilder;
use crate::instruction::ArmInstruction;
use crate::translator::TranslateError;

pub(crate) fn translate(
    tb: &mut TranslationBuilder,
    instruction: &ArmInstruction,
) -> Result<(), TranslateError> {
    let (rt, mem) = operands2(instruction)?;
    // Reading the memory operand performs any base register writeback.
    let value = tb.read(mem)?;
    tb.write(rt, value)?;
    Ok(())
}
