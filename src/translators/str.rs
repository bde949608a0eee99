//! STR, STRB and STRH translation.
//!
//! The stored width comes from the memory operand; narrow stores keep the
//! low bits of the source register.

use super::operands2;
use crate::builder::TranslationBuilder;
use crate::instruction::ArmInstruction;
use crate::translator::TranslateError;

pub(crate) fn translate(
    tb: &mut TranslationBuilder,
    instruction: &ArmInstruction,
) -> Result<(), TranslateError> {
    let (rt, mem) = operands2(instruction)?;
    let value = tb.read(rt)?;
    tb.write(mem, value)?;
    Ok(())
}
