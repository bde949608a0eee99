//! LSL (logical shift left) translation.

use super::shift_instruction;
use crate::builder::TranslationBuilder;
use crate::instruction::ArmInstruction;
use crate::operands::ShiftType;
use crate::translator::TranslateError;

pub(crate) fn translate(
    tb: &mut TranslationBuilder,
    instruction: &ArmInstruction,
) -> Result<(), TranslateError> {
    shift_instruction(tb, instruction, ShiftType::Lsl)
}
