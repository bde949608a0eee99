//! TST translation. Flags of an AND, no destination.

use super::operands2;
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
    let (rn, rm) = operands2(instruction)?;
    let a = tb.read(rn)?;
    let b = tb.read(rm)?;
    let result = ReilOperand::Reg(tb.and_regs(a, b));
    flags::data_proc_logical(tb, rm, WORD_SIZE, &result)
}
