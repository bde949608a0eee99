//! NOP translation.

use crate::builder::TranslationBuilder;
use crate::instruction::ArmInstruction;
use crate::reil::ReilInstruction;
use crate::translator::TranslateError;

pub(crate) fn translate(
    tb: &mut TranslationBuilder,
    _instruction: &ArmInstruction,
) -> Result<(), TranslateError> {
    tb.add(ReilInstruction::nop());
    Ok(())
}
