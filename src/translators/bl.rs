//! BL (branch with link) translation.
//!
//! The return address lands in r14 only on the taken path, so a conditional
//! BL that fails its test leaves the link register alone.

use super::{branch_condition, branch_target, operands1};
use crate::builder::TranslationBuilder;
use crate::instruction::ArmInstruction;
use crate::operands::WORD_SIZE;
use crate::reil::{ReilInstruction, ReilRegister};
use crate::translator::{condition_prologue, TranslateError};

pub(crate) fn translate(
    tb: &mut TranslationBuilder,
    instruction: &ArmInstruction,
) -> Result<(), TranslateError> {
    condition_prologue(tb, branch_condition(instruction));
    let target = branch_target(tb, operands1(instruction)?)?;
    let return_address = tb.immediate(tb.next_instruction_address() as u64, WORD_SIZE);
    tb.add(ReilInstruction::str(
        return_address,
        ReilRegister::new("r14", WORD_SIZE),
    ));
    let always = tb.immediate(1, 1);
    tb.add(ReilInstruction::jcc(always, target));
    Ok(())
}
