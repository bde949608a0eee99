//! B (branch) translation, covering the condition-suffixed forms.
//!
//! The branch test is part of the translation itself: a `jcc` on the
//! condition predicate targets the branch destination, and execution falls
//! through to the next instruction otherwise.

use super::{branch_condition, branch_target, operands1};
use crate::builder::TranslationBuilder;
use crate::condition::Condition;
use crate::flags;
use crate::instruction::ArmInstruction;
use crate::reil::{ReilInstruction, ReilOperand};
use crate::translator::TranslateError;

pub(crate) fn translate(
    tb: &mut TranslationBuilder,
    instruction: &ArmInstruction,
) -> Result<(), TranslateError> {
    let condition = branch_condition(instruction);
    let target = branch_target(tb, operands1(instruction)?)?;
    let predicate: ReilOperand = match condition {
        Condition::Always => tb.immediate(1, 1).into(),
        condition => flags::condition_passed(tb, condition).into(),
    };
    tb.add(ReilInstruction::jcc(predicate, target));
    Ok(())
}
