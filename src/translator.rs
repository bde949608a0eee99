//! ARM to REIL translation driver.
//!
//! [Translator::translate] turns one decoded ARM instruction into a REIL
//! sequence. The translator builds a fresh [TranslationBuilder], emits the
//! conditional-execution prologue when needed, dispatches to the routine
//! registered for the mnemonic and finalizes the sequence addresses.
//!
//! Unsupported instructions and operand shapes never fail the caller: the
//! output is replaced by a single `unkn` instruction and the event is logged.

use crate::builder::TranslationBuilder;
use crate::condition::Condition;
use crate::flags;
use crate::instruction::{ArmInstruction, ArmMode};
use crate::namer::VariableNamer;
use crate::reil::ReilInstruction;
use crate::translators;
use thiserror::Error;
use tracing::{error, info};

/// Errors raised while translating an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    /// The mnemonic, an operand shape or a shift type is not covered by the
    /// translator. Recovered by emitting a single `unkn` instruction.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
    /// An operand cannot be used where it appears, for instance a malformed
    /// register range or a write to an immediate. Recovered like
    /// [TranslateError::NotImplemented].
    #[error("invalid operand: {0}")]
    InvalidOperand(&'static str),
    /// The translation broke one of its own invariants. Never recovered.
    #[error("internal translation failure: {0}")]
    Internal(String),
}

impl TranslateError {
    /// True for errors recovered by replacing the output with `unkn`.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TranslateError::NotImplemented(_) | TranslateError::InvalidOperand(_)
        )
    }
}

/// Translates decoded ARM instructions to REIL sequences.
///
/// A translator instance is cheap and holds only the temporary name
/// generator, which is reset before every instruction. It is not meant to be
/// shared between threads; independent instances can run in parallel.
pub struct Translator {
    mode: ArmMode,
    namer: VariableNamer,
}

impl Translator {
    pub fn new(mode: ArmMode) -> Self {
        Self {
            mode,
            namer: VariableNamer::new("t"),
        }
    }

    /// Returns the REIL representation of an instruction.
    ///
    /// Each instruction of the result carries the address
    /// `instruction.address << 8 | index`. When the instruction is not
    /// supported the result is a single `unkn` instruction; other failures
    /// are returned to the caller after being logged.
    pub fn translate(
        &mut self,
        instruction: &ArmInstruction,
    ) -> Result<Vec<ReilInstruction>, TranslateError> {
        self.namer.reset();
        match self.lift(instruction) {
            Ok(sequence) => Ok(sequence),
            Err(e) if e.is_recoverable() => {
                info!(
                    mnemonic = %instruction.mnemonic,
                    bytes = %bytes_string(&instruction.bytes),
                    "instruction not supported: {} ({})",
                    instruction,
                    e,
                );
                let mut unkn = ReilInstruction::unkn();
                unkn.address = (instruction.address as u64) << 8;
                Ok(vec![unkn])
            }
            Err(e) => {
                error!(
                    mnemonic = %instruction.mnemonic,
                    bytes = %bytes_string(&instruction.bytes),
                    "failed to translate to REIL: {} ({})",
                    instruction,
                    e,
                );
                Err(e)
            }
        }
    }

    fn lift(
        &mut self,
        instruction: &ArmInstruction,
    ) -> Result<Vec<ReilInstruction>, TranslateError> {
        let mut tb = TranslationBuilder::new(&mut self.namer, self.mode, instruction);
        // Branch routines translate their condition themselves; everything
        // else gets a skip-to-end prologue.
        if !translators::is_branch(&instruction.mnemonic) {
            if let Some(condition) = instruction.condition {
                condition_prologue(&mut tb, condition);
            }
        }
        let routine = translators::lookup(&instruction.mnemonic)
            .ok_or(TranslateError::NotImplemented("mnemonic is not covered"))?;
        routine(&mut tb, instruction)?;
        tb.finalize(instruction.address)
    }
}

/// Emits the conditional-execution prologue: when the inverse condition
/// holds, jump over the whole translation to the first address of the next
/// instruction.
pub(crate) fn condition_prologue(tb: &mut TranslationBuilder, condition: Condition) {
    let Some(inverse) = condition.inverse() else {
        return;
    };
    let skip = flags::condition_passed(tb, inverse);
    let end = tb.immediate(tb.end_address(), 40);
    tb.add(ReilInstruction::jcc(skip, end));
}

fn bytes_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{TranslateError, Translator};
    use crate::condition::Condition;
    use crate::instruction::{ArmInstruction, ArmMode};
    use crate::operands::Operand;
    use crate::registers::RegisterIndex::{R0, R1, R2};
    use crate::reil::{Opcode, ReilOperand};

    #[test]
    fn test_unknown_mnemonic_becomes_unkn() {
        let mut translator = Translator::new(ArmMode::Arm);
        let ins = ArmInstruction {
            address: 0x1000,
            bytes: vec![0x00, 0x01, 0x02, 0x03],
            ..ArmInstruction::new("vadd", vec![])
        };
        let sequence = translator.translate(&ins).unwrap();
        assert_eq!(sequence.len(), 1);
        assert_eq!(sequence[0].opcode, Opcode::Unkn);
        assert_eq!(sequence[0].address, 0x1000 << 8);
    }

    #[test]
    fn test_malformed_operand_becomes_unkn() {
        let mut translator = Translator::new(ArmMode::Arm);
        // A write to an immediate is not translatable.
        let ins = ArmInstruction::new("mov", vec![Operand::imm(1), Operand::imm(2)]);
        let sequence = translator.translate(&ins).unwrap();
        assert_eq!(sequence.len(), 1);
        assert_eq!(sequence[0].opcode, Opcode::Unkn);
    }

    #[test]
    fn test_subaddresses_strictly_increase() {
        let mut translator = Translator::new(ArmMode::Arm);
        let ins = ArmInstruction {
            address: 0x2000,
            ..ArmInstruction::new(
                "adds",
                vec![Operand::reg(R0), Operand::reg(R1), Operand::reg(R2)],
            )
        };
        let sequence = translator.translate(&ins).unwrap();
        assert!(sequence.len() > 1);
        for (i, reil) in sequence.iter().enumerate() {
            assert_eq!(reil.address, 0x2000 << 8 | i as u64);
        }
    }

    #[test]
    fn test_temporaries_unique_within_translation() {
        use std::collections::HashSet;
        let mut translator = Translator::new(ArmMode::Arm);
        let ins = ArmInstruction::new(
            "subs",
            vec![Operand::reg(R0), Operand::reg(R1), Operand::reg(R2)],
        );
        let sequence = translator.translate(&ins).unwrap();
        let mut written: HashSet<String> = HashSet::new();
        for reil in &sequence {
            if matches!(reil.opcode, Opcode::Jcc | Opcode::Stm) {
                continue;
            }
            if let ReilOperand::Reg(dst) = &reil.operands[2] {
                if dst.name.starts_with('t') {
                    assert!(written.insert(dst.name.clone()), "{} reused", dst.name);
                }
            }
        }
    }

    #[test]
    fn test_conditional_prologue_is_first() {
        let mut translator = Translator::new(ArmMode::Arm);
        let ins = ArmInstruction {
            condition: Some(Condition::Equal),
            address: 0x1000,
            ..ArmInstruction::new(
                "add",
                vec![Operand::reg(R0), Operand::reg(R1), Operand::reg(R2)],
            )
        };
        let sequence = translator.translate(&ins).unwrap();
        // The skip test must appear before any architectural write.
        let jcc_at = sequence
            .iter()
            .position(|i| i.opcode == Opcode::Jcc)
            .expect("no jcc in conditional translation");
        let write_at = sequence
            .iter()
            .position(|i| {
                matches!(&i.operands[2], ReilOperand::Reg(r) if r.name == "r0")
            })
            .expect("no write to r0");
        assert!(jcc_at < write_at);
        // The jump lands past the end of this instruction.
        let ReilOperand::Imm(target) = &sequence[jcc_at].operands[2] else {
            panic!("jcc target is not an immediate");
        };
        assert_eq!(target.value, (0x1000 + 4) << 8);
    }

    #[test]
    fn test_internal_errors_surface() {
        // Recoverable errors are the only ones hidden from the caller.
        assert!(TranslateError::NotImplemented("x").is_recoverable());
        assert!(TranslateError::InvalidOperand("x").is_recoverable());
        assert!(!TranslateError::Internal("x".into()).is_recoverable());
    }
}
