//! Per-mnemonic translation routines.
//!
//! Each supported instruction family has its own submodule exposing a
//! `translate` function with the common [TranslateFn] signature. The
//! [lookup] table maps mnemonics to routines; flag-setting "s" forms map to
//! the same routine as their plain form and are told apart by the mnemonic
//! suffix.

use crate::builder::TranslationBuilder;
use crate::condition::Condition;
use crate::instruction::ArmInstruction;
use crate::operands::{Operand, ShiftAmount, ShiftType, ShiftedRegisterOperand};
use crate::reil::{ReilInstruction, ReilOperand};
use crate::translator::TranslateError;

pub mod adc;
pub mod add;
pub mod and;
pub mod asr;
pub mod b;
pub mod bic;
pub mod bl;
pub mod blx;
pub mod bx;
pub mod cmn;
pub mod cmp;
pub mod eor;
pub mod ldm;
pub mod ldr;
pub mod lsl;
pub mod lsr;
pub mod mov;
pub mod mul;
pub mod mvn;
pub mod nop;
pub mod orr;
pub mod pop;
pub mod push;
pub mod ror;
pub mod rrx;
pub mod rsb;
pub mod sbc;
pub mod stm;
pub mod str;
pub mod sub;
pub mod teq;
pub mod tst;

/// Signature shared by every translation routine.
pub(crate) type TranslateFn =
    fn(&mut TranslationBuilder, &ArmInstruction) -> Result<(), TranslateError>;

/// Returns the translation routine registered for a mnemonic, or None when
/// the instruction is not covered.
pub(crate) fn lookup(mnemonic: &str) -> Option<TranslateFn> {
    Some(match mnemonic {
        "adc" | "adcs" => adc::translate,
        "add" | "adds" => add::translate,
        "and" | "ands" => and::translate,
        "asr" | "asrs" => asr::translate,
        "b" | "beq" | "bne" | "bcs" | "bhs" | "bcc" | "blo" | "bmi" | "bpl" | "bvs" | "bvc"
        | "bhi" | "bls" | "bge" | "blt" | "bgt" | "ble" | "bal" => b::translate,
        "bic" | "bics" => bic::translate,
        "bl" => bl::translate,
        "blx" => blx::translate,
        "bx" => bx::translate,
        "cmn" => cmn::translate,
        "cmp" => cmp::translate,
        "eor" | "eors" => eor::translate,
        "ldm" | "ldmia" | "ldmfd" => ldm::translate,
        "ldr" | "ldrb" | "ldrh" => ldr::translate,
        "lsl" | "lsls" => lsl::translate,
        "lsr" | "lsrs" => lsr::translate,
        "mov" | "movs" => mov::translate,
        "mul" | "muls" => mul::translate,
        "mvn" | "mvns" => mvn::translate,
        "nop" => nop::translate,
        "orr" | "orrs" => orr::translate,
        "pop" => pop::translate,
        "push" => push::translate,
        "ror" | "rors" => ror::translate,
        "rrx" | "rrxs" => rrx::translate,
        "rsb" | "rsbs" => rsb::translate,
        "sbc" | "sbcs" => sbc::translate,
        "stm" | "stmia" | "stmea" => stm::translate,
        "str" | "strb" | "strh" => self::str::translate,
        "sub" | "subs" => sub::translate,
        "teq" => teq::translate,
        "tst" => tst::translate,
        _ => return None,
    })
}

/// True for the branch family, whose routines translate their own condition
/// instead of receiving the skip-to-end prologue.
pub(crate) fn is_branch(mnemonic: &str) -> bool {
    matches!(mnemonic, "b" | "bl" | "bx" | "blx")
        || mnemonic
            .strip_prefix('b')
            .is_some_and(|suffix| Condition::from_suffix(suffix).is_some())
}

/// True when the instruction updates the condition flags.
pub(crate) fn flag_setting(instruction: &ArmInstruction) -> bool {
    instruction.mnemonic.ends_with('s')
}

/// Condition of a branch instruction: the explicit condition code when
/// present, the mnemonic suffix otherwise, and AL as the default.
pub(crate) fn branch_condition(instruction: &ArmInstruction) -> Condition {
    instruction
        .condition
        .or_else(|| {
            instruction
                .mnemonic
                .strip_prefix('b')
                .and_then(Condition::from_suffix)
        })
        .unwrap_or(Condition::Always)
}

/// REIL jump target of a branch operand. Immediate targets are absolute
/// addresses shifted into the REIL address space; register targets are
/// widened and shifted at run time.
pub(crate) fn branch_target(
    tb: &mut TranslationBuilder,
    operand: &Operand,
) -> Result<ReilOperand, TranslateError> {
    match operand {
        Operand::Imm(imm) => Ok(ReilOperand::Imm(tb.immediate(imm.value << 8, 40))),
        Operand::Reg(_) => {
            let value = tb.read(operand)?;
            let target = tb.temporal(40);
            tb.add(ReilInstruction::bsh(
                value,
                tb.immediate(8, 40),
                target.clone(),
            ));
            Ok(ReilOperand::Reg(target))
        }
        _ => Err(TranslateError::InvalidOperand(
            "unsupported branch target operand",
        )),
    }
}

/// The single operand of an instruction such as PUSH.
pub(crate) fn operands1(
    instruction: &ArmInstruction,
) -> Result<&Operand, TranslateError> {
    match instruction.operands.as_slice() {
        [op] => Ok(op),
        _ => Err(TranslateError::InvalidOperand("expected one operand")),
    }
}

/// The two operands of moves, compares and loads.
pub(crate) fn operands2(
    instruction: &ArmInstruction,
) -> Result<(&Operand, &Operand), TranslateError> {
    match instruction.operands.as_slice() {
        [a, b] => Ok((a, b)),
        _ => Err(TranslateError::InvalidOperand("expected two operands")),
    }
}

/// The three operands of data-processing instructions. The two-operand form
/// reuses the destination as first source, so `add r0, r1` reads as
/// `add r0, r0, r1`.
pub(crate) fn operands3(
    instruction: &ArmInstruction,
) -> Result<(&Operand, &Operand, &Operand), TranslateError> {
    match instruction.operands.as_slice() {
        [d, m] => Ok((d, d, m)),
        [d, n, m] => Ok((d, n, m)),
        _ => Err(TranslateError::InvalidOperand(
            "expected two or three operands",
        )),
    }
}

/// Common translation of the shift mnemonics (LSL, LSR, ASR, ROR, RRX): the
/// shifted value moves to the destination, and the "s" forms take N and Z
/// from the result and C from the shifter.
pub(crate) fn shift_instruction(
    tb: &mut TranslationBuilder,
    instruction: &ArmInstruction,
    shift: ShiftType,
) -> Result<(), TranslateError> {
    let (rd, rn, amount) = if shift == ShiftType::Rrx {
        let (rd, rn) = operands2(instruction)?;
        (rd, rn, None)
    } else {
        let (rd, rn, amount) = operands3(instruction)?;
        (rd, rn, Some(amount))
    };
    let Operand::Reg(base) = rn else {
        return Err(TranslateError::InvalidOperand(
            "shift source must be a register",
        ));
    };
    let amount = match amount {
        None => Some(ShiftAmount::Imm(crate::operands::ImmediateOperand::new(
            1,
            base.size,
        ))),
        Some(Operand::Imm(imm)) => Some(ShiftAmount::Imm(*imm)),
        Some(Operand::Reg(reg)) => Some(ShiftAmount::Reg(*reg)),
        Some(_) => {
            return Err(TranslateError::InvalidOperand(
                "unsupported shift amount operand",
            ))
        }
    };
    let shifted = Operand::Shifted(ShiftedRegisterOperand {
        base: *base,
        shift,
        amount,
        size: base.size,
    });
    let value = tb.read(&shifted)?;
    tb.write(rd, value.clone())?;
    if flag_setting(instruction) {
        crate::flags::data_proc_logical(tb, &shifted, base.size, &value)?;
    }
    Ok(())
}
