//! Condition flag updates.
//!
//! ARM data-processing instructions update the N, Z, C and V flags of the
//! APSR. At the REIL level the four flags are plain 1-bit registers with
//! well-known names, written directly by the translated code.
//!
//! Updates are grouped by instruction class: additions and subtractions
//! derive C and V from a double-width result, logical operations take C from
//! the barrel shifter carry-out and leave V, multiplications only touch N
//! and Z.

use crate::builder::TranslationBuilder;
use crate::operands::{Operand, ShiftAmount, ShiftType, ShiftedRegisterOperand};
use crate::reil::{bit_mask, ReilInstruction, ReilOperand, ReilRegister};
use crate::translator::TranslateError;

/// Negative flag register.
pub fn nf() -> ReilRegister {
    ReilRegister::new("nf", 1)
}

/// Zero flag register.
pub fn zf() -> ReilRegister {
    ReilRegister::new("zf", 1)
}

/// Carry flag register.
pub fn cf() -> ReilRegister {
    ReilRegister::new("cf", 1)
}

/// Overflow flag register.
pub fn vf() -> ReilRegister {
    ReilRegister::new("vf", 1)
}

/// N is the sign bit of the low `size` bits of the result.
pub(crate) fn update_nf(tb: &mut TranslationBuilder, size: u32, result: &ReilOperand) {
    let sign = tb.extract_bit(result, size - 1);
    tb.add(ReilInstruction::str(sign, nf()));
}

/// Z is set when the low `size` bits of the result are all zero.
pub(crate) fn update_zf(tb: &mut TranslationBuilder, size: u32, result: &ReilOperand) {
    let mask = tb.immediate(bit_mask(size), result.size());
    let low = tb.temporal(size);
    tb.add(ReilInstruction::and(result, mask, low.clone()));
    tb.add(ReilInstruction::bisz(low, zf()));
}

/// C is the carry out of an addition, found at bit `size` of the
/// double-width result.
pub(crate) fn carry_from(tb: &mut TranslationBuilder, size: u32, result: &ReilOperand) {
    debug_assert_eq!(result.size(), size * 2);
    let carry = tb.extract_bit(result, size);
    tb.add(ReilInstruction::str(carry, cf()));
}

/// V for an addition: both operands have the same sign and the result sign
/// differs.
pub(crate) fn overflow_from_add(
    tb: &mut TranslationBuilder,
    a: &ReilOperand,
    b: &ReilOperand,
    result: &ReilOperand,
) {
    let sign = a.size() - 1;
    let a_sign = tb.extract_bit(a, sign);
    let b_sign = tb.extract_bit(b, sign);
    let result_sign = tb.extract_bit(result, sign);
    let same_operands = tb.equal_regs(a_sign.clone(), b_sign);
    let result_differs = tb.unequal_regs(a_sign, result_sign);
    let overflow = tb.and_regs(same_operands, result_differs);
    tb.add(ReilInstruction::str(overflow, vf()));
}

/// V for a subtraction.
pub(crate) fn overflow_from_sub(
    tb: &mut TranslationBuilder,
    a: &ReilOperand,
    b: &ReilOperand,
    result: &ReilOperand,
) {
    let overflow = tb.overflow_from_sub(a, b, result);
    tb.add(ReilInstruction::str(overflow, vf()));
}

/// Flag updates of flag-setting additions (ADD, ADC, CMN).
pub(crate) fn data_proc_add(
    tb: &mut TranslationBuilder,
    a: &ReilOperand,
    b: &ReilOperand,
    result: &ReilOperand,
) {
    let size = a.size();
    update_zf(tb, size, result);
    update_nf(tb, size, result);
    carry_from(tb, size, result);
    overflow_from_add(tb, a, b, result);
}

/// Flag updates of flag-setting subtractions (SUB, SBC, RSB, CMP).
pub(crate) fn data_proc_sub(
    tb: &mut TranslationBuilder,
    a: &ReilOperand,
    b: &ReilOperand,
    result: &ReilOperand,
) {
    let size = a.size();
    update_zf(tb, size, result);
    update_nf(tb, size, result);
    carry_from(tb, size, result);
    // The ARM carry flag is the complement of the borrow, so that SBC and
    // RSC can consume it directly.
    let no_borrow = tb.negate_reg(cf());
    tb.add(ReilInstruction::str(no_borrow, cf()));
    overflow_from_sub(tb, a, b, result);
}

/// Flag updates of flag-setting logical operations (AND, ORR, EOR, BIC,
/// MOV, MVN, TST, TEQ). C comes from the barrel shifter applied to the
/// second operand, V is left untouched.
pub(crate) fn data_proc_logical(
    tb: &mut TranslationBuilder,
    shifter: &Operand,
    size: u32,
    result: &ReilOperand,
) -> Result<(), TranslateError> {
    update_zf(tb, size, result);
    update_nf(tb, size, result);
    carry_out(tb, shifter)
}

/// Flag updates of MUL and friends: N and Z only, C and V untouched.
pub(crate) fn data_proc_nz(tb: &mut TranslationBuilder, size: u32, result: &ReilOperand) {
    update_zf(tb, size, result);
    update_nf(tb, size, result);
}

/// Emits a set of `flag` to one.
pub fn set_flag(tb: &mut TranslationBuilder, flag: ReilRegister) {
    let one = tb.immediate(1, flag.size);
    tb.add(ReilInstruction::str(one, flag));
}

/// Emits a clear of `flag` to zero.
pub fn clear_flag(tb: &mut TranslationBuilder, flag: ReilRegister) {
    let zero = tb.immediate(0, flag.size);
    tb.add(ReilInstruction::str(zero, flag));
}

/// Applied when the architecture leaves a flag undefined. On every tested
/// processor an undefined flag reads as zero, so the flag is cleared rather
/// than randomized.
pub fn undefine_flag(tb: &mut TranslationBuilder, flag: ReilRegister) {
    clear_flag(tb, flag);
}

// Shifter carry out.
// ========================================================================

/// Updates C with the carry out of the barrel shifter for the second operand
/// of a logical data-processing instruction. Immediate and plain register
/// operands leave C untouched.
pub(crate) fn carry_out(
    tb: &mut TranslationBuilder,
    operand: &Operand,
) -> Result<(), TranslateError> {
    match operand {
        Operand::Imm(_) | Operand::Reg(_) => Ok(()),
        Operand::Shifted(shifted) => shifter_carry_out(tb, shifted),
        _ => Err(TranslateError::InvalidOperand(
            "operand cannot produce a shifter carry",
        )),
    }
}

fn shifter_carry_out(
    tb: &mut TranslationBuilder,
    operand: &ShiftedRegisterOperand,
) -> Result<(), TranslateError> {
    let base = tb.register_value(&operand.base);
    let size = base.size();
    let Some(amount) = &operand.amount else {
        return Ok(());
    };
    match amount {
        ShiftAmount::Imm(imm) => {
            let amount = imm.value as u32;
            if amount == 0 && operand.shift != ShiftType::Rrx {
                return Ok(());
            }
            let carry = match operand.shift {
                // carry_out = base[size - amount]
                ShiftType::Lsl => {
                    if amount > size {
                        clear_flag(tb, cf());
                        return Ok(());
                    }
                    tb.extract_bit(base, size - amount)
                }
                // carry_out = base[amount - 1], the last bit shifted out.
                ShiftType::Lsr | ShiftType::Asr => {
                    if amount > size {
                        match operand.shift {
                            ShiftType::Lsr => clear_flag(tb, cf()),
                            _ => {
                                let sign = tb.extract_bit(base, size - 1);
                                tb.add(ReilInstruction::str(sign, cf()));
                            }
                        }
                        return Ok(());
                    }
                    tb.extract_bit(base, amount - 1)
                }
                ShiftType::Ror => {
                    let turn = amount % size;
                    if turn == 0 {
                        tb.extract_bit(base, size - 1)
                    } else {
                        tb.extract_bit(base, turn - 1)
                    }
                }
                ShiftType::Rrx => tb.extract_bit(base, 0),
            };
            tb.add(ReilInstruction::str(carry, cf()));
            Ok(())
        }
        ShiftAmount::Reg(reg) => {
            let amount = tb.register_value(reg);
            register_amount_carry_out(tb, operand.shift, base, amount, size)
        }
    }
}

/// Carry out when the shift amount comes from a register. Only the bottom
/// byte of the register is significant, and three cases arise: a zero
/// amount leaves C, an in-range amount extracts the last bit shifted out,
/// and an over-range amount has a constant answer per shift type.
fn register_amount_carry_out(
    tb: &mut TranslationBuilder,
    shift: ShiftType,
    base: ReilOperand,
    amount: ReilOperand,
    size: u32,
) -> Result<(), TranslateError> {
    let carry = tb.temporal(1);
    tb.add(ReilInstruction::str(cf(), carry.clone()));
    let amount = tb.and_regs(amount, tb.immediate(0xff, size));

    let end = tb.label("carry_end");
    let over = tb.label("carry_over");

    // A zero amount keeps the current C flag, already in the temporary.
    tb.jump_if_zero(amount.clone(), &end);

    match shift {
        ShiftType::Lsl => {
            let too_large =
                tb.greater_than_or_equal(amount.clone(), tb.immediate(33, size));
            tb.jump_if(too_large, &over);
            // 1 <= amount <= 32: carry_out = base[size - amount]
            let bit = tb.temporal(size);
            tb.add(ReilInstruction::sub(
                tb.immediate(size as u64, size),
                amount,
                bit.clone(),
            ));
            let out = tb.extract_bit_with_register(base, &bit);
            tb.add(ReilInstruction::str(out, carry.clone()));
            tb.jump_to(&end);
            // amount > 32: carry_out = 0
            tb.mark(over);
            tb.add(ReilInstruction::str(tb.immediate(0, 1), carry.clone()));
        }
        ShiftType::Lsr | ShiftType::Asr => {
            let too_large =
                tb.greater_than_or_equal(amount.clone(), tb.immediate(33, size));
            tb.jump_if(too_large, &over);
            // 1 <= amount <= 32: carry_out = base[amount - 1]
            let bit = tb.temporal(size);
            tb.add(ReilInstruction::sub(
                amount,
                tb.immediate(1, size),
                bit.clone(),
            ));
            let out = tb.extract_bit_with_register(base.clone(), &bit);
            tb.add(ReilInstruction::str(out, carry.clone()));
            tb.jump_to(&end);
            tb.mark(over);
            match shift {
                // amount > 32: every bit shifted out is zero
                ShiftType::Lsr => {
                    tb.add(ReilInstruction::str(tb.immediate(0, 1), carry.clone()))
                }
                // amount > 32: the sign bit repeats forever
                _ => {
                    let sign = tb.extract_bit(base, size - 1);
                    tb.add(ReilInstruction::str(sign, carry.clone()));
                }
            }
        }
        ShiftType::Ror => {
            let turn = tb.and_regs(amount, tb.immediate((size - 1) as u64, size));
            // A rotation by a multiple of the width moves the top bit into
            // the carry.
            tb.jump_if_zero(turn.clone(), &over);
            let bit = tb.temporal(size);
            tb.add(ReilInstruction::sub(
                turn,
                tb.immediate(1, size),
                bit.clone(),
            ));
            let out = tb.extract_bit_with_register(base.clone(), &bit);
            tb.add(ReilInstruction::str(out, carry.clone()));
            tb.jump_to(&end);
            tb.mark(over);
            let sign = tb.extract_bit(base, size - 1);
            tb.add(ReilInstruction::str(sign, carry.clone()));
        }
        _ => {
            return Err(TranslateError::NotImplemented(
                "shifter carry with register amount",
            ))
        }
    }

    tb.mark(end);
    tb.add(ReilInstruction::str(carry, cf()));
    Ok(())
}

// Condition predicates.
// ========================================================================

/// 1-bit predicate of an execution condition, evaluated from the current
/// flag registers. Must not be called for [Condition::Always].
///
/// [Condition::Always]: crate::condition::Condition::Always
pub(crate) fn condition_passed(
    tb: &mut TranslationBuilder,
    condition: crate::condition::Condition,
) -> ReilRegister {
    use crate::condition::Condition;
    match condition {
        Condition::Equal => zf(),
        Condition::NotEqual => tb.negate_reg(zf()),
        Condition::CarrySet => cf(),
        Condition::CarryClear => tb.negate_reg(cf()),
        Condition::Minus => nf(),
        Condition::Plus => tb.negate_reg(nf()),
        Condition::Overflow => vf(),
        Condition::NoOverflow => tb.negate_reg(vf()),
        Condition::Higher => {
            let not_zero = tb.negate_reg(zf());
            tb.and_regs(cf(), not_zero)
        }
        Condition::LowerOrSame => {
            let no_carry = tb.negate_reg(cf());
            tb.or_regs(no_carry, zf())
        }
        Condition::GreaterThanOrEqual => tb.equal_regs(nf(), vf()),
        Condition::LessThan => tb.unequal_regs(nf(), vf()),
        Condition::GreaterThan => {
            let not_zero = tb.negate_reg(zf());
            let signs_match = tb.equal_regs(nf(), vf());
            tb.and_regs(not_zero, signs_match)
        }
        Condition::LessThanOrEqual => {
            let signs_differ = tb.unequal_regs(nf(), vf());
            tb.or_regs(zf(), signs_differ)
        }
        Condition::Always => panic!("no predicate for the always condition"),
    }
}

#[cfg(test)]
mod tests {
    use super::{carry_out, cf, condition_passed, nf, vf, zf};
    use crate::builder::TranslationBuilder;
    use crate::condition::Condition;
    use crate::instruction::{ArmInstruction, ArmMode};
    use crate::namer::VariableNamer;
    use crate::operands::Operand;
    use crate::registers::RegisterIndex::R1;

    #[test]
    fn test_flag_registers() {
        for flag in [nf(), zf(), cf(), vf()] {
            assert_eq!(flag.size, 1);
        }
        assert_eq!(nf().name, "nf");
        assert_eq!(zf().name, "zf");
        assert_eq!(cf().name, "cf");
        assert_eq!(vf().name, "vf");
    }

    #[test]
    fn test_plain_operands_leave_carry() {
        let mut namer = VariableNamer::new("t");
        let ins = ArmInstruction::new("nop", vec![]);
        let mut tb = TranslationBuilder::new(&mut namer, ArmMode::Arm, &ins);
        carry_out(&mut tb, &Operand::imm(12)).unwrap();
        carry_out(&mut tb, &Operand::reg(R1)).unwrap();
        assert!(tb.finalize(0).unwrap().is_empty());
    }

    #[test]
    fn test_simple_predicates_read_flags() {
        let mut namer = VariableNamer::new("t");
        let ins = ArmInstruction::new("nop", vec![]);
        let mut tb = TranslationBuilder::new(&mut namer, ArmMode::Arm, &ins);
        assert_eq!(condition_passed(&mut tb, Condition::Equal), zf());
        assert_eq!(condition_passed(&mut tb, Condition::CarrySet), cf());
        assert_eq!(condition_passed(&mut tb, Condition::Minus), nf());
        assert_eq!(condition_passed(&mut tb, Condition::Overflow), vf());
        // Direct flag reads emit no code.
        assert!(tb.finalize(0).unwrap().is_empty());
    }
}
