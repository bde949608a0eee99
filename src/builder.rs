//! Translation builder.
//!
//! A [TranslationBuilder] accumulates the REIL instructions produced for one
//! ARM instruction. It offers three layers of services to the per-mnemonic
//! translation routines:
//!
//! - raw accumulation: [TranslationBuilder::add], fresh temporaries, forward
//!   labels and conditional jumps to labels;
//! - small logic idioms (negation, equality, bit extraction, unsigned
//!   comparison) that expand to a few REIL instructions each;
//! - operand materialization: [TranslationBuilder::read] and
//!   [TranslationBuilder::write] convert ARM operands to REIL values,
//!   lowering barrel shifter operands and memory addressing modes (including
//!   base register writeback) on the way.
//!
//! Finalization assigns each instruction the address
//! `arm_address << 8 | index` and resolves labels to the address of the
//! instruction that follows them.

use crate::instruction::{ArmInstruction, ArmMode};
use crate::namer::VariableNamer;
use crate::operands::{
    Displacement, Indexing, MemoryOperand, Operand, RegisterListOperand, RegisterOperand,
    ShiftAmount, ShiftType, ShiftedRegisterOperand,
};
use crate::registers::RegisterIndex;
use crate::reil::{bit_mask, ReilImmediate, ReilInstruction, ReilOperand, ReilRegister};
use crate::translator::TranslateError;
use std::collections::HashMap;

/// Forward reference to a position in the translation sequence. A label
/// resolves to the address of the next instruction added after it, or to the
/// address one past the sequence when nothing follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    name: String,
}

enum Item {
    Ins(ReilInstruction),
    /// Jump to a label, turned into a `jcc` at finalization.
    PendingJump {
        condition: ReilOperand,
        label: Label,
    },
    Label(Label),
}

pub struct TranslationBuilder<'a> {
    namer: &'a mut VariableNamer,
    mode: ArmMode,
    /// Address of the ARM instruction being translated.
    address: u32,
    /// Byte size of the ARM instruction being translated.
    size: u32,
    /// Number of labels issued, used to keep label names unique.
    labels: u32,
    items: Vec<Item>,
}

impl<'a> TranslationBuilder<'a> {
    pub fn new(
        namer: &'a mut VariableNamer,
        mode: ArmMode,
        instruction: &ArmInstruction,
    ) -> Self {
        Self {
            namer,
            mode,
            address: instruction.address,
            size: instruction.size,
            labels: 0,
            items: Vec::new(),
        }
    }

    /// Address of the instruction following the one being translated.
    pub fn next_instruction_address(&self) -> u32 {
        self.address.wrapping_add(self.size)
    }

    /// REIL address of the end of the current translation, which is the
    /// first sub-address of the next ARM instruction.
    pub fn end_address(&self) -> u64 {
        (self.next_instruction_address() as u64) << 8
    }

    /// Value observed when reading PC, which is ahead of the current
    /// instruction by the pipeline offset of the processor mode.
    pub fn pc_value(&self) -> u32 {
        self.address.wrapping_add(self.mode.pc_offset())
    }

    /// Returns a fresh temporary register of the requested width.
    pub fn temporal(&mut self, size: u32) -> ReilRegister {
        ReilRegister::new(self.namer.next(), size)
    }

    pub fn immediate(&self, value: u64, size: u32) -> ReilImmediate {
        ReilImmediate::new(value, size)
    }

    /// Creates a forward label. The given name is made unique within the
    /// translation; place the label with [TranslationBuilder::mark].
    pub fn label(&mut self, name: &str) -> Label {
        let label = Label {
            name: format!("{}_{}", name, self.labels),
        };
        self.labels += 1;
        label
    }

    /// Appends an instruction to the sequence.
    pub fn add(&mut self, ins: ReilInstruction) {
        self.items.push(Item::Ins(ins));
    }

    /// Places a label at the current position of the sequence.
    pub fn mark(&mut self, label: Label) {
        self.items.push(Item::Label(label));
    }

    /// Emits a jump to `label` taken when the 1-bit `condition` is not zero.
    pub fn jump_if(&mut self, condition: impl Into<ReilOperand>, label: &Label) {
        self.items.push(Item::PendingJump {
            condition: condition.into(),
            label: label.clone(),
        });
    }

    /// Emits a jump to `label` taken when `value` is zero.
    pub fn jump_if_zero(&mut self, value: impl Into<ReilOperand>, label: &Label) {
        let zero = self.temporal(1);
        self.add(ReilInstruction::bisz(value, zero.clone()));
        self.jump_if(zero, label);
    }

    /// Emits an unconditional jump to `label`.
    pub fn jump_to(&mut self, label: &Label) {
        let always = self.immediate(1, 1);
        self.jump_if(always, label);
    }

    // Logic idioms.
    // ======================================================================

    /// `a & b` into a fresh temporary of the width of `a`.
    pub fn and_regs(
        &mut self,
        a: impl Into<ReilOperand>,
        b: impl Into<ReilOperand>,
    ) -> ReilRegister {
        let a = a.into();
        let dst = self.temporal(a.size());
        self.add(ReilInstruction::and(a, b.into(), dst.clone()));
        dst
    }

    /// `a | b` into a fresh temporary of the width of `a`.
    pub fn or_regs(
        &mut self,
        a: impl Into<ReilOperand>,
        b: impl Into<ReilOperand>,
    ) -> ReilRegister {
        let a = a.into();
        let dst = self.temporal(a.size());
        self.add(ReilInstruction::or(a, b.into(), dst.clone()));
        dst
    }

    /// `a ^ b` into a fresh temporary of the width of `a`.
    pub fn xor_regs(
        &mut self,
        a: impl Into<ReilOperand>,
        b: impl Into<ReilOperand>,
    ) -> ReilRegister {
        let a = a.into();
        let dst = self.temporal(a.size());
        self.add(ReilInstruction::xor(a, b.into(), dst.clone()));
        dst
    }

    /// Bitwise complement of `x` into a fresh temporary.
    pub fn negate_reg(&mut self, x: impl Into<ReilOperand>) -> ReilRegister {
        let x = x.into();
        let size = x.size();
        let ones = self.immediate(bit_mask(size), size);
        self.xor_regs(x, ones)
    }

    /// 1-bit result of `a == b`.
    pub fn equal_regs(
        &mut self,
        a: impl Into<ReilOperand>,
        b: impl Into<ReilOperand>,
    ) -> ReilRegister {
        let diff = self.xor_regs(a, b);
        let dst = self.temporal(1);
        self.add(ReilInstruction::bisz(diff, dst.clone()));
        dst
    }

    /// 1-bit result of `a != b`.
    pub fn unequal_regs(
        &mut self,
        a: impl Into<ReilOperand>,
        b: impl Into<ReilOperand>,
    ) -> ReilRegister {
        let equal = self.equal_regs(a, b);
        self.negate_reg(equal)
    }

    /// 1-bit result of the unsigned comparison `a >= b`. Both operands must
    /// have the same width.
    pub fn greater_than_or_equal(
        &mut self,
        a: impl Into<ReilOperand>,
        b: impl Into<ReilOperand>,
    ) -> ReilRegister {
        let a = a.into();
        let size = a.size();
        // No borrow out of the subtraction means a >= b.
        let diff = self.temporal(size * 2);
        self.add(ReilInstruction::sub(a, b.into(), diff.clone()));
        let borrow = self.extract_bit(diff, size);
        self.negate_reg(borrow)
    }

    /// Extracts bit `bit` of `source` into a 1-bit temporary.
    pub fn extract_bit(&mut self, source: impl Into<ReilOperand>, bit: u32) -> ReilRegister {
        let source = source.into();
        let size = source.size();
        let shifted = self.temporal(size);
        let amount = ReilImmediate::signed(-(bit as i64), size);
        self.add(ReilInstruction::bsh(source, amount, shifted.clone()));
        let dst = self.temporal(1);
        self.add(ReilInstruction::and(
            shifted,
            self.immediate(1, size),
            dst.clone(),
        ));
        dst
    }

    /// Extracts the bit of `source` whose index is held in the `bit`
    /// register, into a 1-bit temporary.
    pub fn extract_bit_with_register(
        &mut self,
        source: impl Into<ReilOperand>,
        bit: &ReilRegister,
    ) -> ReilRegister {
        let source = source.into();
        let size = source.size();
        let neg = self.temporal(bit.size);
        self.add(ReilInstruction::sub(
            self.immediate(0, bit.size),
            bit,
            neg.clone(),
        ));
        let shifted = self.temporal(size);
        self.add(ReilInstruction::bsh(source, neg, shifted.clone()));
        let dst = self.temporal(1);
        self.add(ReilInstruction::and(
            shifted,
            self.immediate(1, size),
            dst.clone(),
        ));
        dst
    }

    /// 1-bit signed overflow predicate of the subtraction `a - b` whose
    /// (wider) result is `result`.
    pub fn overflow_from_sub(
        &mut self,
        a: impl Into<ReilOperand>,
        b: impl Into<ReilOperand>,
        result: impl Into<ReilOperand>,
    ) -> ReilRegister {
        let a = a.into();
        let sign = a.size() - 1;
        let a_sign = self.extract_bit(a, sign);
        let b_sign = self.extract_bit(b.into(), sign);
        let result_sign = self.extract_bit(result.into(), sign);
        let operands_differ = self.unequal_regs(a_sign.clone(), b_sign);
        let result_differs = self.unequal_regs(a_sign, result_sign);
        self.and_regs(operands_differ, result_differs)
    }

    // Operand materialization.
    // ======================================================================

    /// REIL value of a register, substituting the pipelined PC value for
    /// r15.
    pub fn register_value(&self, reg: &RegisterOperand) -> ReilOperand {
        if reg.reg.is_pc() {
            ReilOperand::Imm(self.immediate(self.pc_value() as u64, reg.size))
        } else {
            ReilOperand::Reg(ReilRegister::new(reg.reg.reil_name(), reg.size))
        }
    }

    /// Materializes an ARM operand as a REIL value suitable as a source.
    ///
    /// Shifted register operands are lowered through the barrel shifter
    /// rules, memory operands compute their effective address (performing
    /// any writeback) and load a fresh temporary. Register lists cannot be
    /// read as a single value; see
    /// [TranslationBuilder::register_list].
    pub fn read(&mut self, operand: &Operand) -> Result<ReilOperand, TranslateError> {
        match operand {
            Operand::Imm(imm) => Ok(ReilOperand::Imm(self.immediate(imm.value, imm.size))),
            Operand::Reg(reg) => Ok(self.register_value(reg)),
            Operand::Shifted(shifted) => self.shifted_register(shifted),
            Operand::Mem(mem) => {
                let addr = self.memory_operand_address(mem)?;
                let value = self.temporal(mem.size);
                self.add(ReilInstruction::ldm(addr, value.clone()));
                Ok(ReilOperand::Reg(value))
            }
            Operand::RegList(_) => Err(TranslateError::InvalidOperand(
                "register list cannot be read as a value",
            )),
        }
    }

    /// Stores `value` into the location denoted by an ARM operand. Only
    /// registers and memory operands are valid write targets.
    pub fn write(
        &mut self,
        operand: &Operand,
        value: impl Into<ReilOperand>,
    ) -> Result<(), TranslateError> {
        let value = value.into();
        match operand {
            Operand::Reg(reg) => {
                let dst = ReilRegister::new(reg.reg.reil_name(), reg.size);
                self.add(ReilInstruction::str(value, dst));
                Ok(())
            }
            Operand::Mem(mem) => {
                let addr = self.memory_operand_address(mem)?;
                let value = if value.size() > mem.size {
                    // Narrow stores keep only the low bits of the source.
                    let narrow = self.temporal(mem.size);
                    self.add(ReilInstruction::str(value, narrow.clone()));
                    ReilOperand::Reg(narrow)
                } else {
                    value
                };
                self.add(ReilInstruction::stm(value, addr));
                Ok(())
            }
            _ => Err(TranslateError::InvalidOperand(
                "operand is not a valid write target",
            )),
        }
    }

    /// Expands a register list operand to the ordered list of REIL registers
    /// it denotes. Ranges expand inclusively; `r3-r7` yields r3, r4, r5, r6
    /// and r7.
    pub fn register_list(
        &self,
        list: &RegisterListOperand,
    ) -> Result<Vec<ReilRegister>, TranslateError> {
        let mut registers = Vec::new();
        for range in &list.ranges {
            match &range.last {
                None => registers.push(ReilRegister::new(
                    range.first.reg.reil_name(),
                    range.first.size,
                )),
                Some(last) => {
                    let start = range.first.reg.index();
                    let end = last.reg.index();
                    if start > end {
                        return Err(TranslateError::InvalidOperand(
                            "malformed register range",
                        ));
                    }
                    for index in start..=end {
                        registers.push(ReilRegister::new(
                            RegisterIndex::new_main(index).reil_name(),
                            range.first.size,
                        ));
                    }
                }
            }
        }
        Ok(registers)
    }

    // Barrel shifter lowering.
    // ======================================================================

    /// Value of a shifted register operand.
    pub(crate) fn shifted_register(
        &mut self,
        operand: &ShiftedRegisterOperand,
    ) -> Result<ReilOperand, TranslateError> {
        let base = self.register_value(&operand.base);
        let Some(amount) = &operand.amount else {
            return Ok(base);
        };
        match amount {
            ShiftAmount::Imm(imm) => self.shift_by_imm(operand.shift, base, imm.value as u32),
            ShiftAmount::Reg(reg) => {
                let amount = self.register_value(reg);
                self.shift_by_reg(operand.shift, base, amount)
            }
        }
    }

    /// Shift by a constant amount taken from the instruction encoding.
    fn shift_by_imm(
        &mut self,
        shift: ShiftType,
        base: ReilOperand,
        amount: u32,
    ) -> Result<ReilOperand, TranslateError> {
        let size = base.size();
        if amount == 0 && shift != ShiftType::Rrx {
            return Ok(base);
        }
        let result = self.temporal(size);
        match shift {
            ShiftType::Lsl => {
                let amount = self.immediate(amount as u64, size);
                self.add(ReilInstruction::bsh(base, amount, result.clone()));
            }
            ShiftType::Lsr => {
                if amount >= size {
                    self.add(ReilInstruction::str(self.immediate(0, size), result.clone()));
                } else {
                    let amount = ReilImmediate::signed(-(amount as i64), size);
                    self.add(ReilInstruction::bsh(base, amount, result.clone()));
                }
            }
            ShiftType::Asr => {
                let sign_mask = self.sign_mask(&base);
                if amount >= size {
                    self.add(ReilInstruction::str(sign_mask, result.clone()));
                } else {
                    let shifted = self.temporal(size);
                    self.add(ReilInstruction::bsh(
                        base,
                        ReilImmediate::signed(-(amount as i64), size),
                        shifted.clone(),
                    ));
                    let high = self.temporal(size);
                    self.add(ReilInstruction::bsh(
                        sign_mask,
                        self.immediate((size - amount) as u64, size),
                        high.clone(),
                    ));
                    self.add(ReilInstruction::or(shifted, high, result.clone()));
                }
            }
            ShiftType::Ror => {
                let amount = amount % size;
                if amount == 0 {
                    return Ok(base);
                }
                let low = self.temporal(size);
                self.add(ReilInstruction::bsh(
                    base.clone(),
                    ReilImmediate::signed(-(amount as i64), size),
                    low.clone(),
                ));
                let high = self.temporal(size);
                self.add(ReilInstruction::bsh(
                    base,
                    self.immediate((size - amount) as u64, size),
                    high.clone(),
                ));
                self.add(ReilInstruction::or(low, high, result.clone()));
            }
            ShiftType::Rrx => {
                let low = self.temporal(size);
                self.add(ReilInstruction::bsh(
                    base,
                    ReilImmediate::signed(-1, size),
                    low.clone(),
                ));
                let carry = self.temporal(size);
                self.add(ReilInstruction::str(
                    ReilRegister::new("cf", 1),
                    carry.clone(),
                ));
                let high = self.temporal(size);
                self.add(ReilInstruction::bsh(
                    carry,
                    self.immediate((size - 1) as u64, size),
                    high.clone(),
                ));
                self.add(ReilInstruction::or(low, high, result.clone()));
            }
        }
        Ok(ReilOperand::Reg(result))
    }

    /// Shift by an amount held in a register. Only the bottom byte of the
    /// register is significant.
    fn shift_by_reg(
        &mut self,
        shift: ShiftType,
        base: ReilOperand,
        amount: ReilOperand,
    ) -> Result<ReilOperand, TranslateError> {
        let size = base.size();
        let amount = self.and_regs(amount, self.immediate(0xff, size));
        let result = self.temporal(size);
        match shift {
            ShiftType::Lsl => {
                let over = self.label("shift_over");
                let end = self.label("shift_end");
                // A shift of 32 already clears the value, so only amounts of
                // 33 and above need the constant path.
                let too_large =
                    self.greater_than_or_equal(amount.clone(), self.immediate(33, size));
                self.jump_if(too_large, &over);
                self.add(ReilInstruction::bsh(base, amount, result.clone()));
                self.jump_to(&end);
                self.mark(over);
                self.add(ReilInstruction::str(self.immediate(0, size), result.clone()));
                self.mark(end);
            }
            ShiftType::Lsr => {
                let over = self.label("shift_over");
                let end = self.label("shift_end");
                let too_large =
                    self.greater_than_or_equal(amount.clone(), self.immediate(33, size));
                self.jump_if(too_large, &over);
                let neg = self.temporal(size);
                self.add(ReilInstruction::sub(
                    self.immediate(0, size),
                    amount,
                    neg.clone(),
                ));
                self.add(ReilInstruction::bsh(base, neg, result.clone()));
                self.jump_to(&end);
                self.mark(over);
                self.add(ReilInstruction::str(self.immediate(0, size), result.clone()));
                self.mark(end);
            }
            ShiftType::Asr => {
                let sign_mask = self.sign_mask(&base);
                let over = self.label("shift_over");
                let end = self.label("shift_end");
                // An arithmetic shift of 32 or more fills the value with the
                // sign bit.
                let too_large = self
                    .greater_than_or_equal(amount.clone(), self.immediate(size as u64, size));
                self.jump_if(too_large, &over);
                let neg = self.temporal(size);
                self.add(ReilInstruction::sub(
                    self.immediate(0, size),
                    amount.clone(),
                    neg.clone(),
                ));
                let shifted = self.temporal(size);
                self.add(ReilInstruction::bsh(base, neg, shifted.clone()));
                let left = self.temporal(size);
                self.add(ReilInstruction::sub(
                    self.immediate(size as u64, size),
                    amount,
                    left.clone(),
                ));
                let high = self.temporal(size);
                self.add(ReilInstruction::bsh(
                    sign_mask.clone(),
                    left,
                    high.clone(),
                ));
                self.add(ReilInstruction::or(shifted, high, result.clone()));
                self.jump_to(&end);
                self.mark(over);
                self.add(ReilInstruction::str(sign_mask, result.clone()));
                self.mark(end);
            }
            ShiftType::Ror => {
                let unchanged = self.label("rotate_none");
                let end = self.label("rotate_end");
                let turn = self.and_regs(amount, self.immediate((size - 1) as u64, size));
                // Rotation by a multiple of the width leaves the value.
                self.jump_if_zero(turn.clone(), &unchanged);
                let neg = self.temporal(size);
                self.add(ReilInstruction::sub(
                    self.immediate(0, size),
                    turn.clone(),
                    neg.clone(),
                ));
                let low = self.temporal(size);
                self.add(ReilInstruction::bsh(base.clone(), neg, low.clone()));
                let left = self.temporal(size);
                self.add(ReilInstruction::sub(
                    self.immediate(size as u64, size),
                    turn,
                    left.clone(),
                ));
                let high = self.temporal(size);
                self.add(ReilInstruction::bsh(base.clone(), left, high.clone()));
                self.add(ReilInstruction::or(low, high, result.clone()));
                self.jump_to(&end);
                self.mark(unchanged);
                self.add(ReilInstruction::str(base, result.clone()));
                self.mark(end);
            }
            ShiftType::Rrx => {
                return Err(TranslateError::NotImplemented(
                    "rrx with register shift amount",
                ))
            }
        }
        Ok(ReilOperand::Reg(result))
    }

    /// A value whose bits are all copies of the sign bit of `x`.
    fn sign_mask(&mut self, x: &ReilOperand) -> ReilRegister {
        let size = x.size();
        let sign = self.extract_bit(x, size - 1);
        let mask = self.temporal(size);
        self.add(ReilInstruction::sub(
            self.immediate(0, size),
            sign,
            mask.clone(),
        ));
        mask
    }

    // Memory addressing lowering.
    // ======================================================================

    /// Effective address of a memory operand. Pre and post indexed modes
    /// write the updated address back to the base register, exactly once;
    /// pre-indexed writeback happens before the access, post-indexed after
    /// snapshotting the original base value.
    pub(crate) fn memory_operand_address(
        &mut self,
        mem: &MemoryOperand,
    ) -> Result<ReilOperand, TranslateError> {
        let base = self.register_value(&mem.base);
        let size = base.size();
        let Some(displacement) = &mem.displacement else {
            return Ok(base);
        };
        let disp = match displacement {
            Displacement::Reg(reg) => self.register_value(reg),
            Displacement::Imm(imm) => ReilOperand::Imm(self.immediate(imm.value, imm.size)),
            Displacement::Shifted(shifted) => self.shifted_register(shifted)?,
        };
        let base_reg = ReilRegister::new(mem.base.reg.reil_name(), mem.base.size);
        let address = self.temporal(size);
        match mem.indexing {
            Indexing::Pre => {
                self.add_or_sub_address(base, disp, mem.minus, &address);
                self.add(ReilInstruction::str(address.clone(), base_reg));
                Ok(ReilOperand::Reg(address))
            }
            Indexing::Offset => {
                self.add_or_sub_address(base, disp, mem.minus, &address);
                Ok(ReilOperand::Reg(address))
            }
            Indexing::Post => {
                // The access uses the original base value, snapshotted
                // before the base register is updated.
                self.add(ReilInstruction::str(base.clone(), address.clone()));
                let updated = self.temporal(size);
                self.add_or_sub_address(base, disp, mem.minus, &updated);
                self.add(ReilInstruction::str(updated, base_reg));
                Ok(ReilOperand::Reg(address))
            }
        }
    }

    fn add_or_sub_address(
        &mut self,
        base: ReilOperand,
        disp: ReilOperand,
        minus: bool,
        dst: &ReilRegister,
    ) {
        if minus {
            self.add(ReilInstruction::sub(base, disp, dst.clone()));
        } else {
            self.add(ReilInstruction::add(base, disp, dst.clone()));
        }
    }

    // Finalization.
    // ======================================================================

    /// Linearizes the sequence: every instruction receives the address
    /// `address << 8 | index` and jumps to labels are patched to the address
    /// of the instruction following their label.
    pub fn finalize(self, address: u32) -> Result<Vec<ReilInstruction>, TranslateError> {
        let mut positions: HashMap<String, u64> = HashMap::new();
        let mut index = 0u64;
        for item in &self.items {
            match item {
                Item::Label(label) => {
                    positions.insert(label.name.clone(), index);
                }
                _ => index += 1,
            }
        }
        if index > 0x100 {
            return Err(TranslateError::Internal(format!(
                "translation needs {} sub-addresses, at most 256 are available",
                index
            )));
        }
        let base = (address as u64) << 8;
        let mut sequence = Vec::with_capacity(index as usize);
        for item in self.items {
            let mut ins = match item {
                Item::Label(_) => continue,
                Item::Ins(ins) => ins,
                Item::PendingJump { condition, label } => {
                    let target = positions.get(&label.name).ok_or_else(|| {
                        TranslateError::Internal(format!("unresolved label {}", label.name))
                    })?;
                    ReilInstruction::jcc(condition, ReilImmediate::new(base | target, 40))
                }
            };
            ins.address = base | sequence.len() as u64;
            sequence.push(ins);
        }
        Ok(sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::TranslationBuilder;
    use crate::instruction::{ArmInstruction, ArmMode};
    use crate::namer::VariableNamer;
    use crate::operands::{
        Indexing, MemoryOperand, Operand, RegisterRange, ShiftType, ShiftedRegisterOperand,
    };
    use crate::registers::RegisterIndex::{R1, R2, R3, R7, Pc};
    use crate::reil::{Opcode, ReilOperand};
    use crate::translator::TranslateError;

    fn builder_fixture(namer: &mut VariableNamer) -> TranslationBuilder {
        let ins = ArmInstruction {
            address: 0x8000,
            ..ArmInstruction::new("nop", vec![])
        };
        TranslationBuilder::new(namer, ArmMode::Arm, &ins)
    }

    #[test]
    fn test_temporal_unique() {
        let mut namer = VariableNamer::new("t");
        let mut tb = builder_fixture(&mut namer);
        let a = tb.temporal(32);
        let b = tb.temporal(1);
        assert_ne!(a.name, b.name);
        assert_eq!(a.size, 32);
        assert_eq!(b.size, 1);
    }

    #[test]
    fn test_finalize_addresses() {
        let mut namer = VariableNamer::new("t");
        let mut tb = builder_fixture(&mut namer);
        let value = tb.read(&Operand::imm(5)).unwrap();
        tb.write(&Operand::reg(R1), value).unwrap();
        let r1 = tb.read(&Operand::reg(R1)).unwrap();
        tb.write(&Operand::reg(R2), r1).unwrap();
        let sequence = tb.finalize(0x8000).unwrap();
        assert_eq!(sequence.len(), 2);
        assert_eq!(sequence[0].address, 0x8000 << 8);
        assert_eq!(sequence[1].address, 0x8000 << 8 | 1);
    }

    #[test]
    fn test_label_resolution() {
        let mut namer = VariableNamer::new("t");
        let mut tb = builder_fixture(&mut namer);
        let skip = tb.label("skip");
        tb.jump_to(&skip);
        let value = tb.read(&Operand::imm(1)).unwrap();
        tb.write(&Operand::reg(R1), value).unwrap();
        tb.mark(skip);
        let value = tb.read(&Operand::imm(2)).unwrap();
        tb.write(&Operand::reg(R2), value).unwrap();
        let sequence = tb.finalize(0x8000).unwrap();
        // jcc, str r1, str r2: the jump lands on the second str.
        assert_eq!(sequence.len(), 3);
        assert_eq!(sequence[0].opcode, Opcode::Jcc);
        let ReilOperand::Imm(target) = &sequence[0].operands[2] else {
            panic!("jcc target is not an immediate");
        };
        assert_eq!(target.value, 0x8000 << 8 | 2);
        assert_eq!(target.size, 40);
    }

    #[test]
    fn test_label_at_end_resolves_past_sequence() {
        let mut namer = VariableNamer::new("t");
        let mut tb = builder_fixture(&mut namer);
        let end = tb.label("end");
        tb.jump_to(&end);
        tb.mark(end);
        let sequence = tb.finalize(0x8000).unwrap();
        assert_eq!(sequence.len(), 1);
        let ReilOperand::Imm(target) = &sequence[0].operands[2] else {
            panic!("jcc target is not an immediate");
        };
        assert_eq!(target.value, 0x8000 << 8 | 1);
    }

    #[test]
    fn test_read_pc_observes_pipeline() {
        let mut namer = VariableNamer::new("t");
        let ins = ArmInstruction {
            address: 0x8000,
            ..ArmInstruction::new("nop", vec![])
        };
        let mut tb = TranslationBuilder::new(&mut namer, ArmMode::Arm, &ins);
        let value = tb.read(&Operand::reg(Pc)).unwrap();
        let ReilOperand::Imm(imm) = value else {
            panic!("pc read is not an immediate");
        };
        assert_eq!(imm.value, 0x8008);

        let mut namer = VariableNamer::new("t");
        let mut tb = TranslationBuilder::new(&mut namer, ArmMode::Thumb, &ins);
        let value = tb.read(&Operand::reg(Pc)).unwrap();
        let ReilOperand::Imm(imm) = value else {
            panic!("pc read is not an immediate");
        };
        assert_eq!(imm.value, 0x8004);
    }

    #[test]
    fn test_shifted_register_without_amount_is_base() {
        let mut namer = VariableNamer::new("t");
        let mut tb = builder_fixture(&mut namer);
        let op = Operand::Shifted(ShiftedRegisterOperand {
            base: crate::operands::RegisterOperand::new(R1),
            shift: ShiftType::Lsl,
            amount: None,
            size: 32,
        });
        let value = tb.read(&op).unwrap();
        assert_eq!(value.as_reg().unwrap().name, "r1");
        assert!(tb.finalize(0).unwrap().is_empty());
    }

    #[test]
    fn test_register_list_expansion() {
        let mut namer = VariableNamer::new("t");
        let tb = builder_fixture(&mut namer);
        let Operand::RegList(list) = Operand::reg_list(vec![
            RegisterRange::single(R1),
            RegisterRange::range(R3, R7),
        ]) else {
            unreachable!();
        };
        let registers = tb.register_list(&list).unwrap();
        let names: Vec<&str> = registers.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["r1", "r3", "r4", "r5", "r6", "r7"]);
    }

    #[test]
    fn test_register_list_malformed_range() {
        let mut namer = VariableNamer::new("t");
        let tb = builder_fixture(&mut namer);
        let Operand::RegList(list) =
            Operand::reg_list(vec![RegisterRange::range(R7, R3)])
        else {
            unreachable!();
        };
        assert_eq!(
            tb.register_list(&list),
            Err(TranslateError::InvalidOperand("malformed register range"))
        );
    }

    #[test]
    fn test_read_write_roundtrip_any_register() {
        use crate::registers::RegisterIndex;
        for _ in 0..16 {
            let reg = Operand::reg(RegisterIndex::new_general_random());
            let mut namer = VariableNamer::new("t");
            let mut tb = builder_fixture(&mut namer);
            let value = tb.read(&reg).unwrap();
            tb.write(&reg, value).unwrap();
            let sequence = tb.finalize(0).unwrap();
            // A register round trip is a single copy onto itself.
            assert_eq!(sequence.len(), 1);
            assert_eq!(sequence[0].opcode, Opcode::Str);
            assert_eq!(sequence[0].operands[0], sequence[0].operands[2]);
        }
    }

    #[test]
    fn test_write_rejects_immediate() {
        let mut namer = VariableNamer::new("t");
        let mut tb = builder_fixture(&mut namer);
        let value = tb.read(&Operand::imm(1)).unwrap();
        assert!(tb.write(&Operand::imm(0), value).is_err());
    }

    #[test]
    fn test_pre_index_writes_back_before_access() {
        let mut namer = VariableNamer::new("t");
        let mut tb = builder_fixture(&mut namer);
        let mem = Operand::Mem(MemoryOperand::with_imm(R1, 4, Indexing::Pre));
        tb.read(&mem).unwrap();
        let sequence = tb.finalize(0x8000).unwrap();
        // add, str (writeback), ldm
        let opcodes: Vec<Opcode> = sequence.iter().map(|i| i.opcode).collect();
        assert_eq!(opcodes, [Opcode::Add, Opcode::Str, Opcode::Ldm]);
        assert_eq!(sequence[1].operands[2].as_reg().unwrap().name, "r1");
    }
}
