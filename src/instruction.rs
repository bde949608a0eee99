//! Decoded ARM instruction representation.
//!
//! Instruction decoding itself is out of scope for this crate: an upstream
//! disassembler produces [ArmInstruction] records, with condition code
//! suffixes already split from the mnemonic and register aliases resolved.

use crate::condition::Condition;
use crate::operands::Operand;
use std::fmt::{self, Display};

/// Processor instruction set state. Selects the pipeline offset observed when
/// reading PC.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ArmMode {
    Arm,
    Thumb,
}

impl ArmMode {
    /// Distance between the address of the current instruction and the value
    /// read from PC, in bytes.
    pub fn pc_offset(&self) -> u32 {
        match self {
            ArmMode::Arm => 8,
            ArmMode::Thumb => 4,
        }
    }
}

/// A decoded ARM instruction, ready for translation.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmInstruction {
    /// Lowercase mnemonic, without condition suffix. The "s" flag-setting
    /// suffix is kept, so "adds" and "add" are distinct mnemonics.
    pub mnemonic: String,
    pub operands: Vec<Operand>,
    /// Execution condition, or None when the instruction is unconditional.
    pub condition: Option<Condition>,
    /// Address of the instruction in the program text.
    pub address: u32,
    /// Size of the encoded instruction in bytes, 4 in ARM mode, 2 or 4 in
    /// Thumb mode.
    pub size: u32,
    /// Raw encoding, kept for diagnostics.
    pub bytes: Vec<u8>,
    /// True when a load or store multiple writes the final transfer address
    /// back to the base register (the "!" syntax).
    pub writeback: bool,
}

impl ArmInstruction {
    pub fn new(mnemonic: &str, operands: Vec<Operand>) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            operands,
            condition: None,
            address: 0,
            size: 4,
            bytes: Vec::new(),
            writeback: false,
        }
    }
}

impl Display for ArmInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic)?;
        if let Some(cond) = self.condition {
            write!(f, "{}", cond)?;
        }
        for (i, op) in self.operands.iter().enumerate() {
            if i == 0 {
                write!(f, " {}", op)?;
            } else {
                write!(f, ", {}", op)?;
            }
        }
        Ok(())
    }
}
