//! Defines ARM processor core registers.

use std::fmt::{self, Display};

/// Enumeration to identify a CPU core register.
///
/// Provides methods to convert to/from instruction encoding values and to the
/// register names used in emitted REIL code.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RegisterIndex {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
    R9,
    R10,
    R11,
    R12,
    Sp,
    Lr,
    Pc,
}

impl RegisterIndex {
    pub fn new_main(index: u32) -> Self {
        match index {
            0 => Self::R0,
            1 => Self::R1,
            2 => Self::R2,
            3 => Self::R3,
            4 => Self::R4,
            5 => Self::R5,
            6 => Self::R6,
            7 => Self::R7,
            8 => Self::R8,
            9 => Self::R9,
            10 => Self::R10,
            11 => Self::R11,
            12 => Self::R12,
            13 => Self::Sp,
            14 => Self::Lr,
            15 => Self::Pc,
            _ => panic!("invalid main register index"),
        }
    }

    /// Generates a random register index from R0 to R12 (general purpose registers).
    /// This is used by tests only.
    #[cfg(test)]
    pub fn new_general_random() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();
        Self::new_main(rng.random_range(..=12))
    }

    /// Index of the register, from 0 for R0 to 15 for PC.
    pub fn index(&self) -> u32 {
        match self {
            Self::R0 => 0,
            Self::R1 => 1,
            Self::R2 => 2,
            Self::R3 => 3,
            Self::R4 => 4,
            Self::R5 => 5,
            Self::R6 => 6,
            Self::R7 => 7,
            Self::R8 => 8,
            Self::R9 => 9,
            Self::R10 => 10,
            Self::R11 => 11,
            Self::R12 => 12,
            Self::Sp => 13,
            Self::Lr => 14,
            Self::Pc => 15,
        }
    }

    /// Parses a register name, accepting both "r13"-style names and the
    /// "sp", "lr" and "pc" aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sp" => Some(Self::Sp),
            "lr" => Some(Self::Lr),
            "pc" => Some(Self::Pc),
            _ => {
                let index: u32 = name.strip_prefix('r')?.parse().ok()?;
                (index < 16).then(|| Self::new_main(index))
            }
        }
    }

    /// Name of the register as it appears in REIL operands. Aliased
    /// registers use their numeric name, so SP is "r13", LR is "r14" and PC
    /// is "r15".
    pub fn reil_name(&self) -> &'static str {
        match self {
            Self::R0 => "r0",
            Self::R1 => "r1",
            Self::R2 => "r2",
            Self::R3 => "r3",
            Self::R4 => "r4",
            Self::R5 => "r5",
            Self::R6 => "r6",
            Self::R7 => "r7",
            Self::R8 => "r8",
            Self::R9 => "r9",
            Self::R10 => "r10",
            Self::R11 => "r11",
            Self::R12 => "r12",
            Self::Sp => "r13",
            Self::Lr => "r14",
            Self::Pc => "r15",
        }
    }

    /// Returns true if index is 13
    pub fn is_sp(&self) -> bool {
        *self == Self::Sp
    }

    /// Returns true if index is 15
    pub fn is_pc(&self) -> bool {
        *self == Self::Pc
    }

    /// Returns true if index is 13 or 15
    pub fn is_sp_or_pc(&self) -> bool {
        (*self == Self::Sp) || (*self == Self::Pc)
    }
}

impl From<u32> for RegisterIndex {
    fn from(value: u32) -> Self {
        Self::new_main(value)
    }
}

impl Display for RegisterIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Sp => "sp",
            Self::Lr => "lr",
            Self::Pc => "pc",
            _ => self.reil_name(),
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::RegisterIndex;

    #[test]
    fn test_new_main() {
        assert_eq!(RegisterIndex::new_main(0), RegisterIndex::R0);
        assert_eq!(RegisterIndex::new_main(13), RegisterIndex::Sp);
        assert_eq!(RegisterIndex::new_main(15), RegisterIndex::Pc);
        for i in 0..16 {
            assert_eq!(RegisterIndex::new_main(i).index(), i);
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(RegisterIndex::from_name("r0"), Some(RegisterIndex::R0));
        assert_eq!(RegisterIndex::from_name("r15"), Some(RegisterIndex::Pc));
        assert_eq!(RegisterIndex::from_name("sp"), Some(RegisterIndex::Sp));
        assert_eq!(RegisterIndex::from_name("lr"), Some(RegisterIndex::Lr));
        assert_eq!(RegisterIndex::from_name("pc"), Some(RegisterIndex::Pc));
        assert_eq!(RegisterIndex::from_name("r16"), None);
        assert_eq!(RegisterIndex::from_name("x0"), None);
    }

    #[test]
    fn test_reil_name() {
        assert_eq!(RegisterIndex::R7.reil_name(), "r7");
        assert_eq!(RegisterIndex::Sp.reil_name(), "r13");
        assert_eq!(RegisterIndex::Pc.reil_name(), "r15");
        assert_eq!(RegisterIndex::Sp.to_string(), "sp");
    }
}
