use num_enum::TryFromPrimitive;
use std::fmt::{self, Display};

/// Possible conditions for conditional execution.
///
/// The discriminant matches the 4-bit condition field of the ARM instruction
/// encoding, so decoders can use [`Condition::try_from`] directly.
#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum Condition {
    Equal = 0,
    NotEqual = 1,
    CarrySet = 2,
    CarryClear = 3,
    Minus = 4,
    Plus = 5,
    Overflow = 6,
    NoOverflow = 7,
    Higher = 8,
    LowerOrSame = 9,
    GreaterThanOrEqual = 10,
    LessThan = 11,
    GreaterThan = 12,
    LessThanOrEqual = 13,
    Always = 14,
}

impl Condition {
    /// Returns inverse condition, or None if current condition is Always (there is no "Never"
    /// condition in ARMv7).
    pub fn inverse(&self) -> Option<Self> {
        Some(match self {
            Condition::Equal => Condition::NotEqual,
            Condition::NotEqual => Condition::Equal,
            Condition::CarrySet => Condition::CarryClear,
            Condition::CarryClear => Condition::CarrySet,
            Condition::Minus => Condition::Plus,
            Condition::Plus => Condition::Minus,
            Condition::Overflow => Condition::NoOverflow,
            Condition::NoOverflow => Condition::Overflow,
            Condition::Higher => Condition::LowerOrSame,
            Condition::LowerOrSame => Condition::Higher,
            Condition::GreaterThanOrEqual => Condition::LessThan,
            Condition::LessThan => Condition::GreaterThanOrEqual,
            Condition::GreaterThan => Condition::LessThanOrEqual,
            Condition::LessThanOrEqual => Condition::GreaterThan,
            Condition::Always => return None,
        })
    }

    /// Parses a mnemonic condition suffix, e.g. "eq" or "ls".
    ///
    /// "hs" and "lo" map to [Condition::CarrySet] and [Condition::CarryClear]
    /// respectively. Returns None for anything that is not a condition
    /// suffix.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "eq" => Condition::Equal,
            "ne" => Condition::NotEqual,
            "cs" | "hs" => Condition::CarrySet,
            "cc" | "lo" => Condition::CarryClear,
            "mi" => Condition::Minus,
            "pl" => Condition::Plus,
            "vs" => Condition::Overflow,
            "vc" => Condition::NoOverflow,
            "hi" => Condition::Higher,
            "ls" => Condition::LowerOrSame,
            "ge" => Condition::GreaterThanOrEqual,
            "lt" => Condition::LessThan,
            "gt" => Condition::GreaterThan,
            "le" => Condition::LessThanOrEqual,
            "al" => Condition::Always,
            _ => return None,
        })
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Condition::Equal => "eq",
            Condition::NotEqual => "ne",
            Condition::CarrySet => "cs",
            Condition::CarryClear => "cc",
            Condition::Minus => "mi",
            Condition::Plus => "pl",
            Condition::Overflow => "vs",
            Condition::NoOverflow => "vc",
            Condition::Higher => "hi",
            Condition::LowerOrSame => "ls",
            Condition::GreaterThanOrEqual => "ge",
            Condition::LessThan => "lt",
            Condition::GreaterThan => "gt",
            Condition::LessThanOrEqual => "le",
            Condition::Always => "",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::Condition;

    #[test]
    fn test_try_from() {
        assert_eq!(Condition::try_from(0), Ok(Condition::Equal));
        assert_eq!(Condition::try_from(9), Ok(Condition::LowerOrSame));
        assert_eq!(Condition::try_from(14), Ok(Condition::Always));
        assert!(Condition::try_from(15).is_err());
    }

    #[test]
    fn test_inverse() {
        assert_eq!(Condition::Equal.inverse(), Some(Condition::NotEqual));
        assert_eq!(
            Condition::LowerOrSame.inverse(),
            Some(Condition::Higher)
        );
        assert_eq!(Condition::Always.inverse(), None);
        for value in 0..14 {
            let cond = Condition::try_from(value).unwrap();
            assert_eq!(cond.inverse().unwrap().inverse(), Some(cond));
        }
    }

    #[test]
    fn test_from_suffix() {
        assert_eq!(Condition::from_suffix("eq"), Some(Condition::Equal));
        assert_eq!(Condition::from_suffix("hs"), Some(Condition::CarrySet));
        assert_eq!(Condition::from_suffix("lo"), Some(Condition::CarryClear));
        assert_eq!(Condition::from_suffix("al"), Some(Condition::Always));
        assert_eq!(Condition::from_suffix("xx"), None);
        assert_eq!(Condition::from_suffix(""), None);
    }
}
