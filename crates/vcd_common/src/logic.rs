//! Four-state logic values as they appear in VCD value changes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single 4-state logic value.
///
/// The four states represent:
/// - `Zero`: logic low (driven 0)
/// - `One`: logic high (driven 1)
/// - `X`: unknown or uninitialized value
/// - `Z`: high-impedance (tri-state, not driven)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum Logic {
    /// Logic low (0).
    Zero = 0,
    /// Logic high (1).
    One = 1,
    /// Unknown or uninitialized.
    X = 2,
    /// High-impedance (tri-state).
    Z = 3,
}

impl Logic {
    /// Character form of [`Logic::from_vcd_byte`]; non-ASCII characters are rejected.
    pub fn from_char(c: char) -> Option<Self> {
        u8::try_from(c).ok().and_then(Self::from_vcd_byte)
    }

    /// Converts a byte from a VCD value change to a [`Logic`] value.
    ///
    /// In addition to the four IEEE 1364 states this folds the extra IEEE 1164
    /// states that VHDL simulators emit: `u`, `w` and `-` read as `X`, weak
    /// `l` reads as `Zero` and weak `h` reads as `One`.
    pub fn from_vcd_byte(b: u8) -> Option<Self> {
        match b {
            b'0' | b'l' | b'L' => Some(Logic::Zero),
            b'1' | b'h' | b'H' => Some(Logic::One),
            b'x' | b'X' | b'u' | b'U' | b'w' | b'W' | b'-' => Some(Logic::X),
            b'z' | b'Z' => Some(Logic::Z),
            _ => None,
        }
    }

    /// Returns the fill value used when a VCD vector is narrower than its signal.
    ///
    /// A leading `X` or `Z` extends as itself; a leading `0` or `1` zero-extends.
    pub fn extension(self) -> Self {
        match self {
            Logic::X => Logic::X,
            Logic::Z => Logic::Z,
            Logic::Zero | Logic::One => Logic::Zero,
        }
    }

    /// Returns `true` for `X` and `Z`.
    pub fn is_unknown(self) -> bool {
        matches!(self, Logic::X | Logic::Z)
    }

    /// Returns the lower-case VCD character for this value.
    pub fn to_char(self) -> char {
        match self {
            Logic::Zero => '0',
            Logic::One => '1',
            Logic::X => 'x',
            Logic::Z => 'z',
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

#[cfg(test)]
mod tests {
    use super::Logic;
    use super::Logic::*;

    #[test]
    fn display() {
        assert_eq!(format!("{Zero}"), "0");
        assert_eq!(format!("{One}"), "1");
        assert_eq!(format!("{X}"), "x");
        assert_eq!(format!("{Z}"), "z");
    }

    #[test]
    fn char_and_byte_agree() {
        for c in ['0', '1', 'x', 'X', 'z', 'Z', 'u', 'h', '?'] {
            assert_eq!(Logic::from_char(c), Logic::from_vcd_byte(c as u8));
        }
        assert_eq!(Logic::from_char('Z'), Some(Z));
        assert_eq!(Logic::from_char('µ'), None);
    }

    #[test]
    fn from_vcd_byte_folds_nine_state() {
        assert_eq!(Logic::from_vcd_byte(b'u'), Some(X));
        assert_eq!(Logic::from_vcd_byte(b'-'), Some(X));
        assert_eq!(Logic::from_vcd_byte(b'W'), Some(X));
        assert_eq!(Logic::from_vcd_byte(b'l'), Some(Zero));
        assert_eq!(Logic::from_vcd_byte(b'H'), Some(One));
        assert_eq!(Logic::from_vcd_byte(b'b'), None);
        assert_eq!(Logic::from_vcd_byte(b'#'), None);
    }

    #[test]
    fn extension_rules() {
        assert_eq!(Zero.extension(), Zero);
        assert_eq!(One.extension(), Zero);
        assert_eq!(X.extension(), X);
        assert_eq!(Z.extension(), Z);
    }

    #[test]
    fn unknown_states() {
        assert!(X.is_unknown());
        assert!(Z.is_unknown());
        assert!(!Zero.is_unknown());
        assert!(!One.is_unknown());
    }
}
