//! Packed vectors of 4-state logic values for multi-bit VCD signals.

use crate::logic::Logic;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A vector of 4-state [`Logic`] values packed for efficient storage.
///
/// Each logic value occupies 2 bits (encoding 4 states), with 32 values packed
/// per `u64` word. Index 0 is the least significant bit.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicVec {
    width: u32,
    /// Packed storage: 2 bits per logic value, 32 values per u64.
    data: Vec<u64>,
}

/// Number of logic values packed per u64 word.
const VALUES_PER_WORD: u32 = 32;

/// Word pattern with every 2-bit slot set to the same state.
fn splat(value: Logic) -> u64 {
    match value {
        Logic::Zero => 0,
        Logic::One => 0x5555_5555_5555_5555,
        Logic::X => 0xAAAA_AAAA_AAAA_AAAA,
        Logic::Z => u64::MAX,
    }
}

impl LogicVec {
    /// Creates a new `LogicVec` of the given width, initialized to all `Zero`.
    pub fn new(width: u32) -> Self {
        Self::filled(width, Logic::Zero)
    }

    /// Creates a `LogicVec` with every bit set to `value`.
    pub fn filled(width: u32, value: Logic) -> Self {
        let num_words = word_count(width);
        let mut v = Self {
            width,
            data: vec![splat(value); num_words],
        };
        v.clear_unused();
        v
    }

    /// Returns the number of logic values in this vector.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Gets the logic value at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: u32) -> Logic {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word_idx = (index / VALUES_PER_WORD) as usize;
        let bit_offset = (index % VALUES_PER_WORD) * 2;
        let bits = (self.data[word_idx] >> bit_offset) & 0b11;
        match bits {
            0 => Logic::Zero,
            1 => Logic::One,
            2 => Logic::X,
            _ => Logic::Z,
        }
    }

    /// Sets the logic value at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn set(&mut self, index: u32, value: Logic) {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word_idx = (index / VALUES_PER_WORD) as usize;
        let bit_offset = (index % VALUES_PER_WORD) * 2;
        let mask = !(0b11u64 << bit_offset);
        self.data[word_idx] = (self.data[word_idx] & mask) | ((value as u64) << bit_offset);
    }

    /// Reads the vector as an unsigned integer.
    ///
    /// `None` if any bit is `X` or `Z` or the value does not fit in 64 bits
    /// (leading zeros beyond bit 63 are fine).
    pub fn to_u64(&self) -> Option<u64> {
        (0..self.width).rev().try_fold(0u64, |acc, i| {
            let bit = match self.get(i) {
                Logic::Zero => 0,
                Logic::One => 1,
                Logic::X | Logic::Z => return None,
            };
            acc.checked_mul(2)?.checked_add(bit)
        })
    }

    /// Decodes the digits of a VCD vector value change, MSB first.
    ///
    /// The result always has `width` bits. Digits narrower than `width` are
    /// extended on the left following [`Logic::extension`] of the leading digit;
    /// an empty digit string yields all zeros. Digits wider than `width` keep
    /// only the `width` least significant positions, so callers that must
    /// reject over-wide values check the digit count first.
    ///
    /// Returns `None` if any digit is not a valid VCD logic character.
    pub fn from_vcd_bits(bits: &[u8], width: u32) -> Option<Self> {
        let fill = match bits.first() {
            Some(&b) => Logic::from_vcd_byte(b)?.extension(),
            None => Logic::Zero,
        };
        let mut v = Self::filled(width, fill);
        for (i, &b) in bits.iter().rev().enumerate() {
            let value = Logic::from_vcd_byte(b)?;
            if (i as u64) < u64::from(width) {
                v.set(i as u32, value);
            }
        }
        Some(v)
    }

    /// Returns true if every bit equals `value`.
    pub fn is_all(&self, value: Logic) -> bool {
        (0..self.width).all(|i| self.get(i) == value)
    }

    /// Zeroes the padding slots past `width` so equality stays structural.
    fn clear_unused(&mut self) {
        let used = self.width % VALUES_PER_WORD;
        if used != 0 {
            if let Some(last) = self.data.last_mut() {
                *last &= (1u64 << (used * 2)) - 1;
            }
        }
    }
}

impl fmt::Display for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.width).rev() {
            write!(f, "{}", self.get(i))?;
        }
        Ok(())
    }
}

impl fmt::Debug for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicVec({self})")
    }
}

/// Returns the number of u64 words needed to store `width` logic values.
fn word_count(width: u32) -> usize {
    width.div_ceil(VALUES_PER_WORD) as usize
}
