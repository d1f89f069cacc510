//! The `$timescale` declaration: how much real time one timestamp step is.

use serde::Serialize;
use std::fmt;

/// Femtoseconds per picosecond.
pub const FS_PER_PS: u64 = 1_000;
/// Femtoseconds per nanosecond.
pub const FS_PER_NS: u64 = 1_000_000;
/// Femtoseconds per microsecond.
pub const FS_PER_US: u64 = 1_000_000_000;
/// Femtoseconds per millisecond.
pub const FS_PER_MS: u64 = 1_000_000_000_000;
/// Femtoseconds per second.
pub const FS_PER_S: u64 = 1_000_000_000_000_000;

/// A timescale unit recognized in VCD headers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Seconds.
    S,
    /// Milliseconds.
    Ms,
    /// Microseconds.
    Us,
    /// Nanoseconds.
    Ns,
    /// Picoseconds.
    Ps,
    /// Femtoseconds.
    Fs,
}

impl TimeUnit {
    /// Parses a unit suffix (`"ns"`, `"ps"`, ...). Matching is case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "s" => Some(TimeUnit::S),
            "ms" => Some(TimeUnit::Ms),
            "us" => Some(TimeUnit::Us),
            "ns" => Some(TimeUnit::Ns),
            "ps" => Some(TimeUnit::Ps),
            "fs" => Some(TimeUnit::Fs),
            _ => None,
        }
    }

    /// Returns the number of femtoseconds in one unit.
    pub fn femtoseconds(self) -> u64 {
        match self {
            TimeUnit::S => FS_PER_S,
            TimeUnit::Ms => FS_PER_MS,
            TimeUnit::Us => FS_PER_US,
            TimeUnit::Ns => FS_PER_NS,
            TimeUnit::Ps => FS_PER_PS,
            TimeUnit::Fs => 1,
        }
    }

    /// Returns the canonical suffix.
    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::S => "s",
            TimeUnit::Ms => "ms",
            TimeUnit::Us => "us",
            TimeUnit::Ns => "ns",
            TimeUnit::Ps => "ps",
            TimeUnit::Fs => "fs",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized timescale such as `1 ns` or `10 ps`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Timescale {
    /// The multiplier, usually 1, 10 or 100.
    pub magnitude: u32,
    /// The unit the multiplier applies to.
    pub unit: TimeUnit,
}

/// Why a `$timescale` body could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimescaleError {
    /// The magnitude is zero or not a number.
    BadMagnitude(String),
    /// The unit is not one of s, ms, us, ns, ps, fs.
    UnknownUnit(String),
}

impl fmt::Display for TimescaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimescaleError::BadMagnitude(m) => write!(f, "invalid timescale magnitude '{m}'"),
            TimescaleError::UnknownUnit(u) => write!(f, "unrecognized timescale unit '{u}'"),
        }
    }
}

impl Timescale {
    /// Parses a `$timescale` body such as `"1ns"`, `"1 ns"` or `"100 ps"`.
    ///
    /// The body words are concatenated, so the magnitude and unit may be
    /// split or joined. A missing magnitude means 1.
    pub fn parse(body: &[String]) -> Result<Self, TimescaleError> {
        let joined: String = body.concat();
        let digit_end = joined
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(joined.len());
        let (num_str, unit_str) = joined.split_at(digit_end);

        let magnitude = if num_str.is_empty() {
            1
        } else {
            match num_str.parse::<u32>() {
                Ok(m) if m > 0 => m,
                _ => return Err(TimescaleError::BadMagnitude(num_str.to_string())),
            }
        };
        let unit = TimeUnit::parse(unit_str)
            .ok_or_else(|| TimescaleError::UnknownUnit(unit_str.to_string()))?;
        Ok(Self { magnitude, unit })
    }

    /// Returns the number of femtoseconds in one timestamp step.
    ///
    /// Saturates at `u64::MAX` for absurd magnitudes of whole seconds.
    pub fn femtoseconds(&self) -> u64 {
        u64::from(self.magnitude).saturating_mul(self.unit.femtoseconds())
    }

    /// Converts a timestamp to femtoseconds, or `None` on overflow.
    pub fn to_femtoseconds(&self, time: u64) -> Option<u64> {
        time.checked_mul(self.femtoseconds())
    }
}

impl fmt::Display for Timescale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.unit)
    }
}
