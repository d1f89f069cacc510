//! Decoded signal values and per-signal timelines.

use std::fmt;

use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};
use vcd_common::{Logic, LogicVec};

use crate::declaration::IdCode;

/// A decoded value of one signal.
///
/// Equality is structural: reals compare by bit pattern, so a `NaN` written
/// by a simulator equals itself and reloading a file yields an equal model.
#[derive(Clone, Debug)]
pub enum Value {
    /// A 1-bit signal.
    Scalar(Logic),
    /// A multi-bit signal, already extended to the declared width.
    Vector(LogicVec),
    /// A `real` signal.
    Real(f64),
    /// A `string` signal.
    String(String),
}

impl Value {
    /// Reads a scalar or vector as an unsigned integer; `None` for real and
    /// string values or when any bit is `x` or `z`.
    pub fn to_u64(&self) -> Option<u64> {
        match self {
            Value::Scalar(Logic::Zero) => Some(0),
            Value::Scalar(Logic::One) => Some(1),
            Value::Vector(v) => v.to_u64(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => a == b,
            (Value::Vector(a), Value::Vector(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// Writes the value as VCD text without its type prefix.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(l) => write!(f, "{l}"),
            Value::Vector(v) => write!(f, "{v}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A value together with the timestamp it was written at.
#[derive(Clone, Debug, PartialEq)]
pub struct TimedValue {
    /// Simulation time in timescale units.
    pub time: u64,
    /// The value written.
    pub value: Value,
}

impl Serialize for TimedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.time)?;
        tuple.serialize_element(&self.value)?;
        tuple.end()
    }
}

/// The ordered history of one signal.
///
/// Timestamps are non-decreasing; writes at the same timestamp keep their
/// textual order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Timeline {
    events: Vec<TimedValue>,
}

impl Timeline {
    /// Creates an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a write.
    ///
    /// Fails with the last recorded time if `time` is earlier than it; the
    /// timeline is left unchanged.
    pub fn push(&mut self, time: u64, value: Value) -> Result<(), u64> {
        if let Some(last) = self.events.last() {
            if time < last.time {
                return Err(last.time);
            }
        }
        self.events.push(TimedValue { time, value });
        Ok(())
    }

    /// Returns the number of recorded writes.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if the signal was never written.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterates over writes in order.
    pub fn iter(&self) -> std::slice::Iter<'_, TimedValue> {
        self.events.iter()
    }

    /// Returns the last write, if any.
    pub fn last(&self) -> Option<&TimedValue> {
        self.events.last()
    }

    /// Returns the value in effect at `time`: the last write at the greatest
    /// timestamp not after `time`.
    pub fn value_at(&self, time: u64) -> Option<&Value> {
        let end = self.events.partition_point(|e| e.time <= time);
        end.checked_sub(1).map(|i| &self.events[i].value)
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a TimedValue;
    type IntoIter = std::slice::Iter<'a, TimedValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// One value-change event as produced by the streaming loader.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValueChange {
    /// Simulation time in timescale units.
    pub time: u64,
    /// The signal written.
    pub code: IdCode,
    /// The decoded value.
    pub value: Value,
}
