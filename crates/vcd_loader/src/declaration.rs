//! Signal declarations parsed from `$var` lines.

use serde::{Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;

/// The compact identifier code that stands in for a signal in value changes.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize)]
#[serde(transparent)]
pub struct IdCode(String);

impl IdCode {
    /// Wraps a code string.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for IdCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IdCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl fmt::Display for IdCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The declared type of a `$var`.
///
/// Types outside IEEE 1364 and the common SystemVerilog extensions are kept
/// verbatim in [`VarKind::Other`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum VarKind {
    /// `event`
    Event,
    /// `integer`
    Integer,
    /// `parameter`
    Parameter,
    /// `real`
    Real,
    /// `realtime`
    RealTime,
    /// `reg`
    Reg,
    /// `supply0`
    Supply0,
    /// `supply1`
    Supply1,
    /// `time`
    Time,
    /// `tri`
    Tri,
    /// `triand`
    TriAnd,
    /// `trior`
    TriOr,
    /// `trireg`
    TriReg,
    /// `tri0`
    Tri0,
    /// `tri1`
    Tri1,
    /// `wand`
    WAnd,
    /// `wire`
    Wire,
    /// `wor`
    WOr,
    /// `string`
    String,
    /// `logic`
    Logic,
    /// `bit`
    Bit,
    /// `int`
    Int,
    /// `shortint`
    ShortInt,
    /// `longint`
    LongInt,
    /// `byte`
    Byte,
    /// `enum`
    Enum,
    /// `shortreal`
    ShortReal,
    /// `port`
    Port,
    /// Any other type name.
    Other(String),
}

impl VarKind {
    /// Parses a `$var` type name. Never fails; unknown names become [`VarKind::Other`].
    pub fn parse(s: &str) -> Self {
        match s {
            "event" => VarKind::Event,
            "integer" => VarKind::Integer,
            "parameter" => VarKind::Parameter,
            "real" => VarKind::Real,
            "realtime" => VarKind::RealTime,
            "reg" => VarKind::Reg,
            "supply0" => VarKind::Supply0,
            "supply1" => VarKind::Supply1,
            "time" => VarKind::Time,
            "tri" => VarKind::Tri,
            "triand" => VarKind::TriAnd,
            "trior" => VarKind::TriOr,
            "trireg" => VarKind::TriReg,
            "tri0" => VarKind::Tri0,
            "tri1" => VarKind::Tri1,
            "wand" => VarKind::WAnd,
            "wire" => VarKind::Wire,
            "wor" => VarKind::WOr,
            "string" => VarKind::String,
            "logic" => VarKind::Logic,
            "bit" => VarKind::Bit,
            "int" => VarKind::Int,
            "shortint" => VarKind::ShortInt,
            "longint" => VarKind::LongInt,
            "byte" => VarKind::Byte,
            "enum" => VarKind::Enum,
            "shortreal" => VarKind::ShortReal,
            "port" => VarKind::Port,
            other => VarKind::Other(other.to_string()),
        }
    }

    /// Returns the type name as written in VCD.
    pub fn as_str(&self) -> &str {
        match self {
            VarKind::Event => "event",
            VarKind::Integer => "integer",
            VarKind::Parameter => "parameter",
            VarKind::Real => "real",
            VarKind::RealTime => "realtime",
            VarKind::Reg => "reg",
            VarKind::Supply0 => "supply0",
            VarKind::Supply1 => "supply1",
            VarKind::Time => "time",
            VarKind::Tri => "tri",
            VarKind::TriAnd => "triand",
            VarKind::TriOr => "trior",
            VarKind::TriReg => "trireg",
            VarKind::Tri0 => "tri0",
            VarKind::Tri1 => "tri1",
            VarKind::WAnd => "wand",
            VarKind::Wire => "wire",
            VarKind::WOr => "wor",
            VarKind::String => "string",
            VarKind::Logic => "logic",
            VarKind::Bit => "bit",
            VarKind::Int => "int",
            VarKind::ShortInt => "shortint",
            VarKind::LongInt => "longint",
            VarKind::Byte => "byte",
            VarKind::Enum => "enum",
            VarKind::ShortReal => "shortreal",
            VarKind::Port => "port",
            VarKind::Other(name) => name,
        }
    }

    /// Returns `true` for floating-point kinds.
    pub fn is_real(&self) -> bool {
        matches!(self, VarKind::Real | VarKind::RealTime | VarKind::ShortReal)
    }
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for VarKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The optional `[msb:lsb]` or `[bit]` suffix of a `$var`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum BitRange {
    /// A single bit select, `[3]`.
    Bit(i64),
    /// A part select, `[7:0]`.
    Range {
        /// The left index.
        msb: i64,
        /// The right index.
        lsb: i64,
    },
}

impl BitRange {
    /// Parses `"[7:0]"` or `"[3]"`; `None` if malformed.
    pub fn parse(s: &str) -> Option<Self> {
        let inner = s.strip_prefix('[')?.strip_suffix(']')?;
        match inner.split_once(':') {
            Some((msb, lsb)) => Some(BitRange::Range {
                msb: msb.trim().parse().ok()?,
                lsb: lsb.trim().parse().ok()?,
            }),
            None => Some(BitRange::Bit(inner.trim().parse().ok()?)),
        }
    }
}

impl fmt::Display for BitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitRange::Bit(b) => write!(f, "[{b}]"),
            BitRange::Range { msb, lsb } => write!(f, "[{msb}:{lsb}]"),
        }
    }
}

/// A further `$var` that reuses an already-declared identifier code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Alias {
    /// Scope names from the root down to the declaring scope.
    pub scope: Vec<String>,
    /// The declared name.
    pub name: String,
    /// The optional bit range.
    pub range: Option<BitRange>,
}

/// A signal declaration: the first `$var` for an identifier code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Declaration {
    /// The identifier code.
    pub code: IdCode,
    /// The declared name.
    pub name: String,
    /// Scope names from the root down to the declaring scope.
    pub scope: Vec<String>,
    /// Bit width, at least 1.
    pub width: u32,
    /// The declared type.
    pub kind: VarKind,
    /// The optional bit range.
    pub range: Option<BitRange>,
    /// Later declarations sharing this code, in header order.
    pub aliases: Vec<Alias>,
}

impl Declaration {
    /// Joins the scope path and name with `separator`, e.g. `top.cpu.clk`.
    pub fn full_name(&self, separator: &str) -> String {
        join_path(&self.scope, &self.name, separator)
    }

    /// Returns the full names of this declaration and all of its aliases.
    pub fn full_names(&self, separator: &str) -> Vec<String> {
        std::iter::once(self.full_name(separator))
            .chain(
                self.aliases
                    .iter()
                    .map(|a| join_path(&a.scope, &a.name, separator)),
            )
            .collect()
    }
}

fn join_path(scope: &[String], name: &str, separator: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}{separator}{name}", scope.join(separator))
    }
}
