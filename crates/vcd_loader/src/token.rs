//! Token types produced by the [`Scanner`](crate::scanner::Scanner).

use vcd_common::Logic;

use crate::position::Position;

/// A VCD `$keyword`.
///
/// `$comment` is recognized so the scanner can skip it; it is never returned
/// as a token.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Keyword {
    /// `$comment`
    Comment,
    /// `$date`
    Date,
    /// `$version`
    Version,
    /// `$timescale`
    Timescale,
    /// `$scope`
    Scope,
    /// `$upscope`
    Upscope,
    /// `$var`
    Var,
    /// `$enddefinitions`
    EndDefinitions,
    /// `$dumpvars`
    DumpVars,
    /// `$dumpall`
    DumpAll,
    /// `$dumpon`
    DumpOn,
    /// `$dumpoff`
    DumpOff,
    /// `$end`
    End,
}

impl Keyword {
    /// Looks up a keyword from its spelling, including the leading `$`.
    ///
    /// Matching is ASCII case-insensitive.
    pub fn lookup(word: &[u8]) -> Option<Self> {
        const TABLE: [(&str, Keyword); 13] = [
            ("$comment", Keyword::Comment),
            ("$date", Keyword::Date),
            ("$version", Keyword::Version),
            ("$timescale", Keyword::Timescale),
            ("$scope", Keyword::Scope),
            ("$upscope", Keyword::Upscope),
            ("$var", Keyword::Var),
            ("$enddefinitions", Keyword::EndDefinitions),
            ("$dumpvars", Keyword::DumpVars),
            ("$dumpall", Keyword::DumpAll),
            ("$dumpon", Keyword::DumpOn),
            ("$dumpoff", Keyword::DumpOff),
            ("$end", Keyword::End),
        ];
        TABLE
            .iter()
            .find(|(spelling, _)| spelling.as_bytes().eq_ignore_ascii_case(word))
            .map(|&(_, kw)| kw)
    }

    /// Returns the canonical spelling, including the leading `$`.
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Comment => "$comment",
            Keyword::Date => "$date",
            Keyword::Version => "$version",
            Keyword::Timescale => "$timescale",
            Keyword::Scope => "$scope",
            Keyword::Upscope => "$upscope",
            Keyword::Var => "$var",
            Keyword::EndDefinitions => "$enddefinitions",
            Keyword::DumpVars => "$dumpvars",
            Keyword::DumpAll => "$dumpall",
            Keyword::DumpOn => "$dumpon",
            Keyword::DumpOff => "$dumpoff",
            Keyword::End => "$end",
        }
    }

    /// Returns `true` for the simulation keywords whose blocks hold value changes.
    pub fn is_dump_block(self) -> bool {
        matches!(
            self,
            Keyword::DumpVars | Keyword::DumpAll | Keyword::DumpOn | Keyword::DumpOff
        )
    }
}

/// The kind of a scanned token.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// A recognized `$keyword`.
    Keyword(Keyword),
    /// Any other whitespace-delimited word (declarations mode only).
    Word(String),
    /// `#<digits>`
    Timestamp(u64),
    /// `0!`, `x#`: a single-bit value immediately followed by its code.
    Scalar {
        /// The bit value.
        value: Logic,
        /// The identifier code.
        code: String,
    },
    /// `b0101 #`: the digits (MSB first) and the code.
    Vector {
        /// The raw digits, already checked to be valid logic characters.
        bits: Vec<u8>,
        /// The identifier code.
        code: String,
    },
    /// `r3.14 $`
    Real {
        /// The decoded number.
        value: f64,
        /// The identifier code.
        code: String,
    },
    /// `s"hello" %` or `shello %`
    Str {
        /// The decoded text, quotes and escapes removed.
        value: String,
        /// The identifier code.
        code: String,
    },
}

/// A token together with the position of its first byte.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// What was scanned.
    pub kind: TokenKind,
    /// Where it starts.
    pub position: Position,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(Keyword::lookup(b"$var"), Some(Keyword::Var));
        assert_eq!(Keyword::lookup(b"$VAR"), Some(Keyword::Var));
        assert_eq!(Keyword::lookup(b"$EndDefinitions"), Some(Keyword::EndDefinitions));
        assert_eq!(Keyword::lookup(b"$attrbegin"), None);
        assert_eq!(Keyword::lookup(b"var"), None);
    }

    #[test]
    fn spelling_roundtrip() {
        for kw in [
            Keyword::Comment,
            Keyword::Date,
            Keyword::Version,
            Keyword::Timescale,
            Keyword::Scope,
            Keyword::Upscope,
            Keyword::Var,
            Keyword::EndDefinitions,
            Keyword::DumpVars,
            Keyword::DumpAll,
            Keyword::DumpOn,
            Keyword::DumpOff,
            Keyword::End,
        ] {
            assert_eq!(Keyword::lookup(kw.as_str().as_bytes()), Some(kw));
        }
    }

    #[test]
    fn dump_blocks() {
        assert!(Keyword::DumpVars.is_dump_block());
        assert!(Keyword::DumpOff.is_dump_block());
        assert!(!Keyword::Var.is_dump_block());
        assert!(!Keyword::End.is_dump_block());
    }
}
