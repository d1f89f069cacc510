//! Source positions attached to tokens and errors.

use serde::Serialize;
use std::fmt;

/// A location in the VCD input.
///
/// `offset` is the 0-based byte offset; `line` and `column` are 1-based for
/// display to users. Columns count bytes, not characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    /// Byte offset from the start of the input.
    pub offset: u64,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub column: u32,
}

impl Position {
    /// The position of the first byte of the input.
    pub const START: Position = Position {
        offset: 0,
        line: 1,
        column: 1,
    };
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let pos = Position {
            offset: 42,
            line: 3,
            column: 7,
        };
        assert_eq!(format!("{pos}"), "line 3, column 7");
    }

    #[test]
    fn default_is_start() {
        assert_eq!(Position::default(), Position::START);
        assert_eq!(Position::START.offset, 0);
    }
}
