//! The value-change section: timestamps, dump blocks and value updates.
//!
//! [`ChangeParser`] pulls tokens from a [`Scanner`] already positioned after
//! `$enddefinitions` and turns them into validated [`Change`]s. It holds only
//! a shared borrow of the frozen [`VariableMap`] per call.

use std::io::BufRead;

use vcd_common::{Logic, LogicVec};

use crate::code_map::VariableMap;
use crate::error::{ParseError, ScanError, StreamError, StreamErrorKind};
use crate::position::Position;
use crate::scanner::Scanner;
use crate::token::{Keyword, Token, TokenKind};
use crate::value::Value;

/// Where the parser is in simulated time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// No `#n` seen yet; updates happen at time 0.
    AwaitingTimestamp,
    /// The most recent timestamp.
    AtTimestamp(u64),
}

impl State {
    /// The time updates are recorded at.
    pub fn time(self) -> u64 {
        match self {
            State::AwaitingTimestamp => 0,
            State::AtTimestamp(t) => t,
        }
    }
}

/// A validated value update.
#[derive(Clone, Debug, PartialEq)]
pub struct Change {
    /// Position of the signal in the variable map.
    pub index: usize,
    /// Simulation time.
    pub time: u64,
    /// Value extended to the declared width.
    pub value: Value,
}

/// Pull parser for the value-change section.
pub struct ChangeParser<R> {
    scanner: Scanner<R>,
    state: State,
    in_block: Option<Keyword>,
    finished: bool,
}

impl<R: BufRead> ChangeParser<R> {
    /// Wraps a scanner that has just consumed `$enddefinitions $end`.
    pub fn new(scanner: Scanner<R>) -> Self {
        Self {
            scanner,
            state: State::AwaitingTimestamp,
            in_block: None,
            finished: false,
        }
    }

    /// Returns the current time state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns `true` once input is exhausted or an error has been returned.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns the next update, or `None` at end of input.
    ///
    /// After the first error every further call returns `Ok(None)`.
    pub fn next_change(&mut self, variables: &VariableMap) -> Result<Option<Change>, ParseError> {
        if self.finished {
            return Ok(None);
        }
        let result = self.advance(variables);
        if !matches!(result, Ok(Some(_))) {
            self.finished = true;
        }
        result
    }

    fn advance(&mut self, variables: &VariableMap) -> Result<Option<Change>, ParseError> {
        loop {
            let Some(Token { kind, position }) = self.scanner.next_token()? else {
                if let Some(kw) = self.in_block {
                    log::warn!("input ended inside an unterminated {} block", kw.as_str());
                }
                return Ok(None);
            };
            match kind {
                TokenKind::Timestamp(t) => self.set_time(t, position)?,
                TokenKind::Keyword(kw) if kw.is_dump_block() => self.in_block = Some(kw),
                TokenKind::Keyword(Keyword::End) => {
                    if self.in_block.take().is_none() {
                        log::debug!("ignoring stray $end at {position}");
                    }
                }
                TokenKind::Keyword(kw) => {
                    log::warn!("ignoring {} block after $enddefinitions at {position}", kw.as_str());
                    self.scanner.read_body(kw, position)?;
                }
                TokenKind::Scalar { value, code } => {
                    let (index, width) = resolve(variables, &code, position)?;
                    let value = if width == 1 {
                        Value::Scalar(value)
                    } else {
                        let mut bits = LogicVec::filled(width, value.extension());
                        bits.set(0, value);
                        Value::Vector(bits)
                    };
                    return Ok(Some(self.change(index, value)));
                }
                TokenKind::Vector { bits, code } => {
                    let (index, width) = resolve(variables, &code, position)?;
                    check_width(&bits, width, &code, position)?;
                    let vec = LogicVec::from_vcd_bits(&bits, width)
                        .ok_or_else(|| ScanError::new(position, "invalid digit in vector value"))?;
                    let value = if width == 1 {
                        Value::Scalar(vec.get(0))
                    } else {
                        Value::Vector(vec)
                    };
                    return Ok(Some(self.change(index, value)));
                }
                TokenKind::Real { value, code } => {
                    let (index, _) = resolve(variables, &code, position)?;
                    return Ok(Some(self.change(index, Value::Real(value))));
                }
                TokenKind::Str { value, code } => {
                    let (index, _) = resolve(variables, &code, position)?;
                    return Ok(Some(self.change(index, Value::String(value))));
                }
                TokenKind::Word(word) => {
                    return Err(ScanError::new(
                        position,
                        format!("unexpected token '{word}' in value changes"),
                    )
                    .into());
                }
            }
        }
    }

    fn set_time(&mut self, time: u64, position: Position) -> Result<(), StreamError> {
        let current = self.state.time();
        if time < current {
            return Err(StreamError {
                position,
                kind: StreamErrorKind::TimestampRegression {
                    current,
                    found: time,
                },
            });
        }
        log::trace!("#{time}");
        self.state = State::AtTimestamp(time);
        Ok(())
    }

    fn change(&self, index: usize, value: Value) -> Change {
        Change {
            index,
            time: self.state.time(),
            value,
        }
    }
}

/// Looks up `code`, returning its map position and declared width.
fn resolve(
    variables: &VariableMap,
    code: &str,
    position: Position,
) -> Result<(usize, u32), StreamError> {
    variables
        .index_of(code)
        .and_then(|i| variables.get_index(i).map(|(_, decl)| (i, decl.width)))
        .ok_or_else(|| StreamError {
            position,
            kind: StreamErrorKind::UndeclaredIdentifier {
                code: code.to_string(),
            },
        })
}

/// Rejects digit strings wider than the signal, except all-`x` or all-`z`.
fn check_width(bits: &[u8], width: u32, code: &str, position: Position) -> Result<(), StreamError> {
    if bits.len() as u64 <= u64::from(width) {
        return Ok(());
    }
    let first = Logic::from_vcd_byte(bits[0]);
    let uniform = bits.iter().all(|&b| Logic::from_vcd_byte(b) == first);
    if uniform && first.is_some_and(Logic::is_unknown) {
        return Ok(());
    }
    Err(StreamError {
        position,
        kind: StreamErrorKind::ValueTooWide {
            code: code.to_string(),
            declared: width,
            found: bits.len(),
        },
    })
}
