//! Lexical scanner for VCD text.
//!
//! VCD is whitespace-delimited with no significant line structure, so the
//! scanner works on words pulled from any [`BufRead`] through its buffer
//! window, never holding more than one word at a time. `$comment` blocks and
//! unknown `$keyword ... $end` blocks are skipped wholesale. In
//! [`ScanMode::Changes`] each word is classified by its lead character into
//! timestamps and value updates; in [`ScanMode::Declarations`] non-keyword
//! words are returned as-is for the header parser.

use std::io::{self, BufRead};

use vcd_common::Logic;

use crate::error::{ParseError, ScanError};
use crate::position::Position;
use crate::token::{Keyword, Token, TokenKind};

/// How the scanner classifies words that are not keywords.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanMode {
    /// Header: plain words.
    Declarations,
    /// After `$enddefinitions`: timestamps and value updates.
    Changes,
}

/// A lazy, forward-only tokenizer over a buffered reader.
pub struct Scanner<R> {
    reader: R,
    mode: ScanMode,
    offset: u64,
    line: u32,
    line_start: u64,
    /// The word most recently read by `read_word`.
    word: Vec<u8>,
}

impl<R: BufRead> Scanner<R> {
    /// Creates a scanner in declarations mode at the start of `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            mode: ScanMode::Declarations,
            offset: 0,
            line: 1,
            line_start: 0,
            word: Vec::with_capacity(64),
        }
    }

    /// Returns the current classification mode.
    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// Switches the classification mode for subsequent tokens.
    pub fn set_mode(&mut self, mode: ScanMode) {
        self.mode = mode;
    }

    /// Returns the position of the next unread byte.
    pub fn current_position(&self) -> Position {
        Position {
            offset: self.offset,
            line: self.line,
            column: column_at(self.offset, self.line_start),
        }
    }

    /// Returns the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        loop {
            let Some(start) = self.read_word()? else {
                return Ok(None);
            };
            if self.word[0] == b'$' {
                match Keyword::lookup(&self.word) {
                    Some(Keyword::Comment) => {
                        self.skip_block("$comment", start)?;
                        continue;
                    }
                    Some(kw) => {
                        return Ok(Some(Token {
                            kind: TokenKind::Keyword(kw),
                            position: start,
                        }));
                    }
                    None => {
                        let name = lossy(&self.word);
                        log::debug!("skipping unknown {name} block at {start}");
                        self.skip_block(&name, start)?;
                        continue;
                    }
                }
            }
            let kind = match self.mode {
                ScanMode::Declarations => TokenKind::Word(lossy(&self.word)),
                ScanMode::Changes => self.classify_change(start)?,
            };
            return Ok(Some(Token {
                kind,
                position: start,
            }));
        }
    }

    /// Reads the raw words of a keyword body up to and excluding `$end`.
    ///
    /// Words are not classified, so identifier codes such as `$` or `#` pass
    /// through untouched. `start` is the keyword's position, used when the
    /// body is never terminated.
    pub fn read_body(&mut self, keyword: Keyword, start: Position) -> Result<Vec<String>, ParseError> {
        let mut words = Vec::new();
        loop {
            if self.read_word()?.is_none() {
                return Err(ScanError::new(
                    start,
                    format!("unterminated {} block", keyword.as_str()),
                )
                .into());
            }
            if self.word.eq_ignore_ascii_case(b"$end") {
                return Ok(words);
            }
            words.push(lossy(&self.word));
        }
    }

    fn skip_block(&mut self, name: &str, start: Position) -> Result<(), ParseError> {
        loop {
            if self.read_word()?.is_none() {
                return Err(ScanError::new(start, format!("unterminated {name} block")).into());
            }
            if self.word.eq_ignore_ascii_case(b"$end") {
                return Ok(());
            }
        }
    }

    fn classify_change(&mut self, start: Position) -> Result<TokenKind, ParseError> {
        match self.word[0] {
            b'#' => parse_digits(&self.word[1..])
                .map(TokenKind::Timestamp)
                .ok_or_else(|| {
                    ScanError::new(start, format!("malformed timestamp '{}'", lossy(&self.word)))
                        .into()
                }),
            b'b' | b'B' => {
                let bits = self.word[1..].to_vec();
                if bits.is_empty() {
                    return Err(ScanError::new(start, "empty vector value").into());
                }
                if let Some(&bad) = bits.iter().find(|&&b| Logic::from_vcd_byte(b).is_none()) {
                    return Err(ScanError::new(
                        start,
                        format!("invalid digit '{}' in vector value", bad as char),
                    )
                    .into());
                }
                let code = self.expect_code(start, "vector")?;
                Ok(TokenKind::Vector { bits, code })
            }
            b'r' | b'R' => {
                let text = lossy(&self.word[1..]);
                let value: f64 = text.parse().map_err(|_| {
                    ScanError::new(start, format!("malformed real value '{text}'"))
                })?;
                let code = self.expect_code(start, "real")?;
                Ok(TokenKind::Real { value, code })
            }
            b's' | b'S' => {
                let value = self.read_string_value(start)?;
                let code = self.expect_code(start, "string")?;
                Ok(TokenKind::Str { value, code })
            }
            lead => {
                let Some(value) = Logic::from_vcd_byte(lead) else {
                    return Err(ScanError::new(
                        start,
                        format!("unexpected token '{}' in value changes", lossy(&self.word)),
                    )
                    .into());
                };
                if self.word.len() < 2 {
                    return Err(ScanError::new(
                        start,
                        format!("missing identifier code after scalar value '{}'", lead as char),
                    )
                    .into());
                }
                Ok(TokenKind::Scalar {
                    value,
                    code: lossy(&self.word[1..]),
                })
            }
        }
    }

    fn expect_code(&mut self, start: Position, what: &str) -> Result<String, ParseError> {
        match self.read_word()? {
            Some(_) => Ok(lossy(&self.word)),
            None => Err(ScanError::new(
                start,
                format!("missing identifier code after {what} value"),
            )
            .into()),
        }
    }

    /// Decodes the value of an `s` word, continuing past whitespace while a
    /// quoted string is open.
    fn read_string_value(&mut self, start: Position) -> Result<String, ParseError> {
        if self.word.get(1) != Some(&b'"') {
            return Ok(lossy(&self.word[1..]));
        }
        let mut quoted = QuotedString::default();
        let mut closed_at = None;
        for i in 2..self.word.len() {
            if quoted.feed(self.word[i]) {
                closed_at = Some(i);
                break;
            }
        }
        match closed_at {
            Some(i) if i + 1 < self.word.len() => {
                return Err(ScanError::new(start, "unexpected characters after closing quote").into());
            }
            Some(_) => return Ok(quoted.finish()),
            None => {}
        }
        loop {
            let Some(b) = self.read_byte()? else {
                return Err(ScanError::new(start, "unterminated quoted string").into());
            };
            if quoted.feed(b) {
                break;
            }
        }
        match self.peek_byte()? {
            Some(b) if !b.is_ascii_whitespace() => {
                Err(ScanError::new(start, "unexpected characters after closing quote").into())
            }
            _ => Ok(quoted.finish()),
        }
    }

    /// Reads the next whitespace-delimited word into `self.word`.
    ///
    /// Returns the word's start position, or `None` at end of input.
    fn read_word(&mut self) -> io::Result<Option<Position>> {
        self.skip_whitespace()?;
        let start = self.current_position();
        self.word.clear();
        loop {
            let buf = self.reader.fill_buf()?;
            if buf.is_empty() {
                break;
            }
            let n = buf
                .iter()
                .position(|b| b.is_ascii_whitespace())
                .unwrap_or(buf.len());
            self.word.extend_from_slice(&buf[..n]);
            let stop = n < buf.len();
            self.reader.consume(n);
            self.offset += n as u64;
            if stop {
                break;
            }
        }
        Ok(if self.word.is_empty() { None } else { Some(start) })
    }

    fn skip_whitespace(&mut self) -> io::Result<()> {
        loop {
            let buf = self.reader.fill_buf()?;
            if buf.is_empty() {
                return Ok(());
            }
            let mut consumed = 0usize;
            for &b in buf {
                if !b.is_ascii_whitespace() {
                    break;
                }
                consumed += 1;
                if b == b'\n' {
                    self.line += 1;
                    self.line_start = self.offset + consumed as u64;
                }
            }
            let stop = consumed < buf.len();
            self.reader.consume(consumed);
            self.offset += consumed as u64;
            if stop {
                return Ok(());
            }
        }
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let Some(&b) = self.reader.fill_buf()?.first() else {
            return Ok(None);
        };
        self.reader.consume(1);
        self.offset += 1;
        if b == b'\n' {
            self.line += 1;
            self.line_start = self.offset;
        }
        Ok(Some(b))
    }

    fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.reader.fill_buf()?.first().copied())
    }
}

/// 1-based column of `offset`, saturating on absurdly long lines.
fn column_at(offset: u64, line_start: u64) -> u32 {
    u32::try_from(offset - line_start).map_or(u32::MAX, |c| c.saturating_add(1))
}

impl<R: BufRead> Iterator for Scanner<R> {
    type Item = Result<Token, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

/// Escape-aware accumulator for the body of a quoted string value.
#[derive(Default)]
struct QuotedString {
    out: Vec<u8>,
    escaped: bool,
}

impl QuotedString {
    /// Consumes one byte; returns `true` when it was the closing quote.
    fn feed(&mut self, b: u8) -> bool {
        if self.escaped {
            self.escaped = false;
            self.out.push(match b {
                b'n' => b'\n',
                b't' => b'\t',
                b'r' => b'\r',
                other => other,
            });
            return false;
        }
        match b {
            b'\\' => {
                self.escaped = true;
                false
            }
            b'"' => true,
            other => {
                self.out.push(other);
                false
            }
        }
    }

    fn finish(self) -> String {
        String::from_utf8_lossy(&self.out).into_owned()
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Parses a non-empty run of ASCII digits; `None` on anything else or overflow.
fn parse_digits(digits: &[u8]) -> Option<u64> {
    if digits.is_empty() {
        return None;
    }
    digits.iter().try_fold(0u64, |acc, &d| {
        if !d.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add(u64::from(d - b'0'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor};

    fn changes(text: &str) -> Vec<TokenKind> {
        let mut scanner = Scanner::new(text.as_bytes());
        scanner.set_mode(ScanMode::Changes);
        scanner.map(|t| t.unwrap().kind).collect()
    }

    fn scan_err(text: &str, mode: ScanMode) -> ScanError {
        let mut scanner = Scanner::new(text.as_bytes());
        scanner.set_mode(mode);
        loop {
            match scanner.next_token() {
                Ok(Some(_)) => continue,
                Ok(None) => panic!("expected a scan error for {text:?}"),
                Err(ParseError::Scan(e)) => return e,
                Err(other) => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn declaration_words_and_keywords() {
        let scanner = Scanner::new("$scope module top $end".as_bytes());
        let kinds: Vec<_> = scanner.map(|t| t.unwrap().kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Keyword(Keyword::Scope),
                TokenKind::Word("module".into()),
                TokenKind::Word("top".into()),
                TokenKind::Keyword(Keyword::End),
            ]
        );
    }

    #[test]
    fn comment_blocks_are_skipped() {
        let text = "$comment\n  #5 1! $var is not parsed\n$end\n$upscope $end";
        let scanner = Scanner::new(text.as_bytes());
        let kinds: Vec<_> = scanner.map(|t| t.unwrap().kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Keyword(Keyword::Upscope),
                TokenKind::Keyword(Keyword::End)
            ]
        );
    }

    #[test]
    fn unknown_blocks_are_skipped() {
        let kinds = changes("$attrbegin misc 07 foo 1 $end #3 $dumpports 1! $end 0!");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Timestamp(3),
                TokenKind::Scalar {
                    value: Logic::Zero,
                    code: "!".into()
                },
            ]
        );
    }

    #[test]
    fn unterminated_comment_errors() {
        let e = scan_err("$timescale 1ns $end\n$comment never closed", ScanMode::Declarations);
        assert!(e.message.contains("unterminated $comment"));
        assert_eq!(e.position.line, 2);
        assert_eq!(e.position.column, 1);
    }

    #[test]
    fn value_updates_classified() {
        let kinds = changes("#0 0! x\" b10z1 # B1 $ r3.5 % R-1e-3 & sidle '");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Timestamp(0),
                TokenKind::Scalar {
                    value: Logic::Zero,
                    code: "!".into()
                },
                TokenKind::Scalar {
                    value: Logic::X,
                    code: "\"".into()
                },
                TokenKind::Vector {
                    bits: b"10z1".to_vec(),
                    code: "#".into()
                },
                TokenKind::Vector {
                    bits: b"1".to_vec(),
                    code: "$".into()
                },
                TokenKind::Real {
                    value: 3.5,
                    code: "%".into()
                },
                TokenKind::Real {
                    value: -1e-3,
                    code: "&".into()
                },
                TokenKind::Str {
                    value: "idle".into(),
                    code: "'".into()
                },
            ]
        );
    }

    #[test]
    fn nine_state_scalars_fold_like_vector_digits() {
        let kinds = changes("u! h\" L# -$ W%");
        let values: Vec<_> = kinds
            .iter()
            .map(|k| match k {
                TokenKind::Scalar { value, .. } => *value,
                other => panic!("expected a scalar, got {other:?}"),
            })
            .collect();
        assert_eq!(values, vec![Logic::X, Logic::One, Logic::Zero, Logic::X, Logic::X]);
        assert_eq!(
            changes("bu !"),
            vec![TokenKind::Vector {
                bits: b"u".to_vec(),
                code: "!".into()
            }]
        );
        assert!(scan_err("u", ScanMode::Changes)
            .message
            .contains("missing identifier code after scalar value 'u'"));
    }

    #[test]
    fn quoted_string_spans_whitespace() {
        let kinds = changes("s\"hello  \\\"big\\\"\nworld\" %");
        assert_eq!(
            kinds,
            vec![TokenKind::Str {
                value: "hello  \"big\"\nworld".into(),
                code: "%".into()
            }]
        );
    }

    #[test]
    fn quoted_string_in_one_word() {
        let kinds = changes("s\"hello\" %");
        assert_eq!(
            kinds,
            vec![TokenKind::Str {
                value: "hello".into(),
                code: "%".into()
            }]
        );
    }

    #[test]
    fn unterminated_quoted_string_errors() {
        let e = scan_err("#1 s\"never closed %", ScanMode::Changes);
        assert_eq!(e.message, "unterminated quoted string");
        assert_eq!(e.position.column, 4);
    }

    #[test]
    fn malformed_changes_error() {
        assert!(scan_err("#12a", ScanMode::Changes)
            .message
            .contains("malformed timestamp"));
        assert!(scan_err("#", ScanMode::Changes)
            .message
            .contains("malformed timestamp"));
        assert!(scan_err("b10q1 !", ScanMode::Changes)
            .message
            .contains("invalid digit 'q'"));
        assert!(scan_err("rpi !", ScanMode::Changes)
            .message
            .contains("malformed real"));
        assert!(scan_err("b101", ScanMode::Changes)
            .message
            .contains("missing identifier code"));
        assert!(scan_err("1", ScanMode::Changes)
            .message
            .contains("missing identifier code"));
        assert!(scan_err("?hello", ScanMode::Changes)
            .message
            .contains("unexpected token"));
    }

    #[test]
    fn read_body_passes_dollar_codes_through() {
        let mut scanner = Scanner::new("$var wire 1 $ clk $end".as_bytes());
        let tok = scanner.next_token().unwrap().unwrap();
        assert_eq!(tok.kind, TokenKind::Keyword(Keyword::Var));
        let body = scanner.read_body(Keyword::Var, tok.position).unwrap();
        assert_eq!(body, vec!["wire", "1", "$", "clk"]);
        assert!(scanner.next_token().unwrap().is_none());
    }

    #[test]
    fn read_body_unterminated() {
        let mut scanner = Scanner::new("$var wire 1 ! clk".as_bytes());
        let tok = scanner.next_token().unwrap().unwrap();
        let err = scanner.read_body(Keyword::Var, tok.position).unwrap_err();
        assert!(matches!(err, ParseError::Scan(e) if e.message == "unterminated $var block"));
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let mut scanner = Scanner::new("#0\n  1!\n\n#10".as_bytes());
        scanner.set_mode(ScanMode::Changes);
        let positions: Vec<_> = scanner.map(|t| t.unwrap().position).collect();
        assert_eq!(
            positions,
            vec![
                Position {
                    offset: 0,
                    line: 1,
                    column: 1
                },
                Position {
                    offset: 5,
                    line: 2,
                    column: 3
                },
                Position {
                    offset: 9,
                    line: 4,
                    column: 1
                },
            ]
        );
    }

    #[test]
    fn column_saturates_on_huge_lines() {
        assert_eq!(column_at(10, 4), 7);
        assert_eq!(column_at(u64::from(u32::MAX) - 1, 0), u32::MAX);
        assert_eq!(column_at(u64::from(u32::MAX), 0), u32::MAX);
        assert_eq!(column_at(1 << 40, 0), u32::MAX);
    }

    #[test]
    fn tiny_buffer_window_matches_slice() {
        let text = "#0 b0101 !! r2.25 \"\n#1000 s\"a b\" % 1!!\n";
        let reader = BufReader::with_capacity(3, Cursor::new(text.as_bytes().to_vec()));
        let mut windowed = Scanner::new(reader);
        windowed.set_mode(ScanMode::Changes);
        let windowed: Vec<_> = windowed.map(|t| t.unwrap()).collect();

        let mut whole = Scanner::new(text.as_bytes());
        whole.set_mode(ScanMode::Changes);
        let whole: Vec<_> = whole.map(|t| t.unwrap()).collect();

        assert_eq!(windowed, whole);
        assert_eq!(whole.len(), 6);
    }

    #[test]
    fn parse_digits_bounds() {
        assert_eq!(parse_digits(b"0"), Some(0));
        assert_eq!(parse_digits(b"18446744073709551615"), Some(u64::MAX));
        assert_eq!(parse_digits(b"18446744073709551616"), None);
        assert_eq!(parse_digits(b"+5"), None);
    }
}
