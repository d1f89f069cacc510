//! Parsing of the declaration section up to `$enddefinitions $end`.

use std::io::BufRead;

use serde::Serialize;

use crate::code_map::VariableMap;
use crate::declaration::{Alias, BitRange, Declaration, IdCode, VarKind};
use crate::error::{HeaderError, ParseError};
use crate::position::Position;
use crate::scanner::{ScanMode, Scanner};
use crate::scope::{ScopeKind, ScopeTree, ScopeTreeBuilder};
use crate::timescale::Timescale;
use crate::token::{Keyword, TokenKind};

/// Free-form header metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HeaderInfo {
    /// Text of the `$date` block, words joined by single spaces.
    pub date: Option<String>,
    /// Text of the `$version` block, words joined by single spaces.
    pub version: Option<String>,
    /// The `$timescale`, if declared.
    pub timescale: Option<Timescale>,
}

/// Everything declared before `$enddefinitions`. Frozen once returned.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    /// Date, version and timescale.
    pub info: HeaderInfo,
    /// The scope hierarchy.
    pub scopes: ScopeTree,
    /// One declaration per identifier code, in header order.
    pub variables: VariableMap,
}

/// Parses the header from `scanner`, leaving it positioned at the first
/// value-change token and switched to [`ScanMode::Changes`].
pub fn parse_header<R: BufRead>(scanner: &mut Scanner<R>) -> Result<Header, ParseError> {
    scanner.set_mode(ScanMode::Declarations);
    let mut info = HeaderInfo::default();
    let mut scopes = ScopeTreeBuilder::new();
    let mut variables = VariableMap::new();

    loop {
        let Some(token) = scanner.next_token()? else {
            return Err(HeaderError::new(
                scanner.current_position(),
                "unexpected end of input before $enddefinitions",
            )
            .into());
        };
        let at = token.position;
        let keyword = match token.kind {
            TokenKind::Keyword(kw) => kw,
            TokenKind::Word(word) => {
                return Err(HeaderError::new(
                    at,
                    format!("unexpected '{word}' before $enddefinitions"),
                )
                .into());
            }
            other => {
                return Err(HeaderError::new(
                    at,
                    format!("unexpected token {other:?} before $enddefinitions"),
                )
                .into());
            }
        };

        match keyword {
            Keyword::Date => info.date = Some(scanner.read_body(keyword, at)?.join(" ")),
            Keyword::Version => info.version = Some(scanner.read_body(keyword, at)?.join(" ")),
            Keyword::Timescale => {
                let body = scanner.read_body(keyword, at)?;
                let timescale =
                    Timescale::parse(&body).map_err(|e| HeaderError::new(at, e.to_string()))?;
                info.timescale = Some(timescale);
            }
            Keyword::Scope => {
                let body = scanner.read_body(keyword, at)?;
                let (kind, name) = match body.as_slice() {
                    [kind, name, rest @ ..] => {
                        if !rest.is_empty() {
                            log::warn!("ignoring extra words in $scope at {at}: {rest:?}");
                        }
                        (ScopeKind::parse(kind), name)
                    }
                    _ => return Err(HeaderError::new(at, "$scope is missing a kind or name").into()),
                };
                scopes.push(kind, name);
            }
            Keyword::Upscope => {
                scanner.read_body(keyword, at)?;
                if !scopes.pop() {
                    return Err(HeaderError::new(at, "$upscope without a matching $scope").into());
                }
            }
            Keyword::Var => {
                let body = scanner.read_body(keyword, at)?;
                declare_var(&body, at, &mut scopes, &mut variables)?;
            }
            Keyword::EndDefinitions => {
                scanner.read_body(keyword, at)?;
                if !scopes.path().is_empty() {
                    log::warn!(
                        "{} scope(s) still open at $enddefinitions ({})",
                        scopes.path().len(),
                        scopes.path().join(".")
                    );
                }
                break;
            }
            Keyword::End => log::debug!("ignoring stray $end at {at}"),
            Keyword::DumpVars | Keyword::DumpAll | Keyword::DumpOn | Keyword::DumpOff => {
                return Err(HeaderError::new(
                    at,
                    format!("{} before $enddefinitions", keyword.as_str()),
                )
                .into());
            }
            // The scanner consumes comments itself.
            Keyword::Comment => {}
        }
    }

    scanner.set_mode(ScanMode::Changes);
    let scopes = scopes.finish();
    log::debug!(
        "header parsed: {} variables, {} scopes, timescale {}",
        variables.len(),
        scopes.scope_count(),
        info.timescale
            .map_or_else(|| "unspecified".to_string(), |ts| ts.to_string())
    );
    Ok(Header {
        info,
        scopes,
        variables,
    })
}

/// Handles `$var <type> <width> <code> <name> [<range>] $end`.
fn declare_var(
    body: &[String],
    at: Position,
    scopes: &mut ScopeTreeBuilder,
    variables: &mut VariableMap,
) -> Result<(), HeaderError> {
    let [kind, width, code, name, rest @ ..] = body else {
        return Err(HeaderError::new(
            at,
            format!(
                "$var needs a type, width, identifier code and name, found {} word(s)",
                body.len()
            ),
        ));
    };
    let width = match width.parse::<u32>() {
        Ok(w) if w > 0 => w,
        _ => return Err(HeaderError::new(at, format!("invalid width '{width}' in $var"))),
    };
    let range = match rest.first() {
        Some(word) if word.starts_with('[') => Some(
            BitRange::parse(word)
                .ok_or_else(|| HeaderError::new(at, format!("malformed bit range '{word}'")))?,
        ),
        _ => None,
    };
    let extra = if range.is_some() { &rest[1..] } else { rest };
    if !extra.is_empty() {
        log::warn!("ignoring extra words in $var {name} at {at}: {extra:?}");
    }

    let code = IdCode::new(code.as_str());
    scopes.add_var(name, code.clone());
    let scope = scopes.path().to_vec();

    if let Some(original) = variables.get_mut(code.as_str()) {
        if original.width != width {
            return Err(HeaderError::new(
                at,
                format!(
                    "identifier code '{code}' redeclared as {width} bit(s), previously {}",
                    original.width
                ),
            ));
        }
        log::debug!("{name} aliases identifier code '{code}'");
        original.aliases.push(Alias {
            scope,
            name: name.clone(),
            range,
        });
        return Ok(());
    }

    variables.insert(
        code.clone(),
        Declaration {
            code,
            name: name.clone(),
            scope,
            width,
            kind: VarKind::parse(kind),
            range,
            aliases: Vec::new(),
        },
    );
    Ok(())
}
