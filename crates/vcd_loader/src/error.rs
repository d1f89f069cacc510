//! Error types for VCD loading.
//!
//! Each pipeline stage has its own error: [`ScanError`] for malformed tokens,
//! [`HeaderError`] for malformed declarations and [`StreamError`] for
//! invariant violations in the value-change section. Inside the pipeline they
//! travel as [`ParseError`]; the loader façade converts them into the single
//! externally visible [`VcdFileError`].

use std::fmt;
use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::model::VcdFile;
use crate::position::Position;

/// A malformed token or an unterminated construct.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("scan error at {position}: {message}")]
pub struct ScanError {
    /// Where the offending token starts.
    pub position: Position,
    /// Description of the problem.
    pub message: String,
}

impl ScanError {
    /// Creates a scan error at the given position.
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

/// A malformed declaration section.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("header error at {position}: {message}")]
pub struct HeaderError {
    /// Where the offending declaration starts.
    pub position: Position,
    /// Description of the problem.
    pub message: String,
}

impl HeaderError {
    /// Creates a header error at the given position.
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

/// A violation of the value-change invariants.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("stream error at {position}: {kind}")]
pub struct StreamError {
    /// Where the offending token starts.
    pub position: Position,
    /// Which invariant was violated.
    pub kind: StreamErrorKind,
}

/// The invariant a [`StreamError`] reports.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StreamErrorKind {
    /// A value change names an identifier code absent from the header.
    #[error("undeclared identifier code '{code}'")]
    UndeclaredIdentifier {
        /// The unknown code.
        code: String,
    },
    /// A timestamp is smaller than the one before it.
    #[error("timestamp #{found} is earlier than the current time #{current}")]
    TimestampRegression {
        /// The time in effect before the offending timestamp.
        current: u64,
        /// The offending timestamp.
        found: u64,
    },
    /// A vector value has more digits than its signal has bits.
    #[error("{found}-bit value is wider than {declared}-bit signal '{code}'")]
    ValueTooWide {
        /// The identifier code of the signal.
        code: String,
        /// The declared width of the signal.
        declared: u32,
        /// The number of digits in the value.
        found: usize,
    },
}

/// The category of a [`VcdFileError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// The file is missing or unreadable.
    Io,
    /// Malformed tokens or unterminated constructs.
    Scan,
    /// Malformed declarations or a missing `$enddefinitions`.
    Header,
    /// Undeclared identifiers, timestamp regressions or over-wide values.
    Stream,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Io => "io",
            ErrorKind::Scan => "scan",
            ErrorKind::Header => "header",
            ErrorKind::Stream => "stream",
        };
        f.write_str(name)
    }
}

/// Failure inside the parsing pipeline, before file context is attached.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Reading the input failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// See [`ScanError`].
    #[error(transparent)]
    Scan(#[from] ScanError),
    /// See [`HeaderError`].
    #[error(transparent)]
    Header(#[from] HeaderError),
    /// See [`StreamError`].
    #[error(transparent)]
    Stream(#[from] StreamError),
}

impl ParseError {
    /// Attaches the file name (and, for stream errors, the partial model).
    pub fn into_file_error(self, filename: &str, partial: Option<VcdFile>) -> VcdFileError {
        match self {
            ParseError::Io(source) => VcdFileError::Io {
                path: filename.to_string(),
                source,
            },
            ParseError::Scan(e) => VcdFileError::Scan(e),
            ParseError::Header(e) => VcdFileError::Header(e),
            ParseError::Stream(error) => VcdFileError::Stream {
                error,
                partial: partial.map(Box::new),
            },
        }
    }
}

/// Errors returned by the loader entry points.
#[derive(Debug, Error)]
pub enum VcdFileError {
    /// The file could not be opened or read.
    #[error("failed to read '{path}': {source}")]
    Io {
        /// The path (or in-memory name) of the input.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// See [`ScanError`].
    #[error(transparent)]
    Scan(#[from] ScanError),
    /// See [`HeaderError`].
    #[error(transparent)]
    Header(#[from] HeaderError),
    /// A value-change invariant was violated.
    ///
    /// Bulk loads attach everything parsed before the error as `partial`;
    /// streaming loads leave it empty because the caller owns the events.
    #[error("{error}")]
    Stream {
        /// The first violation encountered.
        error: StreamError,
        /// The model built from all events preceding the violation.
        partial: Option<Box<VcdFile>>,
    },
}

impl VcdFileError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VcdFileError::Io { .. } => ErrorKind::Io,
            VcdFileError::Scan(_) => ErrorKind::Scan,
            VcdFileError::Header(_) => ErrorKind::Header,
            VcdFileError::Stream { .. } => ErrorKind::Stream,
        }
    }

    /// Returns the input position of the error, if it has one.
    pub fn position(&self) -> Option<Position> {
        match self {
            VcdFileError::Io { .. } => None,
            VcdFileError::Scan(e) => Some(e.position),
            VcdFileError::Header(e) => Some(e.position),
            VcdFileError::Stream { error, .. } => Some(error.position),
        }
    }

    /// Returns the stream error, if this is one.
    pub fn stream_error(&self) -> Option<&StreamError> {
        match self {
            VcdFileError::Stream { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Returns the partial model collected before a stream error.
    pub fn partial_model(&self) -> Option<&VcdFile> {
        match self {
            VcdFileError::Stream { partial, .. } => partial.as_deref(),
            _ => None,
        }
    }

    /// Consumes the error, returning the partial model collected before a stream error.
    pub fn into_partial_model(self) -> Option<VcdFile> {
        match self {
            VcdFileError::Stream { partial, .. } => partial.map(|model| *model),
            _ => None,
        }
    }
}
