//! Pull-based streaming over a VCD source.
//!
//! A [`VcdStream`] parses the header eagerly and then hands out one
//! [`ValueChange`] per `next()`. Dropping it early is a normal way to stop
//! and releases the underlying reader.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::iter::FusedIterator;
use std::path::Path;

use crate::changes::ChangeParser;
use crate::code_map::VariableMap;
use crate::error::{ParseError, VcdFileError};
use crate::header::{parse_header, Header, HeaderInfo};
use crate::model::{ModelBuilder, VcdFile};
use crate::scanner::Scanner;
use crate::scope::ScopeTree;
use crate::value::ValueChange;

/// A header plus a lazy sequence of value changes.
pub struct VcdStream<R> {
    filename: String,
    header: Header,
    parser: ChangeParser<R>,
}

impl VcdStream<BufReader<File>> {
    /// Opens `path` and parses its header, reading through a window of
    /// `capacity` bytes.
    pub fn open(path: impl AsRef<Path>, capacity: usize) -> Result<Self, VcdFileError> {
        let path = path.as_ref();
        let filename = path.display().to_string();
        let file = File::open(path).map_err(|source| VcdFileError::Io {
            path: filename.clone(),
            source,
        })?;
        Self::from_reader(filename, BufReader::with_capacity(capacity, file))
    }
}

impl<R: BufRead> VcdStream<R> {
    /// Parses the header from `reader`; value changes are read on demand.
    pub fn from_reader(filename: impl Into<String>, reader: R) -> Result<Self, VcdFileError> {
        let filename = filename.into();
        let mut scanner = Scanner::new(reader);
        let header =
            parse_header(&mut scanner).map_err(|e| e.into_file_error(&filename, None))?;
        Ok(Self {
            filename,
            header,
            parser: ChangeParser::new(scanner),
        })
    }

    /// The name this stream was opened with.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Date, version and timescale.
    pub fn header(&self) -> &HeaderInfo {
        &self.header.info
    }

    /// The frozen declarations.
    pub fn variable_map(&self) -> &VariableMap {
        &self.header.variables
    }

    /// The frozen scope hierarchy.
    pub fn scopes(&self) -> &ScopeTree {
        &self.header.scopes
    }

    /// Folds every change not yet pulled into a [`VcdFile`].
    ///
    /// Called on a fresh stream this yields the same model as a bulk load.
    /// On a stream error the model of everything before it is returned
    /// inside [`VcdFileError::Stream`].
    pub fn into_model(self) -> Result<VcdFile, VcdFileError> {
        let Self {
            filename,
            header,
            mut parser,
        } = self;
        let mut builder = ModelBuilder::new(filename.clone(), header);
        loop {
            match parser.next_change(builder.variables()) {
                Ok(Some(change)) => {
                    if let Err(e) = builder.record(change) {
                        let partial = builder.finish();
                        return Err(ParseError::from(e).into_file_error(&filename, Some(partial)));
                    }
                }
                Ok(None) => return Ok(builder.finish()),
                Err(e @ ParseError::Stream(_)) => {
                    let partial = builder.finish();
                    return Err(e.into_file_error(&filename, Some(partial)));
                }
                Err(e) => return Err(e.into_file_error(&filename, None)),
            }
        }
    }
}

impl<R: BufRead> Iterator for VcdStream<R> {
    type Item = Result<ValueChange, VcdFileError>;

    fn next(&mut self) -> Option<Self::Item> {
        let variables = &self.header.variables;
        match self.parser.next_change(variables) {
            Ok(Some(change)) => {
                let (code, _) = variables.get_index(change.index)?;
                Some(Ok(ValueChange {
                    time: change.time,
                    code: code.clone(),
                    value: change.value,
                }))
            }
            Ok(None) => None,
            Err(e) => Some(Err(e.into_file_error(&self.filename, None))),
        }
    }
}

impl<R: BufRead> FusedIterator for VcdStream<R> {}
