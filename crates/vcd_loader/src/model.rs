//! The parsed file model and the builder that folds events into it.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::changes::Change;
use crate::code_map::{ValueMap, VariableMap};
use crate::declaration::{Declaration, IdCode};
use crate::error::{StreamError, StreamErrorKind};
use crate::header::{Header, HeaderInfo};
use crate::position::Position;
use crate::scope::ScopeTree;
use crate::value::{Timeline, Value, ValueChange};

/// A fully loaded VCD file.
///
/// `variable_map` and `value_map` have the same keys in the same order; a
/// signal that never changes has an empty timeline.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VcdFile {
    /// The path or name the file was loaded from.
    pub filename: String,
    /// Date, version and timescale.
    pub header: HeaderInfo,
    /// The scope hierarchy.
    pub scopes: ScopeTree,
    /// Identifier code to declaration.
    pub variable_map: VariableMap,
    /// Identifier code to timeline.
    pub value_map: ValueMap,
}

impl VcdFile {
    /// Returns the declaration for `code`.
    pub fn declaration(&self, code: &str) -> Option<&Declaration> {
        self.variable_map.get(code)
    }

    /// Returns the timeline for `code`.
    pub fn timeline(&self, code: &str) -> Option<&Timeline> {
        self.value_map.get(code)
    }

    /// Returns the value of `code` at `time`.
    pub fn value_at(&self, code: &str, time: u64) -> Option<&Value> {
        self.timeline(code)?.value_at(time)
    }

    /// Returns every code declared (directly or as an alias) under the full
    /// path `path`, e.g. `top.cpu.clk` with separator `"."`.
    pub fn find_codes(&self, path: &str, separator: &str) -> Vec<&IdCode> {
        self.variable_map
            .iter()
            .filter(|(_, decl)| decl.full_names(separator).iter().any(|n| n == path))
            .map(|(code, _)| code)
            .collect()
    }

    /// Maps every full path (including aliases) to its code.
    ///
    /// If two declarations share a path, the one declared first is kept.
    pub fn names_by_path(&self, separator: &str) -> BTreeMap<String, IdCode> {
        let mut names = BTreeMap::new();
        for (code, decl) in self.variable_map.iter() {
            for name in decl.full_names(separator) {
                names.entry(name).or_insert_with(|| code.clone());
            }
        }
        names
    }

    /// Returns the latest timestamp of any recorded change.
    pub fn end_time(&self) -> Option<u64> {
        self.value_map
            .values()
            .filter_map(|t| t.last().map(|e| e.time))
            .max()
    }

    /// Returns the total number of recorded changes.
    pub fn change_count(&self) -> usize {
        self.value_map.values().map(Timeline::len).sum()
    }
}

/// Folds value changes into a [`VcdFile`].
#[derive(Debug)]
pub struct ModelBuilder {
    filename: String,
    info: HeaderInfo,
    scopes: ScopeTree,
    variables: VariableMap,
    values: ValueMap,
}

impl ModelBuilder {
    /// Starts a model with an empty timeline for every declared code.
    pub fn new(filename: impl Into<String>, header: Header) -> Self {
        let values = ValueMap::for_variables(&header.variables);
        Self {
            filename: filename.into(),
            info: header.info,
            scopes: header.scopes,
            variables: header.variables,
            values,
        }
    }

    /// The frozen declarations.
    pub fn variables(&self) -> &VariableMap {
        &self.variables
    }

    /// Appends a change produced against [`Self::variables`].
    ///
    /// An index outside the map is ignored.
    pub fn record(&mut self, change: Change) -> Result<(), StreamError> {
        let Change { index, time, value } = change;
        match self.values.get_index_mut(index) {
            Some(timeline) => timeline
                .push(time, value)
                .map_err(|current| regression(current, time)),
            None => Ok(()),
        }
    }

    /// Appends a change addressed by code.
    pub fn push(&mut self, change: ValueChange) -> Result<(), StreamError> {
        let ValueChange { time, code, value } = change;
        let Some(timeline) = self.values.get_mut(code.as_str()) else {
            return Err(StreamError {
                position: Position::START,
                kind: StreamErrorKind::UndeclaredIdentifier {
                    code: code.to_string(),
                },
            });
        };
        timeline
            .push(time, value)
            .map_err(|current| regression(current, time))
    }

    /// Produces the model.
    pub fn finish(self) -> VcdFile {
        VcdFile {
            filename: self.filename,
            header: self.info,
            scopes: self.scopes,
            variable_map: self.variables,
            value_map: self.values,
        }
    }
}

/// Out-of-order events handed to the builder directly carry no source position.
fn regression(current: u64, found: u64) -> StreamError {
    StreamError {
        position: Position::START,
        kind: StreamErrorKind::TimestampRegression { current, found },
    }
}
