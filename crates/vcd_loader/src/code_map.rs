//! Insertion-ordered maps keyed by identifier code.

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::declaration::{Declaration, IdCode};
use crate::value::Timeline;

/// A map from [`IdCode`] to `T` that iterates in insertion order.
///
/// Entries live in a vector; a hash index gives O(1) lookup by code and lets
/// the variable map and value map share positions.
#[derive(Clone, Debug)]
pub struct CodeMap<T> {
    entries: Vec<(IdCode, T)>,
    index: HashMap<IdCode, usize>,
}

/// Identifier code to declaration, in header order.
pub type VariableMap = CodeMap<Declaration>;

/// Identifier code to timeline, in the same order as the [`VariableMap`].
pub type ValueMap = CodeMap<Timeline>;

impl<T> CodeMap<T> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `code` is present.
    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    /// Returns the position of `code` in insertion order.
    pub fn index_of(&self, code: &str) -> Option<usize> {
        self.index.get(code).copied()
    }

    /// Looks up the value for `code`.
    pub fn get(&self, code: &str) -> Option<&T> {
        self.index_of(code).map(|i| &self.entries[i].1)
    }

    /// Looks up the value for `code` mutably.
    pub fn get_mut(&mut self, code: &str) -> Option<&mut T> {
        let i = self.index_of(code)?;
        Some(&mut self.entries[i].1)
    }

    /// Returns the entry at position `index`.
    pub fn get_index(&self, index: usize) -> Option<(&IdCode, &T)> {
        self.entries.get(index).map(|(k, v)| (k, v))
    }

    /// Returns the value at position `index` mutably.
    pub fn get_index_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index).map(|(_, v)| v)
    }

    /// Inserts `value` under `code`.
    ///
    /// If `code` is already present its value is replaced in place and the
    /// old value returned; the insertion position does not change.
    pub fn insert(&mut self, code: IdCode, value: T) -> Option<T> {
        if let Some(&i) = self.index.get(&code) {
            return Some(std::mem::replace(&mut self.entries[i].1, value));
        }
        self.index.insert(code.clone(), self.entries.len());
        self.entries.push((code, value));
        None
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&IdCode, &T)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Iterates over codes in insertion order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &IdCode> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Iterates over values in insertion order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = &T> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<T> Default for CodeMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> PartialEq for CodeMap<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<T> FromIterator<(IdCode, T)> for CodeMap<T> {
    fn from_iter<I: IntoIterator<Item = (IdCode, T)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (code, value) in iter {
            map.insert(code, value);
        }
        map
    }
}

impl<T: Serialize> Serialize for CodeMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (code, value) in &self.entries {
            map.serialize_entry(code, value)?;
        }
        map.end()
    }
}

impl ValueMap {
    /// Creates an empty timeline for every code of `variables`, in the same order.
    pub fn for_variables(variables: &VariableMap) -> Self {
        variables
            .keys()
            .map(|code| (code.clone(), Timeline::new()))
            .collect()
    }
}
