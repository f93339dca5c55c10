//! Test utilities and mock types for Limnos development.
//!
//! Provides a mock [`VariableReader`] for unit-testing formulas and
//! argument gathering, plus reusable formulas and scenario registries in
//! [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::HashMap;

use limnos_core::{ReadSource, VariableId, VariableReader};

/// Mock implementation of [`VariableReader`].
///
/// Backed by a `HashMap<(VariableId, ReadSource), Vec<f64>>`. Pre-populate
/// with [`set`](MockVariableReader::set) before passing to code under test.
/// Slices are returned as stored; the mock does not check their length
/// against `cell_count`.
pub struct MockVariableReader {
    cell_count: usize,
    values: HashMap<(VariableId, ReadSource), Vec<f64>>,
}

impl MockVariableReader {
    pub fn new(cell_count: usize) -> Self {
        Self {
            cell_count,
            values: HashMap::new(),
        }
    }

    /// Pre-populate the data returned for `(var, source)`.
    pub fn set(&mut self, var: VariableId, source: ReadSource, data: Vec<f64>) {
        self.values.insert((var, source), data);
    }

    /// Number of populated `(variable, source)` entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl VariableReader for MockVariableReader {
    fn read(&self, var: VariableId, source: ReadSource) -> Option<&[f64]> {
        self.values.get(&(var, source)).map(|v| v.as_slice())
    }

    fn cell_count(&self) -> usize {
        self.cell_count
    }
}
