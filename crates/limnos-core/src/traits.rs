//! Core abstraction for reading variable values during a step.

use crate::id::VariableId;

/// Where a formula input is read from during a step.
///
/// Computed once per input when the evaluation order is built, so the
/// per-step hot path carries no role conditionals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReadSource {
    /// A static variable's bound (broadcast) value.
    Static,
    /// A state variable's value at the end of the previous step.
    Previous,
    /// A dynamic variable already computed earlier in the current step.
    Current,
}

/// Read-only access to per-cell variable data within a step.
///
/// Implemented by the grid state store; mocked in tests. Returns `None`
/// if the variable is unknown or has no value at that source (e.g. a
/// dynamic variable not yet computed this step).
pub trait VariableReader {
    /// Read a variable's data as a full-length per-cell slice.
    fn read(&self, var: VariableId, source: ReadSource) -> Option<&[f64]>;

    /// Number of cells every slice returned by [`read`](Self::read) has.
    fn cell_count(&self) -> usize;
}
