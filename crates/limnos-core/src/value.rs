//! The per-cell [`Value`] type and its broadcast rule.
//!
//! A value is either a single scalar, which applies to every cell, or an
//! explicit per-cell array in the grid's canonical cell order. Scalars are
//! broadcast when they are bound into the store; formulas therefore always
//! see full-length slices.

use serde::{Deserialize, Serialize};

/// A scalar or per-cell value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// One value shared by every cell.
    Scalar(f64),
    /// One value per cell, in canonical cell order.
    Cells(Vec<f64>),
}

impl Value {
    /// A scalar value.
    pub fn scalar(v: f64) -> Self {
        Self::Scalar(v)
    }

    /// A per-cell value.
    pub fn cells(values: impl Into<Vec<f64>>) -> Self {
        Self::Cells(values.into())
    }

    /// Returns the scalar if this is a [`Value::Scalar`].
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Cells(_) => None,
        }
    }

    /// Returns the per-cell data if this is a [`Value::Cells`].
    pub fn as_cells(&self) -> Option<&[f64]> {
        match self {
            Self::Scalar(_) => None,
            Self::Cells(v) => Some(v),
        }
    }

    /// Whether this value can be broadcast onto a grid of `cell_count` cells.
    ///
    /// Scalars always fit. Per-cell data must have exactly `cell_count`
    /// entries; on mismatch the actual length is returned as the error.
    pub fn check_shape(&self, cell_count: usize) -> Result<(), usize> {
        match self {
            Self::Scalar(_) => Ok(()),
            Self::Cells(v) if v.len() == cell_count => Ok(()),
            Self::Cells(v) => Err(v.len()),
        }
    }

    /// Broadcast into an existing buffer.
    ///
    /// The caller must have checked the shape with [`check_shape`](Self::check_shape);
    /// per-cell data is copied up to the shorter of the two lengths.
    pub fn broadcast_into(&self, out: &mut [f64]) {
        match self {
            Self::Scalar(v) => out.fill(*v),
            Self::Cells(v) => {
                let n = v.len().min(out.len());
                out[..n].copy_from_slice(&v[..n]);
            }
        }
    }

    /// Broadcast into a freshly allocated buffer of `cell_count` cells.
    pub fn to_cells(&self, cell_count: usize) -> Vec<f64> {
        let mut out = vec![0.0; cell_count];
        self.broadcast_into(&mut out);
        out
    }

    /// Whether every entry is finite. Returns the first offending cell
    /// (0 for a scalar) otherwise.
    pub fn first_non_finite(&self) -> Option<usize> {
        match self {
            Self::Scalar(v) => (!v.is_finite()).then_some(0),
            Self::Cells(v) => v.iter().position(|x| !x.is_finite()),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Self::Cells(v)
    }
}

impl From<&[f64]> for Value {
    fn from(v: &[f64]) -> Self {
        Self::Cells(v.to_vec())
    }
}
