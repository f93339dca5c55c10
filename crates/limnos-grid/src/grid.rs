//! The core `Grid` trait and `dyn Grid` downcast support.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::any::Any;

use crate::error::GridError;

/// Shape of a grid: one length per dimension, outermost first.
///
/// Uses `SmallVec<[usize; 4]>` to avoid heap allocation for grids up to
/// 4 dimensions.
pub type Shape = SmallVec<[usize; 4]>;

/// A named grid dimension with one coordinate label per index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// Dimension name (e.g. `"segment"`, `"y"`).
    pub name: String,
    /// Coordinate label per index along this dimension.
    pub coords: Vec<f64>,
}

impl Dimension {
    /// Build a dimension, rejecting empty or non-finite coordinates.
    pub fn new(name: impl Into<String>, coords: Vec<f64>) -> Result<Self, GridError> {
        let name = name.into();
        if coords.is_empty() {
            return Err(GridError::EmptyGrid);
        }
        if let Some(i) = coords.iter().position(|c| !c.is_finite()) {
            return Err(GridError::InvalidCoordinates {
                name,
                reason: format!("coordinate {i} is not finite"),
            });
        }
        Ok(Self { name, coords })
    }

    /// A dimension labelled `0, 1, ..., len-1`.
    pub fn indexed(name: impl Into<String>, len: usize) -> Result<Self, GridError> {
        Self::new(name, (0..len).map(|i| i as f64).collect())
    }

    /// Number of indices along this dimension.
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Whether the dimension has no indices. Never true for dimensions
    /// built through the constructors.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

/// Structured grid of computational cells.
///
/// All per-cell arrays of a model share one grid: identical shape,
/// dimension names and coordinate labels. Cells are addressed by a flat
/// index in canonical row-major order.
///
/// # Object Safety
///
/// This trait is designed for use as `dyn Grid`. Use `downcast_ref` for
/// opt-in specialization on concrete types.
pub trait Grid: Any + Send + Sync + 'static {
    /// Named dimensions with coordinate labels, outermost first.
    fn dimensions(&self) -> &[Dimension];

    /// Number of dimensions.
    fn ndim(&self) -> usize {
        self.dimensions().len()
    }

    /// Length per dimension, outermost first.
    fn shape(&self) -> Shape {
        self.dimensions().iter().map(Dimension::len).collect()
    }

    /// Total number of cells.
    fn cell_count(&self) -> usize {
        self.dimensions().iter().map(Dimension::len).product()
    }

    /// Flat canonical index of a multi-index, or `None` if out of bounds.
    fn flat_index(&self, index: &[usize]) -> Option<usize> {
        let dims = self.dimensions();
        if index.len() != dims.len() {
            return None;
        }
        let mut flat = 0usize;
        for (&i, dim) in index.iter().zip(dims) {
            if i >= dim.len() {
                return None;
            }
            flat = flat * dim.len() + i;
        }
        Some(flat)
    }

    /// Multi-index of a flat canonical index, or `None` if out of bounds.
    fn unravel(&self, flat: usize) -> Option<Shape> {
        if flat >= self.cell_count() {
            return None;
        }
        let dims = self.dimensions();
        let mut out: Shape = SmallVec::from_elem(0, dims.len());
        let mut rest = flat;
        for (slot, dim) in out.iter_mut().zip(dims).rev() {
            *slot = rest % dim.len();
            rest /= dim.len();
        }
        Some(out)
    }

    /// Returns `true` if `self` and `other` have identical dimensions
    /// (names, lengths and coordinate labels).
    fn topology_eq(&self, other: &dyn Grid) -> bool {
        self.dimensions() == other.dimensions()
    }
}

impl dyn Grid {
    /// Attempt to downcast a trait object to a concrete grid type.
    pub fn downcast_ref<T: Grid>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }
}

/// Checked product of dimension lengths.
pub(crate) fn checked_cell_count(dims: &[Dimension]) -> Result<usize, GridError> {
    let mut total = 1usize;
    for dim in dims {
        total = total
            .checked_mul(dim.len())
            .ok_or_else(|| GridError::DimensionTooLarge {
                name: dim.name.clone(),
                value: dim.len(),
            })?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_rejects_empty() {
        assert_eq!(Dimension::new("x", vec![]), Err(GridError::EmptyGrid));
    }

    #[test]
    fn dimension_rejects_nan() {
        let err = Dimension::new("x", vec![0.0, f64::NAN]).unwrap_err();
        assert!(matches!(err, GridError::InvalidCoordinates { .. }));
    }

    #[test]
    fn indexed_dimension_labels() {
        let d = Dimension::indexed("cell", 3).unwrap();
        assert_eq!(d.coords, vec![0.0, 1.0, 2.0]);
        assert_eq!(d.len(), 3);
    }
}
