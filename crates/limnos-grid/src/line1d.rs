//! 1D sequence of cells.

use crate::error::GridError;
use crate::grid::{Dimension, Grid};

/// A one-dimensional grid.
///
/// Models a river reach discretised into segments, or a stratified
/// reservoir discretised into layers. Cell `i` has flat index `i`.
///
/// # Examples
///
/// ```
/// use limnos_grid::{Grid, Line1D};
///
/// let reach = Line1D::new(5).unwrap();
/// assert_eq!(reach.cell_count(), 5);
/// assert_eq!(reach.ndim(), 1);
/// assert_eq!(reach.dimensions()[0].name, "cell");
///
/// // Segment midpoints along the channel, in km.
/// let labelled = Line1D::with_coords("chainage_km", vec![0.5, 1.5, 2.5]).unwrap();
/// assert_eq!(labelled.dimensions()[0].coords[2], 2.5);
/// ```
#[derive(Debug, Clone)]
pub struct Line1D {
    dims: [Dimension; 1],
}

impl Line1D {
    /// Create a line of `len` cells with index coordinates on dimension `"cell"`.
    ///
    /// Returns `Err(GridError::EmptyGrid)` if `len == 0`.
    pub fn new(len: usize) -> Result<Self, GridError> {
        Ok(Self {
            dims: [Dimension::indexed("cell", len)?],
        })
    }

    /// Create a line with explicit coordinate labels on a named dimension.
    pub fn with_coords(name: impl Into<String>, coords: Vec<f64>) -> Result<Self, GridError> {
        Ok(Self {
            dims: [Dimension::new(name, coords)?],
        })
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.dims[0].len()
    }

    /// Always returns `false`: construction rejects empty lines.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Grid for Line1D {
    fn dimensions(&self) -> &[Dimension] {
        &self.dims
    }

    fn cell_count(&self) -> usize {
        self.len()
    }

    fn flat_index(&self, index: &[usize]) -> Option<usize> {
        match index {
            [i] if *i < self.len() => Some(*i),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance;
    use proptest::prelude::*;

    #[test]
    fn zero_length_rejected() {
        assert_eq!(Line1D::new(0).unwrap_err(), GridError::EmptyGrid);
    }

    #[test]
    fn flat_index_is_identity() {
        let g = Line1D::new(4).unwrap();
        assert_eq!(g.flat_index(&[3]), Some(3));
        assert_eq!(g.flat_index(&[4]), None);
        assert_eq!(g.flat_index(&[0, 0]), None);
    }

    #[test]
    fn topology_eq_compares_labels() {
        let a = Line1D::new(3).unwrap();
        let b = Line1D::new(3).unwrap();
        let c = Line1D::with_coords("cell", vec![0.0, 1.0, 5.0]).unwrap();
        assert!(a.topology_eq(&b));
        assert!(!a.topology_eq(&c));
    }

    #[test]
    fn compliance_small() {
        compliance::run_full_compliance(&Line1D::new(7).unwrap());
    }

    proptest! {
        #[test]
        fn compliance_any_length(len in 1usize..200) {
            compliance::assert_index_round_trip(&Line1D::new(len).unwrap());
        }
    }
}
