//! Row-major 2D lattice.

use crate::error::GridError;
use crate::grid::{checked_cell_count, Dimension, Grid};

/// A rectangular two-dimensional grid.
///
/// Dimensions are `(rows, cols)`; the flat index of `(r, c)` is
/// `r * cols + c`. Cells outside the water body are still cells: masking
/// is a concern of the formulas, not the grid.
///
/// # Examples
///
/// ```
/// use limnos_grid::{Grid, Rect2D};
///
/// let lake = Rect2D::new(3, 4).unwrap();
/// assert_eq!(lake.cell_count(), 12);
/// assert_eq!(lake.flat_index(&[1, 2]), Some(6));
/// assert_eq!(lake.unravel(6).unwrap().as_slice(), &[1, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct Rect2D {
    dims: [Dimension; 2],
    cell_count: usize,
}

impl Rect2D {
    /// Create a `rows x cols` grid with index coordinates on `"y"` and `"x"`.
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridError> {
        Self::from_dimensions(
            Dimension::indexed("y", rows)?,
            Dimension::indexed("x", cols)?,
        )
    }

    /// Create a grid from explicit row and column dimensions.
    pub fn from_dimensions(rows: Dimension, cols: Dimension) -> Result<Self, GridError> {
        if rows.name == cols.name {
            return Err(GridError::InvalidCoordinates {
                name: cols.name,
                reason: "row and column dimensions share a name".to_string(),
            });
        }
        let dims = [rows, cols];
        let cell_count = checked_cell_count(&dims)?;
        Ok(Self { dims, cell_count })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.dims[0].len()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.dims[1].len()
    }
}

impl Grid for Rect2D {
    fn dimensions(&self) -> &[Dimension] {
        &self.dims
    }

    fn cell_count(&self) -> usize {
        self.cell_count
    }

    fn flat_index(&self, index: &[usize]) -> Option<usize> {
        match index {
            [r, c] if *r < self.rows() && *c < self.cols() => Some(r * self.cols() + c),
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
    fn zero_rows_rejected() {
        assert_eq!(Rect2D::new(0, 3).unwrap_err(), GridError::EmptyGrid);
    }

    #[test]
    fn duplicate_dimension_names_rejected() {
        let err = Rect2D::from_dimensions(
            Dimension::indexed("x", 2).unwrap(),
            Dimension::indexed("x", 2).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, GridError::InvalidCoordinates { .. }));
    }

    #[test]
    fn row_major_indexing() {
        let g = Rect2D::new(2, 3).unwrap();
        assert_eq!(g.flat_index(&[0, 0]), Some(0));
        assert_eq!(g.flat_index(&[0, 2]), Some(2));
        assert_eq!(g.flat_index(&[1, 0]), Some(3));
        assert_eq!(g.flat_index(&[2, 0]), None);
        assert_eq!(g.shape().as_slice(), &[2, 3]);
    }

    #[test]
    fn downcast_from_dyn() {
        let g: Box<dyn Grid> = Box::new(Rect2D::new(2, 2).unwrap());
        assert_eq!(g.downcast_ref::<Rect2D>().map(Rect2D::rows), Some(2));
    }

    #[test]
    fn compliance_small() {
        compliance::run_full_compliance(&Rect2D::new(4, 5).unwrap());
    }

    proptest! {
        #[test]
        fn compliance_any_shape(rows in 1usize..20, cols in 1usize..20) {
            compliance::assert_index_round_trip(&Rect2D::new(rows, cols).unwrap());
        }
    }
}
