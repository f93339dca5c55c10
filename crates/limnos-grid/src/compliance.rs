//! Grid trait compliance test helpers.
//!
//! These functions verify that a Grid implementation satisfies the
//! invariants required by the trait contract. Reused across all backend
//! test modules.

use crate::grid::Grid;

/// Assert that `cell_count()` equals the product of `shape()`.
pub fn assert_cell_count_matches_shape(grid: &dyn Grid) {
    let product: usize = grid.shape().iter().product();
    assert_eq!(
        grid.cell_count(),
        product,
        "cell_count {} != product of shape {:?}",
        grid.cell_count(),
        grid.shape()
    );
}

/// Assert that every dimension's coordinate labels match its length.
pub fn assert_coords_match_shape(grid: &dyn Grid) {
    for (dim, len) in grid.dimensions().iter().zip(grid.shape()) {
        assert_eq!(dim.coords.len(), len, "dimension '{}'", dim.name);
    }
}

/// Assert that `flat_index(unravel(i)) == i` for every cell.
pub fn assert_index_round_trip(grid: &dyn Grid) {
    for flat in 0..grid.cell_count() {
        let index = grid
            .unravel(flat)
            .unwrap_or_else(|| panic!("unravel({flat}) returned None"));
        assert_eq!(
            grid.flat_index(&index),
            Some(flat),
            "flat_index(unravel({flat})) = flat_index({index:?})"
        );
    }
    assert!(grid.unravel(grid.cell_count()).is_none());
}

/// Run every compliance check.
pub fn run_full_compliance(grid: &dyn Grid) {
    assert_cell_count_matches_shape(grid);
    assert_coords_match_shape(grid);
    assert_index_round_trip(grid);
}
