//! The accumulated output [`Dataset`].
//!
//! A dataset is labelled like the grid it was produced on: dimension
//! names, coordinate labels per dimension, and a time coordinate growing
//! by one entry per committed step. Each stored variable contributes a
//! [`Series`] of per-cell slices in canonical cell order.

use indexmap::IndexMap;
use limnos_core::{Role, VariableMeta};
use limnos_grid::{Dimension, Grid};
use serde::{Deserialize, Serialize};

use crate::hash::{fnv1a_bytes, fnv1a_f64s, fnv1a_u64, FNV_OFFSET};

/// Name of the time dimension.
pub const TIME_DIM: &str = "time";

/// Time series of one variable.
///
/// STATE series start at step 0 (the initial slice). Tracked DYNAMIC
/// series start at step 1, since dynamics have no value before the first
/// step. STATIC series hold a single time-invariant slice.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Series {
    role: Role,
    meta: VariableMeta,
    first_step: usize,
    slices: Vec<Vec<f64>>,
}

impl Series {
    pub(crate) fn new(meta: VariableMeta, role: Role, first_step: usize) -> Self {
        Self {
            role,
            meta,
            first_step,
            slices: Vec::new(),
        }
    }

    /// Role of the variable.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Name, units and descriptive metadata.
    pub fn meta(&self) -> &VariableMeta {
        &self.meta
    }

    /// Time index of the first slice.
    pub fn first_step(&self) -> usize {
        self.first_step
    }

    /// Number of stored slices.
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// All slices, oldest first.
    pub fn slices(&self) -> &[Vec<f64>] {
        &self.slices
    }

    /// Slice at time index `step`, if recorded.
    pub fn at_step(&self, step: usize) -> Option<&[f64]> {
        match self.role {
            Role::Static => self.slices.first().map(Vec::as_slice),
            _ => step
                .checked_sub(self.first_step)
                .and_then(|i| self.slices.get(i))
                .map(Vec::as_slice),
        }
    }

    /// Most recent slice.
    pub fn last(&self) -> Option<&[f64]> {
        self.slices.last().map(Vec::as_slice)
    }

    pub(crate) fn push(&mut self, slice: &[f64]) {
        self.slices.push(slice.to_vec());
    }

    pub(crate) fn reset(&mut self) {
        self.slices.clear();
    }
}

/// Labelled, time-indexed output of a model run.
///
/// Serializable so a host can persist it and hand it back for a
/// hot-start, whose final time slice becomes the new step-0 state.
///
/// # Examples
///
/// ```
/// use limnos_core::{Role, Value, VariableMeta};
/// use limnos_grid::Line1D;
/// use limnos_store::{GridStore, StoreVariable};
///
/// let grid = Line1D::new(2).unwrap();
/// let mut store = GridStore::new(
///     &grid,
///     vec![StoreVariable::new(VariableMeta::named("T"), Role::State)],
///     false,
/// )
/// .unwrap();
/// store.set_initial_state("T", &Value::scalar(4.0)).unwrap();
/// store.record_initial(0.0);
///
/// let ds = store.snapshot();
/// assert_eq!(ds.dims(), &["time".to_string(), "cell".to_string()]);
/// assert_eq!(ds.time(), &[0.0]);
/// assert_eq!(ds.last_slice("T"), Some(&[4.0, 4.0][..]));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    dims: Vec<String>,
    coords: Vec<Dimension>,
    time: Vec<f64>,
    variables: IndexMap<String, Series>,
}

impl Dataset {
    pub(crate) fn new(grid: &dyn Grid) -> Self {
        let coords = grid.dimensions().to_vec();
        let dims = std::iter::once(TIME_DIM.to_string())
            .chain(coords.iter().map(|d| d.name.clone()))
            .collect();
        Self {
            dims,
            coords,
            time: Vec::new(),
            variables: IndexMap::new(),
        }
    }

    pub(crate) fn add_series(&mut self, series: Series) {
        self.variables.insert(series.meta.name.clone(), series);
    }

    pub(crate) fn series_mut(&mut self, name: &str) -> Option<&mut Series> {
        self.variables.get_mut(name)
    }

    pub(crate) fn push_time(&mut self, t: f64) {
        self.time.push(t);
    }

    pub(crate) fn reset(&mut self) {
        self.time.clear();
        for series in self.variables.values_mut() {
            series.reset();
        }
    }

    /// Dimension names: `"time"` followed by the grid's dimensions.
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    /// Spatial dimensions with their coordinate labels.
    pub fn coords(&self) -> &[Dimension] {
        &self.coords
    }

    /// Spatial shape, outermost first.
    pub fn shape(&self) -> Vec<usize> {
        self.coords.iter().map(Dimension::len).collect()
    }

    /// Cells per slice.
    pub fn cell_count(&self) -> usize {
        self.coords.iter().map(Dimension::len).product()
    }

    /// Whether this dataset was produced on a grid with identical
    /// dimensions and coordinate labels.
    pub fn matches_grid(&self, grid: &dyn Grid) -> bool {
        self.coords.as_slice() == grid.dimensions()
    }

    /// The time coordinate.
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Number of time slices, i.e. committed steps plus one.
    pub fn len_time(&self) -> usize {
        self.time.len()
    }

    /// Whether a variable is recorded.
    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Series of a variable.
    pub fn series(&self, name: &str) -> Option<&Series> {
        self.variables.get(name)
    }

    /// All recorded series, in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = &Series> + '_ {
        self.variables.values()
    }

    /// Most recent slice of a variable.
    pub fn last_slice(&self, name: &str) -> Option<&[f64]> {
        self.series(name)?.last()
    }

    /// Bound value of a static variable.
    pub fn static_value(&self, name: &str) -> Option<&[f64]> {
        self.series(name)
            .filter(|s| s.role == Role::Static)?
            .slices
            .first()
            .map(Vec::as_slice)
    }

    /// One cell's value over time, oldest first.
    ///
    /// Covers the time indices the variable was recorded at; `None` if the
    /// variable is unknown or `cell` is out of range.
    pub fn cell_series(&self, name: &str, cell: usize) -> Option<Vec<f64>> {
        let series = self.series(name)?;
        if cell >= self.cell_count() {
            return None;
        }
        series.slices.iter().map(|s| s.get(cell).copied()).collect()
    }

    /// FNV-1a hash over the labels, the time axis and every recorded slice.
    ///
    /// Dimension names, coordinate labels, variable names and slice
    /// boundaries are folded in, so equal fingerprints mean
    /// bitwise-identical data under identical labels.
    pub fn fingerprint(&self) -> u64 {
        let mut hash = FNV_OFFSET;
        for dim in &self.coords {
            hash = fnv1a_bytes(hash, dim.name.as_bytes());
            hash = fnv1a_u64(hash, dim.coords.len() as u64);
            hash = fnv1a_f64s(hash, &dim.coords);
        }
        hash = fnv1a_u64(hash, self.time.len() as u64);
        hash = fnv1a_f64s(hash, &self.time);
        for (name, series) in &self.variables {
            hash = fnv1a_bytes(hash, name.as_bytes());
            hash = fnv1a_u64(hash, series.first_step as u64);
            for slice in &series.slices {
                hash = fnv1a_u64(hash, slice.len() as u64);
                hash = fnv1a_f64s(hash, slice);
            }
        }
        hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use limnos_grid::Rect2D;

    fn dataset() -> Dataset {
        let grid = Rect2D::new(2, 2).unwrap();
        let mut ds = Dataset::new(&grid);
        let mut t = Series::new(VariableMeta::named("T"), Role::State, 0);
        t.push(&[1.0, 2.0, 3.0, 4.0]);
        t.push(&[2.0, 3.0, 4.0, 5.0]);
        ds.add_series(t);
        let mut k = Series::new(VariableMeta::named("k"), Role::Static, 0);
        k.push(&[1.0; 4]);
        ds.add_series(k);
        ds.push_time(0.0);
        ds.push_time(1.0);
        ds
    }

    #[test]
    fn labels_follow_grid() {
        let ds = dataset();
        assert_eq!(ds.dims(), &["time", "y", "x"]);
        assert_eq!(ds.shape(), vec![2, 2]);
        assert_eq!(ds.cell_count(), 4);
        assert!(ds.matches_grid(&Rect2D::new(2, 2).unwrap()));
        assert!(!ds.matches_grid(&Rect2D::new(1, 4).unwrap()));
    }

    #[test]
    fn accessors() {
        let ds = dataset();
        assert_eq!(ds.len_time(), 2);
        assert_eq!(ds.last_slice("T"), Some(&[2.0, 3.0, 4.0, 5.0][..]));
        assert_eq!(ds.cell_series("T", 3), Some(vec![4.0, 5.0]));
        assert_eq!(ds.cell_series("T", 4), None);
        assert_eq!(ds.static_value("k"), Some(&[1.0; 4][..]));
        assert_eq!(ds.static_value("T"), None);
        assert_eq!(ds.series("k").and_then(|s| s.at_step(1)), Some(&[1.0; 4][..]));
        assert!(ds.series("missing").is_none());
    }

    #[test]
    fn fingerprint_tracks_data() {
        let a = dataset();
        let mut b = dataset();
        assert_eq!(a.fingerprint(), b.fingerprint());
        if let Some(s) = b.series_mut("T") {
            s.slices[1][0] = 2.5;
        }
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn fingerprint_tracks_labels() {
        let a = dataset();
        let mut b = dataset();
        b.coords[1].coords[0] = 10.0;
        assert_eq!(a.variables, b.variables);
        assert_eq!(a.time, b.time);
        assert_ne!(a.fingerprint(), b.fingerprint());

        let mut c = dataset();
        c.coords[0].name = "row".to_string();
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn reset_keeps_layout() {
        let mut ds = dataset();
        ds.reset();
        assert_eq!(ds.len_time(), 0);
        assert!(ds.contains("T"));
        assert!(ds.series("T").map(Series::is_empty).unwrap_or(false));
    }
}
