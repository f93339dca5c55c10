//! The grid state store.
//!
//! [`GridStore`] owns every per-cell array of a model. STATIC values live
//! in one broadcast buffer each. DYNAMIC values live in one reusable
//! buffer each, valid only once written in the current step. STATE values
//! are double-buffered: the published buffer holds the previous-step
//! value that every reader sees, the staging buffer receives this step's
//! write, and [`GridStore::commit_step`] swaps the two.
//!
//! The lifecycle per step is:
//! 1. `begin_step()`: obtain a [`StepTransaction`]
//! 2. formulas read through [`VariableReader`] and results are written
//! 3. `commit()`: swap staged state buffers, extend the time axis
//!
//! Dropping the transaction without committing discards every staged
//! write, leaving the store exactly as it was.

use std::ops::{Deref, DerefMut};

use indexmap::IndexMap;
use limnos_core::{ReadSource, Role, Value, VariableId, VariableMeta, VariableReader};
use limnos_grid::Grid;

use crate::dataset::{Dataset, Series};
use crate::error::StoreError;

/// Layout entry for one stored variable.
///
/// A store is built from a list of these in [`VariableId`] order.
#[derive(Clone, Debug, PartialEq)]
pub struct StoreVariable {
    /// Name and descriptive metadata.
    pub meta: VariableMeta,
    /// Role, which decides the buffer layout.
    pub role: Role,
}

impl StoreVariable {
    /// Layout entry for `meta` with the given role.
    pub fn new(meta: VariableMeta, role: Role) -> Self {
        Self { meta, role }
    }
}

enum Slot {
    Static {
        data: Vec<f64>,
    },
    Dynamic {
        data: Vec<f64>,
        written: bool,
    },
    State {
        buffers: [Vec<f64>; 2],
        /// Index of the buffer holding the previous-step value.
        published: usize,
        staged: bool,
    },
}

impl Slot {
    fn role(&self) -> Role {
        match self {
            Self::Static { .. } => Role::Static,
            Self::Dynamic { .. } => Role::Dynamic,
            Self::State { .. } => Role::State,
        }
    }

    fn bytes(&self) -> usize {
        let floats = match self {
            Self::Static { data } | Self::Dynamic { data, .. } => data.capacity(),
            Self::State { buffers, .. } => buffers[0].capacity() + buffers[1].capacity(),
        };
        floats * std::mem::size_of::<f64>()
    }
}

/// Per-cell storage for every variable of one model, plus the
/// accumulated [`Dataset`].
pub struct GridStore {
    cell_count: usize,
    names: IndexMap<String, VariableId>,
    slots: Vec<Slot>,
    dataset: Dataset,
    track_dynamic: bool,
}

impl GridStore {
    /// Create a store for `variables` on `grid`.
    ///
    /// All buffers are allocated up front and zero-filled; bind statics
    /// and set initial states before calling [`record_initial`](Self::record_initial).
    /// With `track_dynamic`, DYNAMIC values are appended to the dataset on
    /// every commit; otherwise they are overwritten each step.
    pub fn new(
        grid: &dyn Grid,
        variables: Vec<StoreVariable>,
        track_dynamic: bool,
    ) -> Result<Self, StoreError> {
        let cell_count = grid.cell_count();
        let mut names = IndexMap::with_capacity(variables.len());
        let mut slots = Vec::with_capacity(variables.len());
        let mut dataset = Dataset::new(grid);

        for (i, var) in variables.into_iter().enumerate() {
            let name = var.meta.name.clone();
            if names.insert(name.clone(), VariableId(i as u32)).is_some() {
                return Err(StoreError::DuplicateVariable { variable: name });
            }
            let slot = match var.role {
                Role::Static => Slot::Static {
                    data: vec![0.0; cell_count],
                },
                Role::Dynamic => Slot::Dynamic {
                    data: vec![0.0; cell_count],
                    written: false,
                },
                Role::State => Slot::State {
                    buffers: [vec![0.0; cell_count], vec![0.0; cell_count]],
                    published: 0,
                    staged: false,
                },
            };
            match var.role {
                Role::Static | Role::State => dataset.add_series(Series::new(var.meta, var.role, 0)),
                Role::Dynamic if track_dynamic => {
                    dataset.add_series(Series::new(var.meta, var.role, 1))
                }
                Role::Dynamic => {}
            }
            slots.push(slot);
        }

        Ok(Self {
            cell_count,
            names,
            slots,
            dataset,
            track_dynamic,
        })
    }

    /// Number of cells per array.
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Number of stored variables.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the store holds no variables.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// ID of a stored variable.
    pub fn id(&self, name: &str) -> Option<VariableId> {
        self.names.get(name).copied()
    }

    /// Role of a stored variable.
    pub fn role(&self, name: &str) -> Option<Role> {
        let id = self.id(name)?;
        self.slots.get(id.index()).map(Slot::role)
    }

    /// Whether DYNAMIC values are retained in the dataset.
    pub fn tracks_dynamic(&self) -> bool {
        self.track_dynamic
    }

    /// Bytes held by all variable buffers. Excludes the dataset.
    pub fn memory_bytes(&self) -> usize {
        self.slots.iter().map(Slot::bytes).sum()
    }

    fn lookup(&self, name: &str) -> Result<VariableId, StoreError> {
        self.id(name).ok_or_else(|| StoreError::UnknownVariable {
            variable: name.to_string(),
        })
    }

    fn name_of(&self, id: VariableId) -> String {
        self.names
            .get_index(id.index())
            .map(|(n, _)| n.clone())
            .unwrap_or_else(|| id.to_string())
    }

    fn check_shape(&self, name: &str, value: &Value) -> Result<(), StoreError> {
        value
            .check_shape(self.cell_count)
            .map_err(|actual| StoreError::ShapeMismatch {
                variable: name.to_string(),
                expected: self.cell_count,
                actual,
            })
    }

    /// Bind (or re-bind) a STATIC variable's value, broadcasting scalars.
    pub fn bind_static(&mut self, name: &str, value: &Value) -> Result<(), StoreError> {
        let id = self.lookup(name)?;
        self.check_shape(name, value)?;
        match &mut self.slots[id.index()] {
            Slot::Static { data } => {
                value.broadcast_into(data);
                Ok(())
            }
            other => Err(StoreError::RoleMismatch {
                variable: name.to_string(),
                expected: Role::Static,
                found: other.role(),
            }),
        }
    }

    /// Set the previous-step value of a STATE variable before the first step.
    pub fn set_initial_state(&mut self, name: &str, value: &Value) -> Result<(), StoreError> {
        let id = self.lookup(name)?;
        value
            .check_shape(self.cell_count)
            .map_err(|actual| StoreError::InitialStateShape {
                variable: name.to_string(),
                expected: self.cell_count,
                actual,
            })?;
        match &mut self.slots[id.index()] {
            Slot::State {
                buffers, published, ..
            } => {
                value.broadcast_into(&mut buffers[*published]);
                Ok(())
            }
            other => Err(StoreError::RoleMismatch {
                variable: name.to_string(),
                expected: Role::State,
                found: other.role(),
            }),
        }
    }

    /// Start the dataset over with a single slice at `time`: the bound
    /// statics and the current (initial) state values.
    pub fn record_initial(&mut self, time: f64) {
        self.dataset.reset();
        self.dataset.push_time(time);
        for ((name, _), slot) in self.names.iter().zip(&self.slots) {
            let data = match slot {
                Slot::Static { data } => data,
                Slot::State {
                    buffers, published, ..
                } => &buffers[*published],
                Slot::Dynamic { .. } => continue,
            };
            if let Some(series) = self.dataset.series_mut(name) {
                series.push(data);
            }
        }
    }

    /// Read a variable by name with role semantics.
    ///
    /// STATIC yields the bound value, STATE the previous-step value, and
    /// DYNAMIC the current-step value once written.
    pub fn read(&self, name: &str) -> Result<&[f64], StoreError> {
        let id = self.lookup(name)?;
        match &self.slots[id.index()] {
            Slot::Static { data } => Ok(data.as_slice()),
            Slot::State {
                buffers, published, ..
            } => Ok(buffers[*published].as_slice()),
            Slot::Dynamic { data, written } => {
                if *written {
                    Ok(data.as_slice())
                } else {
                    Err(StoreError::NotYetComputed {
                        variable: name.to_string(),
                    })
                }
            }
        }
    }

    /// Install a newly computed value for the current step.
    ///
    /// On error nothing is changed.
    pub fn write(&mut self, name: &str, value: &Value) -> Result<(), StoreError> {
        let id = self.lookup(name)?;
        self.write_id(id, value)
    }

    /// [`write`](Self::write) by ID.
    pub fn write_id(&mut self, id: VariableId, value: &Value) -> Result<(), StoreError> {
        if id.index() >= self.slots.len() {
            return Err(StoreError::UnknownVariable {
                variable: id.to_string(),
            });
        }
        if let Err(actual) = value.check_shape(self.cell_count) {
            return Err(StoreError::ShapeMismatch {
                variable: self.name_of(id),
                expected: self.cell_count,
                actual,
            });
        }
        match &mut self.slots[id.index()] {
            Slot::Static { .. } => {
                return Err(StoreError::NotWritable {
                    variable: self.name_of(id),
                })
            }
            Slot::Dynamic { data, written } => {
                value.broadcast_into(data);
                *written = true;
            }
            Slot::State {
                buffers,
                published,
                staged,
            } => {
                value.broadcast_into(&mut buffers[1 - *published]);
                *staged = true;
            }
        }
        Ok(())
    }

    /// Publish the current step at `time`.
    ///
    /// Staged STATE values become the previous-step values and are
    /// appended to the dataset; DYNAMIC values are appended if tracked and
    /// then invalidated.
    pub fn commit_step(&mut self, time: f64) {
        self.dataset.push_time(time);
        for ((name, _), slot) in self.names.iter().zip(self.slots.iter_mut()) {
            match slot {
                Slot::Static { .. } => {}
                Slot::State {
                    buffers,
                    published,
                    staged,
                } => {
                    if *staged {
                        *published = 1 - *published;
                        *staged = false;
                    }
                    if let Some(series) = self.dataset.series_mut(name) {
                        series.push(&buffers[*published]);
                    }
                }
                Slot::Dynamic { data, written } => {
                    if self.track_dynamic && *written {
                        if let Some(series) = self.dataset.series_mut(name) {
                            series.push(data);
                        }
                    }
                    *written = false;
                }
            }
        }
    }

    /// Drop every staged write of the current step.
    pub fn discard_step(&mut self) {
        for slot in &mut self.slots {
            match slot {
                Slot::Static { .. } => {}
                Slot::Dynamic { written, .. } => *written = false,
                Slot::State { staged, .. } => *staged = false,
            }
        }
    }

    /// Begin a step. The returned guard discards staged writes on drop
    /// unless [`StepTransaction::commit`] is called.
    pub fn begin_step(&mut self) -> StepTransaction<'_> {
        StepTransaction {
            store: self,
            committed: false,
        }
    }

    /// Immutable view of the accumulated dataset.
    pub fn snapshot(&self) -> &Dataset {
        &self.dataset
    }

    /// Consume the store, keeping only the dataset.
    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }
}

impl VariableReader for GridStore {
    fn read(&self, var: VariableId, source: ReadSource) -> Option<&[f64]> {
        match (self.slots.get(var.index())?, source) {
            (Slot::Static { data }, ReadSource::Static) => Some(data.as_slice()),
            (
                Slot::State {
                    buffers, published, ..
                },
                ReadSource::Previous,
            ) => Some(buffers[*published].as_slice()),
            (
                Slot::State {
                    buffers,
                    published,
                    staged: true,
                },
                ReadSource::Current,
            ) => Some(buffers[1 - *published].as_slice()),
            (Slot::Dynamic { data, written: true }, ReadSource::Current) => Some(data.as_slice()),
            _ => None,
        }
    }

    fn cell_count(&self) -> usize {
        self.cell_count
    }
}

impl std::fmt::Debug for GridStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridStore")
            .field("cell_count", &self.cell_count)
            .field("variables", &self.names.keys().collect::<Vec<_>>())
            .field("time_slices", &self.dataset.len_time())
            .finish()
    }
}

/// Guard over one step's writes.
///
/// Dereferences to the [`GridStore`] for reads and writes. Dropping the
/// guard without calling [`commit`](Self::commit) rolls the step back.
#[must_use]
pub struct StepTransaction<'a> {
    store: &'a mut GridStore,
    committed: bool,
}

impl StepTransaction<'_> {
    /// Publish the step at `time`.
    pub fn commit(mut self, time: f64) {
        self.store.commit_step(time);
        self.committed = true;
    }
}

impl Deref for StepTransaction<'_> {
    type Target = GridStore;

    fn deref(&self) -> &GridStore {
        self.store
    }
}

impl DerefMut for StepTransaction<'_> {
    fn deref_mut(&mut self) -> &mut GridStore {
        self.store
    }
}

impl Drop for StepTransaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.store.discard_step();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use limnos_grid::Line1D;

    fn store(track_dynamic: bool) -> GridStore {
        let grid = Line1D::new(3).unwrap();
        let vars = vec![
            StoreVariable::new(VariableMeta::named("k"), Role::Static),
            StoreVariable::new(VariableMeta::named("T"), Role::State),
            StoreVariable::new(VariableMeta::named("d"), Role::Dynamic),
        ];
        let mut s = GridStore::new(&grid, vars, track_dynamic).unwrap();
        s.bind_static("k", &Value::scalar(0.5)).unwrap();
        s.set_initial_state("T", &Value::cells(vec![1.0, 2.0, 3.0]))
            .unwrap();
        s.record_initial(0.0);
        s
    }

    #[test]
    fn reads_follow_roles() {
        let s = store(false);
        assert_eq!(s.read("k").unwrap(), &[0.5, 0.5, 0.5]);
        assert_eq!(s.read("T").unwrap(), &[1.0, 2.0, 3.0]);
        assert_eq!(
            s.read("d"),
            Err(StoreError::NotYetComputed {
                variable: "d".into()
            })
        );
        assert!(matches!(
            s.read("nope"),
            Err(StoreError::UnknownVariable { .. })
        ));
    }

    #[test]
    fn state_reads_previous_until_commit() {
        let mut s = store(false);
        s.write("T", &Value::cells(vec![9.0, 9.0, 9.0])).unwrap();
        assert_eq!(s.read("T").unwrap(), &[1.0, 2.0, 3.0]);
        let id = s.id("T").unwrap();
        assert_eq!(
            VariableReader::read(&s, id, ReadSource::Current),
            Some(&[9.0, 9.0, 9.0][..])
        );
        s.commit_step(1.0);
        assert_eq!(s.read("T").unwrap(), &[9.0, 9.0, 9.0]);
        assert_eq!(s.snapshot().cell_series("T", 0), Some(vec![1.0, 9.0]));
    }

    #[test]
    fn ping_pong_alternates_buffers() {
        let mut s = store(false);
        for step in 1..=4 {
            s.write("T", &Value::scalar(step as f64)).unwrap();
            s.commit_step(step as f64);
            assert_eq!(s.read("T").unwrap(), &[step as f64; 3]);
        }
        assert_eq!(s.snapshot().len_time(), 5);
        assert_eq!(
            s.snapshot().cell_series("T", 1),
            Some(vec![2.0, 1.0, 2.0, 3.0, 4.0])
        );
    }

    #[test]
    fn mis_shaped_write_leaves_store_unchanged() {
        let mut s = store(false);
        let before = s.snapshot().fingerprint();
        let err = s.write("T", &Value::cells(vec![1.0, 2.0])).unwrap_err();
        assert_eq!(
            err,
            StoreError::ShapeMismatch {
                variable: "T".into(),
                expected: 3,
                actual: 2,
            }
        );
        let id = s.id("T").unwrap();
        assert_eq!(VariableReader::read(&s, id, ReadSource::Current), None);
        assert_eq!(s.snapshot().fingerprint(), before);
    }

    #[test]
    fn statics_are_not_writable() {
        let mut s = store(false);
        assert_eq!(
            s.write("k", &Value::scalar(1.0)),
            Err(StoreError::NotWritable {
                variable: "k".into()
            })
        );
    }

    #[test]
    fn bind_static_checks_role_and_shape() {
        let mut s = store(false);
        assert!(matches!(
            s.bind_static("T", &Value::scalar(1.0)),
            Err(StoreError::RoleMismatch { .. })
        ));
        assert!(matches!(
            s.bind_static("k", &Value::cells(vec![1.0])),
            Err(StoreError::ShapeMismatch { .. })
        ));
        s.bind_static("k", &Value::cells(vec![1.0, 2.0, 3.0])).unwrap();
        assert_eq!(s.read("k").unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn initial_state_shape_checked() {
        let grid = Line1D::new(3).unwrap();
        let vars = vec![StoreVariable::new(VariableMeta::named("T"), Role::State)];
        let mut s = GridStore::new(&grid, vars, false).unwrap();
        assert!(matches!(
            s.set_initial_state("T", &Value::cells(vec![0.0; 4])),
            Err(StoreError::InitialStateShape { actual: 4, .. })
        ));
    }

    #[test]
    fn dynamic_values_expire_at_commit() {
        let mut s = store(false);
        s.write("d", &Value::scalar(7.0)).unwrap();
        assert_eq!(s.read("d").unwrap(), &[7.0; 3]);
        s.commit_step(1.0);
        assert!(s.read("d").is_err());
        assert!(!s.snapshot().contains("d"));
    }

    #[test]
    fn tracked_dynamics_are_recorded() {
        let mut s = store(true);
        for step in 1..=2 {
            s.write("d", &Value::scalar(step as f64)).unwrap();
            s.commit_step(step as f64);
        }
        let series = s.snapshot().series("d").unwrap();
        assert_eq!(series.first_step(), 1);
        assert_eq!(series.len(), 2);
        assert_eq!(series.at_step(2), Some(&[2.0; 3][..]));
        assert_eq!(series.at_step(0), None);
    }

    #[test]
    fn dropped_transaction_rolls_back() {
        let mut s = store(false);
        {
            let mut txn = s.begin_step();
            txn.write("T", &Value::scalar(100.0)).unwrap();
            txn.write("d", &Value::scalar(1.0)).unwrap();
        }
        let id = s.id("T").unwrap();
        assert_eq!(VariableReader::read(&s, id, ReadSource::Current), None);
        assert!(s.read("d").is_err());
        // A later commit must not publish the abandoned write.
        s.commit_step(1.0);
        assert_eq!(s.read("T").unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn committed_transaction_publishes() {
        let mut s = store(false);
        let mut txn = s.begin_step();
        txn.write("T", &Value::scalar(4.0)).unwrap();
        txn.commit(1.0);
        assert_eq!(s.read("T").unwrap(), &[4.0; 3]);
        assert_eq!(s.snapshot().time(), &[0.0, 1.0]);
    }

    #[test]
    fn duplicate_layout_rejected() {
        let grid = Line1D::new(1).unwrap();
        let vars = vec![
            StoreVariable::new(VariableMeta::named("a"), Role::Static),
            StoreVariable::new(VariableMeta::named("a"), Role::State),
        ];
        assert!(matches!(
            GridStore::new(&grid, vars, false),
            Err(StoreError::DuplicateVariable { .. })
        ));
    }

    #[test]
    fn memory_accounts_for_ping_pong() {
        let s = store(false);
        // static + 2 state buffers + dynamic, 3 cells each
        assert!(s.memory_bytes() >= 4 * 3 * 8);
    }
}
