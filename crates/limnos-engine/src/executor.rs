//! Single-step execution.
//!
//! [`TimestepExecutor`] owns the computation order and the store of an
//! initialized model. Each [`step`](TimestepExecutor::step):
//!
//! 1. validates per-step overrides and re-binds the overridden statics,
//! 2. evaluates every formula in order, gathering inputs per route,
//! 3. commits the step, advancing time by `dt`,
//! 4. restores the overridden statics.
//!
//! A failing step rolls back: staged writes are discarded, statics are
//! restored, and the store is exactly as before the call. Both happen in
//! guards' `Drop`, so a formula that panics leaves the same state behind.

use std::sync::Arc;
use std::time::Instant;

use indexmap::{IndexMap, IndexSet};
use limnos_core::{FormulaError, InputError, Role, StepId, Value};
use limnos_process::{
    compute_order, ComputationOrder, FormulaArgs, GraphError, Variable, VariableRegistry,
};
use limnos_store::{Dataset, GridStore, StoreError};
use thiserror::Error;

use crate::config::{check_timestep, DEFAULT_DT, DT};
use crate::metrics::StepMetrics;

// ── Overrides ──────────────────────────────────────────────────────

/// Per-step values for updatable STATIC variables.
///
/// Applied for one step only; the base values are restored afterwards.
///
/// ```
/// use limnos_engine::Overrides;
///
/// let o = Overrides::new().with("net_heat_flux", 250.0).with("depth", 2.5);
/// assert_eq!(o.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overrides(IndexMap<String, Value>);

impl Overrides {
    /// No overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an override, replacing any earlier one for the same name.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Add an override in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Override value for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of overrides.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no overrides.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>, V: Into<Value>> FromIterator<(S, V)> for Overrides {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (name, value) in iter {
            out.insert(name, value);
        }
        out
    }
}

// ── StepError ──────────────────────────────────────────────────────

/// Why a step was rolled back.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum StepError {
    /// A formula returned an error.
    #[error("formula for '{variable}' failed: {source}")]
    FormulaFailed {
        /// The variable being computed.
        variable: String,
        /// The formula's error.
        #[source]
        source: FormulaError,
    },
    /// A store operation failed, e.g. a mis-shaped formula result.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The overrides were invalid.
    #[error(transparent)]
    Input(#[from] InputError),
    /// A formula produced NaN or infinity (only with `check_finite`).
    #[error("formula for '{variable}' produced a non-finite value at cell {cell}")]
    NonFinite {
        /// The variable being computed.
        variable: String,
        /// First offending cell.
        cell: usize,
    },
}

// ── OverrideScope ────────────────────────────────────────────────

/// Binds per-step overrides into the store and re-binds the base values
/// on drop, whether the step commits, fails or unwinds.
struct OverrideScope<'a> {
    store: &'a mut GridStore,
    base_statics: &'a IndexMap<String, Value>,
    bound: Vec<String>,
}

impl<'a> OverrideScope<'a> {
    fn bind(
        store: &'a mut GridStore,
        base_statics: &'a IndexMap<String, Value>,
        overrides: &Overrides,
    ) -> Result<Self, StepError> {
        let mut scope = Self {
            store,
            base_statics,
            bound: Vec::with_capacity(overrides.len()),
        };
        for (name, value) in overrides.iter() {
            scope.store.bind_static(name, value)?;
            scope.bound.push(name.to_string());
        }
        Ok(scope)
    }
}

impl Drop for OverrideScope<'_> {
    fn drop(&mut self) {
        for name in &self.bound {
            if let Some(base) = self.base_statics.get(name) {
                // Base values passed the same shape check when first bound.
                let _ = self.store.bind_static(name, base);
            }
        }
    }
}

// ── TimestepExecutor ───────────────────────────────────────────────

/// Runs steps of an initialized model against its store.
///
/// Shares the registry with the model and computes the evaluation order
/// from it, so the formulas it runs are always the ones the order was
/// built for.
#[derive(Debug)]
pub struct TimestepExecutor {
    registry: Arc<VariableRegistry>,
    order: ComputationOrder,
    store: GridStore,
    /// Bound values of every STATIC, restored after overrides.
    base_statics: IndexMap<String, Value>,
    /// STATIC names that accept per-step overrides.
    updatable: IndexSet<String>,
    /// Base timestep.
    dt: f64,
    check_finite: bool,
    time: f64,
    current_step: StepId,
    rollback_events: u64,
    last_metrics: Option<StepMetrics>,
}

impl TimestepExecutor {
    /// Order `registry` and wrap a store whose statics are bound to
    /// `base_statics` and whose dataset holds the initial slice at
    /// `start_time`.
    ///
    /// # Errors
    ///
    /// [`GraphError`] if the registry cannot be ordered.
    pub fn new(
        registry: Arc<VariableRegistry>,
        store: GridStore,
        base_statics: IndexMap<String, Value>,
        updatable: IndexSet<String>,
        check_finite: bool,
        start_time: f64,
    ) -> Result<Self, GraphError> {
        let order = compute_order(&registry)?;
        let dt = base_statics
            .get(DT)
            .and_then(Value::as_scalar)
            .unwrap_or(DEFAULT_DT);
        Ok(Self {
            registry,
            order,
            store,
            base_statics,
            updatable,
            dt,
            check_finite,
            time: start_time,
            current_step: StepId(0),
            rollback_events: 0,
            last_metrics: None,
        })
    }

    /// Execute one step.
    pub fn step(&mut self, overrides: &Overrides) -> Result<&StepMetrics, StepError> {
        let start = Instant::now();
        let outcome = self
            .validate_overrides(overrides)
            .and_then(|dt| self.execute(overrides, dt));

        let (formula_us, commit_us) = match outcome {
            Ok(m) => m,
            Err(e) => {
                self.rollback_events += 1;
                return Err(e);
            }
        };

        Ok(self.last_metrics.insert(StepMetrics {
            total_us: start.elapsed().as_micros() as u64,
            formula_us,
            commit_us,
            memory_bytes: self.store.memory_bytes(),
            rollback_events: self.rollback_events,
        }))
    }

    /// Check every override and return the timestep for this step.
    fn validate_overrides(&self, overrides: &Overrides) -> Result<f64, StepError> {
        let mut dt = self.dt;
        for (name, value) in overrides.iter() {
            let updatable = self.updatable.contains(name)
                && self
                    .registry
                    .get(name)
                    .is_some_and(|v| v.role() == Role::Static);
            if !updatable {
                return Err(InputError::UnknownOverride {
                    name: name.to_string(),
                }
                .into());
            }
            if name == DT {
                dt = check_timestep(value)?;
            }
            let cell_count = self.store.cell_count();
            value
                .check_shape(cell_count)
                .map_err(|actual| StoreError::ShapeMismatch {
                    variable: name.to_string(),
                    expected: cell_count,
                    actual,
                })?;
        }
        Ok(dt)
    }

    /// Bind overrides, evaluate the order and commit. Returns per-formula
    /// and commit timings.
    fn execute(
        &mut self,
        overrides: &Overrides,
        dt: f64,
    ) -> Result<(Vec<(String, u64)>, u64), StepError> {
        let mut scope = OverrideScope::bind(&mut self.store, &self.base_statics, overrides)?;
        let mut formula_us = Vec::with_capacity(self.order.len());
        let mut txn = scope.store.begin_step();

        for entry in &self.order {
            let formula_start = Instant::now();
            let formula = self
                .registry
                .get_by_id(entry.id)
                .and_then(Variable::formula)
                .ok_or_else(|| StepError::FormulaFailed {
                    variable: entry.name.clone(),
                    source: FormulaError::failed("variable has no formula"),
                })?;
            let fail = |source| StepError::FormulaFailed {
                variable: entry.name.clone(),
                source,
            };

            let value = {
                let args =
                    FormulaArgs::gather(&entry.inputs, &entry.routes, &*txn).map_err(fail)?;
                formula.evaluate(&args).map_err(fail)?
            };
            if self.check_finite {
                if let Some(cell) = value.first_non_finite() {
                    return Err(StepError::NonFinite {
                        variable: entry.name.clone(),
                        cell,
                    });
                }
            }
            txn.write_id(entry.id, &value)?;
            formula_us.push((
                entry.name.clone(),
                formula_start.elapsed().as_micros() as u64,
            ));
        }

        let commit_start = Instant::now();
        let time = self.time + dt;
        txn.commit(time);
        self.time = time;
        self.current_step = self.current_step.next();
        Ok((formula_us, commit_start.elapsed().as_micros() as u64))
    }

    /// The registry the order was computed from.
    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    /// STATIC names that accept per-step overrides.
    pub fn updatable(&self) -> &IndexSet<String> {
        &self.updatable
    }

    /// The evaluation order.
    pub fn order(&self) -> &ComputationOrder {
        &self.order
    }

    /// The store.
    pub fn store(&self) -> &GridStore {
        &self.store
    }

    /// The accumulated dataset.
    pub fn dataset(&self) -> &Dataset {
        self.store.snapshot()
    }

    /// Consume the executor, keeping the dataset.
    pub fn into_dataset(self) -> Dataset {
        self.store.into_dataset()
    }

    /// Time coordinate of the last committed slice.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of committed steps.
    pub fn current_step(&self) -> StepId {
        self.current_step
    }

    /// Cumulative number of rolled-back steps.
    pub fn rollback_events(&self) -> u64 {
        self.rollback_events
    }

    /// Metrics from the most recent successful step.
    pub fn last_metrics(&self) -> Option<&StepMetrics> {
        self.last_metrics.as_ref()
    }
}
