//! The user-facing model.
//!
//! [`Model`] is the primary API for running a water-quality simulation:
//! construct it from a [`ModelConfig`], [`initialize`](Model::initialize)
//! it, then [`step`](Model::step) or [`run`](Model::run) it and read the
//! accumulated [`Dataset`].
//!
//! # Ownership model
//!
//! `Model` is [`Send`] but not [`Sync`]. All mutating methods take
//! `&mut self`, and the dataset borrows from `self`, so a caller cannot
//! step while holding a dataset reference.

use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use limnos_core::{StepId, Value};
use limnos_grid::Grid;
use limnos_process::{ComputationOrder, GraphError, Variable, VariableRegistry};
use limnos_store::{Dataset, GridStore, StoreVariable};
use thiserror::Error;

use crate::config::{ConfigError, ModelConfig, ModelOptions, DEFAULT_DT, DT};
use crate::executor::{Overrides, StepError, TimestepExecutor};
use crate::metrics::StepMetrics;

// Compile-time assertion: Model is Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Model>();
    }
};

// ── Lifecycle ───────────────────────────────────────────────────

/// Lifecycle state of a [`Model`].
///
/// ```text
/// Constructed ─initialize→ Initialized ─step→ Stepping ⇄ Idle ─finalize→ Finalized
/// ```
///
/// `Stepping` is held only for the duration of a step call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Configuration validated; order and store not yet built.
    Constructed,
    /// Order computed and initial slice recorded; no step taken yet.
    Initialized,
    /// A step is executing.
    Stepping,
    /// At least one step attempted; ready for the next.
    Idle,
    /// Dataset handed out; no further operations.
    Finalized,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Constructed => "constructed",
            Self::Initialized => "initialized",
            Self::Stepping => "stepping",
            Self::Idle => "idle",
            Self::Finalized => "finalized",
        };
        f.write_str(s)
    }
}

// ── ModelError ──────────────────────────────────────────────────

/// Errors from model lifecycle operations.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ModelError {
    /// Building the store from the configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The dependency graph cannot be ordered.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// A step was rolled back.
    #[error(transparent)]
    Step(#[from] StepError),
    /// The operation is not valid in the current lifecycle state.
    #[error("cannot {operation} a model that is {state}")]
    InvalidLifecycle {
        /// The attempted operation.
        operation: &'static str,
        /// The state the model was in.
        state: Lifecycle,
    },
}

// ── Model ───────────────────────────────────────────────────────

/// A water-quality model over one grid.
///
/// # Example
///
/// ```
/// use limnos_engine::{Model, ModelConfig};
/// use limnos_grid::Line1D;
/// use limnos_process::{formula, Variable, VariableRegistry};
///
/// let mut registry = VariableRegistry::new("demo");
/// registry.declare(Variable::constant("k").with_default(0.5)).unwrap();
/// registry
///     .declare(
///         Variable::state("T", formula(["T", "k"], |a| a.map2(0, 1, |t, k| t + k)))
///             .with_default(1.0),
///     )
///     .unwrap();
///
/// let config = ModelConfig::new(registry, Line1D::new(3).unwrap());
/// let mut model = Model::new(config).unwrap();
/// model.initialize().unwrap();
/// model.run(4).unwrap();
///
/// let ds = model.dataset().unwrap();
/// assert_eq!(ds.cell_series("T", 0), Some(vec![1.0, 1.5, 2.0, 2.5, 3.0]));
/// assert_eq!(ds.time(), &[0.0, 1.0, 2.0, 3.0, 4.0]);
/// ```
pub struct Model {
    registry: Arc<VariableRegistry>,
    grid: Box<dyn Grid>,
    statics: IndexMap<String, Value>,
    initial: IndexMap<String, Value>,
    updatable: IndexSet<String>,
    options: ModelOptions,
    start_time: f64,
    lifecycle: Lifecycle,
    executor: Option<TimestepExecutor>,
}

impl Model {
    /// Create a model from a [`ModelConfig`].
    ///
    /// Declares `dt` (default 1.0) if the registry does not, then
    /// validates and resolves every supplied value. The dependency graph
    /// is not examined until [`initialize`](Self::initialize).
    pub fn new(mut config: ModelConfig) -> Result<Self, ConfigError> {
        if !config.registry.contains(DT) {
            config.registry.declare(
                Variable::constant(DT)
                    .with_default(DEFAULT_DT)
                    .long_name("timestep"),
            )?;
        }
        let resolved = config.resolve()?;
        Ok(Self {
            registry: Arc::new(config.registry),
            grid: config.grid,
            statics: resolved.statics,
            initial: resolved.initial,
            updatable: resolved.updatable,
            options: config.options,
            start_time: resolved.start_time,
            lifecycle: Lifecycle::Constructed,
            executor: None,
        })
    }

    /// Compute the evaluation order, build the store and record the
    /// initial slice.
    ///
    /// # Errors
    ///
    /// [`ModelError::Graph`] on a cycle among DYNAMIC variables or an
    /// undeclared formula input. The model stays `Constructed`.
    pub fn initialize(&mut self) -> Result<(), ModelError> {
        self.expect_state("initialize", &[Lifecycle::Constructed])?;

        let layout = self
            .registry
            .all()
            .map(|v| StoreVariable::new(v.meta().clone(), v.role()))
            .collect();
        let mut store = GridStore::new(self.grid.as_ref(), layout, self.options.track_dynamic)
            .map_err(ConfigError::from)?;
        for (name, value) in &self.statics {
            store.bind_static(name, value).map_err(ConfigError::from)?;
        }
        for (name, value) in &self.initial {
            store
                .set_initial_state(name, value)
                .map_err(ConfigError::from)?;
        }
        store.record_initial(self.start_time);

        self.executor = Some(TimestepExecutor::new(
            Arc::clone(&self.registry),
            store,
            self.statics.clone(),
            self.updatable.clone(),
            self.options.check_finite,
            self.start_time,
        )?);
        self.lifecycle = Lifecycle::Initialized;
        Ok(())
    }

    /// Advance one step, applying `overrides` to updatable statics for
    /// this step only. See [`updatable`](Self::updatable).
    ///
    /// # Errors
    ///
    /// [`ModelError::Step`] if the step was rolled back; the dataset and
    /// all values are then exactly as before the call.
    pub fn step(&mut self, overrides: &Overrides) -> Result<&StepMetrics, ModelError> {
        self.expect_state("step", &[Lifecycle::Initialized, Lifecycle::Idle])?;
        let executor = self.executor.as_mut().ok_or(ModelError::InvalidLifecycle {
            operation: "step",
            state: self.lifecycle,
        })?;
        self.lifecycle = Lifecycle::Stepping;
        let result = executor.step(overrides);
        self.lifecycle = Lifecycle::Idle;
        Ok(result?)
    }

    /// Advance `n` steps without overrides, stopping at the first failure.
    pub fn run(&mut self, n: usize) -> Result<(), ModelError> {
        let none = Overrides::new();
        for _ in 0..n {
            self.step(&none)?;
        }
        Ok(())
    }

    /// The accumulated dataset. Valid once initialized and until finalized.
    pub fn dataset(&self) -> Result<&Dataset, ModelError> {
        Ok(self.executor("dataset")?.dataset())
    }

    /// The cached evaluation order. Valid once initialized and until finalized.
    pub fn computation_order(&self) -> Result<&ComputationOrder, ModelError> {
        Ok(self.executor("inspect")?.order())
    }

    /// Hand out the dataset and move to [`Lifecycle::Finalized`].
    pub fn finalize(&mut self) -> Result<Dataset, ModelError> {
        self.expect_state("finalize", &[Lifecycle::Initialized, Lifecycle::Idle])?;
        let executor = self.executor.take().ok_or(ModelError::InvalidLifecycle {
            operation: "finalize",
            state: self.lifecycle,
        })?;
        self.lifecycle = Lifecycle::Finalized;
        Ok(executor.into_dataset())
    }

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Number of committed steps (0 before the first step).
    pub fn current_step(&self) -> StepId {
        self.executor
            .as_ref()
            .map_or(StepId(0), TimestepExecutor::current_step)
    }

    /// Time coordinate of the last committed slice.
    pub fn current_time(&self) -> f64 {
        self.executor
            .as_ref()
            .map_or(self.start_time, TimestepExecutor::time)
    }

    /// Metrics from the most recent successful step.
    pub fn last_metrics(&self) -> Option<&StepMetrics> {
        self.executor.as_ref()?.last_metrics()
    }

    /// Cumulative number of rolled-back steps.
    pub fn rollback_events(&self) -> u64 {
        self.executor
            .as_ref()
            .map_or(0, TimestepExecutor::rollback_events)
    }

    /// The registry, including the implicit `dt`.
    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    /// The grid.
    pub fn grid(&self) -> &dyn Grid {
        self.grid.as_ref()
    }

    /// Execution options.
    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    /// STATIC names that accept per-step overrides: those declared
    /// updatable plus those listed in the configuration.
    pub fn updatable(&self) -> &IndexSet<String> {
        &self.updatable
    }

    /// Resolved base value of a STATIC variable.
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.statics.get(name)
    }

    fn expect_state(&self, operation: &'static str, allowed: &[Lifecycle]) -> Result<(), ModelError> {
        if allowed.contains(&self.lifecycle) {
            Ok(())
        } else {
            Err(ModelError::InvalidLifecycle {
                operation,
                state: self.lifecycle,
            })
        }
    }

    fn executor(&self, operation: &'static str) -> Result<&TimestepExecutor, ModelError> {
        self.executor.as_ref().ok_or(ModelError::InvalidLifecycle {
            operation,
            state: self.lifecycle,
        })
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("kind", &self.registry.kind())
            .field("lifecycle", &self.lifecycle)
            .field("current_step", &self.current_step())
            .field("current_time", &self.current_time())
            .field("cell_count", &self.grid.cell_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use limnos_grid::Line1D;
    use limnos_test_utils::fixtures::{linear_growth, mutual_cycle};

    fn model() -> Model {
        Model::new(ModelConfig::new(linear_growth(1.0, 0.0), Line1D::new(2).unwrap())).unwrap()
    }

    #[test]
    fn dt_is_declared_implicitly() {
        let m = model();
        let dt = m.registry().get(DT).unwrap();
        assert_eq!(dt.default_value(), Some(&Value::Scalar(1.0)));
        assert_eq!(m.parameter(DT), Some(&Value::Scalar(1.0)));
    }

    #[test]
    fn implicit_dt_can_be_made_updatable() {
        let config = ModelConfig::new(linear_growth(1.0, 0.0), Line1D::new(2).unwrap())
            .with_updatable(DT);
        let mut m = Model::new(config).unwrap();
        assert!(m.updatable().contains(DT));
        m.initialize().unwrap();
        m.step(&Overrides::new().with(DT, 0.25)).unwrap();
        m.step(&Overrides::new()).unwrap();
        assert_eq!(m.dataset().unwrap().time(), &[0.0, 0.25, 1.25]);
        assert!(!model().updatable().contains(DT));
    }

    #[test]
    fn lifecycle_transitions() {
        let mut m = model();
        assert_eq!(m.lifecycle(), Lifecycle::Constructed);
        m.initialize().unwrap();
        assert_eq!(m.lifecycle(), Lifecycle::Initialized);
        m.step(&Overrides::new()).unwrap();
        assert_eq!(m.lifecycle(), Lifecycle::Idle);
        let ds = m.finalize().unwrap();
        assert_eq!(ds.len_time(), 2);
        assert_eq!(m.lifecycle(), Lifecycle::Finalized);
    }

    #[test]
    fn step_before_initialize_rejected() {
        let mut m = model();
        assert_eq!(
            m.step(&Overrides::new()).unwrap_err(),
            ModelError::InvalidLifecycle {
                operation: "step",
                state: Lifecycle::Constructed,
            }
        );
        assert!(m.dataset().is_err());
        assert!(m.computation_order().is_err());
    }

    #[test]
    fn double_initialize_rejected() {
        let mut m = model();
        m.initialize().unwrap();
        assert!(matches!(
            m.initialize(),
            Err(ModelError::InvalidLifecycle { .. })
        ));
    }

    #[test]
    fn finalized_model_rejects_everything() {
        let mut m = model();
        m.initialize().unwrap();
        m.finalize().unwrap();
        assert!(m.step(&Overrides::new()).is_err());
        assert!(m.run(1).is_err());
        assert!(m.dataset().is_err());
        assert!(m.finalize().is_err());
    }

    #[test]
    fn cycle_fails_at_initialize() {
        let mut m = Model::new(ModelConfig::new(mutual_cycle(), Line1D::new(1).unwrap())).unwrap();
        let err = m.initialize().unwrap_err();
        assert!(matches!(
            err,
            ModelError::Graph(GraphError::CircularDependency { .. })
        ));
        assert_eq!(m.lifecycle(), Lifecycle::Constructed);
    }

    #[test]
    fn time_and_step_track_commits() {
        let mut m = model();
        assert_eq!(m.current_time(), 0.0);
        m.initialize().unwrap();
        m.run(3).unwrap();
        assert_eq!(m.current_step(), StepId(3));
        assert_eq!(m.current_time(), 3.0);
        assert!(m.last_metrics().is_some());
    }

    #[test]
    fn debug_summarises_state() {
        let m = model();
        let s = format!("{m:?}");
        assert!(s.contains("Constructed"));
        assert!(s.contains("current_step"));
    }
}
