//! Model configuration and validation.
//!
//! [`ModelConfig`] is the single construction-time input of a
//! [`Model`](crate::Model): the registry, the grid, host-supplied values
//! and options. [`ModelConfig::validate`] checks everything that can be
//! checked before the dependency graph is sorted.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use limnos_core::{InputError, Role, Value};
use limnos_grid::Grid;
use limnos_process::{DeclarationError, VariableRegistry};
use limnos_store::{Dataset, StoreError};
use thiserror::Error;

/// Name of the timestep variable.
pub const DT: &str = "dt";

/// Timestep used when the registry and parameters leave `dt` unset.
pub const DEFAULT_DT: f64 = 1.0;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating a [`ModelConfig`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A declaration was rejected (including the implicit `dt`).
    #[error("declaration: {0}")]
    Declaration(#[from] DeclarationError),
    /// Host-supplied values are inconsistent with the registry.
    #[error("input: {0}")]
    Input(#[from] InputError),
    /// A supplied value does not fit the grid.
    #[error("store: {0}")]
    Store(#[from] StoreError),
    /// The hot-start dataset was produced on a different grid.
    #[error("hot-start dataset does not match the grid: {reason}")]
    GridMismatch {
        /// What differs.
        reason: String,
    },
}

// ── ModelOptions ───────────────────────────────────────────────────

/// Execution options.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelOptions {
    /// Retain DYNAMIC values in the dataset on every step. Default: `false`.
    pub track_dynamic: bool,
    /// Reject NaN or infinite formula results. Default: `false`.
    pub check_finite: bool,
    /// Time coordinate of the initial slice. Ignored on hot-start, which
    /// continues from the dataset's last time. Default: `0.0`.
    pub start_time: f64,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            track_dynamic: false,
            check_finite: false,
            start_time: 0.0,
        }
    }
}

// ── ModelConfig ────────────────────────────────────────────────────

/// Complete configuration for constructing a model.
///
/// Value precedence for a STATE's initial value: `initial_state`, then the
/// hot-start dataset's last slice, then the declared default. For a
/// STATIC: `parameters`, then the declared default.
pub struct ModelConfig {
    /// Declared variables.
    pub registry: VariableRegistry,
    /// Computational grid shared by every per-cell array.
    pub grid: Box<dyn Grid>,
    /// Initial values for STATE variables.
    pub initial_state: IndexMap<String, Value>,
    /// Values for STATIC variables, overriding module defaults.
    pub parameters: IndexMap<String, Value>,
    /// STATIC variables to accept per-step overrides for, in addition to
    /// those declared updatable.
    pub updatable: IndexSet<String>,
    /// Dataset of a previous run to continue from.
    pub hot_start: Option<Dataset>,
    /// Execution options.
    pub options: ModelOptions,
}

/// Values resolved from a validated configuration.
pub(crate) struct Resolved {
    pub statics: IndexMap<String, Value>,
    pub initial: IndexMap<String, Value>,
    /// Declared and construction-time updatable statics.
    pub updatable: IndexSet<String>,
    pub start_time: f64,
}

impl ModelConfig {
    /// Configuration with no supplied values and default options.
    pub fn new(registry: VariableRegistry, grid: impl Grid) -> Self {
        Self {
            registry,
            grid: Box::new(grid),
            initial_state: IndexMap::new(),
            parameters: IndexMap::new(),
            updatable: IndexSet::new(),
            hot_start: None,
            options: ModelOptions::default(),
        }
    }

    /// Supply an initial value for a STATE variable.
    pub fn with_initial(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.initial_state.insert(name.into(), value.into());
        self
    }

    /// Supply a value for a STATIC variable.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Accept per-step overrides for a STATIC variable, whether or not its
    /// declaration marks it updatable.
    pub fn with_updatable(mut self, name: impl Into<String>) -> Self {
        self.updatable.insert(name.into());
        self
    }

    /// Continue from the last time slice of `dataset`.
    pub fn with_hot_start(mut self, dataset: Dataset) -> Self {
        self.hot_start = Some(dataset);
        self
    }

    /// Replace the execution options.
    pub fn with_options(mut self, options: ModelOptions) -> Self {
        self.options = options;
        self
    }

    /// Validate all supplied values against the registry and grid.
    ///
    /// Does not sort the dependency graph; cycles and unknown formula
    /// inputs are reported by `Model::initialize()`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolve().map(|_| ())
    }

    pub(crate) fn resolve(&self) -> Result<Resolved, ConfigError> {
        let cell_count = self.grid.cell_count();
        let registry = &self.registry;

        // 1. Supplied names must match declared roles.
        for (name, value) in &self.initial_state {
            if registry.get(name).map(|v| v.role()) != Some(Role::State) {
                return Err(InputError::UnknownInitialState { name: name.clone() }.into());
            }
            check_initial_shape(name, value, cell_count)?;
        }
        for name in self.parameters.keys() {
            if registry.get(name).map(|v| v.role()) != Some(Role::Static) {
                return Err(InputError::UnknownParameter { name: name.clone() }.into());
            }
        }
        for name in &self.updatable {
            if registry.get(name).map(|v| v.role()) != Some(Role::Static) {
                return Err(InputError::UnknownUpdatable { name: name.clone() }.into());
            }
        }

        // 2. Hot-start data must come from the same grid.
        if let Some(ds) = &self.hot_start {
            if !ds.matches_grid(self.grid.as_ref()) {
                return Err(ConfigError::GridMismatch {
                    reason: format!(
                        "dataset shape {:?}, grid shape {:?}",
                        ds.shape(),
                        self.grid.shape().as_slice()
                    ),
                });
            }
        }

        // 3. Every STATIC resolves to a grid-shaped value.
        let mut statics = IndexMap::new();
        for var in registry.by_role(Role::Static) {
            let value = self
                .parameters
                .get(var.name())
                .or(var.default_value())
                .cloned()
                .ok_or_else(|| InputError::MissingParameter {
                    name: var.name().to_string(),
                })?;
            value
                .check_shape(cell_count)
                .map_err(|actual| StoreError::ShapeMismatch {
                    variable: var.name().to_string(),
                    expected: cell_count,
                    actual,
                })?;
            statics.insert(var.name().to_string(), value);
        }

        // 4. Every STATE resolves to a grid-shaped initial value.
        let mut initial = IndexMap::new();
        for var in registry.by_role(Role::State) {
            let name = var.name();
            let value = self
                .initial_state
                .get(name)
                .cloned()
                .or_else(|| {
                    self.hot_start
                        .as_ref()
                        .and_then(|ds| ds.last_slice(name))
                        .map(Value::from)
                })
                .or_else(|| var.default_value().cloned())
                .ok_or_else(|| InputError::MissingInitialState {
                    name: name.to_string(),
                })?;
            check_initial_shape(name, &value, cell_count)?;
            initial.insert(name.to_string(), value);
        }

        // 5. The timestep is a positive finite scalar.
        if registry.get(DT).is_some_and(|v| v.role() != Role::Static) {
            return Err(DeclarationError::InvalidDeclaration {
                name: DT.to_string(),
                reason: "the timestep must be a static variable".to_string(),
            }
            .into());
        }
        let dt = statics
            .get(DT)
            .cloned()
            .unwrap_or(Value::Scalar(DEFAULT_DT));
        check_timestep(&dt)?;

        let updatable = registry
            .by_role(Role::Static)
            .filter(|v| v.is_updatable())
            .map(|v| v.name().to_string())
            .chain(self.updatable.iter().cloned())
            .collect();

        let start_time = self
            .hot_start
            .as_ref()
            .and_then(|ds| ds.time().last().copied())
            .unwrap_or(self.options.start_time);

        Ok(Resolved {
            statics,
            initial,
            updatable,
            start_time,
        })
    }
}

fn check_initial_shape(name: &str, value: &Value, cell_count: usize) -> Result<(), StoreError> {
    value
        .check_shape(cell_count)
        .map_err(|actual| StoreError::InitialStateShape {
            variable: name.to_string(),
            expected: cell_count,
            actual,
        })
}

/// The timestep as a number, if `value` is a positive finite scalar.
pub(crate) fn check_timestep(value: &Value) -> Result<f64, InputError> {
    match value.as_scalar() {
        Some(dt) if dt.is_finite() && dt > 0.0 => Ok(dt),
        _ => Err(InputError::InvalidTimestep {
            value: format!("{value:?}"),
        }),
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("kind", &self.registry.kind())
            .field("variables", &self.registry.len())
            .field("grid_shape", &self.grid.shape())
            .field("initial_state", &self.initial_state.keys().collect::<Vec<_>>())
            .field("parameters", &self.parameters.keys().collect::<Vec<_>>())
            .field("updatable", &self.updatable)
            .field("hot_start", &self.hot_start.is_some())
            .field("options", &self.options)
            .finish()
    }
}
