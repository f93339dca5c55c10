//! Limnos: declarative water-quality simulation on regular grids.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Limnos sub-crates. For most users, adding `limnos` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use limnos::prelude::*;
//! use limnos::processes::{DissolvedOxygen, WaterTemperature, MODEL_KIND};
//!
//! let mut registry = VariableRegistry::new(MODEL_KIND);
//! registry.register(&WaterTemperature::default()).unwrap();
//! registry.register(&DissolvedOxygen::default()).unwrap();
//!
//! // A 4x5 lake, warmed for three one-minute steps.
//! let config = ModelConfig::new(registry, Rect2D::new(4, 5).unwrap())
//!     .with_parameter("dt", 60.0)
//!     .with_parameter("net_heat_flux", 418.6);
//! let mut model = Model::new(config).unwrap();
//! model.initialize().unwrap();
//! model.run(3).unwrap();
//!
//! let ds = model.dataset().unwrap();
//! assert_eq!(ds.len_time(), 4);
//! assert_eq!(model.current_step(), StepId(3));
//! assert!(ds.last_slice("water_temp").unwrap()[0] > 20.0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `limnos-core` | IDs, roles, values, shared errors and traits |
//! | [`grid`] | `limnos-grid` | Grid trait and the 1D and 2D grids |
//! | [`store`] | `limnos-store` | Grid store, step transactions, datasets |
//! | [`process`] | `limnos-process` | Formulas, registry, evaluation ordering |
//! | [`processes`] | `limnos-processes` | Reference temperature and oxygen processes |
//! | [`engine`] | `limnos-engine` | Timestep executor and model facade |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`limnos-core`).
pub use limnos_core as types;

/// Computational grids (`limnos-grid`).
///
/// Provides the [`grid::Grid`] trait with [`grid::Line1D`] and
/// [`grid::Rect2D`].
pub use limnos_grid as grid;

/// Variable storage and datasets (`limnos-store`).
///
/// [`store::GridStore`] holds the current values; [`store::Dataset`] is
/// the accumulated, serializable time series.
pub use limnos_store as store;

/// Formula trait, registry and ordering (`limnos-process`).
///
/// The [`process::Formula`] trait and the [`process::Module`] trait are
/// the main extension points for user-defined processes.
pub use limnos_process as process;

/// Reference water-quality processes (`limnos-processes`).
pub use limnos_processes as processes;

/// Model facade and executor (`limnos-engine`).
pub use limnos_engine as engine;

/// Common imports for typical Limnos usage.
///
/// ```rust
/// use limnos::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use limnos_core::{Role, StepId, Value, VariableId, VariableMeta};

    // Errors
    pub use limnos_core::{FormulaError, InputError};
    pub use limnos_process::{DeclarationError, GraphError};
    pub use limnos_store::StoreError;

    // Grids
    pub use limnos_grid::{Grid, Line1D, Rect2D};

    // Processes
    pub use limnos_process::{formula, Formula, FormulaArgs, Module, Variable, VariableRegistry};

    // Store
    pub use limnos_store::Dataset;

    // Engine
    pub use limnos_engine::{
        ConfigError, Lifecycle, Model, ModelConfig, ModelError, ModelOptions, Overrides,
        StepError, StepMetrics,
    };
}
