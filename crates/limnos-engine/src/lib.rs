//! Timestep executor and model facade for Limnos.
//!
//! A [`Model`] ties a [`VariableRegistry`](limnos_process::VariableRegistry)
//! to a grid and a store. It moves through a small lifecycle:
//!
//! 1. [`Model::new`] validates host-supplied values ([`ModelConfig`]).
//! 2. [`Model::initialize`] sorts the formulas and records the step-0 slice.
//! 3. [`Model::step`] / [`Model::run`] advance time; each step either
//!    commits in full or rolls back.
//! 4. [`Model::finalize`] hands out the accumulated dataset.
//!
//! Every successful step yields [`StepMetrics`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod executor;
pub mod metrics;
pub mod model;

pub use config::{ConfigError, ModelConfig, ModelOptions, DEFAULT_DT, DT};
pub use executor::{Overrides, StepError, TimestepExecutor};
pub use metrics::StepMetrics;
pub use model::{Lifecycle, Model, ModelError};
