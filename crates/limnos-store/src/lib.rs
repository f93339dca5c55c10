//! Grid state store for Limnos models.
//!
//! [`GridStore`] holds every per-cell array of a model with role-aware
//! reads, transactional step writes and ping-pong STATE buffers, and
//! accumulates the labelled [`Dataset`] a run produces.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dataset;
pub mod error;
mod hash;
pub mod store;

pub use dataset::{Dataset, Series, TIME_DIM};
pub use error::StoreError;
pub use store::{GridStore, StepTransaction, StoreVariable};
