//! Structured computational grids for Limnos models.
//!
//! This crate defines the [`Grid`] trait, the spatial abstraction every
//! per-cell array in a model is laid out against, along with concrete
//! structured backends.
//!
//! # Backends
//!
//! - [`Line1D`]: a 1D sequence of cells (river segments, reservoir layers)
//! - [`Rect2D`]: a row-major 2D lattice (estuary or lake surface grids)
//!
//! Every backend defines a canonical row-major cell order; per-cell
//! arrays are always stored in that order.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod grid;
pub mod line1d;
pub mod rect2d;

#[cfg(test)]
pub(crate) mod compliance;

pub use error::GridError;
pub use grid::{Dimension, Grid, Shape};
pub use line1d::Line1D;
pub use rect2d::Rect2D;
