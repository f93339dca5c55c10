//! Core types and traits for the Limnos water-quality engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Limnos workspace:
//! variable IDs and roles, the per-cell [`Value`] type, formula and
//! input error types, and the [`VariableReader`] trait.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod traits;
pub mod value;
pub mod variable;

pub use error::{FormulaError, InputError};
pub use id::{StepId, VariableId};
pub use traits::{ReadSource, VariableReader};
pub use value::Value;
pub use variable::{Role, VariableMeta};
