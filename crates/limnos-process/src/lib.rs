//! Formula trait, variable registry and evaluation ordering.
//!
//! Modules contribute [`Variable`]s to a [`VariableRegistry`], each
//! DYNAMIC or STATE variable carrying a [`Formula`] that names the
//! variables it consumes. [`compute_order`] runs once at model
//! initialization to sort the formulas into a [`ComputationOrder`], a
//! precomputed routing table that tells the executor where every input
//! is read from.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod formula;
pub mod order;
pub mod registry;
pub mod variable;

pub use error::{DeclarationError, SignatureError};
pub use formula::{formula, FnFormula, Formula, FormulaArgs, Signature};
pub use order::{compute_order, ComputationOrder, GraphError, OrderedVariable, Route};
pub use registry::{Module, VariableRegistry};
pub use variable::Variable;
