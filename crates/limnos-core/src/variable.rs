//! Variable roles and descriptive metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a variable participates in a timestep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Constant across time. Bound from configuration or module defaults,
    /// never recomputed. Scalar or per-cell.
    Static,
    /// Recomputed every step from current-step values of other variables.
    /// Not carried across steps.
    Dynamic,
    /// Recomputed every step; its previous-step value is an input to the
    /// step (its own formula or others). Accumulates along the time axis.
    State,
}

impl Role {
    /// Whether variables of this role are evaluated by a formula.
    pub fn is_computed(self) -> bool {
        !matches!(self, Self::Static)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Dynamic => write!(f, "dynamic"),
            Self::State => write!(f, "state"),
        }
    }
}

/// Descriptive metadata attached to a declared variable.
///
/// Purely informational: nothing in here affects evaluation. Carried
/// through to the accumulated dataset so hosts can label output.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableMeta {
    /// Unique identifier within a model. Formulas refer to inputs by this name.
    pub name: String,
    /// Optional human-readable name (e.g. `"water temperature"`).
    pub long_name: Option<String>,
    /// Optional unit annotation (e.g. `"degC"`, `"mg/L"`).
    pub units: Option<String>,
    /// Optional free-form description.
    pub description: Option<String>,
}

impl VariableMeta {
    /// Metadata with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
