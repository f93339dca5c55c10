//! Store-specific error types.

use limnos_core::Role;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A written value is neither a scalar nor exactly one entry per cell.
    #[error("'{variable}' has {actual} values, expected 1 or {expected}")]
    ShapeMismatch {
        /// The variable written.
        variable: String,
        /// Grid cell count.
        expected: usize,
        /// Length of the rejected value.
        actual: usize,
    },
    /// An initial state value does not fit the grid.
    #[error("initial value of '{variable}' has {actual} values, expected 1 or {expected}")]
    InitialStateShape {
        /// The state variable.
        variable: String,
        /// Grid cell count.
        expected: usize,
        /// Length of the rejected value.
        actual: usize,
    },
    /// A dynamic variable was read before being computed this step.
    #[error("dynamic variable '{variable}' has not been computed this step")]
    NotYetComputed {
        /// The dynamic variable.
        variable: String,
    },
    /// No variable with this name is stored.
    #[error("unknown variable '{variable}'")]
    UnknownVariable {
        /// The requested name.
        variable: String,
    },
    /// Static variables are bound, never written by a step.
    #[error("static variable '{variable}' cannot be written during a step")]
    NotWritable {
        /// The static variable.
        variable: String,
    },
    /// The operation requires a variable of a different role.
    #[error("'{variable}' is a {found} variable, expected {expected}")]
    RoleMismatch {
        /// The variable.
        variable: String,
        /// Role the operation requires.
        expected: Role,
        /// Role the variable was declared with.
        found: Role,
    },
    /// Two stored variables share a name.
    #[error("variable '{variable}' is laid out twice")]
    DuplicateVariable {
        /// The repeated name.
        variable: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_variable() {
        let e = StoreError::ShapeMismatch {
            variable: "T".into(),
            expected: 10,
            actual: 3,
        };
        assert_eq!(e.to_string(), "'T' has 3 values, expected 1 or 10");
        let e = StoreError::RoleMismatch {
            variable: "k".into(),
            expected: Role::State,
            found: Role::Static,
        };
        assert_eq!(e.to_string(), "'k' is a static variable, expected state");
    }
}
