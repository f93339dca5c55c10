//! Error types shared across the Limnos workspace.
//!
//! Subsystem-specific errors live with their subsystem (declaration and
//! graph errors in `limnos-process`, shape errors in `limnos-store`,
//! step errors in `limnos-engine`). This module holds the two kinds that
//! cross crate boundaries: errors raised *by* formulas, and errors in the
//! host-supplied inputs.

use thiserror::Error;

/// Errors raised by a formula during evaluation.
///
/// Returned by `Formula::evaluate()` and wrapped with the offending
/// variable name by the timestep executor.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum FormulaError {
    /// The formula's computation failed.
    #[error("execution failed: {reason}")]
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// The formula asked for an input it did not declare.
    #[error("no input named '{name}'")]
    MissingArgument {
        /// The name that was requested.
        name: String,
    },
    /// The formula asked for an input position beyond its signature.
    #[error("input index {index} out of range for {arity} declared inputs")]
    ArgumentOutOfRange {
        /// The requested position.
        index: usize,
        /// Number of declared inputs.
        arity: usize,
    },
}

impl FormulaError {
    /// Shorthand for [`FormulaError::ExecutionFailed`].
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            reason: reason.into(),
        }
    }
}

/// Errors in host-supplied inputs: initial state, static parameters,
/// and per-step overrides.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum InputError {
    /// A per-step override named a variable that is unknown or not an
    /// updatable static.
    #[error("'{name}' is not an updatable static variable")]
    UnknownOverride {
        /// The rejected override name.
        name: String,
    },
    /// A name listed as updatable at construction is not a static variable.
    #[error("'{name}' cannot be made updatable: not a static variable")]
    UnknownUpdatable {
        /// The rejected name.
        name: String,
    },
    /// A state variable has no supplied initial value and no default.
    #[error("state variable '{name}' has no initial value and no default")]
    MissingInitialState {
        /// The state variable.
        name: String,
    },
    /// An initial value was supplied for a name that is not a state variable.
    #[error("initial value supplied for '{name}', which is not a state variable")]
    UnknownInitialState {
        /// The rejected name.
        name: String,
    },
    /// A parameter value was supplied for a name that is not a static variable.
    #[error("parameter '{name}' is not a static variable")]
    UnknownParameter {
        /// The rejected name.
        name: String,
    },
    /// A static variable has no supplied value and no default.
    #[error("static variable '{name}' has no value and no default")]
    MissingParameter {
        /// The static variable.
        name: String,
    },
    /// The timestep is not a positive, finite scalar.
    #[error("dt must be a finite, positive scalar, got {value:?}")]
    InvalidTimestep {
        /// Debug rendering of the offending value.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formula_error_messages() {
        assert_eq!(
            FormulaError::failed("division by zero").to_string(),
            "execution failed: division by zero"
        );
        assert_eq!(
            FormulaError::MissingArgument { name: "k".into() }.to_string(),
            "no input named 'k'"
        );
    }

    #[test]
    fn input_error_names_variable() {
        let e = InputError::UnknownOverride { name: "k".into() };
        assert!(e.to_string().contains("'k'"));
        let e = InputError::UnknownUpdatable { name: "T".into() };
        assert_eq!(e.to_string(), "'T' cannot be made updatable: not a static variable");
    }
}
