//! Declaration-time errors.
//!
//! Raised while building a registry. All are fatal: a model whose
//! registry failed to build cannot initialize.

use thiserror::Error;

/// Why a formula's input names could not be recovered.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// An input name is the empty string.
    #[error("input {position} has an empty name")]
    EmptyName {
        /// Position in the declared input list.
        position: usize,
    },
    /// An input name is not a valid identifier.
    #[error("input name '{name}' is not a valid identifier")]
    InvalidName {
        /// The offending name.
        name: String,
    },
    /// The same input is named twice.
    #[error("input '{name}' is named more than once")]
    DuplicateInput {
        /// The repeated name.
        name: String,
    },
}

/// Errors from declaring variables into a registry.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DeclarationError {
    /// A variable with this name is already declared.
    #[error("variable '{name}' is already declared")]
    DuplicateName {
        /// The duplicated name.
        name: String,
    },
    /// The declaration is structurally invalid for its role.
    #[error("invalid declaration of '{name}': {reason}")]
    InvalidDeclaration {
        /// The variable being declared.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
    /// The formula's input names could not be recovered.
    #[error("cannot introspect formula of '{name}': {source}")]
    UnintrospectableFormula {
        /// The variable being declared.
        name: String,
        /// The underlying signature problem.
        #[source]
        source: SignatureError,
    },
    /// A module built for a different model kind was registered.
    #[error("module '{module}' targets model kind '{found}', registry is '{expected}'")]
    KindMismatch {
        /// The rejected module.
        module: String,
        /// The registry's model kind.
        expected: String,
        /// The module's model kind.
        found: String,
    },
}
