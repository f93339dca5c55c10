//! The [`VariableRegistry`] and the [`Module`] registration seam.
//!
//! A registry is bound to one model kind. Hosts build it explicitly by
//! declaring variables or registering modules; there is no global
//! declaration list, so construction order is whatever the host writes.

use indexmap::IndexMap;
use limnos_core::{Role, VariableId};

use crate::error::DeclarationError;
use crate::formula::Signature;
use crate::variable::Variable;

/// A source of variable declarations, typically one process of a model
/// (temperature, oxygen, nutrients...).
///
/// Modules hold their parameter defaults as an immutable record and
/// declare STATIC variables carrying those defaults.
pub trait Module {
    /// Module name for error reporting.
    fn name(&self) -> &str;

    /// The model kind this module's variables belong to.
    fn model_kind(&self) -> &str;

    /// Declare this module's variables.
    fn declare(&self, registry: &mut VariableRegistry) -> Result<(), DeclarationError>;
}

/// Declared variables of one model, in declaration order.
///
/// Append-only: variables are never removed or replaced once declared.
/// `VariableId(n)` is the n-th declaration.
#[derive(Debug)]
pub struct VariableRegistry {
    kind: String,
    variables: IndexMap<String, Variable>,
}

impl VariableRegistry {
    /// An empty registry for the given model kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            variables: IndexMap::new(),
        }
    }

    /// The model kind this registry accepts modules for.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Declare a variable.
    ///
    /// Checks, in order:
    ///
    /// 1. The name is not already declared.
    /// 2. DYNAMIC and STATE carry a formula; STATIC does not.
    /// 3. Only STATIC may be updatable; DYNAMIC has no default.
    /// 4. The formula's input names can be recovered.
    pub fn declare(&mut self, mut variable: Variable) -> Result<VariableId, DeclarationError> {
        let name = variable.name().to_string();
        if self.variables.contains_key(&name) {
            return Err(DeclarationError::DuplicateName { name });
        }

        let invalid = |reason: &str| DeclarationError::InvalidDeclaration {
            name: name.clone(),
            reason: reason.to_string(),
        };
        match (variable.role(), variable.formula().is_some()) {
            (Role::Static, true) => return Err(invalid("static variables take no formula")),
            (Role::Dynamic | Role::State, false) => {
                return Err(invalid("dynamic and state variables require a formula"))
            }
            _ => {}
        }
        if variable.is_updatable() && variable.role() != Role::Static {
            return Err(invalid("only static variables can be updatable"));
        }
        if variable.role() == Role::Dynamic && variable.default_value().is_some() {
            return Err(invalid("dynamic variables take no default"));
        }

        if let Some(formula) = variable.formula() {
            let signature = Signature::of(formula).map_err(|source| {
                DeclarationError::UnintrospectableFormula {
                    name: name.clone(),
                    source,
                }
            })?;
            variable.inputs = signature.into_names();
        }

        let id = VariableId(self.variables.len() as u32);
        self.variables.insert(name, variable);
        Ok(id)
    }

    /// Declare every variable of a module, atomically.
    ///
    /// If the module's kind differs from the registry's, or any of its
    /// declarations fails, no variable of the module is kept.
    pub fn register(&mut self, module: &dyn Module) -> Result<(), DeclarationError> {
        if module.model_kind() != self.kind {
            return Err(DeclarationError::KindMismatch {
                module: module.name().to_string(),
                expected: self.kind.clone(),
                found: module.model_kind().to_string(),
            });
        }
        let before = self.variables.len();
        let result = module.declare(self);
        if result.is_err() {
            self.variables.truncate(before);
        }
        result
    }

    /// Look up a variable by name.
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Look up a variable by ID.
    pub fn get_by_id(&self, id: VariableId) -> Option<&Variable> {
        self.variables.get_index(id.index()).map(|(_, v)| v)
    }

    /// Whether a variable with this name is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// ID of a declared variable.
    pub fn id(&self, name: &str) -> Option<VariableId> {
        self.variables
            .get_index_of(name)
            .map(|i| VariableId(i as u32))
    }

    /// Name of the variable with this ID.
    pub fn name(&self, id: VariableId) -> Option<&str> {
        self.variables.get_index(id.index()).map(|(k, _)| k.as_str())
    }

    /// All variables in declaration order.
    pub fn all(&self) -> impl Iterator<Item = &Variable> + '_ {
        self.variables.values()
    }

    /// `(id, variable)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (VariableId, &Variable)> + '_ {
        self.variables
            .values()
            .enumerate()
            .map(|(i, v)| (VariableId(i as u32), v))
    }

    /// Variables of one role, in declaration order.
    pub fn by_role(&self, role: Role) -> impl Iterator<Item = &Variable> + '_ {
        self.variables.values().filter(move |v| v.role() == role)
    }

    /// Number of declared variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether nothing has been declared.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
