//! The declarative [`Variable`] entity.

use limnos_core::{Role, Value, VariableMeta};

use crate::formula::Formula;

/// A variable declaration: name, role, optional formula and defaults.
///
/// Built with one of the role constructors and refined with the builder
/// methods, then handed to [`VariableRegistry::declare`](crate::VariableRegistry::declare),
/// which validates it.
///
/// # Examples
///
/// ```
/// use limnos_process::{formula, Variable};
///
/// let k = Variable::constant("k").with_default(0.5).units("1/day");
/// let t = Variable::state("T", formula(["T", "k"], |a| a.map2(0, 1, |t, k| t + k)))
///     .with_default(1.0)
///     .long_name("water temperature");
/// assert!(k.formula().is_none());
/// assert!(t.formula().is_some());
/// ```
pub struct Variable {
    meta: VariableMeta,
    role: Role,
    formula: Option<Box<dyn Formula>>,
    default: Option<Value>,
    updatable: bool,
    pub(crate) inputs: Vec<String>,
}

impl Variable {
    /// Raw constructor. Prefer the role constructors; this one exists so
    /// hosts can build declarations from data, and is validated on declare.
    pub fn new(meta: VariableMeta, role: Role, formula: Option<Box<dyn Formula>>) -> Self {
        Self {
            meta,
            role,
            formula,
            default: None,
            updatable: false,
            inputs: Vec::new(),
        }
    }

    /// A STATIC variable.
    pub fn constant(name: impl Into<String>) -> Self {
        Self::new(VariableMeta::named(name), Role::Static, None)
    }

    /// A DYNAMIC variable computed by `formula`.
    pub fn dynamic(name: impl Into<String>, formula: impl Formula) -> Self {
        Self::new(VariableMeta::named(name), Role::Dynamic, Some(Box::new(formula)))
    }

    /// A STATE variable updated by `formula`.
    pub fn state(name: impl Into<String>, formula: impl Formula) -> Self {
        Self::new(VariableMeta::named(name), Role::State, Some(Box::new(formula)))
    }

    /// Default value: a STATIC's parameter value or a STATE's initial value.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Allow per-step overrides from an external driver. STATIC only.
    pub fn updatable(mut self) -> Self {
        self.updatable = true;
        self
    }

    /// Set the long name.
    pub fn long_name(mut self, long_name: impl Into<String>) -> Self {
        self.meta.long_name = Some(long_name.into());
        self
    }

    /// Set the units.
    pub fn units(mut self, units: impl Into<String>) -> Self {
        self.meta.units = Some(units.into());
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.meta.description = Some(description.into());
        self
    }

    /// Variable name.
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Descriptive metadata.
    pub fn meta(&self) -> &VariableMeta {
        &self.meta
    }

    /// Role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// The formula, if any.
    pub fn formula(&self) -> Option<&dyn Formula> {
        self.formula.as_deref()
    }

    /// Default value, if any.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether per-step overrides are accepted.
    pub fn is_updatable(&self) -> bool {
        self.updatable
    }

    /// Validated input names, in argument order.
    ///
    /// Empty until the variable has been declared into a registry, and
    /// always empty for STATIC variables.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }
}

impl std::fmt::Debug for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Variable")
            .field("name", &self.meta.name)
            .field("role", &self.role)
            .field("inputs", &self.inputs)
            .field("default", &self.default)
            .field("updatable", &self.updatable)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::formula;

    #[test]
    fn builders_set_metadata() {
        let v = Variable::constant("depth")
            .with_default(2.0)
            .updatable()
            .units("m")
            .long_name("water depth")
            .description("mean depth of the cell");
        assert_eq!(v.name(), "depth");
        assert_eq!(v.role(), Role::Static);
        assert_eq!(v.default_value(), Some(&Value::Scalar(2.0)));
        assert!(v.is_updatable());
        assert_eq!(v.meta().units.as_deref(), Some("m"));
        assert_eq!(v.meta().long_name.as_deref(), Some("water depth"));
        assert!(v.meta().description.is_some());
    }

    #[test]
    fn role_constructors_attach_formula() {
        let d = Variable::dynamic("d1", formula(["x"], |a| a.map1(0, |x| x * x)));
        assert_eq!(d.role(), Role::Dynamic);
        assert_eq!(d.formula().map(|f| f.inputs().len()), Some(1));
        // Inputs are only recorded once declared.
        assert!(d.inputs().is_empty());
    }
}
