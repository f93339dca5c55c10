//! Evaluation ordering and read resolution.
//!
//! [`compute_order`] runs once at model initialisation. It checks that
//! every formula input names a declared variable, sorts DYNAMIC variables
//! so each follows everything it reads, appends STATE variables, and
//! precomputes a [`ReadSource`] per input so the per-step hot path never
//! inspects roles.

use std::collections::HashSet;
use std::fmt;

use limnos_core::{ReadSource, Role, VariableId};

use crate::registry::VariableRegistry;
use crate::variable::Variable;

/// Where one formula input is read from: the producing variable and the
/// buffer holding the value the formula must see.
pub type Route = (VariableId, ReadSource);

/// One DYNAMIC or STATE variable in evaluation position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderedVariable {
    /// Registry ID.
    pub id: VariableId,
    /// Variable name.
    pub name: String,
    /// `Dynamic` or `State`.
    pub role: Role,
    /// Input names in argument order.
    pub inputs: Vec<String>,
    /// `routes[i]` resolves `inputs[i]`.
    pub routes: Vec<Route>,
}

/// Valid evaluation order of all computed variables.
///
/// DYNAMIC variables come first, each after every DYNAMIC it reads; STATE
/// variables follow in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct ComputationOrder {
    entries: Vec<OrderedVariable>,
}

impl ComputationOrder {
    /// Number of computed variables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the model has no computed variables.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in evaluation order.
    pub fn iter(&self) -> std::slice::Iter<'_, OrderedVariable> {
        self.entries.iter()
    }

    /// Entry at evaluation position `index`.
    pub fn get(&self, index: usize) -> Option<&OrderedVariable> {
        self.entries.get(index)
    }

    /// Variable names in evaluation order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Evaluation position of a variable.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }
}

impl<'a> IntoIterator for &'a ComputationOrder {
    type Item = &'a OrderedVariable;
    type IntoIter = std::slice::Iter<'a, OrderedVariable>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for ComputationOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            write!(f, "{i:>3}. {} ({})", entry.name, entry.role)?;
            if !entry.inputs.is_empty() {
                write!(f, " <-")?;
                for (name, (_, source)) in entry.inputs.iter().zip(&entry.routes) {
                    let tag = match source {
                        ReadSource::Static => "static",
                        ReadSource::Previous => "previous",
                        ReadSource::Current => "current",
                    };
                    write!(f, " {name}[{tag}]")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Errors from ordering the dependency graph.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// DYNAMIC variables depend on each other in a cycle.
    #[error(
        "circular dependency: {} (unresolved: {})",
        cycle.join(" -> "),
        residual.join(", ")
    )]
    CircularDependency {
        /// One concrete cycle, closed: the first name is repeated last.
        cycle: Vec<String>,
        /// Every DYNAMIC variable that could not be placed.
        residual: Vec<String>,
    },

    /// A formula input names no declared variable.
    #[error("variable '{variable}' depends on undeclared '{dependency}'")]
    UnknownDependency {
        /// The consuming variable.
        variable: String,
        /// The missing input name.
        dependency: String,
    },
}

/// Sort the registry's computed variables into evaluation order.
///
/// STATIC and STATE values are available before any formula runs, so they
/// seed the resolved set. Each pass places every still-pending DYNAMIC
/// whose inputs are all resolved, in declaration order; a pass that
/// places nothing means the remainder contains a cycle.
pub fn compute_order(registry: &VariableRegistry) -> Result<ComputationOrder, GraphError> {
    for var in registry.all() {
        if let Some(dep) = var.inputs().iter().find(|i| !registry.contains(i)) {
            return Err(GraphError::UnknownDependency {
                variable: var.name().to_string(),
                dependency: dep.clone(),
            });
        }
    }

    let mut resolved: HashSet<&str> = registry
        .all()
        .filter(|v| v.role() != Role::Dynamic)
        .map(Variable::name)
        .collect();
    let mut pending: Vec<(VariableId, &Variable)> = registry
        .iter()
        .filter(|(_, v)| v.role() == Role::Dynamic)
        .collect();
    let mut entries = Vec::with_capacity(registry.len());

    while !pending.is_empty() {
        let (ready, rest): (Vec<_>, Vec<_>) = pending
            .into_iter()
            .partition(|(_, v)| v.inputs().iter().all(|i| resolved.contains(i.as_str())));
        if ready.is_empty() {
            return Err(circular(&rest));
        }
        for (id, var) in ready {
            resolved.insert(var.name());
            entries.push(ordered(registry, id, var));
        }
        pending = rest;
    }

    for (id, var) in registry.iter().filter(|(_, v)| v.role() == Role::State) {
        entries.push(ordered(registry, id, var));
    }

    Ok(ComputationOrder { entries })
}

fn ordered(registry: &VariableRegistry, id: VariableId, var: &Variable) -> OrderedVariable {
    let routes = var
        .inputs()
        .iter()
        .filter_map(|name| {
            let producer = registry.id(name)?;
            let source = match registry.get_by_id(producer)?.role() {
                Role::Static => ReadSource::Static,
                Role::State => ReadSource::Previous,
                Role::Dynamic => ReadSource::Current,
            };
            Some((producer, source))
        })
        .collect();
    OrderedVariable {
        id,
        name: var.name().to_string(),
        role: var.role(),
        inputs: var.inputs().to_vec(),
        routes,
    }
}

/// Build the cycle report for the unplaceable remainder.
///
/// Every residual variable reads at least one other residual variable,
/// so walking first-unresolved-input edges from any of them must revisit
/// a node; the walk from that node back to itself is a cycle.
fn circular(residual: &[(VariableId, &Variable)]) -> GraphError {
    let names: Vec<String> = residual.iter().map(|(_, v)| v.name().to_string()).collect();
    let lookup = |name: &str| residual.iter().find(|(_, v)| v.name() == name).map(|(_, v)| *v);

    let mut path: Vec<&str> = Vec::new();
    let mut current = residual.first().map(|(_, v)| *v);
    while let Some(var) = current {
        if let Some(start) = path.iter().position(|n| *n == var.name()) {
            let mut cycle: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
            cycle.push(var.name().to_string());
            return GraphError::CircularDependency {
                cycle,
                residual: names,
            };
        }
        path.push(var.name());
        current = var.inputs().iter().find_map(|i| lookup(i));
    }

    GraphError::CircularDependency {
        cycle: Vec::new(),
        residual: names,
    }
}
