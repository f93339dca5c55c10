//! Reusable formulas and scenario registries.
//!
//! Formulas for exercising executor error paths:
//!
//! - [`ConstFormula`]: returns a fixed value, reads nothing.
//! - [`FailingFormula`]: fails deterministically after N successful calls.
//! - [`WrongShapeFormula`]: returns a per-cell value of the wrong length.
//! - [`PoisonFormula`]: writes NaN into one cell.
//!
//! Registries for the reference scenarios, all of kind [`TEST_KIND`] and
//! none declaring `dt`.

use std::sync::atomic::{AtomicUsize, Ordering};

use limnos_core::{FormulaError, Value};
use limnos_process::{formula, Formula, FormulaArgs, Variable, VariableRegistry};

/// Model kind used by every fixture registry.
pub const TEST_KIND: &str = "test";

/// Returns `value` every step.
pub struct ConstFormula {
    pub value: Value,
    inputs: Vec<String>,
}

impl ConstFormula {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            inputs: Vec::new(),
        }
    }
}

impl Formula for ConstFormula {
    fn inputs(&self) -> &[String] {
        &self.inputs
    }

    fn evaluate(&self, _args: &FormulaArgs<'_>) -> Result<Value, FormulaError> {
        Ok(self.value.clone())
    }
}

/// Succeeds `succeed_count` times (echoing its first input), then fails.
pub struct FailingFormula {
    inputs: Vec<String>,
    succeed_count: usize,
    calls: AtomicUsize,
}

impl FailingFormula {
    pub fn new(input: impl Into<String>, succeed_count: usize) -> Self {
        Self {
            inputs: vec![input.into()],
            succeed_count,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Formula for FailingFormula {
    fn inputs(&self) -> &[String] {
        &self.inputs
    }

    fn evaluate(&self, args: &FormulaArgs<'_>) -> Result<Value, FormulaError> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed);
        if n >= self.succeed_count {
            return Err(FormulaError::failed(format!(
                "deliberate failure on call {n}"
            )));
        }
        args.map1(0, |x| x)
    }
}

/// Returns `len` copies of `fill`, whatever the grid size.
pub struct WrongShapeFormula {
    inputs: Vec<String>,
    len: usize,
    fill: f64,
}

impl WrongShapeFormula {
    pub fn new(len: usize, fill: f64) -> Self {
        Self {
            inputs: Vec::new(),
            len,
            fill,
        }
    }
}

impl Formula for WrongShapeFormula {
    fn inputs(&self) -> &[String] {
        &self.inputs
    }

    fn evaluate(&self, _args: &FormulaArgs<'_>) -> Result<Value, FormulaError> {
        Ok(Value::Cells(vec![self.fill; self.len]))
    }
}

/// Echoes its input, replacing cell `cell` with NaN.
pub struct PoisonFormula {
    inputs: Vec<String>,
    cell: usize,
}

impl PoisonFormula {
    pub fn new(input: impl Into<String>, cell: usize) -> Self {
        Self {
            inputs: vec![input.into()],
            cell,
        }
    }
}

impl Formula for PoisonFormula {
    fn inputs(&self) -> &[String] {
        &self.inputs
    }

    fn evaluate(&self, args: &FormulaArgs<'_>) -> Result<Value, FormulaError> {
        let mut out = args.arg(0)?.to_vec();
        if let Some(slot) = out.get_mut(self.cell) {
            *slot = f64::NAN;
        }
        Ok(Value::Cells(out))
    }
}

// ── Variable builders ──────────────────────────────────────────────

/// STATE `name(t) = name(t-1) + increment`.
pub fn accumulator(name: &str, increment: &str, initial: impl Into<Value>) -> Variable {
    Variable::state(
        name,
        formula([name, increment], |a| a.map2(0, 1, |x, inc| x + inc)),
    )
    .with_default(initial)
}

// ── Scenario registries ────────────────────────────────────────────

/// STATIC `k = 0`, STATE `T = T + k`, `T(0) = 20`.
pub fn identity_model() -> VariableRegistry {
    linear_growth(0.0, 20.0)
}

/// STATIC `k`, STATE `T = T + k`, `T(0) = t0`.
pub fn linear_growth(k: f64, t0: f64) -> VariableRegistry {
    let mut reg = VariableRegistry::new(TEST_KIND);
    declare_all(
        &mut reg,
        vec![
            Variable::constant("k").with_default(k),
            accumulator("T", "k", t0),
        ],
    );
    reg
}

/// STATE `x = x + d2`, DYNAMIC `d1 = x * x`, DYNAMIC `d2 = d1 + 1`, `x(0) = 2`.
pub fn dependency_chain() -> VariableRegistry {
    let mut reg = VariableRegistry::new(TEST_KIND);
    declare_all(&mut reg, dependency_chain_variables());
    reg
}

/// The [`dependency_chain`] declarations, for tests that reorder them.
pub fn dependency_chain_variables() -> Vec<Variable> {
    vec![
        accumulator("x", "d2", 2.0),
        Variable::dynamic("d1", formula(["x"], |a| a.map1(0, |x| x * x))),
        Variable::dynamic("d2", formula(["d1"], |a| a.map1(0, |d1| d1 + 1.0))),
    ]
}

/// DYNAMIC `a` reads `b`, DYNAMIC `b` reads `a`.
pub fn mutual_cycle() -> VariableRegistry {
    let mut reg = VariableRegistry::new(TEST_KIND);
    declare_all(
        &mut reg,
        vec![
            Variable::dynamic("a", formula(["b"], |a| a.map1(0, |b| b + 1.0))),
            Variable::dynamic("b", formula(["a"], |a| a.map1(0, |x| x + 1.0))),
        ],
    );
    reg
}

/// Updatable STATIC `k = 0`, STATE `T = T + k`, `T(0) = 0`.
pub fn updatable_increment() -> VariableRegistry {
    let mut reg = VariableRegistry::new(TEST_KIND);
    declare_all(
        &mut reg,
        vec![
            Variable::constant("k").with_default(0.0).updatable(),
            accumulator("T", "k", 0.0),
        ],
    );
    reg
}

/// Declare every variable in order.
///
/// # Panics
///
/// Panics if any declaration is rejected.
pub fn declare_all(reg: &mut VariableRegistry, variables: Vec<Variable>) {
    for v in variables {
        let name = v.name().to_string();
        if let Err(e) = reg.declare(v) {
            panic!("fixture declaration of '{name}' failed: {e}");
        }
    }
}
