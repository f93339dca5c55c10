//! The [`Formula`] trait, its argument view, and the signature reflector.
//!
//! A formula is a pure function from named per-cell inputs to a new
//! [`Value`]. Its input names are the only way the engine discovers
//! dependencies, so they must match the names of the variables consumed.
//! Rust has no parameter-name reflection: formulas carry their input
//! list explicitly and [`Signature::of`] validates and recovers it.

use limnos_core::{FormulaError, ReadSource, Value, VariableId, VariableReader};
use smallvec::SmallVec;

use crate::error::SignatureError;

/// A pure per-cell computation producing one variable's value for a step.
///
/// # Contract
///
/// - `evaluate()` MUST be deterministic: same inputs produce identical outputs.
/// - `&self`: formulas are stateless; temporal state lives in STATE variables.
/// - `Send + Sync`: a registry is shared read-only by a model and its executor.
/// - `inputs()` is read once at declaration, not per step.
/// - The result is either a scalar or exactly one value per cell.
///
/// # Examples
///
/// A formula computing `x + d2` per cell:
///
/// ```
/// use limnos_core::{FormulaError, Value};
/// use limnos_process::{Formula, FormulaArgs};
///
/// struct AddIncrement {
///     inputs: Vec<String>,
/// }
///
/// impl Formula for AddIncrement {
///     fn inputs(&self) -> &[String] {
///         &self.inputs
///     }
///
///     fn evaluate(&self, args: &FormulaArgs<'_>) -> Result<Value, FormulaError> {
///         args.map2(0, 1, |x, d2| x + d2)
///     }
/// }
///
/// let f = AddIncrement { inputs: vec!["x".into(), "d2".into()] };
/// let names = f.inputs().to_vec();
/// let x = [2.0, 3.0];
/// let d2 = [5.0, 10.0];
/// let args = FormulaArgs::new(&names, vec![&x[..], &d2[..]], 2);
/// assert_eq!(f.evaluate(&args).unwrap(), Value::cells(vec![7.0, 13.0]));
/// ```
pub trait Formula: Send + Sync + 'static {
    /// Names of the variables consumed, in argument order.
    fn inputs(&self) -> &[String];

    /// Evaluate for the current step over all cells.
    fn evaluate(&self, args: &FormulaArgs<'_>) -> Result<Value, FormulaError>;
}

impl std::fmt::Debug for dyn Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Formula")
            .field("inputs", &self.inputs())
            .finish()
    }
}

// ── Closure adapter ────────────────────────────────────────────────

/// A [`Formula`] built from a closure and an explicit input-name list.
pub struct FnFormula<F> {
    inputs: Vec<String>,
    f: F,
}

impl<F> FnFormula<F>
where
    F: Fn(&FormulaArgs<'_>) -> Result<Value, FormulaError> + Send + Sync + 'static,
{
    /// Pair `f` with the names of the variables it consumes.
    pub fn new<I, S>(inputs: I, f: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            f,
        }
    }
}

impl<F> Formula for FnFormula<F>
where
    F: Fn(&FormulaArgs<'_>) -> Result<Value, FormulaError> + Send + Sync + 'static,
{
    fn inputs(&self) -> &[String] {
        &self.inputs
    }

    fn evaluate(&self, args: &FormulaArgs<'_>) -> Result<Value, FormulaError> {
        (self.f)(args)
    }
}

/// Capture a closure together with the names of the variables it consumes.
///
/// ```
/// use limnos_process::formula;
///
/// // T(t) = T(t-1) + k * dt
/// let f = formula(["T", "k", "dt"], |a| a.map3(0, 1, 2, |t, k, dt| t + k * dt));
/// ```
pub fn formula<I, S, F>(inputs: I, f: F) -> FnFormula<F>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    F: Fn(&FormulaArgs<'_>) -> Result<Value, FormulaError> + Send + Sync + 'static,
{
    FnFormula::new(inputs, f)
}

// ── Signature reflection ───────────────────────────────────────────

/// Synthetic return descriptor some formula authors append to their
/// input list; never treated as an input.
const RETURN_DESCRIPTOR: &str = "return";

/// The validated, ordered input names of a formula.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    names: Vec<String>,
}

impl Signature {
    /// Recover and validate the input names a formula consumes.
    ///
    /// A trailing `"return"` entry is dropped. Fails if any remaining name
    /// is empty, is not an identifier, or appears twice.
    pub fn of(formula: &dyn Formula) -> Result<Self, SignatureError> {
        let mut declared = formula.inputs();
        if declared.last().map(String::as_str) == Some(RETURN_DESCRIPTOR) {
            declared = &declared[..declared.len() - 1];
        }
        let mut names: Vec<String> = Vec::with_capacity(declared.len());
        for (position, name) in declared.iter().enumerate() {
            if name.is_empty() {
                return Err(SignatureError::EmptyName { position });
            }
            if !is_identifier(name) || name == RETURN_DESCRIPTOR {
                return Err(SignatureError::InvalidName { name: name.clone() });
            }
            if names.contains(name) {
                return Err(SignatureError::DuplicateInput { name: name.clone() });
            }
            names.push(name.clone());
        }
        Ok(Self { names })
    }

    /// Input names in argument order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Consume into the name list.
    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

// ── Arguments ──────────────────────────────────────────────────────

/// Read-only per-cell inputs handed to [`Formula::evaluate`].
///
/// Every slice has exactly [`cell_count`](Self::cell_count) entries:
/// scalar statics arrive already broadcast. Slices borrow from the
/// store and cannot outlive the call.
pub struct FormulaArgs<'a> {
    names: &'a [String],
    slices: SmallVec<[&'a [f64]; 8]>,
    cell_count: usize,
}

impl<'a> FormulaArgs<'a> {
    /// Construct from explicit slices, one per name.
    ///
    /// Typically called by the engine via [`gather`](Self::gather); useful
    /// directly when unit-testing a formula.
    pub fn new(names: &'a [String], slices: Vec<&'a [f64]>, cell_count: usize) -> Self {
        Self {
            names,
            slices: slices.into_iter().collect(),
            cell_count,
        }
    }

    /// Gather one slice per input from `reader`, following precomputed routes.
    ///
    /// `names` and `routes` are parallel. Fails with
    /// [`FormulaError::MissingArgument`] naming the first unreadable input.
    pub fn gather(
        names: &'a [String],
        routes: &[(VariableId, ReadSource)],
        reader: &'a dyn VariableReader,
    ) -> Result<Self, FormulaError> {
        let mut slices = SmallVec::with_capacity(routes.len());
        for (name, &(var, source)) in names.iter().zip(routes) {
            let data = reader
                .read(var, source)
                .ok_or_else(|| FormulaError::MissingArgument { name: name.clone() })?;
            slices.push(data);
        }
        Ok(Self {
            names,
            slices,
            cell_count: reader.cell_count(),
        })
    }

    /// Number of cells in every input slice.
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Number of inputs.
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// Whether the formula takes no inputs.
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Input at argument position `index`.
    pub fn arg(&self, index: usize) -> Result<&'a [f64], FormulaError> {
        self.slices
            .get(index)
            .copied()
            .ok_or(FormulaError::ArgumentOutOfRange {
                index,
                arity: self.slices.len(),
            })
    }

    /// Input by variable name.
    pub fn get(&self, name: &str) -> Result<&'a [f64], FormulaError> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.slices.get(i).copied())
            .ok_or_else(|| FormulaError::MissingArgument {
                name: name.to_string(),
            })
    }

    /// Apply `f` cell-wise over one input.
    pub fn map1(&self, a: usize, f: impl Fn(f64) -> f64) -> Result<Value, FormulaError> {
        let a = self.arg(a)?;
        Ok(Value::Cells(a.iter().map(|&x| f(x)).collect()))
    }

    /// Apply `f` cell-wise over two inputs.
    pub fn map2(
        &self,
        a: usize,
        b: usize,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Value, FormulaError> {
        let (a, b) = (self.arg(a)?, self.arg(b)?);
        Ok(Value::Cells(
            a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect(),
        ))
    }

    /// Apply `f` cell-wise over three inputs.
    pub fn map3(
        &self,
        a: usize,
        b: usize,
        c: usize,
        f: impl Fn(f64, f64, f64) -> f64,
    ) -> Result<Value, FormulaError> {
        let (a, b, c) = (self.arg(a)?, self.arg(b)?, self.arg(c)?);
        Ok(Value::Cells(
            a.iter()
                .zip(b)
                .zip(c)
                .map(|((&x, &y), &z)| f(x, y, z))
                .collect(),
        ))
    }

    /// Apply `f` cell-wise over all inputs in argument order.
    ///
    /// `f` receives one value per input for the current cell.
    pub fn map_n(&self, f: impl Fn(&[f64]) -> f64) -> Value {
        let mut row: SmallVec<[f64; 8]> = SmallVec::from_elem(0.0, self.slices.len());
        let mut out = Vec::with_capacity(self.cell_count);
        for cell in 0..self.cell_count {
            for (slot, slice) in row.iter_mut().zip(&self.slices) {
                *slot = slice[cell];
            }
            out.push(f(&row));
        }
        Value::Cells(out)
    }
}
