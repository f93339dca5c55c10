//! Per-step performance metrics.
//!
//! [`StepMetrics`] captures timing and memory data for a single step.

/// Timing and memory metrics collected during a single step.
///
/// All durations are in microseconds. The executor populates these
/// after each successful step; read them from the most recent step via
/// `Model::last_metrics()`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepMetrics {
    /// Wall-clock time for the entire step, in microseconds.
    pub total_us: u64,
    /// Per-formula evaluation times in evaluation order: `(variable, microseconds)`.
    pub formula_us: Vec<(String, u64)>,
    /// Time spent committing the step to the store, in microseconds.
    pub commit_us: u64,
    /// Bytes held by the store's variable buffers after the step.
    pub memory_bytes: usize,
    /// Cumulative number of rolled-back steps.
    pub rollback_events: u64,
}

impl StepMetrics {
    /// Time spent in formulas, in microseconds.
    pub fn formulas_total_us(&self) -> u64 {
        self.formula_us.iter().map(|(_, us)| us).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = StepMetrics::default();
        assert_eq!(m.total_us, 0);
        assert!(m.formula_us.is_empty());
        assert_eq!(m.commit_us, 0);
        assert_eq!(m.memory_bytes, 0);
        assert_eq!(m.rollback_events, 0);
    }

    #[test]
    fn formula_times_sum() {
        let m = StepMetrics {
            formula_us: vec![("d1".into(), 3), ("x".into(), 4)],
            ..Default::default()
        };
        assert_eq!(m.formulas_total_us(), 7);
    }
}
