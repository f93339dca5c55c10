//! Benchmark profiles for Limnos.
//!
//! Provides pre-built [`ModelConfig`] profiles coupling the reference
//! temperature and oxygen processes:
//!
//! - [`reference_profile`]: 100x100 grid (10K cells)
//! - [`stress_profile`]: 316x316 grid (~100K cells)
//! - [`init_field`]: deterministic spatially varying initial values via seed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use limnos_engine::{ModelConfig, ModelOptions, DT};
use limnos_grid::Rect2D;
use limnos_process::{DeclarationError, Variable, VariableRegistry};
use limnos_processes::{DissolvedOxygen, OxygenDefaults, WaterTemperature, MODEL_KIND};

/// Registry with temperature and oxygen registered in dependency order
/// and a 60 s timestep.
pub fn water_quality_registry() -> Result<VariableRegistry, DeclarationError> {
    let mut registry = VariableRegistry::new(MODEL_KIND);
    registry.declare(Variable::constant(DT).with_default(60.0).units("s"))?;
    registry.register(&WaterTemperature::default())?;
    registry.register(&DissolvedOxygen::new(OxygenDefaults {
        reaeration_rate: 1.0e-3,
        ..OxygenDefaults::default()
    }))?;
    Ok(registry)
}

/// Build a reference benchmark profile: 100x100 grid (10K cells).
///
/// Temperature in 15..25 °C, oxygen in 6..10 mg/L, 200 W/m² heating,
/// dt = 60 s.
///
/// # Panics
///
/// Panics if the reference processes fail to register.
pub fn reference_profile(seed: u64) -> ModelConfig {
    profile(100, 100, seed)
}

/// Build a stress benchmark profile: 316x316 grid (~100K cells).
///
/// Same processes as [`reference_profile`] at 10x the cell count.
///
/// # Panics
///
/// Panics if the reference processes fail to register.
pub fn stress_profile(seed: u64) -> ModelConfig {
    profile(316, 316, seed)
}

fn profile(rows: usize, cols: usize, seed: u64) -> ModelConfig {
    let registry = water_quality_registry().unwrap();
    let grid = Rect2D::new(rows, cols).unwrap();
    let cell_count = rows * cols;

    ModelConfig::new(registry, grid)
        .with_initial("water_temp", init_field(cell_count, seed, 15.0, 25.0))
        .with_initial("dissolved_oxygen", init_field(cell_count, seed ^ 0x9e37, 6.0, 10.0))
        .with_parameter("net_heat_flux", 200.0)
        .with_options(ModelOptions {
            check_finite: true,
            ..ModelOptions::default()
        })
}

/// Generate `cell_count` deterministic values in `[lo, hi)`.
///
/// Uses a simple multiplicative hash of the seed and cell index, so the
/// same seed always yields the same field.
pub fn init_field(cell_count: usize, seed: u64, lo: f64, hi: f64) -> Vec<f64> {
    (0..cell_count as u64)
        .map(|i| {
            let h = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(i.wrapping_mul(1442695040888963407));
            let unit = (h >> 11) as f64 / (1u64 << 53) as f64;
            lo + (hi - lo) * unit
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use limnos_engine::Model;

    #[test]
    fn reference_profile_validates() {
        reference_profile(42).validate().unwrap();
    }

    #[test]
    fn stress_profile_validates() {
        stress_profile(42).validate().unwrap();
    }

    #[test]
    fn reference_profile_steps() {
        let mut model = Model::new(reference_profile(7)).unwrap();
        model.initialize().unwrap();
        model.run(2).unwrap();
        assert_eq!(model.dataset().unwrap().time(), &[0.0, 60.0, 120.0]);
    }

    #[test]
    fn init_field_in_range() {
        let field = init_field(1000, 42, 6.0, 10.0);
        assert_eq!(field.len(), 1000);
        assert!(field.iter().all(|v| (6.0..10.0).contains(v)));
    }

    #[test]
    fn init_field_deterministic() {
        assert_eq!(init_field(500, 42, 0.0, 1.0), init_field(500, 42, 0.0, 1.0));
        assert_ne!(init_field(500, 42, 0.0, 1.0), init_field(500, 43, 0.0, 1.0));
    }
}
