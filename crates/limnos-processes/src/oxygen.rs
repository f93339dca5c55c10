//! Dissolved oxygen with surface reaeration.
//!
//! Saturation follows the APHA freshwater polynomial in water
//! temperature (°C). Reaeration relaxes the dissolved concentration
//! towards it at rate `k_a`. Reads `water_temp`, so
//! [`WaterTemperature`](crate::WaterTemperature) must be registered too.

use limnos_process::{formula, DeclarationError, Module, Variable, VariableRegistry};

use crate::temperature::WATER_TEMP;
use crate::MODEL_KIND;

/// Surface reaeration rate, 1/s.
pub const REAERATION_RATE: &str = "reaeration_rate";
/// Saturation concentration, mg/L.
pub const OXYGEN_SATURATION: &str = "oxygen_saturation";
/// Dissolved oxygen concentration, mg/L.
pub const DISSOLVED_OXYGEN: &str = "dissolved_oxygen";

/// Parameter defaults for [`DissolvedOxygen`].
#[derive(Clone, Debug, PartialEq)]
pub struct OxygenDefaults {
    /// Reaeration rate, 1/s.
    pub reaeration_rate: f64,
    /// Initial dissolved oxygen, mg/L.
    pub dissolved_oxygen: f64,
}

impl Default for OxygenDefaults {
    fn default() -> Self {
        Self {
            reaeration_rate: 1.0e-5,
            dissolved_oxygen: 8.0,
        }
    }
}

/// Oxygen saturation in fresh water at `t` °C, mg/L.
pub fn oxygen_saturation(t: f64) -> f64 {
    14.652 - 0.41022 * t + 0.007991 * t * t - 0.000077774 * t * t * t
}

/// Reaeration-driven dissolved oxygen.
#[derive(Clone, Debug, Default)]
pub struct DissolvedOxygen {
    defaults: OxygenDefaults,
}

impl DissolvedOxygen {
    /// An oxygen process with the given defaults.
    pub fn new(defaults: OxygenDefaults) -> Self {
        Self { defaults }
    }

    /// The parameter defaults this process declares.
    pub fn defaults(&self) -> &OxygenDefaults {
        &self.defaults
    }
}

impl Module for DissolvedOxygen {
    fn name(&self) -> &str {
        "dissolved_oxygen"
    }

    fn model_kind(&self) -> &str {
        MODEL_KIND
    }

    fn declare(&self, registry: &mut VariableRegistry) -> Result<(), DeclarationError> {
        registry.declare(
            Variable::constant(REAERATION_RATE)
                .with_default(self.defaults.reaeration_rate)
                .units("s-1")
                .long_name("surface reaeration rate"),
        )?;
        registry.declare(
            Variable::dynamic(
                OXYGEN_SATURATION,
                formula([WATER_TEMP], |a| a.map1(0, oxygen_saturation)),
            )
            .units("mg L-1")
            .long_name("oxygen saturation concentration"),
        )?;
        registry.declare(
            Variable::state(
                DISSOLVED_OXYGEN,
                formula(
                    [DISSOLVED_OXYGEN, OXYGEN_SATURATION, REAERATION_RATE, "dt"],
                    |a| Ok(a.map_n(|v| v[0] + v[2] * (v[1] - v[0]) * v[3])),
                ),
            )
            .with_default(self.defaults.dissolved_oxygen)
            .units("mg L-1")
            .long_name("dissolved oxygen"),
        )?;
        Ok(())
    }
}
