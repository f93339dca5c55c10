//! Water temperature driven by net surface heat flux.
//!
//! A well-mixed column of depth `h` gains heat at `q` W/m²:
//!
//! ```text
//! temperature_tendency = q / (rho * cp * h)        [K/s]
//! water_temp(t)        = water_temp(t-1) + temperature_tendency * dt
//! ```
//!
//! `net_heat_flux` and `depth` are updatable so a driver can feed
//! meteorological forcing step by step.

use limnos_core::FormulaError;
use limnos_process::{formula, DeclarationError, Module, Variable, VariableRegistry};

use crate::MODEL_KIND;

/// Net surface heat flux, W/m² (positive into the water).
pub const NET_HEAT_FLUX: &str = "net_heat_flux";
/// Column depth, m.
pub const DEPTH: &str = "depth";
/// Water density, kg/m³.
pub const WATER_DENSITY: &str = "water_density";
/// Specific heat of water, J/(kg·K).
pub const SPECIFIC_HEAT: &str = "specific_heat";
/// Rate of temperature change, K/s.
pub const TEMPERATURE_TENDENCY: &str = "temperature_tendency";
/// Water temperature, °C.
pub const WATER_TEMP: &str = "water_temp";

/// Parameter defaults for [`WaterTemperature`].
#[derive(Clone, Debug, PartialEq)]
pub struct TemperatureDefaults {
    /// Net heat flux, W/m².
    pub net_heat_flux: f64,
    /// Depth, m.
    pub depth: f64,
    /// Density, kg/m³.
    pub water_density: f64,
    /// Specific heat, J/(kg·K).
    pub specific_heat: f64,
    /// Initial water temperature, °C.
    pub water_temp: f64,
}

impl Default for TemperatureDefaults {
    fn default() -> Self {
        Self {
            net_heat_flux: 0.0,
            depth: 1.0,
            water_density: 1000.0,
            specific_heat: 4186.0,
            water_temp: 20.0,
        }
    }
}

/// `q / (rho * cp * h)`.
pub fn temperature_tendency(q: f64, rho: f64, cp: f64, h: f64) -> f64 {
    q / (rho * cp * h)
}

/// Heat-flux-driven water temperature.
#[derive(Clone, Debug, Default)]
pub struct WaterTemperature {
    defaults: TemperatureDefaults,
}

impl WaterTemperature {
    /// A temperature process with the given defaults.
    pub fn new(defaults: TemperatureDefaults) -> Self {
        Self { defaults }
    }

    /// The parameter defaults this process declares.
    pub fn defaults(&self) -> &TemperatureDefaults {
        &self.defaults
    }
}

impl Module for WaterTemperature {
    fn name(&self) -> &str {
        "water_temperature"
    }

    fn model_kind(&self) -> &str {
        MODEL_KIND
    }

    fn declare(&self, registry: &mut VariableRegistry) -> Result<(), DeclarationError> {
        let d = &self.defaults;
        registry.declare(
            Variable::constant(NET_HEAT_FLUX)
                .with_default(d.net_heat_flux)
                .updatable()
                .units("W m-2")
                .long_name("net surface heat flux"),
        )?;
        registry.declare(
            Variable::constant(DEPTH)
                .with_default(d.depth)
                .updatable()
                .units("m")
                .long_name("water column depth"),
        )?;
        registry.declare(
            Variable::constant(WATER_DENSITY)
                .with_default(d.water_density)
                .units("kg m-3"),
        )?;
        registry.declare(
            Variable::constant(SPECIFIC_HEAT)
                .with_default(d.specific_heat)
                .units("J kg-1 K-1"),
        )?;

        registry.declare(
            Variable::dynamic(
                TEMPERATURE_TENDENCY,
                formula(
                    [NET_HEAT_FLUX, WATER_DENSITY, SPECIFIC_HEAT, DEPTH],
                    |a| {
                        if let Some(cell) = a.arg(3)?.iter().position(|&h| h <= 0.0) {
                            return Err(FormulaError::failed(format!(
                                "depth must be positive (cell {cell})"
                            )));
                        }
                        Ok(a.map_n(|v| temperature_tendency(v[0], v[1], v[2], v[3])))
                    },
                ),
            )
            .units("K s-1")
            .long_name("rate of temperature change"),
        )?;

        registry.declare(
            Variable::state(
                WATER_TEMP,
                formula([WATER_TEMP, TEMPERATURE_TENDENCY, "dt"], |a| {
                    a.map3(0, 1, 2, |t, dtdt, dt| t + dtdt * dt)
                }),
            )
            .with_default(d.water_temp)
            .units("degC")
            .long_name("water temperature"),
        )?;
        Ok(())
    }
}
