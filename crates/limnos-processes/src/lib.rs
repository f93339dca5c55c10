//! Reference water-quality processes for Limnos.
//!
//! Each process is a [`Module`](limnos_process::Module) of kind
//! [`MODEL_KIND`] that declares its parameters, diagnostics and state:
//!
//! 1. [`WaterTemperature`]: net surface heat flux warms a well-mixed
//!    column, `dT/dt = q / (rho * cp * h)`.
//! 2. [`DissolvedOxygen`]: surface reaeration relaxes oxygen towards its
//!    temperature-dependent saturation, `dDO/dt = k_a * (DO_sat - DO)`.
//!
//! Register temperature before oxygen; oxygen reads `water_temp`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod oxygen;
pub mod temperature;

pub use oxygen::{oxygen_saturation, DissolvedOxygen, OxygenDefaults};
pub use temperature::{temperature_tendency, TemperatureDefaults, WaterTemperature};

/// Model kind shared by every process in this crate.
pub const MODEL_KIND: &str = "water_quality";
