//! Unit metadata attached to parameters.
//!
//! Conversion between units is out of scope; parameters only record which
//! units their value is expressed in so inputs with a foreign unit suffix can
//! be rejected rather than silently misread.

use serde::Serialize;

/// The physical quantity a parameter measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[allow(missing_docs)]
pub enum UnitType {
    None,
    Temperature,
    TemperatureGradient,
    Length,
    MassFlow,
    Power,
    Energy,
    Currency,
    CurrencyPerYear,
    EnergyCost,
    EnergyPrice,
    Percent,
    Drawdown,
    Time,
    Impedance,
    ThermalConductivity,
    Density,
    HeatCapacity,
}

/// Preferred and current units of a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Units {
    /// The quantity measured.
    pub unit_type: UnitType,
    /// Units the model computes in.
    pub preferred: String,
    /// Units the value is currently expressed in.
    pub current: String,
    /// Whether `current` equals `preferred`.
    pub units_match: bool,
}

impl Units {
    /// A dimensionless parameter.
    pub fn none() -> Self {
        Self::new(UnitType::None, "")
    }

    /// Units of `unit_type` expressed in `symbol`, with current == preferred.
    pub fn new(unit_type: UnitType, symbol: &str) -> Self {
        Self {
            unit_type,
            preferred: symbol.to_string(),
            current: symbol.to_string(),
            units_match: true,
        }
    }
}

impl Default for Units {
    fn default() -> Self {
        Self::none()
    }
}
