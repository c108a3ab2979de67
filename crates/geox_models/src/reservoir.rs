//! Reservoir heat-extraction model.
//!
//! Produces the reservoir outlet temperature over the plant lifetime from the
//! initial rock temperature and a thermal drawdown model.

use std::sync::OnceLock;

use geox_cache::{CodeMarker, Computable, Identity, Schema};
use geox_common::DomainKind;
use geox_params::{
    Choice, InputSet, OutputParameter, OutputSet, ParamValue, Parameter, ReservoirModel, UnitType,
    Units,
};

use crate::error::ModelError;
use crate::math::{erf, time_axis, SECONDS_PER_YEAR, WATER_HEAT_CAPACITY};
use crate::names::*;

const KIND: DomainKind = DomainKind::Reservoir;

/// The reservoir stage of the pipeline.
#[derive(Debug, Clone)]
pub struct Reservoir {
    inputs: InputSet,
    outputs: OutputSet,
}

impl Reservoir {
    /// Creates a reservoir with default inputs.
    pub fn new() -> Self {
        Self {
            inputs: declare_inputs(),
            outputs: declare_outputs(),
        }
    }

    /// Mutable access to the inputs, for applying user values.
    pub fn inputs_mut(&mut self) -> &mut InputSet {
        &mut self.inputs
    }

    fn drawdown(&self, model: ReservoirModel, rock: f64, injection: f64) -> Result<Vec<f64>, ModelError> {
        let lifetime = self.inputs.int(PLANT_LIFETIME)?;
        let steps = self.inputs.int(TIME_STEPS_PER_YEAR)?;
        let d = self.inputs.float(DRAWDOWN_PARAMETER)?;
        let times = time_axis(lifetime, steps);

        match model {
            ReservoirModel::AnnualPercentage => Ok(times
                .iter()
                .map(|t| (1.0 - d * t).max(0.0) * (rock - injection) + injection)
                .collect()),
            ReservoirModel::SingleFracture => {
                if d <= 0.0 {
                    return Err(ModelError::InvalidInput {
                        kind: KIND,
                        name: DRAWDOWN_PARAMETER.to_string(),
                        reason: "single fracture drawdown needs a positive flow per area".to_string(),
                    });
                }
                let k = self.inputs.float(ROCK_CONDUCTIVITY)?;
                let rho = self.inputs.float(ROCK_DENSITY)?;
                let cp = self.inputs.float(ROCK_HEAT_CAPACITY)?;
                Ok(times
                    .iter()
                    .map(|&t| {
                        if t == 0.0 {
                            return rock;
                        }
                        let arg = 1.0 / d / WATER_HEAT_CAPACITY * (k * rho * cp / (t * SECONDS_PER_YEAR)).sqrt();
                        erf(arg) * (rock - injection) + injection
                    })
                    .collect())
            }
            other => Err(ModelError::UnsupportedOption {
                kind: KIND,
                option: Choice::ReservoirModel(other).tag(),
            }),
        }
    }
}

impl Default for Reservoir {
    fn default() -> Self {
        Self::new()
    }
}

fn declare_inputs() -> InputSet {
    let temp = || Units::new(UnitType::Temperature, "degC");
    [
        Parameter::choice(RESERVOIR_MODEL, Choice::ReservoirModel(ReservoirModel::AnnualPercentage))
            .with_tooltip("Thermal drawdown model"),
        Parameter::float(RESERVOIR_DEPTH, 3.0)
            .with_range(0.1, 15.0)
            .with_units(Units::new(UnitType::Length, "km")),
        Parameter::float(GRADIENT, 50.0)
            .with_range(0.0, 500.0)
            .with_units(Units::new(UnitType::TemperatureGradient, "degC/km")),
        Parameter::float(SURFACE_TEMPERATURE, 15.0)
            .with_range(-50.0, 50.0)
            .with_units(temp()),
        Parameter::float(INJECTION_TEMPERATURE, 70.0)
            .with_range(0.0, 200.0)
            .with_units(temp()),
        Parameter::float(DRAWDOWN_PARAMETER, 0.005)
            .with_range(0.0, 0.2)
            .with_units(Units::new(UnitType::Drawdown, "1/year"))
            .with_tooltip("Annual fractional drawdown, or flow per fracture area for single fracture"),
        Parameter::float(ROCK_CONDUCTIVITY, 3.0)
            .with_range(0.01, 100.0)
            .with_units(Units::new(UnitType::ThermalConductivity, "W/m/K")),
        Parameter::float(ROCK_DENSITY, 2700.0)
            .with_range(100.0, 10000.0)
            .with_units(Units::new(UnitType::Density, "kg/m**3")),
        Parameter::float(ROCK_HEAT_CAPACITY, 1000.0)
            .with_range(100.0, 10000.0)
            .with_units(Units::new(UnitType::HeatCapacity, "J/kg/K")),
        Parameter::int(PLANT_LIFETIME, 30)
            .with_allowed(1, 100)
            .with_units(Units::new(UnitType::Time, "yr")),
        Parameter::int(TIME_STEPS_PER_YEAR, 1).with_allowed(1, 100),
    ]
    .into_iter()
    .collect()
}

fn declare_outputs() -> OutputSet {
    let temp = || Units::new(UnitType::Temperature, "degC");
    [
        OutputParameter::float(BOTTOM_HOLE_TEMPERATURE).with_units(temp()),
        OutputParameter::float_list(RESERVOIR_PRODUCED_TEMPERATURE).with_units(temp()),
    ]
    .into_iter()
    .collect()
}

impl Computable for Reservoir {
    type Error = ModelError;

    fn identity(&self) -> Identity {
        Identity {
            kind: KIND,
            marker: CodeMarker::Embedded(include_str!("reservoir.rs")),
        }
    }

    fn schema(&self) -> &Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| Schema::from_sets(KIND, &declare_inputs(), &declare_outputs()))
    }

    fn inputs(&self) -> &InputSet {
        &self.inputs
    }

    fn outputs(&self) -> &OutputSet {
        &self.outputs
    }

    fn restore(&mut self, inputs: InputSet, outputs: OutputSet) {
        self.inputs = inputs;
        self.outputs = outputs;
    }

    fn compute(&mut self) -> Result<(), ModelError> {
        let rock = self.inputs.float(SURFACE_TEMPERATURE)?
            + self.inputs.float(GRADIENT)? * self.inputs.float(RESERVOIR_DEPTH)?;
        let injection = self.inputs.float(INJECTION_TEMPERATURE)?;
        if rock <= injection {
            return Err(ModelError::InvalidInput {
                kind: KIND,
                name: INJECTION_TEMPERATURE.to_string(),
                reason: format!("rock temperature {rock:.1} degC is not above injection temperature"),
            });
        }

        let model = match self.inputs.choice(RESERVOIR_MODEL)? {
            Choice::ReservoirModel(model) => model,
            other => {
                return Err(ModelError::UnsupportedOption {
                    kind: KIND,
                    option: other.tag(),
                })
            }
        };
        let profile = self.drawdown(model, rock, injection)?;

        self.outputs.set(BOTTOM_HOLE_TEMPERATURE, ParamValue::Float(rock))?;
        self.outputs
            .set(RESERVOIR_PRODUCED_TEMPERATURE, ParamValue::FloatList(profile))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(r: &Reservoir) -> Vec<f64> {
        r.outputs().float_list(RESERVOIR_PRODUCED_TEMPERATURE).unwrap().to_vec()
    }

    #[test]
    fn annual_percentage_defaults() {
        let mut r = Reservoir::new();
        r.compute().unwrap();
        assert_eq!(r.outputs().float(BOTTOM_HOLE_TEMPERATURE).unwrap(), 165.0);
        let temps = profile(&r);
        assert_eq!(temps.len(), 31);
        assert_eq!(temps[0], 165.0);
        // 30 years at 0.5 %/yr leaves 85 % of the 95 degC rise.
        assert!((temps[30] - (0.85 * 95.0 + 70.0)).abs() < 1e-9);
    }

    #[test]
    fn time_steps_refine_profile() {
        let mut r = Reservoir::new();
        r.inputs_mut().apply(TIME_STEPS_PER_YEAR, "4").unwrap();
        r.inputs_mut().apply(PLANT_LIFETIME, "10").unwrap();
        r.compute().unwrap();
        assert_eq!(profile(&r).len(), 41);
    }

    #[test]
    fn single_fracture_starts_at_rock_and_declines() {
        let mut r = Reservoir::new();
        r.inputs_mut().apply(RESERVOIR_MODEL, "SingleFracture").unwrap();
        r.inputs_mut().apply(DRAWDOWN_PARAMETER, "0.0001").unwrap();
        r.compute().unwrap();
        let temps = profile(&r);
        assert_eq!(temps[0], 165.0);
        assert!(temps.windows(2).all(|w| w[1] <= w[0]));
        assert!(temps[30] > 70.0);
    }

    #[test]
    fn unsupported_model_is_rejected() {
        let mut r = Reservoir::new();
        r.inputs_mut().apply(RESERVOIR_MODEL, "Tough2Simulator").unwrap();
        assert!(matches!(r.compute(), Err(ModelError::UnsupportedOption { .. })));
    }

    #[test]
    fn cold_rock_is_rejected() {
        let mut r = Reservoir::new();
        r.inputs_mut().apply(GRADIENT, "10").unwrap();
        r.inputs_mut().apply(RESERVOIR_DEPTH, "1").unwrap();
        assert!(matches!(r.compute(), Err(ModelError::InvalidInput { .. })));
    }
}
