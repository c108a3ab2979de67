//! Surface conversion plant.
//!
//! Converts produced fluid enthalpy into electricity and direct-use heat
//! according to the end-use option, then integrates both to annual energy
//! for the economics stage.

use std::sync::OnceLock;

use geox_cache::{CodeMarker, Computable, Identity, Schema};
use geox_common::DomainKind;
use geox_params::{
    Choice, EndUseOption, InputSet, OutputParameter, OutputSet, ParamValue, Parameter,
    PowerPlantType, UnitType, Units,
};

use crate::error::ModelError;
use crate::math::{yearly_means, HOURS_PER_YEAR, WATER_HEAT_CAPACITY};
use crate::names::*;

const KIND: DomainKind = DomainKind::SurfacePlant;

/// The surface plant stage of the pipeline.
#[derive(Debug, Clone)]
pub struct SurfacePlant {
    inputs: InputSet,
    outputs: OutputSet,
}

impl SurfacePlant {
    /// Creates a surface plant with default inputs.
    pub fn new() -> Self {
        Self {
            inputs: declare_inputs(),
            outputs: declare_outputs(),
        }
    }

    /// Mutable access to the inputs, for applying and piping values.
    pub fn inputs_mut(&mut self) -> &mut InputSet {
        &mut self.inputs
    }

    fn end_use(&self) -> Result<EndUseOption, ModelError> {
        match self.inputs.choice(END_USE_OPTION)? {
            Choice::EndUseOption(option) => Ok(option),
            other => Err(ModelError::UnsupportedOption {
                kind: KIND,
                option: other.tag(),
            }),
        }
    }

    fn plant_type(&self) -> Result<PowerPlantType, ModelError> {
        match self.inputs.choice(POWER_PLANT_TYPE)? {
            Choice::PowerPlantType(plant) => Ok(plant),
            other => Err(ModelError::UnsupportedOption {
                kind: KIND,
                option: other.tag(),
            }),
        }
    }
}

impl Default for SurfacePlant {
    fn default() -> Self {
        Self::new()
    }
}

/// Fraction of the Carnot efficiency each cycle achieves.
fn carnot_fraction(plant: PowerPlantType) -> f64 {
    match plant {
        PowerPlantType::SubcriticalOrc => 0.45,
        PowerPlantType::SupercriticalOrc => 0.5,
        PowerPlantType::SingleFlash => 0.55,
        PowerPlantType::DoubleFlash => 0.6,
    }
}

fn declare_inputs() -> InputSet {
    let temp = || Units::new(UnitType::Temperature, "degC");
    [
        Parameter::choice(END_USE_OPTION, Choice::EndUseOption(EndUseOption::Electricity)),
        Parameter::choice(POWER_PLANT_TYPE, Choice::PowerPlantType(PowerPlantType::SubcriticalOrc)),
        Parameter::float_list(PRODUCED_TEMPERATURE, Vec::new())
            .with_units(temp())
            .required(),
        Parameter::float(TOTAL_FLOW_RATE, 0.0)
            .with_units(Units::new(UnitType::MassFlow, "kg/sec"))
            .required(),
        Parameter::float(PUMPING_POWER, 0.0).with_units(Units::new(UnitType::Power, "MW")),
        Parameter::float(INJECTION_TEMPERATURE, 70.0)
            .with_range(0.0, 200.0)
            .with_units(temp()),
        Parameter::float(AMBIENT_TEMPERATURE, 15.0)
            .with_range(-50.0, 50.0)
            .with_units(temp()),
        Parameter::float(UTILIZATION_FACTOR, 0.9).with_range(0.1, 1.0),
        Parameter::int(PLANT_LIFETIME, 30)
            .with_allowed(1, 100)
            .with_units(Units::new(UnitType::Time, "yr")),
        Parameter::int(TIME_STEPS_PER_YEAR, 1).with_allowed(1, 100),
    ]
    .into_iter()
    .collect()
}

fn declare_outputs() -> OutputSet {
    let mw = || Units::new(UnitType::Power, "MW");
    let kwh = || Units::new(UnitType::Energy, "kWh/year");
    [
        OutputParameter::float_list(HEAT_EXTRACTED).with_units(mw()),
        OutputParameter::float_list(FIRST_LAW_EFFICIENCY),
        OutputParameter::float_list(NET_ELECTRICITY).with_units(mw()),
        OutputParameter::float_list(HEAT_PRODUCED).with_units(mw()),
        OutputParameter::float_list(ANNUAL_ELECTRICITY).with_units(kwh()),
        OutputParameter::float_list(ANNUAL_HEAT).with_units(kwh()),
    ]
    .into_iter()
    .collect()
}

impl Computable for SurfacePlant {
    type Error = ModelError;

    fn identity(&self) -> Identity {
        Identity {
            kind: KIND,
            marker: CodeMarker::Embedded(include_str!("surface_plant.rs")),
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
        let produced = self.inputs.float_list(PRODUCED_TEMPERATURE)?;
        if produced.is_empty() {
            return Err(ModelError::MissingInput {
                kind: KIND,
                name: PRODUCED_TEMPERATURE.to_string(),
            });
        }
        let flow = self.inputs.float(TOTAL_FLOW_RATE)?;
        let pumping = self.inputs.float(PUMPING_POWER)?;
        let injection = self.inputs.float(INJECTION_TEMPERATURE)?;
        let ambient_k = self.inputs.float(AMBIENT_TEMPERATURE)? + 273.15;
        let share = self.end_use()?.electric_share();
        let fraction = carnot_fraction(self.plant_type()?);

        let mut heat_extracted = Vec::with_capacity(produced.len());
        let mut efficiency = Vec::with_capacity(produced.len());
        let mut electricity = Vec::with_capacity(produced.len());
        let mut heat = Vec::with_capacity(produced.len());
        for &t in produced {
            let q = (flow * WATER_HEAT_CAPACITY * (t - injection) / 1e6).max(0.0);
            let carnot = (1.0 - ambient_k / (t + 273.15)).max(0.0);
            let net = q * share * fraction * carnot - pumping;
            heat_extracted.push(q);
            efficiency.push(if q > 0.0 { net / q } else { 0.0 });
            electricity.push(net);
            heat.push(q * (1.0 - share));
        }

        let lifetime = self.inputs.int(PLANT_LIFETIME)?;
        let steps = self.inputs.int(TIME_STEPS_PER_YEAR)?;
        let to_kwh = 1000.0 * HOURS_PER_YEAR * self.inputs.float(UTILIZATION_FACTOR)?;
        let annual = |series: &[f64]| -> Vec<f64> {
            yearly_means(series, lifetime, steps)
                .into_iter()
                .map(|mw| mw * to_kwh)
                .collect()
        };
        let annual_electricity = annual(&electricity);
        let annual_heat = annual(&heat);

        self.outputs.set(HEAT_EXTRACTED, ParamValue::FloatList(heat_extracted))?;
        self.outputs.set(FIRST_LAW_EFFICIENCY, ParamValue::FloatList(efficiency))?;
        self.outputs.set(NET_ELECTRICITY, ParamValue::FloatList(electricity))?;
        self.outputs.set(HEAT_PRODUCED, ParamValue::FloatList(heat))?;
        self.outputs
            .set(ANNUAL_ELECTRICITY, ParamValue::FloatList(annual_electricity))?;
        self.outputs.set(ANNUAL_HEAT, ParamValue::FloatList(annual_heat))?;
        Ok(())
    }
}
