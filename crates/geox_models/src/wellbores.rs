//! Production wellbore heat loss and reservoir pumping.

use std::sync::OnceLock;

use geox_cache::{CodeMarker, Computable, Identity, Schema};
use geox_common::DomainKind;
use geox_params::{InputSet, OutputParameter, OutputSet, ParamValue, Parameter, UnitType, Units};

use crate::error::ModelError;
use crate::math::WATER_DENSITY;
use crate::names::*;

const KIND: DomainKind = DomainKind::WellBores;

/// Fraction of the reservoir temperature lost up a well flowing 1 kg/s.
const RAMEY_LOSS_COEFFICIENT: f64 = 0.2;

/// The wellbore stage of the pipeline.
#[derive(Debug, Clone)]
pub struct WellBores {
    inputs: InputSet,
    outputs: OutputSet,
}

impl WellBores {
    /// Creates wellbores with default inputs.
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
}

impl Default for WellBores {
    fn default() -> Self {
        Self::new()
    }
}

fn declare_inputs() -> InputSet {
    let temp = || Units::new(UnitType::Temperature, "degC");
    [
        Parameter::float_list(RESERVOIR_PRODUCED_TEMPERATURE, Vec::new())
            .with_units(temp())
            .required(),
        Parameter::int(PRODUCTION_WELLS, 2).with_allowed(1, 50),
        Parameter::int(INJECTION_WELLS, 2).with_allowed(0, 50),
        Parameter::float(FLOW_RATE_PER_WELL, 50.0)
            .with_range(1.0, 500.0)
            .with_units(Units::new(UnitType::MassFlow, "kg/sec")),
        Parameter::boolean(RAMEY_MODEL, true)
            .with_tooltip("Estimate wellbore heat loss from flow rate instead of a fixed drop"),
        Parameter::float(WELLBORE_TEMPERATURE_DROP, 5.0)
            .with_range(0.0, 50.0)
            .with_units(temp()),
        Parameter::float(RESERVOIR_IMPEDANCE, 0.1)
            .with_range(0.0001, 10.0)
            .with_units(Units::new(UnitType::Impedance, "GPa.s/m**3")),
        Parameter::float(PUMP_EFFICIENCY, 0.75).with_range(0.1, 1.0),
    ]
    .into_iter()
    .collect()
}

fn declare_outputs() -> OutputSet {
    [
        OutputParameter::float_list(PRODUCED_TEMPERATURE)
            .with_units(Units::new(UnitType::Temperature, "degC")),
        OutputParameter::float(TOTAL_FLOW_RATE).with_units(Units::new(UnitType::MassFlow, "kg/sec")),
        OutputParameter::float(PUMPING_POWER).with_units(Units::new(UnitType::Power, "MW")),
    ]
    .into_iter()
    .collect()
}

impl Computable for WellBores {
    type Error = ModelError;

    fn identity(&self) -> Identity {
        Identity {
            kind: KIND,
            marker: CodeMarker::Embedded(include_str!("wellbores.rs")),
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
        let reservoir = self.inputs.float_list(RESERVOIR_PRODUCED_TEMPERATURE)?;
        if reservoir.is_empty() {
            return Err(ModelError::MissingInput {
                kind: KIND,
                name: RESERVOIR_PRODUCED_TEMPERATURE.to_string(),
            });
        }
        let wells = self.inputs.int(PRODUCTION_WELLS)? as f64;
        let per_well = self.inputs.float(FLOW_RATE_PER_WELL)?;

        let produced: Vec<f64> = if self.inputs.boolean(RAMEY_MODEL)? {
            let loss = (RAMEY_LOSS_COEFFICIENT / per_well.sqrt()).min(0.5);
            reservoir.iter().map(|t| t * (1.0 - loss)).collect()
        } else {
            let drop = self.inputs.float(WELLBORE_TEMPERATURE_DROP)?;
            reservoir.iter().map(|t| t - drop).collect()
        };

        let total_flow = wells * per_well;
        let volume_flow = total_flow / WATER_DENSITY;
        let pressure_drop = self.inputs.float(RESERVOIR_IMPEDANCE)? * 1e9 * volume_flow;
        let pumping = pressure_drop * volume_flow / self.inputs.float(PUMP_EFFICIENCY)? / 1e6;

        self.outputs.set(PRODUCED_TEMPERATURE, ParamValue::FloatList(produced))?;
        self.outputs.set(TOTAL_FLOW_RATE, ParamValue::Float(total_flow))?;
        self.outputs.set(PUMPING_POWER, ParamValue::Float(pumping))?;
        Ok(())
    }
}
