//! Levelized cost of electricity and project finance.
//!
//! Three levelized cost models are supported:
//!
//! - **Fixed charge rate**: annualized capital at a fixed rate plus O&M,
//!   divided by mean annual production.
//! - **Standard levelized cost**: discounted costs over discounted
//!   production at the discount rate.
//! - **BICYCLE**: capital recovered at the after-tax weighted cost of money,
//!   with income tax on the return and inflated O&M and production.
//!
//! Costs are in millions of dollars and production in kWh per year, so the
//! `1e8` factor yields cents per kWh.

use std::sync::OnceLock;

use geox_cache::{CodeMarker, Computable, Identity, Schema};
use geox_common::DomainKind;
use geox_params::{
    Choice, EconomicModel, InputSet, OutputParameter, OutputSet, ParamValue, Parameter, UnitType,
    Units,
};

use crate::error::ModelError;
use crate::math::{capital_recovery_factor, irr, npv, payback_period};
use crate::names::*;

const KIND: DomainKind = DomainKind::Economics;

/// Million dollars per kWh to cents per kWh.
const CENTS_PER_MEGADOLLAR: f64 = 1e8;

/// The economics stage of the pipeline.
#[derive(Debug, Clone)]
pub struct Economics {
    inputs: InputSet,
    outputs: OutputSet,
}

impl Economics {
    /// Creates economics with default inputs.
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

    fn model(&self) -> Result<EconomicModel, ModelError> {
        match self.inputs.choice(ECONOMIC_MODEL)? {
            Choice::EconomicModel(model) => Ok(model),
            other => Err(ModelError::UnsupportedOption {
                kind: KIND,
                option: other.tag(),
            }),
        }
    }

    /// Annual production for each year of the lifetime.
    fn production(&self, lifetime: usize) -> Result<Vec<f64>, ModelError> {
        let annual = self.inputs.float_list(ANNUAL_ELECTRICITY)?;
        let Some(&last) = annual.last() else {
            return Err(ModelError::MissingInput {
                kind: KIND,
                name: ANNUAL_ELECTRICITY.to_string(),
            });
        };
        Ok((0..lifetime)
            .map(|year| annual.get(year).copied().unwrap_or(last))
            .collect())
    }
}

impl Default for Economics {
    fn default() -> Self {
        Self::new()
    }
}

/// Financial inputs read once per compute.
struct Finance {
    lifetime: usize,
    capital: f64,
    om: f64,
    construction_inflation: f64,
    production: Vec<f64>,
}

impl Finance {
    fn installed_capital(&self) -> f64 {
        (1.0 + self.construction_inflation) * self.capital
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator * CENTS_PER_MEGADOLLAR
    } else {
        f64::NAN
    }
}

fn fixed_charge_rate_lcoe(f: &Finance, fcr: f64) -> f64 {
    let mean = f.production.iter().sum::<f64>() / f.lifetime as f64;
    ratio(fcr * f.installed_capital() + f.om, mean)
}

fn standard_lcoe(f: &Finance, rate: f64) -> f64 {
    let discount: Vec<f64> = (0..f.lifetime).map(|t| 1.0 / (1.0 + rate).powi(t as i32)).collect();
    let costs = f.installed_capital() + discount.iter().map(|d| f.om * d).sum::<f64>();
    let energy: f64 = f.production.iter().zip(&discount).map(|(e, d)| e * d).sum();
    ratio(costs, energy)
}

struct BicycleRates {
    bond_fraction: f64,
    bond_rate: f64,
    equity_rate: f64,
    tax_rate: f64,
    inflation: f64,
}

impl BicycleRates {
    /// After-tax weighted average cost of money.
    fn average(&self) -> f64 {
        self.bond_fraction * self.bond_rate * (1.0 - self.tax_rate)
            + (1.0 - self.bond_fraction) * self.equity_rate
    }
}

fn bicycle_lcoe(f: &Finance, rates: &BicycleRates) -> f64 {
    let iave = rates.average();
    let crf = capital_recovery_factor(iave, f.lifetime as f64);
    let installed = f.installed_capital();
    let recovered = installed * crf;
    let tax_on_return =
        rates.tax_rate / (1.0 - rates.tax_rate) * (recovered - f.capital / f.lifetime as f64);

    let (mut costs, mut energy) = (0.0, 0.0);
    for (year, production) in (1..=f.lifetime).zip(&f.production) {
        let discount = 1.0 / (1.0 + iave).powi(year as i32);
        let inflation = (1.0 + rates.inflation).powi(year as i32);
        costs += (recovered + tax_on_return + f.om * inflation) * discount;
        energy += production * inflation * discount;
    }
    ratio(costs, energy)
}

fn declare_inputs() -> InputSet {
    let rate = |name: &str, default: f64| {
        Parameter::float(name, default)
            .with_range(0.0, 1.0)
            .with_units(Units::new(UnitType::Percent, "1"))
    };
    [
        Parameter::choice(ECONOMIC_MODEL, Choice::EconomicModel(EconomicModel::StandardLevelizedCost)),
        rate(FIXED_CHARGE_RATE, 0.1),
        rate(DISCOUNT_RATE, 0.07).with_err_message("discount rate must lie between 0 and 1"),
        rate(BOND_FRACTION, 0.5),
        rate(BOND_RATE, 0.05),
        rate(EQUITY_RATE, 0.1),
        rate(INFLATION_RATE, 0.02),
        rate(INCOME_TAX_RATE, 0.3).with_range(0.0, 0.99),
        rate(CONSTRUCTION_INFLATION, 0.0),
        Parameter::float(CAPITAL_COST, 12.5)
            .with_range(0.0, 10000.0)
            .with_units(Units::new(UnitType::Currency, "MUSD")),
        Parameter::float(OM_COST, 0.5)
            .with_range(0.0, 1000.0)
            .with_units(Units::new(UnitType::CurrencyPerYear, "MUSD/yr")),
        Parameter::int(PLANT_LIFETIME, 30)
            .with_allowed(1, 100)
            .with_units(Units::new(UnitType::Time, "yr")),
        Parameter::float(ELECTRICITY_RATE, 0.07)
            .with_range(0.0, 1.0)
            .with_units(Units::new(UnitType::EnergyPrice, "USD/kWh")),
        Parameter::float_list(ANNUAL_ELECTRICITY, vec![5.0e7])
            .with_units(Units::new(UnitType::Energy, "kWh/year")),
    ]
    .into_iter()
    .collect()
}

fn declare_outputs() -> OutputSet {
    [
        OutputParameter::float(LCOE).with_units(Units::new(UnitType::EnergyCost, "cents/kWh")),
        OutputParameter::float(CAPITAL_RECOVERY_FACTOR),
        OutputParameter::float(PROJECT_NPV).with_units(Units::new(UnitType::Currency, "MUSD")),
        OutputParameter::float(PROJECT_IRR),
        OutputParameter::float(PAYBACK_PERIOD).with_units(Units::new(UnitType::Time, "yr")),
    ]
    .into_iter()
    .collect()
}

impl Computable for Economics {
    type Error = ModelError;

    fn identity(&self) -> Identity {
        Identity {
            kind: KIND,
            marker: CodeMarker::Embedded(include_str!("economics.rs")),
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
        let inputs = &self.inputs;
        let lifetime = inputs.int(PLANT_LIFETIME)?;
        if lifetime < 1 {
            return Err(ModelError::InvalidInput {
                kind: KIND,
                name: PLANT_LIFETIME.to_string(),
                reason: "must be at least one year".to_string(),
            });
        }
        let lifetime = lifetime as usize;
        let finance = Finance {
            lifetime,
            capital: inputs.float(CAPITAL_COST)?,
            om: inputs.float(OM_COST)?,
            construction_inflation: inputs.float(CONSTRUCTION_INFLATION)?,
            production: self.production(lifetime)?,
        };
        let discount_rate = inputs.float(DISCOUNT_RATE)?;

        let (lcoe, crf) = match self.model()? {
            EconomicModel::FixedChargeRate => {
                let fcr = inputs.float(FIXED_CHARGE_RATE)?;
                (fixed_charge_rate_lcoe(&finance, fcr), fcr)
            }
            EconomicModel::StandardLevelizedCost => (
                standard_lcoe(&finance, discount_rate),
                capital_recovery_factor(discount_rate, lifetime as f64),
            ),
            EconomicModel::Bicycle => {
                let rates = BicycleRates {
                    bond_fraction: inputs.float(BOND_FRACTION)?,
                    bond_rate: inputs.float(BOND_RATE)?,
                    equity_rate: inputs.float(EQUITY_RATE)?,
                    tax_rate: inputs.float(INCOME_TAX_RATE)?,
                    inflation: inputs.float(INFLATION_RATE)?,
                };
                (
                    bicycle_lcoe(&finance, &rates),
                    capital_recovery_factor(rates.average(), lifetime as f64),
                )
            }
        };

        // Year 0 carries the installed capital; revenue is in USD, costs in MUSD.
        let price = inputs.float(ELECTRICITY_RATE)?;
        let cash_flows: Vec<f64> = std::iter::once(-finance.installed_capital())
            .chain(finance.production.iter().map(|e| e * price / 1e6 - finance.om))
            .collect();

        self.outputs.set(LCOE, ParamValue::Float(lcoe))?;
        self.outputs.set(CAPITAL_RECOVERY_FACTOR, ParamValue::Float(crf))?;
        self.outputs
            .set(PROJECT_NPV, ParamValue::Float(npv(discount_rate, &cash_flows)))?;
        self.outputs.set(PROJECT_IRR, ParamValue::Float(irr(&cash_flows)))?;
        self.outputs
            .set(PAYBACK_PERIOD, ParamValue::Float(payback_period(&cash_flows)))?;
        Ok(())
    }
}
