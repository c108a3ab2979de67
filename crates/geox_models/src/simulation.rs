//! The staged simulation pipeline.
//!
//! Runs reservoir, wellbores, surface plant and economics in order. Each
//! stage goes through [`Cache::compute_with_cache`]; after a stage completes
//! (computed or rehydrated) its outputs are piped into the next stage's
//! inputs, so a downstream fingerprint always reflects the upstream result.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use geox_cache::{Cache, CacheOutcome, Computable};
use geox_common::DomainKind;
use geox_params::{ApplyOutcome, InputEntry, InputSet, OutputSet};

use crate::economics::Economics;
use crate::error::ModelError;
use crate::names::*;
use crate::reservoir::Reservoir;
use crate::surface_plant::SurfacePlant;
use crate::wellbores::WellBores;

/// What happened to each user input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputReport {
    /// Inputs whose value changed.
    pub applied: Vec<String>,
    /// Inputs given their current value.
    pub unchanged: Vec<String>,
    /// Inputs rejected by their bounds, with the parameter's error message.
    pub out_of_range: Vec<(String, String)>,
    /// Inputs no model declares.
    pub unknown: Vec<String>,
}

/// Cache outcome of one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    /// The stage.
    pub kind: DomainKind,
    /// What the cache did.
    pub outcome: CacheOutcome,
}

/// Outcomes of one [`Simulation::calculate`] run, in pipeline order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// One report per stage.
    pub stages: Vec<StageReport>,
}

impl RunReport {
    /// Number of stages served from the cache.
    pub fn hits(&self) -> usize {
        self.stages.iter().filter(|s| s.outcome.is_hit()).count()
    }

    /// The outcome for `kind`, if that stage ran.
    pub fn outcome(&self, kind: DomainKind) -> Option<&CacheOutcome> {
        self.stages
            .iter()
            .find(|s| s.kind == kind)
            .map(|s| &s.outcome)
    }

    fn push(&mut self, kind: DomainKind, outcome: CacheOutcome) {
        debug!(%kind, %outcome, "stage finished");
        self.stages.push(StageReport { kind, outcome });
    }
}

/// All domain models of one simulated plant.
#[derive(Debug, Clone, Default)]
pub struct Simulation {
    /// Reservoir stage.
    pub reservoir: Reservoir,
    /// Wellbore stage.
    pub wellbores: WellBores,
    /// Surface plant stage.
    pub surface_plant: SurfacePlant,
    /// Economics stage.
    pub economics: Economics,
}

impl Simulation {
    /// Creates a simulation with every model at its defaults.
    pub fn new() -> Self {
        Self::default()
    }

    fn input_sets(&mut self) -> [&mut InputSet; 4] {
        [
            self.reservoir.inputs_mut(),
            self.wellbores.inputs_mut(),
            self.surface_plant.inputs_mut(),
            self.economics.inputs_mut(),
        ]
    }

    /// Applies user input entries to every model that declares them.
    ///
    /// Unknown names and out-of-range values are reported and skipped; text
    /// that cannot be parsed for its parameter is an error.
    pub fn apply_inputs(&mut self, inputs: &BTreeMap<String, InputEntry>) -> Result<InputReport, ModelError> {
        let mut report = InputReport::default();
        for (name, entry) in inputs {
            let mut outcomes = Vec::new();
            let mut rejection = None;
            for set in self.input_sets() {
                let Some(param) = set.get_mut(name) else {
                    continue;
                };
                let outcome = param.apply_entry(entry)?;
                if outcome == ApplyOutcome::OutOfRange {
                    rejection = Some(param.err_message.clone());
                }
                outcomes.push(outcome);
            }

            if outcomes.is_empty() {
                warn!(input = %name, "no model declares this input, ignoring");
                report.unknown.push(name.clone());
            } else if let Some(message) = rejection {
                warn!(input = %name, value = %entry.value, %message, "input out of range, keeping default");
                report.out_of_range.push((name.clone(), message));
            } else if outcomes.contains(&ApplyOutcome::Applied) {
                debug!(input = %name, value = %entry.value, "applied input");
                report.applied.push(name.clone());
            } else {
                report.unchanged.push(name.clone());
            }
        }
        Ok(report)
    }

    /// Runs every stage through `cache`, piping results downstream.
    pub fn calculate(&mut self, cache: &Cache) -> Result<RunReport, ModelError> {
        let mut report = RunReport::default();

        report.push(DomainKind::Reservoir, cache.compute_with_cache(&mut self.reservoir)?);
        pipe(
            self.reservoir.outputs(),
            self.wellbores.inputs_mut(),
            &[RESERVOIR_PRODUCED_TEMPERATURE],
        )?;

        report.push(DomainKind::WellBores, cache.compute_with_cache(&mut self.wellbores)?);
        pipe(
            self.wellbores.outputs(),
            self.surface_plant.inputs_mut(),
            &[PRODUCED_TEMPERATURE, TOTAL_FLOW_RATE, PUMPING_POWER],
        )?;

        report.push(
            DomainKind::SurfacePlant,
            cache.compute_with_cache(&mut self.surface_plant)?,
        );
        pipe(
            self.surface_plant.outputs(),
            self.economics.inputs_mut(),
            &[ANNUAL_ELECTRICITY],
        )?;

        report.push(DomainKind::Economics, cache.compute_with_cache(&mut self.economics)?);

        info!(hits = report.hits(), stages = report.stages.len(), "simulation complete");
        Ok(report)
    }
}

/// Copies the named outputs into same-named inputs.
fn pipe(from: &OutputSet, to: &mut InputSet, names: &[&str]) -> Result<(), ModelError> {
    for name in names {
        to.pipe(name, from.value_of(name)?.clone())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(pairs: &[(&str, &str)]) -> BTreeMap<String, InputEntry> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), InputEntry::new(*v)))
            .collect()
    }

    #[test]
    fn shared_input_reaches_every_model() {
        let mut sim = Simulation::new();
        let report = sim.apply_inputs(&inputs(&[(PLANT_LIFETIME, "25")])).unwrap();
        assert_eq!(report.applied, vec![PLANT_LIFETIME.to_string()]);
        assert_eq!(sim.reservoir.inputs().int(PLANT_LIFETIME).unwrap(), 25);
        assert_eq!(sim.surface_plant.inputs().int(PLANT_LIFETIME).unwrap(), 25);
        assert_eq!(sim.economics.inputs().int(PLANT_LIFETIME).unwrap(), 25);
    }

    #[test]
    fn unknown_and_out_of_range_are_reported() {
        let mut sim = Simulation::new();
        let report = sim
            .apply_inputs(&inputs(&[("Turbine Color", "red"), (DISCOUNT_RATE, "3.5")]))
            .unwrap();
        assert_eq!(report.unknown, vec!["Turbine Color".to_string()]);
        assert_eq!(report.out_of_range.len(), 1);
        assert!(report.out_of_range[0].1.contains("discount rate"));
        assert_eq!(sim.economics.inputs().float(DISCOUNT_RATE).unwrap(), 0.07);
    }

    #[test]
    fn default_value_is_unchanged() {
        let mut sim = Simulation::new();
        let report = sim.apply_inputs(&inputs(&[(DISCOUNT_RATE, "0.07")])).unwrap();
        assert_eq!(report.unchanged, vec![DISCOUNT_RATE.to_string()]);
        assert!(!sim.economics.inputs().get(DISCOUNT_RATE).unwrap().provided);
    }

    #[test]
    fn comment_follows_applied_input() {
        let mut sim = Simulation::new();
        let mut entries = BTreeMap::new();
        entries.insert(
            PLANT_LIFETIME.to_string(),
            InputEntry::new("25").with_comment("permit term"),
        );
        sim.apply_inputs(&entries).unwrap();
        assert_eq!(sim.reservoir.inputs().get(PLANT_LIFETIME).unwrap().input_comment, "permit term");
        assert_eq!(sim.economics.inputs().get(PLANT_LIFETIME).unwrap().input_comment, "permit term");
    }

    #[test]
    fn unparsable_input_is_an_error() {
        let mut sim = Simulation::new();
        assert!(matches!(
            sim.apply_inputs(&inputs(&[(RESERVOIR_DEPTH, "deep")])),
            Err(ModelError::Param(_))
        ));
    }

    #[test]
    fn pipeline_without_cache_pipes_results() {
        let mut sim = Simulation::new();
        let report = sim.calculate(&Cache::disabled()).unwrap();
        assert_eq!(report.stages.len(), 4);
        assert!(report.stages.iter().all(|s| s.outcome == CacheOutcome::Bypassed));

        let piped = sim.economics.inputs().float_list(ANNUAL_ELECTRICITY).unwrap();
        let produced = sim
            .surface_plant
            .outputs()
            .float_list(ANNUAL_ELECTRICITY)
            .unwrap();
        assert_eq!(piped, produced);
        assert_eq!(piped.len(), 30);
        let lcoe = sim.economics.outputs().float(LCOE).unwrap();
        assert!(lcoe.is_finite() && lcoe > 0.0);
    }
}
