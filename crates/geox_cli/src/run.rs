//! `geox run`: simulate the configured plant.
//!
//! 1. Load `geox.toml` (or defaults)
//! 2. Open the compute cache it describes, unless `--no-cache`
//! 3. Apply configured inputs and `--set` overrides
//! 4. Run every stage through the cache
//! 5. Print stage outcomes and headline results

use geox_cache::{open_cache, Cache, Computable};
use geox_models::names::{
    ANNUAL_ELECTRICITY, BOTTOM_HOLE_TEMPERATURE, LCOE, PAYBACK_PERIOD, PROJECT_IRR, PROJECT_NPV,
};
use geox_models::{InputReport, RunReport, Simulation, StageReport};
use geox_params::ParamError;

use crate::project::{collect_inputs, load_project};
use crate::{GlobalArgs, ReportFormat, RunArgs};

/// Runs the `geox run` command.
///
/// Returns exit code 0 on success and 2 if any input was rejected.
pub fn run(args: &RunArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let inputs = collect_inputs(&project.config, &args.overrides)?;

    let cache = if args.no_cache {
        Cache::disabled()
    } else {
        open_cache(&project.config.cache, &project.base)
    };

    let mut sim = Simulation::new();
    let applied = sim.apply_inputs(&inputs)?;
    let report = sim.calculate(&cache)?;

    match args.format {
        ReportFormat::Text => {
            if !global.quiet {
                print_text(&sim, &applied, &report);
            }
        }
        ReportFormat::Json => {
            let json = to_json(&sim, &applied, &report);
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(if applied.out_of_range.is_empty() { 0 } else { 2 })
}

fn print_text(sim: &Simulation, applied: &InputReport, report: &RunReport) {
    for name in &applied.unknown {
        eprintln!("warning: ignored unknown input '{name}'");
    }
    for (name, message) in &applied.out_of_range {
        eprintln!("warning: '{name}' out of range: {message}");
    }

    for stage in &report.stages {
        println!("{}", stage_line(stage));
    }
    println!();

    let reservoir = sim.reservoir.outputs();
    let economics = sim.economics.outputs();
    let value = |r: Result<f64, ParamError>| {
        r.map(|x| format!("{x:.3}"))
            .unwrap_or_else(|_| "-".to_string())
    };
    println!("Bottom-hole temperature  {} degC", value(reservoir.float(BOTTOM_HOLE_TEMPERATURE)));
    if let Ok(annual) = sim.surface_plant.outputs().float_list(ANNUAL_ELECTRICITY) {
        if let Some(first) = annual.first() {
            println!("First-year electricity   {first:.0} kWh");
        }
    }
    println!("LCOE                     {} cents/kWh", value(economics.float(LCOE)));
    println!("Project NPV              {} MUSD", value(economics.float(PROJECT_NPV)));
    println!("Project IRR              {}", value(economics.float(PROJECT_IRR)));
    println!("Payback period           {} yr", value(economics.float(PAYBACK_PERIOD)));
}

/// One summary line per stage; the fingerprint is printed in full so it can
/// be handed to `geox inspect`.
fn stage_line(stage: &StageReport) -> String {
    match stage.outcome.fingerprint() {
        Some(fp) => format!(
            "{:>14}  {:<20} {fp}",
            stage.kind.as_str(),
            stage.outcome.to_string()
        ),
        None => format!("{:>14}  {}", stage.kind.as_str(), stage.outcome),
    }
}

fn to_json(sim: &Simulation, applied: &InputReport, report: &RunReport) -> serde_json::Value {
    let stages: Vec<serde_json::Value> = report
        .stages
        .iter()
        .map(|s| {
            serde_json::json!({
                "kind": s.kind,
                "outcome": s.outcome.to_string(),
                "fingerprint": s.outcome.fingerprint(),
            })
        })
        .collect();
    serde_json::json!({
        "stages": stages,
        "unknown_inputs": applied.unknown,
        "rejected_inputs": applied.out_of_range.iter().map(|(name, _)| name).collect::<Vec<_>>(),
        "outputs": {
            "Reservoir": sim.reservoir.outputs(),
            "WellBores": sim.wellbores.outputs(),
            "SurfacePlant": sim.surface_plant.outputs(),
            "Economics": sim.economics.outputs(),
        },
    })
}
