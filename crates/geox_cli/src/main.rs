//! geox CLI, the command-line front end of the geothermal simulator.
//!
//! Provides `geox run` to simulate a plant through the compute cache and
//! `geox inspect` to examine a stored cache entry by fingerprint.

#![warn(missing_docs)]

mod inspect;
mod project;
mod run;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// geox, a geothermal techno-economic simulator.
#[derive(Parser, Debug)]
#[command(name = "geox", version, about = "Geothermal techno-economic simulator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `geox.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Simulate the configured plant.
    Run(RunArgs),
    /// Show a stored cache entry.
    Inspect(InspectArgs),
}

/// Arguments for the `geox run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Input overrides as `NAME=VALUE`, applied after the config file.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub overrides: Vec<String>,

    /// Compute every stage without consulting or filling the cache.
    #[arg(long)]
    pub no_cache: bool,

    /// Output format for results.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `geox inspect` subcommand.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Hex fingerprint of the entry.
    pub fingerprint: String,

    /// Also decrypt the secure payload and check it matches.
    #[arg(long)]
    pub secure: bool,
}

/// Result output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_tracing(&global);

    let result = match cli.command {
        Command::Run(ref args) => run::run(args, &global),
        Command::Inspect(ref args) => inspect::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber; `RUST_LOG` overrides the flags.
fn init_tracing(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(global)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn default_filter(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "info"
    }
}
