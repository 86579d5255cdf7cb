use clap::Parser;
use color_eyre::eyre::{bail, Result};
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use dvrsim::{config, report, runner};

/// Distance-vector routing protocol simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the simulation configuration YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to a plain-text cost matrix (shortcut for a default config)
    #[arg(short, long, conflicts_with = "config")]
    topology: Option<PathBuf>,

    /// Base TCP port; node i listens on base_port + i (overrides the config)
    #[arg(long)]
    base_port: Option<u16>,

    /// JSON results output path (overrides the config)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cfg = match (&args.config, &args.topology) {
        (Some(path), None) => {
            info!("Configuration file: {:?}", path);
            config::load_config(path)?
        }
        (None, Some(path)) => {
            info!("Topology matrix file: {:?}", path);
            config::Config::for_matrix_file(path.clone())
        }
        (None, None) => bail!("either --config or --topology is required"),
        (Some(_), Some(_)) => unreachable!("clap rejects conflicting arguments"),
    };

    let base_port = args.base_port.unwrap_or(cfg.general.base_port);
    let results_path = args.output.clone().or_else(|| cfg.general.results_path.clone());

    let topology = cfg.topology()?;
    info!(
        "Loaded topology: {} nodes ({})",
        topology.node_count(),
        topology.names().join(", ")
    );

    let outcome = runner::run_simulation(&topology, base_port)?;

    report::log_summary(&outcome);
    if let Some(path) = results_path {
        report::write_results(&path, &outcome)?;
    }

    info!("Simulation completed successfully");
    Ok(())
}
