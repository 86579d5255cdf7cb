//! Run reporting: console summary and the optional JSON results file.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use serde::Serialize;

use crate::runner::SimulationOutcome;
use crate::table::format_distances;

/// JSON-serializable record of one completed run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub convergence_round: i64,
    pub nodes: Vec<NodeReport>,
}

/// One node's final distance row. Unreachable destinations serialize as
/// `null` (JSON has no infinity).
#[derive(Debug, Serialize)]
pub struct NodeReport {
    pub name: String,
    pub distances: Vec<Option<f64>>,
}

impl RunReport {
    pub fn from_outcome(outcome: &SimulationOutcome) -> Self {
        let nodes = outcome
            .final_distances
            .iter()
            .map(|(name, distances)| NodeReport {
                name: name.clone(),
                distances: distances
                    .iter()
                    .map(|&d| if d.is_infinite() { None } else { Some(d) })
                    .collect(),
            })
            .collect();
        Self {
            generated_at: Utc::now(),
            convergence_round: outcome.convergence_round,
            nodes,
        }
    }
}

/// Log the final routing tables and the convergence round.
pub fn log_summary(outcome: &SimulationOutcome) {
    for (name, distances) in &outcome.final_distances {
        log::info!("Node {} final DV = {}", name, format_distances(distances));
    }
    log::info!(
        "Network converged; last change was in round {}",
        outcome.convergence_round
    );
}

/// Write the JSON results file.
pub fn write_results(path: &Path, outcome: &SimulationOutcome) -> Result<()> {
    let report = RunReport::from_outcome(outcome);
    let json = serde_json::to_string_pretty(&report).wrap_err("failed to serialize run report")?;
    fs::write(path, json)
        .wrap_err_with(|| format!("failed to write results file '{}'", path.display()))?;
    log::info!("Wrote results to {}", path.display());
    Ok(())
}
