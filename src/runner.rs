//! Simulation runner.
//!
//! Coordinates one full run: binds every node's endpoint, spawns one worker
//! thread per node, injects the initial Turn token at the ring's first node,
//! and joins the workers into a single outcome.

use std::collections::BTreeMap;
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

use color_eyre::eyre::{bail, eyre, WrapErr};
use color_eyre::Result;

use crate::agent::NodeAgent;
use crate::directory::NodeDirectory;
use crate::protocol::transport;
use crate::protocol::Message;
use crate::topology::Topology;

/// The result of a completed simulation run.
#[derive(Debug)]
pub struct SimulationOutcome {
    /// Each node's final distance row, keyed by node name.
    pub final_distances: BTreeMap<String, Vec<f64>>,
    /// The last round in which any node's table changed.
    pub convergence_round: i64,
}

/// Run the simulation to convergence and collect every node's final state.
///
/// All endpoints are bound before any worker starts, so an endpoint already
/// in use fails the run before the first token moves.
pub fn run_simulation(topology: &Topology, base_port: u16) -> Result<SimulationOutcome> {
    let node_count = topology.node_count();
    let highest_port = base_port as u32 + node_count as u32 - 1;
    if highest_port > u16::MAX as u32 {
        bail!(
            "base port {} leaves no room for {} nodes",
            base_port,
            node_count
        );
    }

    let directory = Arc::new(NodeDirectory::new(topology.names(), base_port));
    log::info!(
        "Starting simulation: {} nodes, ring order {:?}, ports {}-{}",
        node_count,
        topology.names(),
        base_port,
        highest_port
    );

    let mut listeners = Vec::with_capacity(node_count);
    for name in directory.names() {
        let addr = directory.endpoint(name)?;
        let listener = TcpListener::bind(addr)
            .wrap_err_with(|| format!("failed to bind endpoint {} for node {}", addr, name))?;
        listeners.push(listener);
    }

    let mut handles = Vec::with_capacity(node_count);
    for (index, listener) in listeners.into_iter().enumerate() {
        let agent = NodeAgent::new(index, topology, Arc::clone(&directory), listener);
        let name = topology.name(index).to_string();
        let handle = thread::Builder::new()
            .name(format!("node-{}", name))
            .spawn(move || agent.run())
            .wrap_err_with(|| format!("failed to spawn worker for node {}", name))?;
        handles.push(handle);
    }

    // Round 0 token; the first node bumps it to 1 when its turn starts.
    let first = directory.endpoint(directory.first())?;
    transport::send(first, &Message::Turn { round: 0 })
        .wrap_err("failed to inject the initial Turn token")?;

    let mut final_distances = BTreeMap::new();
    let mut convergence_round = None;
    for handle in handles {
        let outcome = handle
            .join()
            .map_err(|_| eyre!("a node worker panicked"))??;
        if let Some(round) = outcome.convergence_round {
            convergence_round = Some(round);
        }
        final_distances.insert(outcome.name, outcome.distances);
    }

    let convergence_round =
        convergence_round.ok_or_else(|| eyre!("terminal node reported no convergence round"))?;

    Ok(SimulationOutcome {
        final_distances,
        convergence_round,
    })
}
