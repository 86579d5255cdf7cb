//! The node agent: owns one node's distance-vector table and reacts to
//! protocol messages in a single accept-and-handle loop.
//!
//! Cross-node concurrency is serialized by the ring token, so no locks are
//! needed on any of this state: the table, snapshot, and last-changed round
//! are mutated only by the owning worker thread.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;

use color_eyre::Result;

use crate::agent::convergence;
use crate::directory::NodeDirectory;
use crate::protocol::transport;
use crate::protocol::Message;
use crate::table::{format_distances, DistanceTable};
use crate::topology::Topology;

/// What a node worker hands back to the runner after the End token.
#[derive(Debug)]
pub struct NodeOutcome {
    pub name: String,
    /// The node's final distance row.
    pub distances: Vec<f64>,
    /// Set only by the terminal node: the round in which the network last
    /// changed.
    pub convergence_round: Option<i64>,
}

/// One node's worker state.
pub struct NodeAgent {
    name: String,
    neighbors: BTreeMap<String, f64>,
    directory: Arc<NodeDirectory>,
    listener: TcpListener,
    table: DistanceTable,
    /// Copy of the table taken at the end of this node's most recent
    /// broadcast phase; the baseline for change detection.
    last_snapshot: Option<DistanceTable>,
    /// Round in which this node's table last changed; -1 before any change.
    last_changed_round: i64,
    /// Terminal node only: the convergence round it computed.
    convergence_round: Option<i64>,
}

impl NodeAgent {
    pub fn new(
        index: usize,
        topology: &Topology,
        directory: Arc<NodeDirectory>,
        listener: TcpListener,
    ) -> Self {
        let name = topology.name(index).to_string();
        let neighbors = topology.neighbors(index);
        let table = DistanceTable::new(&name, topology.names(), &neighbors);
        Self {
            name,
            neighbors,
            directory,
            listener,
            table,
            last_snapshot: None,
            last_changed_round: -1,
            convergence_round: None,
        }
    }

    fn is_first(&self) -> bool {
        self.directory.is_first(&self.name)
    }

    fn is_terminal(&self) -> bool {
        self.directory.is_terminal(&self.name)
    }

    /// The accept-and-handle loop. Each connection carries exactly one
    /// message and is processed to completion before the next accept.
    /// Returns after the End token has been handled.
    pub fn run(mut self) -> Result<NodeOutcome> {
        loop {
            let (stream, _peer) = match self.listener.accept() {
                Ok(accepted) => accepted,
                Err(err) => {
                    log::warn!("node {}: accept failed: {}", self.name, err);
                    continue;
                }
            };
            match self.serve(stream) {
                Ok(true) => break,
                Ok(false) => {}
                Err(err) => {
                    // Abandon the exchange, keep accepting; no retry.
                    log::warn!("node {}: dropped exchange: {:#}", self.name, err);
                }
            }
        }

        let distances = self.table.own_row().to_vec();
        Ok(NodeOutcome {
            name: self.name,
            distances,
            convergence_round: self.convergence_round,
        })
    }

    /// Handle one connection. Returns `Ok(true)` when the agent should stop.
    fn serve(&mut self, stream: TcpStream) -> Result<bool> {
        let mut line = String::new();
        if let Err(err) = BufReader::new(&stream).read_line(&mut line) {
            log::warn!("node {}: connection problem while reading: {}", self.name, err);
            return Ok(false);
        }

        let message = match Message::decode(&line) {
            Ok(message) => message,
            Err(err) => {
                // Malformed traffic is discarded and the connection dropped.
                log::debug!("node {}: discarding message: {}", self.name, err);
                return Ok(false);
            }
        };

        match message {
            Message::Turn { round } => {
                self.handle_turn(round)?;
                Ok(false)
            }
            Message::DvUpdate {
                sender,
                round,
                distances,
            } => {
                self.handle_dv_update(&stream, &sender, round, distances)?;
                Ok(false)
            }
            Message::ChangedQuery { round } => {
                self.handle_changed_query(&stream, round)?;
                Ok(false)
            }
            Message::End => self.handle_end(),
            other => {
                log::debug!(
                    "node {}: unexpected {:?} outside an exchange",
                    self.name,
                    other
                );
                Ok(false)
            }
        }
    }

    /// The Turn token arrived: broadcast this node's row to every neighbor,
    /// snapshot the table, then either run the convergence poll (terminal
    /// node) or forward the token.
    fn handle_turn(&mut self, mut round: u64) -> Result<()> {
        // The round counter advances exactly once per full ring cycle, and
        // only at the designated first node.
        if self.is_first() {
            round += 1;
        }

        log::info!("------");
        log::info!("Round {}: {}", round, self.name);
        log::info!("Current DV table = {}", self.table.describe());
        match &self.last_snapshot {
            Some(snapshot) => log::info!("Last DV table = {}", snapshot.describe()),
            None => log::info!("Last DV table = None"),
        }
        let status = if DistanceTable::unchanged(Some(&self.table), self.last_snapshot.as_ref()) {
            "Same"
        } else {
            "Updated"
        };
        log::info!("Updated from last DV table or the same? {}", status);

        for neighbor in self.neighbors.keys() {
            log::info!("Sending DV to node {}", neighbor);
            let update = Message::DvUpdate {
                sender: self.name.clone(),
                round,
                distances: self.table.own_row().to_vec(),
            };
            match transport::exchange(self.directory.endpoint(neighbor)?, &update) {
                Ok(Message::Ack) => {}
                Ok(other) => log::warn!(
                    "node {}: expected ack from {}, got {:?}",
                    self.name,
                    neighbor,
                    other
                ),
                Err(err) => log::warn!(
                    "node {}: broadcast to {} failed: {:#}",
                    self.name,
                    neighbor,
                    err
                ),
            }
        }

        self.last_snapshot = Some(self.table.clone());

        if self.is_terminal() {
            let outcome = convergence::poll_network(
                &self.directory,
                &self.name,
                round,
                self.last_changed_round,
            )?;
            if let Some(round_of_convergence) = outcome {
                self.convergence_round = Some(round_of_convergence);
                log::info!("-------");
                log::info!("Final Output:");
                let successor = self.directory.successor(&self.name)?;
                transport::send(self.directory.endpoint(successor)?, &Message::End)?;
                return Ok(());
            }
        }

        let successor = self.directory.successor(&self.name)?;
        transport::send(self.directory.endpoint(successor)?, &Message::Turn { round })?;
        Ok(())
    }

    /// A neighbor broadcast its row: store it, relax our own row, record the
    /// change round if the table moved, and acknowledge.
    fn handle_dv_update(
        &mut self,
        stream: &TcpStream,
        sender: &str,
        round: u64,
        distances: Vec<f64>,
    ) -> Result<()> {
        log::info!("Node {} received DV from {}", self.name, sender);
        self.apply_dv_update(sender, round, distances);
        transport::reply(stream, &Message::Ack)
    }

    /// The state transition behind a DV update, separated from the socket
    /// handling.
    fn apply_dv_update(&mut self, sender: &str, round: u64, distances: Vec<f64>) {
        log::info!("Updating DV table at node {}", self.name);

        self.table.set_row(sender, distances);
        self.table.relax(&self.neighbors);

        log::info!("New DV table at node {} = {}", self.name, self.table.describe());

        // Change detection spans the whole table, not just our own row.
        if !DistanceTable::unchanged(Some(&self.table), self.last_snapshot.as_ref()) {
            self.last_changed_round = round as i64;
        }
    }

    fn handle_changed_query(&mut self, stream: &TcpStream, round: u64) -> Result<()> {
        let changed = self.last_changed_round == round as i64;
        transport::reply(
            stream,
            &Message::ChangedReply {
                changed,
                last_changed_round: self.last_changed_round,
            },
        )
    }

    /// The End token arrived: print the final row, forward the token unless
    /// we are the terminal node, and stop this agent's loop.
    fn handle_end(&mut self) -> Result<bool> {
        log::info!(
            "Node {} DV = {}",
            self.name,
            format_distances(self.table.own_row())
        );

        if self.is_terminal() {
            if let Some(round) = self.convergence_round {
                log::info!(
                    "Number of rounds until convergence (round when a node last updated its DV) = {}",
                    round
                );
            }
            log::info!("------");
        } else {
            let successor = self.directory.successor(&self.name)?;
            transport::send(self.directory.endpoint(successor)?, &Message::End)?;
        }

        Ok(true)
    }
}
