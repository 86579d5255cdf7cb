//! # DvrSim - Distance-vector routing protocol simulator
//!
//! This library simulates a distance-vector routing protocol (Bellman-Ford)
//! over a small, fixed set of network nodes. Each node runs as an
//! independent worker exchanging routing information with its neighbors over
//! localhost TCP until every routing table converges.
//!
//! ## Overview
//!
//! A ring token serializes the protocol: exactly one node broadcasts its
//! distance row per turn, neighbors relax their own rows and acknowledge,
//! and the token moves on. After each full cycle the ring's terminal node
//! polls every node for "changed since last round"; when nobody changed, a
//! termination token makes one final pass and each node reports its final
//! distance vector.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `config`: Type-safe configuration structures and YAML parsing
//! - `topology`: Cost-matrix parsing and neighbor extraction
//! - `directory`: Read-only node directory (endpoints and ring order)
//! - `table`: Distance-vector tables and Bellman-Ford relaxation
//! - `protocol`: The closed message set, text wire codec, and TCP transport
//! - `agent`: The per-node protocol engine and convergence detector
//! - `runner`: Thread-per-node orchestration of one simulation run
//! - `report`: Console summary and JSON results export
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use dvrsim::{config, report, runner};
//!
//! // Load configuration from YAML file
//! let cfg = config::load_config(std::path::Path::new("simulation.yaml"))?;
//!
//! // Run the simulation to convergence
//! let topology = cfg.topology()?;
//! let outcome = runner::run_simulation(&topology, cfg.general.base_port)?;
//!
//! report::log_summary(&outcome);
//! # Ok::<(), color_eyre::Report>(())
//! ```
//!
//! ## Configuration Format
//!
//! Configurations use YAML, with the cost matrix either inline or in a
//! plain-text file (one whitespace-separated row per line, 0 = no link):
//!
//! ```yaml
//! general:
//!   base_port: 3001       # node i listens on base_port + i
//!   results_path: out.json
//!
//! network:
//!   matrix:
//!     - [0, 1, 5]
//!     - [1, 0, 1]
//!     - [5, 1, 0]
//!   names: [A, B, C]      # optional; defaults to A, B, C, ...
//! ```
//!
//! ## Error Handling
//!
//! The library uses `color_eyre` for error reporting with context at the
//! run-level boundaries, and `thiserror` enums for domain errors (topology,
//! configuration, and wire-protocol validation).

pub mod agent;
pub mod config;
pub mod directory;
pub mod protocol;
pub mod report;
pub mod runner;
pub mod table;
pub mod topology;
