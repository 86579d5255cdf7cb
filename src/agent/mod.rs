//! Per-node protocol engine: the node agent worker and the terminal node's
//! convergence detector.

pub mod convergence;
pub mod node;

pub use node::{NodeAgent, NodeOutcome};
