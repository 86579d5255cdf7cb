//! Topology loading: parse a static cost matrix into named nodes and
//! per-node neighbor/cost mappings.
//!
//! The input is an N×N matrix of nonnegative real link costs, one
//! whitespace-separated row per line. A zero entry (including the whole
//! diagonal) means "no direct link"; a nonzero entry (i, j) makes node j a
//! neighbor of node i with that cost.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Errors produced while loading or validating a topology.
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("failed to read topology file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("line {line}: invalid cost value '{value}'")]
    InvalidEntry { line: usize, value: String },
    #[error("topology matrix is empty")]
    Empty,
    #[error("matrix is not square: expected {expected} entries in row {row}, got {actual}")]
    NotSquare {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("link cost at row {row}, column {col} must be a nonnegative finite number, got {cost}")]
    BadCost { row: usize, col: usize, cost: f64 },
    #[error("diagonal entry for node {row} must be 0 (a node has no link to itself)")]
    NonzeroDiagonal { row: usize },
    #[error("expected {expected} node names, got {actual}")]
    NameCount { expected: usize, actual: usize },
    #[error("duplicate node name '{0}'")]
    DuplicateName(String),
    #[error("{count} nodes need explicit names (default names cover A through Z)")]
    TooManyNodes { count: usize },
}

/// A validated topology: the fixed node-name ordering plus the cost matrix.
#[derive(Debug, Clone)]
pub struct Topology {
    names: Vec<String>,
    costs: Vec<Vec<f64>>,
}

impl Topology {
    /// Validate and wrap a name list and cost matrix.
    pub fn new(names: Vec<String>, costs: Vec<Vec<f64>>) -> Result<Self, TopologyError> {
        if costs.is_empty() {
            return Err(TopologyError::Empty);
        }
        let expected = costs.len();
        for (i, row) in costs.iter().enumerate() {
            if row.len() != expected {
                return Err(TopologyError::NotSquare {
                    row: i + 1,
                    expected,
                    actual: row.len(),
                });
            }
            for (j, &cost) in row.iter().enumerate() {
                if !cost.is_finite() || cost < 0.0 {
                    return Err(TopologyError::BadCost {
                        row: i + 1,
                        col: j + 1,
                        cost,
                    });
                }
                if i == j && cost != 0.0 {
                    return Err(TopologyError::NonzeroDiagonal { row: i + 1 });
                }
            }
        }
        if names.len() != expected {
            return Err(TopologyError::NameCount {
                expected,
                actual: names.len(),
            });
        }
        let mut seen = std::collections::BTreeSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(TopologyError::DuplicateName(name.clone()));
            }
        }
        Ok(Self { names, costs })
    }

    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, index: usize) -> &str {
        &self.names[index]
    }

    /// Direct link cost from node `i` to node `j` (0 = no link).
    pub fn cost(&self, i: usize, j: usize) -> f64 {
        self.costs[i][j]
    }

    /// The neighbor-name → link-cost mapping for node `index`.
    pub fn neighbors(&self, index: usize) -> BTreeMap<String, f64> {
        let mut neighbors = BTreeMap::new();
        for (j, &cost) in self.costs[index].iter().enumerate() {
            if cost != 0.0 {
                neighbors.insert(self.names[j].clone(), cost);
            }
        }
        neighbors
    }
}

/// Parse matrix rows from text. Blank lines are skipped; squareness is
/// checked later by [`Topology::new`].
pub fn parse_matrix(content: &str) -> Result<Vec<Vec<f64>>, TopologyError> {
    let mut rows = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut row = Vec::new();
        for token in line.split_whitespace() {
            let cost = token
                .parse::<f64>()
                .map_err(|_| TopologyError::InvalidEntry {
                    line: number + 1,
                    value: token.to_string(),
                })?;
            row.push(cost);
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Default node names in ring order: A, B, C, ...
pub fn default_names(count: usize) -> Result<Vec<String>, TopologyError> {
    if count > 26 {
        return Err(TopologyError::TooManyNodes { count });
    }
    Ok((0..count)
        .map(|i| char::from(b'A' + i as u8).to_string())
        .collect())
}

/// Load and validate a topology from a matrix file.
pub fn load_topology(path: &Path, names: Option<Vec<String>>) -> Result<Topology, TopologyError> {
    let content = fs::read_to_string(path).map_err(|source| TopologyError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let costs = parse_matrix(&content)?;
    let names = match names {
        Some(names) => names,
        None => default_names(costs.len())?,
    };
    Topology::new(names, costs)
}
