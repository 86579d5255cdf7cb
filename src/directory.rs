//! The read-only node directory: name → endpoint mapping plus the fixed
//! cyclic ring order.
//!
//! Built once at startup from the topology's name ordering and a base port,
//! then shared read-only (behind an `Arc`) by every node worker. Node `i`
//! listens on `base_port + i`; the ring order is the name order, wrapping
//! from the last name back to the first.

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Lookup failures against the directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("unknown node '{0}' in directory")]
    UnknownNode(String),
}

/// Immutable endpoint directory and ring ordering over the node names.
///
/// Constructed from a non-empty, duplicate-free name list (guaranteed by
/// topology validation).
#[derive(Debug)]
pub struct NodeDirectory {
    names: Vec<String>,
    endpoints: BTreeMap<String, SocketAddr>,
}

impl NodeDirectory {
    pub fn new(names: &[String], base_port: u16) -> Self {
        let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let mut endpoints = BTreeMap::new();
        for (i, name) in names.iter().enumerate() {
            let port = base_port + i as u16;
            endpoints.insert(name.clone(), SocketAddr::new(localhost, port));
        }
        Self {
            names: names.to_vec(),
            endpoints,
        }
    }

    /// Node names in ring order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn endpoint(&self, name: &str) -> Result<SocketAddr, DirectoryError> {
        self.endpoints
            .get(name)
            .copied()
            .ok_or_else(|| DirectoryError::UnknownNode(name.to_string()))
    }

    /// The next node in the fixed cyclic order.
    pub fn successor(&self, name: &str) -> Result<&str, DirectoryError> {
        let index = self
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| DirectoryError::UnknownNode(name.to_string()))?;
        Ok(&self.names[(index + 1) % self.names.len()])
    }

    /// The ring's designated first node: the only one that increments the
    /// round counter.
    pub fn first(&self) -> &str {
        &self.names[0]
    }

    /// The ring's terminal node: runs the convergence poll after its turn.
    pub fn terminal(&self) -> &str {
        &self.names[self.names.len() - 1]
    }

    pub fn is_first(&self, name: &str) -> bool {
        self.first() == name
    }

    pub fn is_terminal(&self, name: &str) -> bool {
        self.terminal() == name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> NodeDirectory {
        let names: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        NodeDirectory::new(&names, 4000)
    }

    #[test]
    fn test_endpoints_are_sequential_localhost_ports() {
        let directory = directory();
        assert_eq!(
            directory.endpoint("A").unwrap(),
            "127.0.0.1:4000".parse().unwrap()
        );
        assert_eq!(
            directory.endpoint("C").unwrap(),
            "127.0.0.1:4002".parse().unwrap()
        );
        assert!(directory.endpoint("D").is_err());
    }

    #[test]
    fn test_ring_order_wraps_around() {
        let directory = directory();
        assert_eq!(directory.successor("A").unwrap(), "B");
        assert_eq!(directory.successor("B").unwrap(), "C");
        assert_eq!(directory.successor("C").unwrap(), "A");
        assert!(directory.successor("Z").is_err());
    }

    #[test]
    fn test_first_and_terminal() {
        let directory = directory();
        assert_eq!(directory.first(), "A");
        assert_eq!(directory.terminal(), "C");
        assert!(directory.is_first("A"));
        assert!(!directory.is_first("B"));
        assert!(directory.is_terminal("C"));
    }

    #[test]
    fn test_single_node_ring() {
        let names = vec!["A".to_string()];
        let directory = NodeDirectory::new(&names, 4100);
        assert_eq!(directory.successor("A").unwrap(), "A");
        assert!(directory.is_first("A") && directory.is_terminal("A"));
    }
}
