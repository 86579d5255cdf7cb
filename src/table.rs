//! Distance-vector table maintenance and Bellman-Ford relaxation.
//!
//! Each node agent owns exactly one `DistanceTable`. The table maps a node
//! name (the owner itself plus each direct neighbor) to a distance row
//! indexed by the global node ordering. Unknown distances are the
//! `f64::INFINITY` sentinel.

use std::collections::BTreeMap;

/// One node's view of the network: its own distance row plus the most
/// recently received row from each neighbor.
///
/// Invariants:
/// - every row's length equals the total node count;
/// - the owner's row always holds `0.0` at the owner's own index;
/// - rows for neighbors start at all-infinity until a DV update arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceTable {
    owner: String,
    node_count: usize,
    rows: BTreeMap<String, Vec<f64>>,
}

impl DistanceTable {
    /// Build the initial table from static neighbor/cost data.
    ///
    /// The owner's row gets 0 at its own index, the direct link cost at each
    /// neighbor's index, and infinity everywhere else. Each neighbor gets an
    /// all-infinity row until its first broadcast arrives.
    pub fn new(owner: &str, names: &[String], neighbors: &BTreeMap<String, f64>) -> Self {
        let mut rows = BTreeMap::new();

        let mut own_row = Vec::with_capacity(names.len());
        for name in names {
            if name == owner {
                own_row.push(0.0);
            } else if let Some(cost) = neighbors.get(name) {
                own_row.push(*cost);
            } else {
                own_row.push(f64::INFINITY);
            }
        }
        rows.insert(owner.to_string(), own_row);

        for neighbor in neighbors.keys() {
            rows.insert(neighbor.clone(), vec![f64::INFINITY; names.len()]);
        }

        Self {
            owner: owner.to_string(),
            node_count: names.len(),
            rows,
        }
    }

    /// Store `distances` as the row for `name`, replacing any previous row.
    pub fn set_row(&mut self, name: &str, distances: Vec<f64>) {
        self.rows.insert(name.to_string(), distances);
    }

    /// The row currently stored for `name`, if any.
    pub fn row(&self, name: &str) -> Option<&[f64]> {
        self.rows.get(name).map(Vec::as_slice)
    }

    /// The owner's own distance row. Always present.
    pub fn own_row(&self) -> &[f64] {
        &self.rows[self.owner.as_str()]
    }

    /// Recompute the owner's row by Bellman-Ford relaxation:
    /// `self[i] = min(self[i], min over neighbors n of cost(n) + row[n][i])`.
    ///
    /// Ties keep the existing value, so re-applying an identical update never
    /// changes the row.
    pub fn relax(&mut self, neighbors: &BTreeMap<String, f64>) {
        let mut own_row = self.rows[self.owner.as_str()].clone();

        for (i, distance) in own_row.iter_mut().enumerate() {
            for (neighbor, cost) in neighbors {
                if let Some(row) = self.rows.get(neighbor.as_str()) {
                    if let Some(via) = row.get(i) {
                        *distance = (*distance).min(cost + via);
                    }
                }
            }
        }

        self.rows.insert(self.owner.clone(), own_row);
    }

    /// Change-detection comparison between a table and a snapshot.
    ///
    /// Two absent tables count as unchanged; an absent table is unequal to
    /// any populated one. Populated tables are unchanged only with identical
    /// key sets, identical row lengths per key, and identical elements.
    pub fn unchanged(current: Option<&DistanceTable>, snapshot: Option<&DistanceTable>) -> bool {
        match (current, snapshot) {
            (None, None) => true,
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Render the full table for the per-round trace, e.g.
    /// `{A: [0, 1, 5], B: [inf, inf, inf]}`.
    pub fn describe(&self) -> String {
        let rows: Vec<String> = self
            .rows
            .iter()
            .map(|(name, row)| format!("{}: {}", name, format_distances(row)))
            .collect();
        format!("{{{}}}", rows.join(", "))
    }
}

/// Format a distance row for human-readable output, using `inf` for the
/// unreachable sentinel: `[0, 1, inf]`.
pub fn format_distances(distances: &[f64]) -> String {
    let parts: Vec<String> = distances
        .iter()
        .map(|d| {
            if d.is_infinite() {
                "inf".to_string()
            } else {
                format!("{}", d)
            }
        })
        .collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["A".to_string(), "B".to_string(), "C".to_string()]
    }

    fn neighbors_of_a() -> BTreeMap<String, f64> {
        let mut neighbors = BTreeMap::new();
        neighbors.insert("B".to_string(), 1.0);
        neighbors.insert("C".to_string(), 5.0);
        neighbors
    }

    #[test]
    fn test_initial_table_shape() {
        let table = DistanceTable::new("A", &names(), &neighbors_of_a());

        assert_eq!(table.own_row(), &[0.0, 1.0, 5.0]);
        assert_eq!(table.row("B"), Some(&[f64::INFINITY; 3][..]));
        assert_eq!(table.row("C"), Some(&[f64::INFINITY; 3][..]));
        assert_eq!(table.row("D"), None);
    }

    #[test]
    fn test_relaxation_finds_shorter_route() {
        let neighbors = neighbors_of_a();
        let mut table = DistanceTable::new("A", &names(), &neighbors);

        // B reports it can reach C at cost 1, so A should route to C via B
        // (1 + 1 = 2) instead of the direct 5-cost link.
        table.set_row("B", vec![1.0, 0.0, 1.0]);
        table.relax(&neighbors);

        assert_eq!(table.own_row(), &[0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_relaxation_is_idempotent() {
        let neighbors = neighbors_of_a();
        let mut table = DistanceTable::new("A", &names(), &neighbors);

        table.set_row("B", vec![1.0, 0.0, 1.0]);
        table.relax(&neighbors);
        let after_first = table.clone();

        // Re-applying the identical update must not change anything.
        table.set_row("B", vec![1.0, 0.0, 1.0]);
        table.relax(&neighbors);

        assert_eq!(table, after_first);
    }

    #[test]
    fn test_relaxation_keeps_existing_value_on_tie() {
        let neighbors = neighbors_of_a();
        let mut table = DistanceTable::new("A", &names(), &neighbors);

        // Route via B to C costs exactly the direct link: 1 + 4 = 5.
        table.set_row("B", vec![1.0, 0.0, 4.0]);
        table.relax(&neighbors);

        assert_eq!(table.own_row(), &[0.0, 1.0, 5.0]);
    }

    #[test]
    fn test_unreachable_stays_at_infinity() {
        let neighbors = BTreeMap::new();
        let mut table = DistanceTable::new("C", &names(), &neighbors);

        table.relax(&neighbors);

        assert_eq!(table.own_row(), &[f64::INFINITY, f64::INFINITY, 0.0]);
    }

    #[test]
    fn test_unchanged_is_reflexive() {
        let table = DistanceTable::new("A", &names(), &neighbors_of_a());
        let copy = table.clone();

        assert!(DistanceTable::unchanged(Some(&table), Some(&copy)));
    }

    #[test]
    fn test_absent_table_is_unequal_to_populated() {
        let table = DistanceTable::new("A", &names(), &neighbors_of_a());

        assert!(!DistanceTable::unchanged(Some(&table), None));
        assert!(!DistanceTable::unchanged(None, Some(&table)));
        assert!(DistanceTable::unchanged(None, None));
    }

    #[test]
    fn test_changed_neighbor_row_counts_as_changed() {
        let neighbors = neighbors_of_a();
        let mut table = DistanceTable::new("A", &names(), &neighbors);
        let snapshot = table.clone();

        // The update leaves A's own row untouched but replaces B's row, which
        // still counts as a table change.
        table.set_row("B", vec![9.0, 0.0, 9.0]);
        table.relax(&neighbors);

        assert_eq!(table.own_row(), snapshot.own_row());
        assert!(!DistanceTable::unchanged(Some(&table), Some(&snapshot)));
    }

    #[test]
    fn test_describe_renders_infinity() {
        let table = DistanceTable::new("A", &names(), &neighbors_of_a());

        assert_eq!(
            table.describe(),
            "{A: [0, 1, 5], B: [inf, inf, inf], C: [inf, inf, inf]}"
        );
    }

    #[test]
    fn test_format_distances() {
        assert_eq!(format_distances(&[0.0, 1.5, f64::INFINITY]), "[0, 1.5, inf]");
        assert_eq!(format_distances(&[]), "[]");
    }
}
