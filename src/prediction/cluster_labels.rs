use std::collections::BTreeMap;

use serde::Serialize;

pub const UNKNOWN_LABEL: &str = "Unknown";

/// Human-readable names for the cluster ids the shipped k-means model produces.
#[derive(Debug, Clone)]
pub struct ClusterLabelTable {
    labels: BTreeMap<usize, &'static str>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClusterLabel {
    pub id: usize,
    pub label: &'static str,
}

impl Default for ClusterLabelTable {
    fn default() -> Self {
        ClusterLabelTable::new([
            (0, "Risk-Averse Trader"),
            (1, "High-Frequency Trader"),
            (2, "Momentum Trader"),
            (3, "Balanced Trader"),
        ])
    }
}

impl ClusterLabelTable {
    pub fn new(entries: impl IntoIterator<Item = (usize, &'static str)>) -> Self {
        ClusterLabelTable {
            labels: entries.into_iter().collect(),
        }
    }

    /// Label for `cluster_id`, or "Unknown" when the table has no entry for it.
    pub fn label_for(&self, cluster_id: usize) -> &'static str {
        self.labels.get(&cluster_id).copied().unwrap_or(UNKNOWN_LABEL)
    }

    /// Entries in ascending id order.
    pub fn entries(&self) -> Vec<ClusterLabel> {
        self.labels
            .iter()
            .map(|(&id, &label)| ClusterLabel { id, label })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = ClusterLabelTable::default();
        assert_eq!(table.label_for(0), "Risk-Averse Trader");
        assert_eq!(table.label_for(1), "High-Frequency Trader");
        assert_eq!(table.label_for(2), "Momentum Trader");
        assert_eq!(table.label_for(3), "Balanced Trader");
        assert_eq!(table.entries().len(), 4);
    }

    #[test]
    fn test_unknown_id() {
        let table = ClusterLabelTable::default();
        assert_eq!(table.label_for(4), "Unknown");
        assert_eq!(table.label_for(usize::MAX), "Unknown");
    }

    #[test]
    fn test_entries_are_sorted() {
        let table = ClusterLabelTable::new([(2, "b"), (0, "a")]);
        let ids: Vec<usize> = table.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 2]);
    }
}
