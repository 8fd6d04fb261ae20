//! Ordered named feature collection

use serde::{Deserialize, Serialize};

/// Ordered mapping from feature name to value.
///
/// Insertion order is the column order used by [`crate::FeatureVectorBuilder`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    entries: Vec<(String, f64)>,
}

impl FeatureSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set with room for `capacity` features
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Append a feature
    pub fn push(&mut self, name: impl Into<String>, value: f64) {
        self.entries.push((name.into(), value));
    }

    /// Append every feature of `other`, prefixing names with `{prefix}_`
    pub fn extend_prefixed(&mut self, prefix: &str, other: FeatureSet) {
        self.entries.reserve(other.len());
        for (name, value) in other.entries {
            self.entries.push((format!("{prefix}_{name}"), value));
        }
    }

    /// Look up a value by name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Feature names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Feature values in order
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    /// Iterate over (name, value) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let mut set = FeatureSet::new();
        set.push("b", 2.0);
        set.push("a", 1.0);
        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(set.values(), vec![2.0, 1.0]);
    }

    #[test]
    fn test_prefixed_merge() {
        let mut axis = FeatureSet::new();
        axis.push("mean", 0.5);

        let mut set = FeatureSet::new();
        set.extend_prefixed("x", axis);
        assert_eq!(set.get("x_mean"), Some(0.5));
        assert_eq!(set.get("mean"), None);
    }
}
