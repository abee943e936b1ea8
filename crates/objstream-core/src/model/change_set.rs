use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::FieldPath;

/// The set of field paths that changed in one snapshot transition
///
/// Not cumulative: a change set describes exactly one step. Ordered so that
/// iteration, logging and serialization are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet {
    paths: BTreeSet<FieldPath>,
}

impl ChangeSet {
    /// Create an empty change set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a changed path; returns false if it was already present
    pub fn insert(&mut self, path: FieldPath) -> bool {
        self.paths.insert(path)
    }

    /// Check whether a path is marked as changed
    pub fn contains(&self, path: &FieldPath) -> bool {
        self.paths.contains(path)
    }

    /// Check whether a path, given as a string, is marked as changed
    pub fn contains_str(&self, path: &str) -> bool {
        self.paths.contains(&FieldPath::from(path))
    }

    /// Iterate over changed paths in order
    pub fn iter(&self) -> impl Iterator<Item = &FieldPath> {
        self.paths.iter()
    }

    /// Get the number of changed paths
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if nothing changed
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Remove every path
    pub fn clear(&mut self) {
        self.paths.clear();
    }
}

impl FromIterator<FieldPath> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = FieldPath>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(FieldPath::from).collect()
    }
}

impl IntoIterator for ChangeSet {
    type Item = FieldPath;
    type IntoIter = std::collections::btree_set::IntoIter<FieldPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a FieldPath;
    type IntoIter = std::collections::btree_set::Iter<'a, FieldPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}
