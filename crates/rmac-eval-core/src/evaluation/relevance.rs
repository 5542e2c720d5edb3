//! Ground-truth relevance sets.

use super::similarity::SimilarityMatrix;
use crate::error::EvaluationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Dataset indices that count as correct matches for one query.
///
/// A set may also name *ignored* items (the "junk" images of the Oxford
/// protocol). Ignored items are removed from the ranking before scoring: they
/// neither count as hits nor take up a rank. An index cannot be both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceSet {
    relevant: BTreeSet<usize>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    ignored: BTreeSet<usize>,
}

impl RelevanceSet {
    /// Creates a set from relevant indices; duplicates collapse.
    pub fn new<I>(relevant: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        Self {
            relevant: relevant.into_iter().collect(),
            ignored: BTreeSet::new(),
        }
    }

    /// Returns a copy that also ignores the given indices.
    ///
    /// Indices that are already relevant stay relevant.
    pub fn with_ignored<I>(mut self, ignored: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        self.ignored = ignored
            .into_iter()
            .filter(|i| !self.relevant.contains(i))
            .collect();
        self
    }

    pub fn relevant(&self) -> &BTreeSet<usize> {
        &self.relevant
    }

    pub fn ignored(&self) -> &BTreeSet<usize> {
        &self.ignored
    }

    /// Number of relevant items.
    pub fn len(&self) -> usize {
        self.relevant.len()
    }

    /// True if no item is relevant, which leaves precision and AP undefined.
    pub fn is_empty(&self) -> bool {
        self.relevant.is_empty()
    }

    pub fn is_relevant(&self, index: usize) -> bool {
        self.relevant.contains(&index)
    }

    pub fn is_ignored(&self, index: usize) -> bool {
        self.ignored.contains(&index)
    }

    fn max_index(&self) -> Option<usize> {
        let relevant = self.relevant.last().copied();
        let ignored = self.ignored.last().copied();
        relevant.max(ignored)
    }
}

impl FromIterator<usize> for RelevanceSet {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Checks that there is one set per query and every index names a column.
pub(crate) fn validate(
    sim: &SimilarityMatrix,
    relevance: &[RelevanceSet],
) -> Result<(), EvaluationError> {
    if relevance.len() != sim.num_queries() {
        return Err(EvaluationError::ShapeMismatch(format!(
            "{} relevance sets for {} queries",
            relevance.len(),
            sim.num_queries()
        )));
    }

    for (query, set) in relevance.iter().enumerate() {
        if let Some(max) = set.max_index() {
            if max >= sim.num_dataset() {
                return Err(EvaluationError::ShapeMismatch(format!(
                    "query {query} references item {max} but the dataset has {} items",
                    sim.num_dataset()
                )));
            }
        }
    }

    Ok(())
}
