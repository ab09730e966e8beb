//! Bidirectional label <-> index lookup shared by views and topology
//! compartments.

use crate::error::{GraphError, Result};
use std::collections::HashMap;

/// Maps symbolic labels (species names, nutrient names, …) to their stable
/// `[0, n)` index and back.
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    labels: Vec<String>,
    by_label: HashMap<String, usize>,
}

impl LabelIndex {
    /// Builds a label index from labels in index order. Labels must be
    /// unique; duplicates collapse to the first occurrence's index, which
    /// would silently corrupt lookups, so this is a logic error in the
    /// caller (an ecological-data blueprint that validates uniqueness at its
    /// early check, see `ecodyn-model`).
    #[must_use]
    pub fn new(labels: Vec<String>) -> Self {
        let mut by_label = HashMap::with_capacity(labels.len());
        for (idx, label) in labels.iter().enumerate() {
            by_label.entry(label.clone()).or_insert(idx);
        }
        Self { labels, by_label }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[must_use]
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn index(&self, label: &str) -> Result<usize> {
        self.by_label
            .get(label)
            .copied()
            .ok_or_else(|| GraphError::unknown_label(label, &self.labels))
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}
