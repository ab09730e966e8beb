//! Errors raised by graph views, labels, and topology queries.

use thiserror::Error;

const MAX_SHOWN: usize = 12;

fn render_set(values: &[String]) -> String {
    if values.len() <= MAX_SHOWN {
        values.join(", ")
    } else {
        format!("{}, … ({} more)", values[..MAX_SHOWN].join(", "), values.len() - MAX_SHOWN)
    }
}

/// Errors raised by [`crate::view`] and [`crate::topology`] operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// An index fell outside `[0, size)`.
    #[error("index {index} out of bounds for size {size} ({axis})")]
    OutOfBounds { index: usize, size: usize, axis: &'static str },

    /// A sparse write targeted an index the template marks as structurally
    /// zero.
    #[error("({i}, {j:?}) is not part of the sparse template")]
    TemplateViolation { i: usize, j: Option<usize> },

    /// A label had no registered index.
    #[error("unknown label '{label}'; known labels: {known}")]
    UnknownLabel { label: String, known: String },

    /// Two array-likes that must share a shape did not.
    #[error("dimension mismatch: expected {expected:?}, got {got:?}")]
    DimensionMismatch { expected: Vec<usize>, got: Vec<usize> },

    /// A write was attempted against a read-only view or property.
    #[error("'{what}' is read-only")]
    ReadOnly { what: String },
}

impl GraphError {
    #[must_use]
    pub fn unknown_label<S: Into<String>>(label: S, known: &[String]) -> Self {
        Self::UnknownLabel { label: label.into(), known: render_set(known) }
    }
}

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
