//! Construction and access errors (§ 7).

use ecodyn_graph::GraphError;
use thiserror::Error;

/// Errors raised while assembling or introspecting a [`crate::Model`].
///
/// Construction and access errors are always surfaced without partial state
/// mutation (§ 7): [`crate::Model::add`] only ever commits a fully-checked
/// expansion.
#[derive(Error, Debug, Clone)]
pub enum ModelError {
    /// A blueprint's `requires()` component was neither already present nor
    /// reachable via `implies` in the same batch.
    #[error("missing requirement: component '{component}' is not present")]
    MissingRequirement { component: String },

    /// The blueprint's component is already active and conflicts with it
    /// (or an explicitly declared conflicting component is present).
    #[error("component conflict: '{a}' conflicts with already-active '{b}'")]
    ComponentConflict { a: String, b: String },

    /// The blueprint's early or late structural check failed.
    #[error("blueprint check failed: {message}")]
    BlueprintCheckFailure { message: String },

    /// Two values that must share a dimension did not.
    #[error("dimension mismatch: {message}")]
    DimensionMismatch { message: String },

    /// A sparse assignment targeted an index outside its template.
    #[error("template violation: {message}")]
    TemplateViolation { message: String },

    /// A species was assigned a [`crate::components::metabolic_class::MetabolicClass`]
    /// inconsistent with its producer/consumer status.
    #[error("invalid metabolic class: {message}")]
    InvalidClass { message: String },

    /// A structural foodweb generator failed to meet its tolerance within
    /// `iter_max` attempts.
    #[error("foodweb generation failed after {attempts} attempts: {message}")]
    FoodwebGenerationFailed { attempts: usize, message: String },

    /// A reference string did not resolve to any known alias.
    #[error(transparent)]
    UnknownAlias(#[from] ecodyn_aliases::AliasError),

    /// A label had no registered index.
    #[error("unknown label '{label}'")]
    UnknownLabel { label: String },

    /// An index fell outside its valid range.
    #[error("index {index} out of bounds for size {size}")]
    OutOfBounds { index: usize, size: usize },

    /// A write targeted a read-only or non-terminal property.
    #[error("'{what}' is read-only")]
    ReadOnly { what: String },

    /// A named property has no registered accessor because its owning
    /// component is not active.
    #[error("property '{path}' is not available: component '{component}' is not active")]
    PropertyNotAvailable { path: String, component: String },
}

impl From<GraphError> for ModelError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::OutOfBounds { index, size, .. } => Self::OutOfBounds { index, size },
            GraphError::TemplateViolation { i, j } => Self::TemplateViolation {
                message: format!("({i}, {j:?}) is not part of the sparse template"),
            },
            GraphError::UnknownLabel { label, .. } => Self::UnknownLabel { label },
            GraphError::DimensionMismatch { expected, got } => Self::DimensionMismatch {
                message: format!("expected {expected:?}, got {got:?}"),
            },
            GraphError::ReadOnly { what } => Self::ReadOnly { what },
        }
    }
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_error_converts_to_model_error() {
        let g = GraphError::OutOfBounds { index: 3, size: 2, axis: "row" };
        let m: ModelError = g.into();
        assert!(matches!(m, ModelError::OutOfBounds { index: 3, size: 2 }));
    }
}
