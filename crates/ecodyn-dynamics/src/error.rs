//! Errors raised while freezing a model into a derivative kernel.

use thiserror::Error;

/// A model was missing a component the chosen functional response or
/// producer-growth variant needs before a [`crate::Derivative`] can be
/// built from it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DynamicsError {
    #[error("cannot build a derivative kernel: component '{component}' is not active")]
    MissingComponent { component: &'static str },

    #[error("cannot build a derivative kernel: no functional response is active")]
    MissingFunctionalResponse,

    #[error("cannot build a derivative kernel: no producer growth variant is active")]
    MissingProducerGrowth,
}

pub type Result<T> = std::result::Result<T, DynamicsError>;
