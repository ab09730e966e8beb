//! Runtime errors (§ 7 "Runtime"). Construction/access errors from the
//! underlying model are propagated as-is; runtime errors terminate a
//! simulation but are folded into a partial [`crate::solution::Solution`]'s
//! retcode rather than raised (§ 7 "Propagation policy") — `SimError` itself
//! is only returned for failures that occur before a Solution can exist at
//! all (model freezing, state-length mismatches).

use ecodyn_dynamics::DynamicsError;
use ecodyn_model::ModelError;
use thiserror::Error;

/// Errors raised assembling or driving a simulation.
#[derive(Error, Debug, Clone)]
pub enum SimError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Dynamics(#[from] DynamicsError),

    /// `u0`'s length did not match the model's `n_species + n_nutrients`.
    #[error("initial state has {got} entries, model expects {expected}")]
    StateLengthMismatch { expected: usize, got: usize },

    /// The integrator reported a failure retcode (§ 7 "Runtime").
    #[error("integrator failed: {message}")]
    IntegratorFailure { message: String },

    /// The simulation was cancelled cooperatively (§ 5 "Cancellation").
    #[error("simulation cancelled at t={t}")]
    Cancelled { t: f64 },
}

/// Result type alias for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;
