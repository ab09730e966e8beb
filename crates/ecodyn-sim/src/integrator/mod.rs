//! The integrator seam (§ 1, § SPEC_FULL E): the driver never embeds a
//! specific numerical ODE solver, it drives whatever [`Integrator`] it is
//! handed, defaulting to [`builtin::AdaptiveStepDoublingRk4`] when the
//! caller doesn't supply one.

pub mod builtin;

use ecodyn_dynamics::Derivative;

/// Tolerances an [`Integrator`] uses for its local error estimate (§ 4.8
/// step 4 "reltol/abstol overrides").
#[derive(Debug, Clone, Copy)]
pub struct IntegratorOptions {
    pub abstol: f64,
    pub reltol: f64,
}

impl Default for IntegratorOptions {
    fn default() -> Self {
        Self { abstol: 1e-8, reltol: 1e-6 }
    }
}

/// The outcome of one trial step (§ 4.8 step 4). `Rejected` and `Failed`
/// never advance `t`; the driver retries at the suggested step size or gives
/// up once it falls below a configured floor.
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// The trial step met its local error tolerance.
    Accepted { t_next: f64, u_next: Vec<f64>, dt_next: f64 },
    /// The trial step exceeded its local error tolerance; retry at `dt_next`.
    Rejected { dt_next: f64 },
    /// The integrator cannot continue (e.g. a step size collapsed to zero
    /// without converging).
    Failed { message: String },
}

/// An adaptive-step ODE integrator (§ 1 "out of scope: concrete numerical
/// ODE solver library — the core consumes an integrator interface").
///
/// Implementors own whatever internal state their method needs (step-size
/// history, Jacobian caches, …) across calls to [`Integrator::step`]. The
/// driver (`crate::driver::simulate`) calls `step` once per trial step and
/// applies the extinction/steady-state logic itself; an implementor never
/// runs its own outer loop.
pub trait Integrator {
    /// Attempts one step of (at most) `dt` starting at `(t, u)`.
    /// `derivative.evaluate` must be called purely — it may be invoked
    /// multiple times per trial step (e.g. for embedded-pair or
    /// step-doubling error estimation) and must be reentrant (§ 5).
    fn step(&mut self, derivative: &dyn Derivative, t: f64, u: &[f64], dt: f64, opts: &IntegratorOptions) -> StepOutcome;

    /// Called by the driver after an extinction snap forces a
    /// biomass discontinuity (§ 4.8 step 2 "request the integrator to
    /// reinitialize"). The default no-op is correct for any integrator
    /// without step-size history to discard.
    fn reinit(&mut self) {}
}
