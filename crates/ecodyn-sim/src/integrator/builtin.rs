//! The one bundled [`Integrator`] implementation (§ SPEC_FULL E): an
//! embedded step-doubling adaptive RK4 stepper with Richardson
//! extrapolation error control. It satisfies "adaptive-step" (§ 4.8 step 4)
//! and is adequate for the moderately stiff systems a handful of
//! species/nutrients produce, but is not a production implicit stiff
//! solver — a caller who needs one wires up their own [`Integrator`].

use super::{IntegratorOptions, StepOutcome};
use crate::integrator::Integrator;
use ecodyn_dynamics::Derivative;

/// One classical RK4 step of size `dt`, pure in `t`/`u`/`dt`.
fn rk4_step(derivative: &dyn Derivative, t: f64, u: &[f64], dt: f64) -> Vec<f64> {
    let n = u.len();
    let mut k1 = vec![0.0; n];
    derivative.evaluate(t, u, &mut k1);

    let mid: Vec<f64> = (0..n).map(|i| u[i] + 0.5 * dt * k1[i]).collect();
    let mut k2 = vec![0.0; n];
    derivative.evaluate(t + 0.5 * dt, &mid, &mut k2);

    let mid2: Vec<f64> = (0..n).map(|i| u[i] + 0.5 * dt * k2[i]).collect();
    let mut k3 = vec![0.0; n];
    derivative.evaluate(t + 0.5 * dt, &mid2, &mut k3);

    let end: Vec<f64> = (0..n).map(|i| u[i] + dt * k3[i]).collect();
    let mut k4 = vec![0.0; n];
    derivative.evaluate(t + dt, &end, &mut k4);

    (0..n).map(|i| u[i] + dt / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i])).collect()
}

/// Step-doubling adaptive RK4 (§ SPEC_FULL E). Each trial step compares one
/// step of size `dt` against two steps of size `dt/2`; since RK4 is a
/// fourth-order method, the difference divided by `2^4 - 1 = 15` is both the
/// local error estimate and the Richardson correction applied to the
/// accepted solution.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveStepDoublingRk4 {
    /// Shrinks/grows the suggested step size below/above what the error
    /// ratio alone would pick, guarding against oscillating step sizes.
    pub safety: f64,
    /// Lower bound on how much a single trial step can shrink `dt`.
    pub min_shrink: f64,
    /// Upper bound on how much a single trial step can grow `dt`.
    pub max_growth: f64,
}

impl Default for AdaptiveStepDoublingRk4 {
    fn default() -> Self {
        Self { safety: 0.9, min_shrink: 0.2, max_growth: 5.0 }
    }
}

impl Integrator for AdaptiveStepDoublingRk4 {
    fn step(&mut self, derivative: &dyn Derivative, t: f64, u: &[f64], dt: f64, opts: &IntegratorOptions) -> StepOutcome {
        if dt <= 0.0 {
            return StepOutcome::Failed { message: "step size collapsed to zero".into() };
        }

        let full = rk4_step(derivative, t, u, dt);
        let half = rk4_step(derivative, t, u, dt / 2.0);
        let half = rk4_step(derivative, t + dt / 2.0, &half, dt / 2.0);

        let mut error_ratio = 0.0_f64;
        for i in 0..u.len() {
            let diff = (half[i] - full[i]).abs();
            let scale = opts.abstol + opts.reltol * half[i].abs();
            error_ratio = error_ratio.max(diff / scale);
        }

        let growth = if error_ratio > 0.0 {
            (self.safety * error_ratio.powf(-0.25)).clamp(self.min_shrink, self.max_growth)
        } else {
            self.max_growth
        };
        let dt_next = dt * growth;

        if error_ratio <= 1.0 {
            let extrapolated: Vec<f64> = (0..u.len()).map(|i| half[i] + (half[i] - full[i]) / 15.0).collect();
            StepOutcome::Accepted { t_next: t + dt, u_next: extrapolated, dt_next }
        } else {
            StepOutcome::Rejected { dt_next }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ExponentialDecay;

    impl Derivative for ExponentialDecay {
        fn evaluate(&self, _t: f64, u: &[f64], du: &mut [f64]) {
            du[0] = -u[0];
        }
        fn state_len(&self) -> usize {
            1
        }
        fn n_species(&self) -> usize {
            1
        }
    }

    #[test]
    fn accepted_step_matches_analytic_decay_closely() {
        let mut integrator = AdaptiveStepDoublingRk4::default();
        let opts = IntegratorOptions { abstol: 1e-10, reltol: 1e-10 };
        let outcome = integrator.step(&ExponentialDecay, 0.0, &[1.0], 0.01, &opts);
        match outcome {
            StepOutcome::Accepted { u_next, t_next, .. } => {
                assert!((t_next - 0.01).abs() < 1e-12);
                let exact = (-0.01_f64).exp();
                assert!((u_next[0] - exact).abs() < 1e-9);
            }
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[test]
    fn oversized_step_is_rejected_with_a_smaller_suggestion() {
        let mut integrator = AdaptiveStepDoublingRk4::default();
        let opts = IntegratorOptions { abstol: 1e-14, reltol: 0.0 };
        let outcome = integrator.step(&ExponentialDecay, 0.0, &[1.0], 5.0, &opts);
        match outcome {
            StepOutcome::Rejected { dt_next } => assert!(dt_next < 5.0),
            StepOutcome::Accepted { .. } => {}
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}
