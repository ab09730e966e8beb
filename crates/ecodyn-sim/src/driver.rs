//! The simulation driver (§ 4.8): freezes a model, drives an [`Integrator`]
//! through accepted/rejected trial steps, applies the extinction and
//! steady-state callbacks between them, and packages the result into a
//! [`Solution`].

use crate::analysis;
use crate::cancellation::CancellationSignal;
use crate::error::{Result, SimError};
use crate::integrator::builtin::AdaptiveStepDoublingRk4;
use crate::integrator::{Integrator, IntegratorOptions, StepOutcome};
use crate::solution::{RetCode, Solution};
use ecodyn_dynamics::{Derivative, GenericDerivative};
use ecodyn_model::model::warn_advisory;
use ecodyn_model::Model;
use std::collections::HashSet;
use tracing::{info, instrument, warn};

/// Options controlling a single `simulate` call (§ 4.8 "Operation
/// `simulate(model, u0, t_max; t0=0, extinction_threshold, callbacks?,
/// integrator_opts...)`").
#[derive(Debug, Clone)]
pub struct SimOptions {
    pub t0: f64,
    pub extinction_threshold: f64,
    pub abstol: f64,
    pub reltol: f64,
    pub initial_dt: f64,
    pub min_dt: f64,
    pub max_dt: f64,
    pub max_steps: usize,
    /// Silences the § 4.8 step 6 advisory warnings (§ 7 "Advisory
    /// conditions... can be silenced by an option").
    pub silence_advisories: bool,
    pub cancellation: Option<CancellationSignal>,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            t0: 0.0,
            extinction_threshold: 1e-6,
            abstol: 1e-8,
            reltol: 1e-6,
            initial_dt: 1e-2,
            min_dt: 1e-10,
            max_dt: 10.0,
            max_steps: 1_000_000,
            silence_advisories: false,
            cancellation: None,
        }
    }
}

fn steady_state(du: &[f64], u: &[f64], abstol: f64, reltol: f64) -> bool {
    let du_inf = du.iter().fold(0.0_f64, |acc, &x| acc.max(x.abs()));
    let u_inf = u.iter().fold(0.0_f64, |acc, &x| acc.max(x.abs()));
    du_inf < abstol + reltol * u_inf
}

/// `simulate(model, u0, t_max, opts) -> Solution` (§ 6), defaulting to the
/// bundled [`AdaptiveStepDoublingRk4`] integrator (§ SPEC_FULL E: "the
/// driver never constructs an integrator itself, it is always passed in or
/// defaulted to the builtin").
pub fn simulate(model: &Model, u0: &[f64], t_max: f64, opts: &SimOptions) -> Result<Solution> {
    let mut integrator = AdaptiveStepDoublingRk4::default();
    simulate_with(model, u0, t_max, opts, &mut integrator)
}

/// As [`simulate`], but with an explicit [`Integrator`] (e.g. a caller's own
/// Rosenbrock/implicit-RK wrapper).
#[instrument(skip(model, u0, opts, integrator), fields(t_max))]
pub fn simulate_with(model: &Model, u0: &[f64], t_max: f64, opts: &SimOptions, integrator: &mut dyn Integrator) -> Result<Solution> {
    let frozen_model = model.clone();
    let derivative = GenericDerivative::try_new(&frozen_model, opts.extinction_threshold)?;

    let state_len = derivative.state_len();
    if u0.len() != state_len {
        return Err(SimError::StateLengthMismatch { expected: state_len, got: u0.len() });
    }
    let n_species = derivative.n_species();

    let integrator_opts = IntegratorOptions { abstol: opts.abstol, reltol: opts.reltol };

    let mut t = opts.t0;
    let mut u = u0.to_vec();
    let mut dt = opts.initial_dt;
    let mut ts = vec![t];
    let mut us = vec![u.clone()];
    let mut already_extinct: HashSet<usize> = HashSet::new();
    let mut extinctions = Vec::new();
    let mut retcode = RetCode::Completed;
    let mut steps = 0usize;

    'outer: loop {
        if let Some(signal) = &opts.cancellation {
            if signal.is_cancelled() {
                retcode = RetCode::Cancelled;
                break;
            }
        }
        if t >= t_max {
            break;
        }
        if steps >= opts.max_steps {
            retcode = RetCode::IntegratorFailure(format!("exceeded max_steps ({})", opts.max_steps));
            break;
        }

        let trial_dt = dt.min(t_max - t);
        let outcome = integrator.step(&derivative, t, &u, trial_dt, &integrator_opts);
        steps += 1;

        match outcome {
            StepOutcome::Accepted { t_next, u_next: mut next_u, dt_next } => {
                t = t_next;
                u = std::mem::take(&mut next_u);
                dt = dt_next.clamp(opts.min_dt, opts.max_dt);

                let mut reinit_needed = false;
                for i in 0..n_species {
                    if u[i] <= opts.extinction_threshold && !already_extinct.contains(&i) {
                        u[i] = 0.0;
                        already_extinct.insert(i);
                        extinctions.push((i, t));
                        info!(species = i, time = t, "species extinction");
                        reinit_needed = true;
                    }
                }
                if reinit_needed {
                    integrator.reinit();
                }

                ts.push(t);
                us.push(u.clone());

                let mut du = vec![0.0; state_len];
                derivative.evaluate(t, &u, &mut du);
                if steady_state(&du, &u, opts.abstol, opts.reltol) {
                    retcode = RetCode::SteadyState;
                    break 'outer;
                }
            }
            StepOutcome::Rejected { dt_next } => {
                dt = dt_next.clamp(opts.min_dt, opts.max_dt);
                if dt <= opts.min_dt {
                    retcode = RetCode::IntegratorFailure("step size collapsed below min_dt".into());
                    break;
                }
            }
            StepOutcome::Failed { message } => {
                retcode = RetCode::IntegratorFailure(message);
                break;
            }
        }
    }

    if !opts.silence_advisories {
        report_advisories(&frozen_model, us.last().expect("at least t0's sample is always recorded"));
    }

    Ok(Solution::new(frozen_model, ts, us, extinctions, retcode))
}

fn report_advisories(model: &Model, final_state: &[f64]) {
    let final_biomass = &final_state[..model.value().n_species];
    let topology = analysis::post_extinction_topology(model, final_biomass);

    let isolated = analysis::isolated_producers(model, &topology);
    if !isolated.is_empty() {
        warn_advisory(&format!("{} producer(s) isolated from the trophic network post-extinction", isolated.len()));
    }

    let starving = analysis::starving_consumers(model, &topology);
    if !starving.is_empty() {
        warn_advisory(&format!("{} consumer(s) have no trophic path to a producer post-extinction", starving.len()));
    }

    let components = analysis::disconnected_components(&topology);
    if components.len() > 1 {
        warn!(count = components.len(), "post-extinction topology split into disconnected components");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecodyn_model::components::{BodyMass, Foodweb, FunctionalResponse};

    fn linear_chain() -> Model {
        let mut model = Model::new();
        model.add(Foodweb::AdjacencyList { n_species: 2, pairs: vec![(1, 0)] }).unwrap();
        model.add(BodyMass::Scalar(1.0)).unwrap();
        model.add(FunctionalResponse::linear()).unwrap();
        model
    }

    #[test]
    fn rejects_mismatched_initial_state_length() {
        let model = linear_chain();
        let opts = SimOptions::default();
        let err = simulate(&model, &[1.0], 1.0, &opts).unwrap_err();
        assert!(matches!(err, SimError::StateLengthMismatch { expected: 2, got: 1 }));
    }

    #[test]
    fn runs_to_t_max_without_extinction_when_growth_balances_loss() {
        let model = linear_chain();
        let opts = SimOptions { max_dt: 0.1, initial_dt: 0.01, ..SimOptions::default() };
        let solution = simulate(&model, &[1.0, 1.0], 0.5, &opts).unwrap();
        assert!(*solution.t().last().unwrap() >= 0.5 - 1e-6);
    }

    #[test]
    fn cancellation_truncates_the_trajectory() {
        let model = linear_chain();
        let signal = CancellationSignal::new();
        signal.cancel();
        let opts = SimOptions { cancellation: Some(signal), ..SimOptions::default() };
        let solution = simulate(&model, &[1.0, 1.0], 10.0, &opts).unwrap();
        assert_eq!(*solution.retcode(), RetCode::Cancelled);
        assert_eq!(solution.t().len(), 1);
    }
}
