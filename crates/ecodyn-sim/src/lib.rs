//! # ecodyn-sim
//!
//! The simulation driver (§ 4.8): freezes a [`ecodyn_model::Model`] into a
//! [`ecodyn_dynamics::Derivative`], drives an [`integrator::Integrator`]
//! through accepted/rejected trial steps applying the extinction and
//! steady-state callbacks between them, and packages the run into a
//! [`Solution`]. Also home to the pure biomass observables (§ 4.9) and the
//! post-extinction topology analyses (§ 4.8 step 6).

pub mod analysis;
pub mod cancellation;
pub mod driver;
pub mod error;
pub mod integrator;
pub mod observables;
pub mod solution;

pub use cancellation::CancellationSignal;
pub use driver::{simulate, simulate_with, SimOptions};
pub use error::{Result, SimError};
pub use solution::{RetCode, Solution};
