//! The `Derivative` seam (§ 4.7, § 9 design note): an interface the
//! simulation driver calls once per accepted/trial integrator step. Both
//! [`crate::kernel::GenericDerivative`] and [`crate::specialized::SpecializedDerivative`]
//! implement it and are required to agree up to floating-point rounding
//! (§ 8 invariant 4).

/// Computes `du/dt` for the state vector `u = [B_1..B_n, N_1..N_m]`
/// (§ 3 "State vector").
pub trait Derivative {
    /// Writes `du` given the current state `u` at time `t`. `du.len()`
    /// and `u.len()` must equal [`Derivative::state_len`].
    fn evaluate(&self, t: f64, u: &[f64], du: &mut [f64]);

    /// `n_species + n_nutrients` (§ 3).
    fn state_len(&self) -> usize;

    /// The number of species compartments, i.e. the offset at which the
    /// nutrient suffix (if any) begins in the state vector.
    fn n_species(&self) -> usize;
}
