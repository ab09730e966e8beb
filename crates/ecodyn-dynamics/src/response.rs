//! Pure per-edge/per-species formulas (§ 4.7). Both
//! [`crate::kernel::GenericDerivative`] (loop-driven) and
//! [`crate::specialized::SpecializedDerivative`] (unrolled) call these
//! exact functions so the two kernels are equivalent by construction
//! rather than by coincidence (§ 8 invariant 4, § 9 design note).

use ecodyn_model::components::FunctionalResponseKind;

/// The per-prey term summed into a consumer's functional-response
/// denominator (§ 4.7 step 1): `ω_ik·|B_k|^h` for bioenergetic,
/// `ω_ik·a_r,ik·h_t,ik·|B_k|^h` for classic, unused for linear.
#[must_use]
pub fn denominator_term(
    kind: FunctionalResponseKind,
    omega_ik: f64,
    attack_rate_ik: f64,
    handling_time_ik: f64,
    b_k: f64,
    hill_exponent: f64,
) -> f64 {
    match kind {
        FunctionalResponseKind::Linear => 0.0,
        FunctionalResponseKind::Bioenergetic => omega_ik * b_k.abs().powf(hill_exponent),
        FunctionalResponseKind::Classic => omega_ik * attack_rate_ik * handling_time_ik * b_k.abs().powf(hill_exponent),
    }
}

/// Parameters needed to evaluate a single trophic edge `(i, j)`'s
/// functional response once its denominator sum is known (§ 4.7 step 1).
#[derive(Debug, Clone, Copy)]
pub struct EdgeInputs {
    pub kind: FunctionalResponseKind,
    pub omega_ij: f64,
    pub b_i: f64,
    pub b_j: f64,
    pub hill_exponent: f64,
    pub consumption_rate_i: f64,
    pub half_saturation_i: f64,
    pub interference_i: f64,
    pub attack_rate_ij: f64,
    pub consumer_mass_i: f64,
    pub interference_term: f64,
    pub denominator_sum: f64,
}

/// `F_ij` (§ 4.7 step 1).
#[must_use]
pub fn edge_response(inputs: EdgeInputs) -> f64 {
    match inputs.kind {
        FunctionalResponseKind::Linear => inputs.omega_ij * inputs.consumption_rate_i * inputs.b_j,
        FunctionalResponseKind::Bioenergetic => {
            let numerator = inputs.omega_ij * inputs.b_j.abs().powf(inputs.hill_exponent);
            let denominator = inputs.half_saturation_i.abs().powf(inputs.hill_exponent) * (1.0 + inputs.interference_i * inputs.b_i)
                + inputs.denominator_sum;
            numerator / denominator
        }
        FunctionalResponseKind::Classic => {
            let numerator = inputs.omega_ij * inputs.attack_rate_ij * inputs.b_j.abs().powf(inputs.hill_exponent);
            let denominator = inputs.consumer_mass_i
                * (1.0 + inputs.interference_i * inputs.b_i + inputs.interference_term + inputs.denominator_sum);
            numerator / denominator
        }
    }
}

/// Applies the refuge modifier to an attack rate (§ 4.7 step 1): `a_r,ij
/// / (1 + φ·Σ_k A_ref[j,k]·B_k)`, `refuge_sum` already being `Σ_k
/// A_ref[j,k]·B_k`.
#[must_use]
pub fn refuge_adjusted_attack_rate(attack_rate_ij: f64, refuge_intensity: f64, refuge_sum: f64) -> f64 {
    attack_rate_ij / (1.0 + refuge_intensity * refuge_sum)
}

/// Logistic producer growth (§ 4.7 step 2, logistic branch): `r_i·B_i·(1
/// − Σ_j a_pp[i,j]·B_j / K_i)`.
#[must_use]
pub fn logistic_growth(growth_rate_i: f64, b_i: f64, competition_sum: f64, carrying_capacity_i: f64) -> f64 {
    growth_rate_i * b_i * (1.0 - competition_sum / carrying_capacity_i)
}

/// Nutrient-limited producer growth (§ 4.7 step 2, nutrient branch):
/// `r_i·B_i·min_l(N_l/(K_il + N_l))`.
#[must_use]
pub fn nutrient_growth(growth_rate_i: f64, b_i: f64, limiting_factor: f64) -> f64 {
    growth_rate_i * b_i * limiting_factor
}

/// Assimilation gain (§ 4.7 step 3): `B_i·Σ_j e_ij·F_ij`, `assimilated_sum`
/// already being `Σ_j e_ij·F_ij`.
#[must_use]
pub fn assimilation_gain(b_i: f64, assimilated_sum: f64) -> f64 {
    b_i * assimilated_sum
}

/// Predation loss (§ 4.7 step 4): `Σ_j B_j·F_ji`.
#[must_use]
pub fn predation_loss(predation_sum: f64) -> f64 {
    predation_sum
}

/// Maintenance loss (§ 4.7 step 5): `(x_i + d_i)·B_i`.
#[must_use]
pub fn maintenance_loss(metabolism_i: f64, mortality_i: f64, b_i: f64) -> f64 {
    (metabolism_i + mortality_i) * b_i
}

/// Clamps an already-extinct species' derivative so it cannot re-grow
/// (§ 4.7 "Edge cases").
#[must_use]
pub fn clamp_extinct(raw_derivative: f64, b_i: f64, extinction_threshold: f64) -> f64 {
    if b_i <= extinction_threshold {
        raw_derivative.min(0.0)
    } else {
        raw_derivative
    }
}

/// Nutrient-pool ODE term (§ 4.7 step 7): `D_l·(S_l − N_l) − Σ_i
/// C[i,l]·G_i·B_i`, `uptake_sum` already being `Σ_i C[i,l]·G_i·B_i`.
#[must_use]
pub fn nutrient_derivative(turnover_l: f64, supply_l: f64, n_l: f64, uptake_sum: f64) -> f64 {
    turnover_l * (supply_l - n_l) - uptake_sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_response_matches_s3_scenario() {
        let inputs = EdgeInputs {
            kind: FunctionalResponseKind::Linear,
            omega_ij: 1.0,
            b_i: 1.0,
            b_j: 1.0,
            hill_exponent: 1.0,
            consumption_rate_i: 1.0,
            half_saturation_i: 0.0,
            interference_i: 0.0,
            attack_rate_ij: 0.0,
            consumer_mass_i: 1.0,
            interference_term: 0.0,
            denominator_sum: 0.0,
        };
        assert!((edge_response(inputs) - 1.0).abs() < 1e-12);
        let scaled = EdgeInputs { b_j: 1.5, ..inputs };
        assert!((edge_response(scaled) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn bioenergetic_response_matches_s1_scenario() {
        let denom = 1.0_f64; // single prey: ω·|B_j|^2 with ω=1, B_j=1.
        let inputs = EdgeInputs {
            kind: FunctionalResponseKind::Bioenergetic,
            omega_ij: 1.0,
            b_i: 1.0,
            b_j: 1.0,
            hill_exponent: 2.0,
            consumption_rate_i: 0.0,
            half_saturation_i: 0.5,
            interference_i: 0.0,
            attack_rate_ij: 0.0,
            consumer_mass_i: 1.0,
            interference_term: 0.0,
            denominator_sum: denom,
        };
        // denominator = 0.5^2 * 1 + 1 = 1.25; numerator = 1 -> F = 0.8.
        assert!((edge_response(inputs) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn extinct_species_cannot_re_grow() {
        assert_eq!(clamp_extinct(5.0, 0.0, 1e-6), 0.0);
        assert_eq!(clamp_extinct(-5.0, 0.0, 1e-6), -5.0);
        assert_eq!(clamp_extinct(5.0, 1.0, 1e-6), 5.0);
    }
}
