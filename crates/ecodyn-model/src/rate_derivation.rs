//! Allometric scaling and Boltzmann–Arrhenius rate derivations (§ 4.6).

use crate::components::metabolic_class::MetabolicClass;
use crate::config::{BoltzmannArrheniusConstants, RateCoefficientTable};

fn class_rates(table: &RateCoefficientTable, class: MetabolicClass) -> crate::config::MetabolicClassRates {
    match class {
        MetabolicClass::Producer => table.producer,
        MetabolicClass::Invertebrate => table.invertebrate,
        MetabolicClass::EctothermVertebrate => table.ectotherm_vertebrate,
    }
}

/// Allometric scaling `R_i = a_class(i) * M_i ^ b_class(i)` (§ 4.6).
#[must_use]
pub fn allometric_growth_rate(table: &RateCoefficientTable, class: MetabolicClass, mass: f64) -> f64 {
    class_rates(table, class).growth_rate.evaluate(mass)
}

#[must_use]
pub fn allometric_metabolism(table: &RateCoefficientTable, class: MetabolicClass, mass: f64) -> f64 {
    class_rates(table, class).metabolism.evaluate(mass)
}

#[must_use]
pub fn allometric_max_consumption(table: &RateCoefficientTable, class: MetabolicClass, mass: f64) -> f64 {
    class_rates(table, class).max_consumption.evaluate(mass)
}

#[must_use]
pub fn allometric_mortality(table: &RateCoefficientTable, class: MetabolicClass, mass: f64) -> f64 {
    class_rates(table, class).mortality.evaluate(mass)
}

/// Boltzmann–Arrhenius corrected rate for a scalar (per-species) quantity:
/// `a * M_i^b * exp(E_a * (T_ref - T) / (k_B * T_ref * T))`. The `M_j`
/// factor is omitted for scalar rates (§ 4.6).
#[must_use]
pub fn boltzmann_scalar_rate(
    base: crate::config::AllometricCoefficients,
    activation_energy: f64,
    constants: &BoltzmannArrheniusConstants,
    mass: f64,
    temperature: f64,
) -> f64 {
    base.evaluate(mass) * constants.correction(activation_energy, temperature)
}

/// Boltzmann–Arrhenius corrected rate for a pairwise (consumer/prey)
/// quantity such as handling time or attack rate (§ 4.6), with the
/// sessile-producer exponent correction (§ 4.5).
#[must_use]
pub fn boltzmann_pairwise_rate(
    pair: crate::config::PairwiseCoefficients,
    constants: &BoltzmannArrheniusConstants,
    mass_i: f64,
    mass_j: f64,
    j_is_sessile: bool,
    temperature: f64,
) -> f64 {
    pair.evaluate(mass_i, mass_j, j_is_sessile) * constants.correction(pair.activation_energy, temperature)
}
