//! Literature-derived default constant tables, consumed as fixed
//! configuration (§ 1 "Out of scope … literature-derived default constant
//! tables").
//!
//! Mirrors the teacher's `config.rs` convention: plain `Serialize +
//! Deserialize` structs with a hand-written [`Default`] holding the
//! hardcoded literature values, optionally overridden by a TOML document.

use serde::{Deserialize, Serialize};

/// A single allometric coefficient pair for `R = a * M^b`. `a == 0.0`
/// disables the rate for that class (§ 4.6 "Null `a` yields a null rate").
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllometricCoefficients {
    pub a: f64,
    pub b: f64,
}

impl AllometricCoefficients {
    #[must_use]
    pub const fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    #[must_use]
    pub fn evaluate(&self, mass: f64) -> f64 {
        if self.a == 0.0 {
            0.0
        } else {
            self.a * mass.powf(self.b)
        }
    }
}

/// The three per-species allometric rates a metabolic class needs (§ 4.6):
/// intrinsic growth (producers only), metabolism, and max consumption.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetabolicClassRates {
    pub growth_rate: AllometricCoefficients,
    pub metabolism: AllometricCoefficients,
    pub max_consumption: AllometricCoefficients,
    pub mortality: AllometricCoefficients,
}

/// A pairwise allometric coefficient `R = a * M_i^b * M_j^c`, used for
/// handling time and attack rate (§ 4.5).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairwiseCoefficients {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    /// Boltzmann–Arrhenius activation energy `E_a`, used only when a
    /// temperature is present on the model (§ 4.6).
    pub activation_energy: f64,
}

impl PairwiseCoefficients {
    #[must_use]
    pub fn evaluate(&self, mass_i: f64, mass_j: f64, j_is_sessile: bool) -> f64 {
        if self.a == 0.0 {
            return 0.0;
        }
        let c = if j_is_sessile { 0.0 } else { self.c };
        self.a * mass_i.powf(self.b) * mass_j.powf(c)
    }
}

/// The full literature-derived coefficient table consumed by rate
/// derivations (§ 4.6). A caller may override any part of this when
/// constructing the relevant blueprint; absent that, [`RateCoefficientTable::default`]
/// supplies it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateCoefficientTable {
    pub producer: MetabolicClassRates,
    pub invertebrate: MetabolicClassRates,
    pub ectotherm_vertebrate: MetabolicClassRates,
    pub handling_time: PairwiseCoefficients,
    pub attack_rate: PairwiseCoefficients,
}

/// Boltzmann–Arrhenius constants (§ 4.6): `k_B = 8.617e-5 eV/K`,
/// `T_ref = 293.15 K` (20 °C).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoltzmannArrheniusConstants {
    pub k_boltzmann: f64,
    pub t_ref: f64,
}

impl Default for BoltzmannArrheniusConstants {
    fn default() -> Self {
        Self { k_boltzmann: 8.617e-5, t_ref: 293.15 }
    }
}

impl BoltzmannArrheniusConstants {
    /// `exp(E_a * (T_ref - T) / (k_B * T_ref * T))`, the temperature
    /// correction factor applied on top of an allometric rate (§ 4.6).
    #[must_use]
    pub fn correction(&self, activation_energy: f64, temperature: f64) -> f64 {
        if activation_energy == 0.0 {
            return 1.0;
        }
        let exponent = activation_energy * (self.t_ref - temperature)
            / (self.k_boltzmann * self.t_ref * temperature);
        exponent.exp()
    }
}

impl Default for RateCoefficientTable {
    fn default() -> Self {
        Self {
            producer: MetabolicClassRates {
                growth_rate: AllometricCoefficients::new(1.0, -0.25),
                metabolism: AllometricCoefficients::new(0.0, 0.0),
                max_consumption: AllometricCoefficients::new(0.0, 0.0),
                mortality: AllometricCoefficients::new(0.0, 0.0),
            },
            invertebrate: MetabolicClassRates {
                growth_rate: AllometricCoefficients::new(0.0, 0.0),
                metabolism: AllometricCoefficients::new(0.314, -0.25),
                max_consumption: AllometricCoefficients::new(8.0, 0.0),
                mortality: AllometricCoefficients::new(0.0, 0.0),
            },
            ectotherm_vertebrate: MetabolicClassRates {
                growth_rate: AllometricCoefficients::new(0.0, 0.0),
                metabolism: AllometricCoefficients::new(0.88, -0.25),
                max_consumption: AllometricCoefficients::new(4.0, 0.0),
                mortality: AllometricCoefficients::new(0.0, 0.0),
            },
            handling_time: PairwiseCoefficients { a: 0.3, b: -0.48, c: -0.66, activation_energy: 0.65 },
            attack_rate: PairwiseCoefficients { a: 50.0, b: 0.45, c: 0.15, activation_energy: -0.38 },
        }
    }
}

impl RateCoefficientTable {
    /// Overrides the hardcoded defaults with a user-supplied TOML document.
    /// Missing sections/fields keep the literature default via serde's
    /// `#[serde(default)]`-free "start from default, merge" strategy:
    /// the document must be a complete table. A partial override is the
    /// caller's job via [`Self::default`] + field assignment.
    pub fn from_toml_str(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_coefficient_yields_null_rate() {
        let disabled = AllometricCoefficients::new(0.0, -0.25);
        assert_eq!(disabled.evaluate(10.0), 0.0);
    }

    #[test]
    fn allometric_scaling_matches_power_law() {
        let c = AllometricCoefficients::new(2.0, 0.5);
        assert!((c.evaluate(4.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn sessile_correction_drops_prey_exponent() {
        let c = PairwiseCoefficients { a: 50.0, b: 0.45, c: 0.15, activation_energy: 0.0 };
        let with_prey_exponent = c.evaluate(1.0, 2.0, false);
        let sessile = c.evaluate(1.0, 2.0, true);
        assert!((sessile - 50.0).abs() < 1e-12);
        assert!((with_prey_exponent - 50.0 * 2f64.powf(0.15)).abs() < 1e-12);
    }

    #[test]
    fn boltzmann_correction_is_identity_at_reference_temperature() {
        let constants = BoltzmannArrheniusConstants::default();
        let factor = constants.correction(0.65, constants.t_ref);
        assert!((factor - 1.0).abs() < 1e-12);
    }

    #[test]
    fn default_table_round_trips_through_toml() {
        let table = RateCoefficientTable::default();
        let text = toml::to_string(&table).unwrap();
        let parsed = RateCoefficientTable::from_toml_str(&text).unwrap();
        assert_eq!(parsed, table);
    }
}
