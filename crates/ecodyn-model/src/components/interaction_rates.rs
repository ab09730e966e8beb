//! Edge-indexed and per-species interaction-rate components (§ 3): the
//! quantities that parameterize the functional response, sparse on the
//! trophic template where the data model calls for it.

use crate::blueprint::{Blueprint, ComponentId};
use crate::error::{ModelError, Result};
use crate::model::Model;
use crate::rate_derivation::boltzmann_pairwise_rate;
use ecodyn_graph::SparseMatrix;
use ndarray::Array2;
use std::collections::HashMap;

fn trophic_template(model: &Model) -> Array2<bool> {
    model.value.foodweb.clone().unwrap_or_else(|| Array2::from_elem((model.value.n_species, model.value.n_species), false))
}

fn build_sparse(
    overrides: &Option<HashMap<(usize, usize), f64>>,
    model: &Model,
    default_for: impl Fn(usize, usize) -> f64,
) -> Result<SparseMatrix<f64>> {
    let mut matrix = SparseMatrix::new(trophic_template(model));
    for &(i, j) in &matrix.nonzero_indices().collect::<Vec<_>>() {
        let value = overrides.as_ref().and_then(|o| o.get(&(i, j)).copied()).unwrap_or_else(|| default_for(i, j));
        matrix.set(i, j, value, |_, _, _| {}).map_err(ModelError::from)?;
    }
    Ok(matrix)
}

/// `Efficiency` — assimilation efficiency `e_ij ∈ (0, 1]` (§ 3). Defaults
/// to a uniform literature constant when not supplied.
#[derive(Debug, Clone, Default)]
pub struct Efficiency(pub Option<HashMap<(usize, usize), f64>>);

const DEFAULT_EFFICIENCY: f64 = 0.85;

impl Blueprint for Efficiency {
    fn component(&self) -> ComponentId {
        "Efficiency"
    }

    fn requires(&self) -> Vec<ComponentId> {
        vec!["Foodweb"]
    }

    fn early_check(&self) -> Result<()> {
        if let Some(overrides) = &self.0 {
            if overrides.values().any(|&e| !(0.0..=1.0).contains(&e) || e == 0.0) {
                return Err(ModelError::BlueprintCheckFailure {
                    message: "efficiency values must lie in (0, 1]".into(),
                });
            }
        }
        Ok(())
    }

    fn expand(self: Box<Self>, model: &mut Model) {
        let matrix = build_sparse(&self.0, model, |_, _| DEFAULT_EFFICIENCY).expect("template-checked above");
        model.value.efficiency = Some(matrix);
    }
}

/// `ConsumersPreference` — `ω_ij`, defaulting to uniform over prey, with
/// the invariant `Σ_j ω_ij = 1` per consumer (§ 3, § 8 invariant 2).
#[derive(Debug, Clone, Default)]
pub struct ConsumersPreference(pub Option<HashMap<(usize, usize), f64>>);

impl Blueprint for ConsumersPreference {
    fn component(&self) -> ComponentId {
        "ConsumersPreference"
    }

    fn requires(&self) -> Vec<ComponentId> {
        vec!["Foodweb"]
    }

    fn late_check(&self, model: &Model) -> Result<()> {
        let Some(overrides) = &self.0 else { return Ok(()) };
        let n = model.value.n_species;
        let template = trophic_template(model);
        for i in 0..n {
            let prey: Vec<usize> = (0..n).filter(|&j| template[[i, j]]).collect();
            if prey.is_empty() {
                continue;
            }
            let sum: f64 = prey.iter().map(|j| overrides.get(&(i, *j)).copied().unwrap_or(0.0)).sum();
            if (sum - 1.0).abs() > 1e-6 {
                return Err(ModelError::BlueprintCheckFailure {
                    message: format!("preferences for consumer {i} sum to {sum}, expected 1"),
                });
            }
        }
        Ok(())
    }

    fn expand(self: Box<Self>, model: &mut Model) {
        let template = trophic_template(model);
        let n = model.value.n_species;
        let prey_counts: Vec<usize> =
            (0..n).map(|i| (0..n).filter(|&j| template[[i, j]]).count()).collect();
        let matrix = build_sparse(&self.0, model, |i, _| 1.0 / prey_counts[i] as f64).expect("validated above");
        model.value.preference = Some(matrix);
    }
}

/// `HandlingTime` — `h_t,ij ≥ 0`, defaulting to the allometric pairwise
/// derivation `0.3·M_i^{-0.48}·M_j^{-0.66}` with the sessile exponent
/// correction for producer prey (§ 4.5, § 4.6).
#[derive(Debug, Clone, Default)]
pub struct HandlingTime(pub Option<HashMap<(usize, usize), f64>>);

impl Blueprint for HandlingTime {
    fn component(&self) -> ComponentId {
        "HandlingTime"
    }

    fn requires(&self) -> Vec<ComponentId> {
        vec!["Foodweb", "BodyMass"]
    }

    fn expand(self: Box<Self>, model: &mut Model) {
        let table = model.value.rate_table;
        let constants = model.value.boltzmann;
        let mass = model.value.body_mass.clone();
        let producers: std::collections::HashSet<usize> = model.value.producers().into_iter().collect();
        let temperature = model.value.temperature.unwrap_or(constants.t_ref);
        let matrix = build_sparse(&self.0, model, |i, j| {
            boltzmann_pairwise_rate(table.handling_time, &constants, mass[i], mass[j], producers.contains(&j), temperature)
        })
        .expect("handling time template always matches the foodweb");
        model.value.handling_time = Some(matrix);
    }
}

/// `AttackRate` — `a_r,ij ≥ 0`, defaulting to `50·M_i^{0.45}·M_j^{0.15}`
/// with the sessile exponent correction (§ 4.5, § 4.6).
#[derive(Debug, Clone, Default)]
pub struct AttackRate(pub Option<HashMap<(usize, usize), f64>>);

impl Blueprint for AttackRate {
    fn component(&self) -> ComponentId {
        "AttackRate"
    }

    fn requires(&self) -> Vec<ComponentId> {
        vec!["Foodweb", "BodyMass"]
    }

    fn expand(self: Box<Self>, model: &mut Model) {
        let table = model.value.rate_table;
        let constants = model.value.boltzmann;
        let mass = model.value.body_mass.clone();
        let producers: std::collections::HashSet<usize> = model.value.producers().into_iter().collect();
        let temperature = model.value.temperature.unwrap_or(constants.t_ref);
        let matrix = build_sparse(&self.0, model, |i, j| {
            boltzmann_pairwise_rate(table.attack_rate, &constants, mass[i], mass[j], producers.contains(&j), temperature)
        })
        .expect("attack rate template always matches the foodweb");
        model.value.attack_rate = Some(matrix);
    }
}

macro_rules! per_species_rate {
    ($name:ident, $component:literal, $field:ident, $default:expr, $validate:expr) => {
        #[derive(Debug, Clone, Default)]
        pub struct $name(pub Option<Vec<f64>>);

        impl Blueprint for $name {
            fn component(&self) -> ComponentId {
                $component
            }

            fn requires(&self) -> Vec<ComponentId> {
                vec!["Species"]
            }

            fn early_check(&self) -> Result<()> {
                if let Some(values) = &self.0 {
                    let validate: fn(f64) -> bool = $validate;
                    if values.iter().any(|&v| !validate(v)) {
                        return Err(ModelError::BlueprintCheckFailure {
                            message: concat!($component, " has an out-of-range value").into(),
                        });
                    }
                }
                Ok(())
            }

            fn late_check(&self, model: &Model) -> Result<()> {
                if let Some(values) = &self.0 {
                    if values.len() != model.value.n_species {
                        return Err(ModelError::DimensionMismatch {
                            message: format!(
                                "{} expects {} entries, got {}",
                                $component,
                                model.value.n_species,
                                values.len()
                            ),
                        });
                    }
                }
                Ok(())
            }

            fn expand(self: Box<Self>, model: &mut Model) {
                let n = model.value.n_species;
                model.value.$field = self.0.unwrap_or_else(|| vec![$default; n]);
            }
        }
    };
}

per_species_rate!(IntraspecificInterference, "IntraspecificInterference", interference, 0.0_f64, |v| v >= 0.0);
per_species_rate!(HalfSaturationDensity, "HalfSaturationDensity", half_saturation_density, 1.0_f64, |v| v > 0.0);
per_species_rate!(ConsumptionRate, "ConsumptionRate", consumption_rate, 1.0_f64, |v| v >= 0.0);

/// `HillExponent` — scalar `h ≥ 1` shared by every trophic link (§ 3).
#[derive(Debug, Clone, Copy)]
pub struct HillExponent(pub f64);

impl Default for HillExponent {
    fn default() -> Self {
        Self(1.0)
    }
}

impl Blueprint for HillExponent {
    fn component(&self) -> ComponentId {
        "HillExponent"
    }

    fn early_check(&self) -> Result<()> {
        if self.0 < 1.0 {
            return Err(ModelError::BlueprintCheckFailure { message: format!("hill exponent must be >= 1, got {}", self.0) });
        }
        Ok(())
    }

    fn expand(self: Box<Self>, model: &mut Model) {
        model.value.hill_exponent = self.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::body_mass::BodyMass;
    use crate::components::foodweb::Foodweb;

    fn chain_model() -> Model {
        let mut model = Model::new();
        model.add(Foodweb::AdjacencyList { n_species: 3, pairs: vec![(0, 1), (1, 2)] }).unwrap();
        model.add(BodyMass::Scalar(1.0)).unwrap();
        model
    }

    #[test]
    fn default_preference_is_uniform_and_normalized() {
        let mut model = chain_model();
        model.add(ConsumersPreference(None)).unwrap();
        let preference = model.value().preference.as_ref().unwrap();
        assert!((preference.get(0, 1).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn preference_override_must_sum_to_one() {
        let mut overrides = HashMap::new();
        overrides.insert((0, 1), 0.5);
        let model = chain_model();
        assert!(model.clone().add(ConsumersPreference(Some(overrides))).is_err());
    }

    #[test]
    fn hill_exponent_below_one_is_rejected() {
        assert!(HillExponent(0.5).early_check().is_err());
    }
}
