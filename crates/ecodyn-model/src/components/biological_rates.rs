//! Per-species biological rate components (§ 3, § 4.6): `Mortality`,
//! `Metabolism`, `MaximumConsumption`, `GrowthRate`. Each defaults to the
//! allometric (optionally Boltzmann–Arrhenius corrected) derivation from
//! `BodyMass` and `MetabolicClass` unless the caller supplies an explicit
//! per-species override.

use crate::error::{ModelError, Result};
use crate::model::Model;
use crate::rate_derivation::{
    allometric_growth_rate, allometric_max_consumption, allometric_metabolism, allometric_mortality,
};
use crate::blueprint::{Blueprint, ComponentId};

fn check_override(values: &Option<Vec<f64>>, model: &Model, component: &'static str) -> Result<()> {
    if let Some(values) = values {
        if values.len() != model.value.n_species {
            return Err(ModelError::DimensionMismatch {
                message: format!("{component} expects {} entries, got {}", model.value.n_species, values.len()),
            });
        }
        if values.iter().any(|&v| v < 0.0) {
            return Err(ModelError::BlueprintCheckFailure { message: format!("{component} must be non-negative") });
        }
    }
    Ok(())
}

fn derive_or_override(
    values: Option<Vec<f64>>,
    model: &Model,
    derive: impl Fn(crate::components::metabolic_class::MetabolicClass, f64, f64) -> f64,
) -> Vec<f64> {
    values.unwrap_or_else(|| {
        let temperature = model.value.temperature.unwrap_or(model.value.boltzmann.t_ref);
        model
            .value
            .metabolic_class
            .iter()
            .zip(&model.value.body_mass)
            .map(|(&class, &mass)| derive(class, mass, temperature))
            .collect()
    })
}

macro_rules! rate_blueprint {
    ($name:ident, $component:literal, $field:ident, $allometric:ident, $activation_energy:expr) => {
        #[doc = concat!("The `", $component, "` component (§ 3, § 4.6).")]
        #[derive(Debug, Clone, Default)]
        pub struct $name(pub Option<Vec<f64>>);

        impl Blueprint for $name {
            fn component(&self) -> ComponentId {
                $component
            }

            fn requires(&self) -> Vec<ComponentId> {
                vec!["BodyMass", "MetabolicClass"]
            }

            fn late_check(&self, model: &Model) -> Result<()> {
                check_override(&self.0, model, $component)
            }

            fn expand(self: Box<Self>, model: &mut Model) {
                let table = model.value.rate_table;
                let constants = model.value.boltzmann;
                let activation_energy: f64 = $activation_energy;
                let has_temperature = model.value.temperature.is_some();
                let values = derive_or_override(self.0, model, |class, mass, temperature| {
                    let base = $allometric(&table, class, mass);
                    if has_temperature && activation_energy != 0.0 {
                        base * constants.correction(activation_energy, temperature)
                    } else {
                        base
                    }
                });
                model.value.$field = values;
            }
        }
    };
}

// Activation energies for the temperature-sensitive scalar rates listed in
// § 4.6 ("Temperature component toggles … for `{r, x, a_r, h_t, K}`"):
// intrinsic growth `r` and metabolism `x` reuse the producer/consumer
// metabolism activation energy baked into the allometric table itself via
// `RateCoefficientTable`; max consumption and mortality are left
// temperature-invariant by default (no literature constant specified).
rate_blueprint!(Mortality, "Mortality", mortality, allometric_mortality, 0.0);
rate_blueprint!(Metabolism, "Metabolism", metabolism, allometric_metabolism, 0.65);
rate_blueprint!(MaxConsumption, "MaximumConsumption", max_consumption, allometric_max_consumption, 0.0);
rate_blueprint!(GrowthRate, "GrowthRate", growth_rate, allometric_growth_rate, -0.25);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::body_mass::BodyMass;
    use crate::components::foodweb::Foodweb;
    use crate::components::metabolic_class::MetabolicClasses;

    fn base_model() -> Model {
        let mut model = Model::new();
        model.add(Foodweb::AdjacencyList { n_species: 2, pairs: vec![(0, 1)] }).unwrap();
        model.add(BodyMass::Scalar(1.0)).unwrap();
        model.add(MetabolicClasses(None)).unwrap();
        model
    }

    #[test]
    fn producer_has_zero_metabolism_and_positive_growth_rate() {
        let mut model = base_model();
        model.add(Metabolism(None)).unwrap();
        model.add(GrowthRate(None)).unwrap();
        assert_eq!(model.value().metabolism[1], 0.0);
        assert!(model.value().growth_rate[1] > 0.0);
    }

    #[test]
    fn override_must_match_species_count() {
        let model = base_model();
        assert!(model.clone().add(Mortality(Some(vec![0.1]))).is_err());
    }

}
