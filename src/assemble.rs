//! `Model::default(foodweb, overrides...)` (§ 6): a one-call assembly path
//! to a ready-to-simulate model, wiring the `Foodweb` blueprint through body
//! mass, metabolic class, the allometric biological rates, a functional
//! response, and a producer-growth variant in the order each depends on the
//! last.

use ecodyn_model::components::{
    BodyMass, Foodweb, FunctionalResponse, GrowthRate, MaxConsumption, MetabolicClasses, Metabolism, Mortality,
    ProducerGrowth, Temperature,
};
use ecodyn_model::{Model, Result};

/// Overrides for [`default_model`]; every field left `None` falls back to
/// the same choice its individual blueprint would pick when constructed
/// with no override of its own.
#[derive(Debug, Clone, Default)]
pub struct DefaultModelOverrides {
    pub body_mass: Option<BodyMass>,
    pub metabolic_classes: Option<MetabolicClasses>,
    pub mortality: Option<Mortality>,
    pub metabolism: Option<Metabolism>,
    pub max_consumption: Option<MaxConsumption>,
    pub growth_rate: Option<GrowthRate>,
    pub functional_response: Option<FunctionalResponse>,
    pub producer_growth: Option<ProducerGrowth>,
    pub temperature: Option<Temperature>,
}

/// Assembles a ready-to-simulate model from a `Foodweb` blueprint plus
/// optional overrides for every downstream component (§ 6).
///
/// Temperature, if given, is added before the rate components so the
/// Boltzmann–Arrhenius correction applies to the rates this call brings in
/// (§ 4.5 `Temperature` ordering note). The only thing this function adds
/// over calling [`Model::new`] and [`Model::add`] by hand is the fixed,
/// dependency-respecting order; every individual `add!` here is one a
/// caller could equally have issued themselves.
pub fn default_model(foodweb: Foodweb, overrides: DefaultModelOverrides) -> Result<Model> {
    let mut model = Model::new();
    model.add(foodweb)?;

    if let Some(temperature) = overrides.temperature {
        model.add(temperature)?;
    }

    model.add(overrides.body_mass.unwrap_or(BodyMass::Scalar(1.0)))?;
    model.add(overrides.metabolic_classes.unwrap_or(MetabolicClasses(None)))?;
    model.add(overrides.mortality.unwrap_or(Mortality(None)))?;
    model.add(overrides.metabolism.unwrap_or(Metabolism(None)))?;
    model.add(overrides.max_consumption.unwrap_or(MaxConsumption(None)))?;
    model.add(overrides.growth_rate.unwrap_or(GrowthRate(None)))?;
    model.add(overrides.functional_response.unwrap_or_else(FunctionalResponse::bioenergetic))?;
    model.add(overrides.producer_growth.unwrap_or_else(ProducerGrowth::logistic_default))?;

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_assembles_a_ready_to_simulate_chain() {
        let foodweb = Foodweb::AdjacencyList { n_species: 3, pairs: vec![(1, 0), (2, 1)] };
        let model = default_model(foodweb, DefaultModelOverrides::default()).unwrap();
        assert_eq!(model.value().n_species, 3);
        assert!(model.has_component("FunctionalResponse"));
        assert!(model.has_component("ProducerGrowth"));
        assert!(model.value().producer_growth.is_some());
    }

    #[test]
    fn temperature_override_is_applied_before_rate_components() {
        let foodweb = Foodweb::AdjacencyList { n_species: 2, pairs: vec![(0, 1)] };
        let overrides = DefaultModelOverrides { temperature: Some(Temperature(300.0)), ..Default::default() };
        let model = default_model(foodweb, overrides).unwrap();
        assert_eq!(model.value().temperature, Some(300.0));
    }

    #[test]
    fn explicit_functional_response_override_is_honored() {
        let foodweb = Foodweb::AdjacencyList { n_species: 2, pairs: vec![(0, 1)] };
        let overrides = DefaultModelOverrides { functional_response: Some(FunctionalResponse::linear()), ..Default::default() };
        let model = default_model(foodweb, overrides).unwrap();
        assert_eq!(
            model.value().functional_response,
            Some(ecodyn_model::components::FunctionalResponseKind::Linear)
        );
    }
}
