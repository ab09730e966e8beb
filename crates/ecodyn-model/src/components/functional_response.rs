//! The `FunctionalResponse` component (§ 4.5): picks exactly one of
//! `Linear`, `Bioenergetic`, or `Classic`, bringing in whichever
//! per-species/per-edge rate components that variant needs.

use crate::blueprint::{Blueprint, Brought, ComponentId};
use crate::components::interaction_rates::{
    ConsumersPreference, ConsumptionRate, HalfSaturationDensity, HandlingTime, IntraspecificInterference, AttackRate,
    HillExponent,
};
use crate::error::Result;
use crate::model::Model;

const COMPONENT: ComponentId = "FunctionalResponse";

/// Which derivative-kernel branch a model uses (§ 4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionalResponseKind {
    Linear,
    Bioenergetic,
    Classic,
}

/// `FunctionalResponse::Linear/Bioenergetic/Classic` (§ 4.5). Brought
/// sub-blueprints default via [`Brought::Implied`] and can be replaced by
/// constructing the variant with an explicit [`Brought::Embedded`] field.
#[derive(Debug, Clone)]
pub enum FunctionalResponse {
    Linear {
        consumption_rate: Brought<ConsumptionRate>,
        preference: Brought<ConsumersPreference>,
    },
    Bioenergetic {
        hill_exponent: Brought<HillExponent>,
        preference: Brought<ConsumersPreference>,
        interference: Brought<IntraspecificInterference>,
        half_saturation: Brought<HalfSaturationDensity>,
    },
    Classic {
        hill_exponent: Brought<HillExponent>,
        preference: Brought<ConsumersPreference>,
        interference: Brought<IntraspecificInterference>,
        handling_time: Brought<HandlingTime>,
        attack_rate: Brought<AttackRate>,
    },
}

impl FunctionalResponse {
    #[must_use]
    pub fn linear() -> Self {
        Self::Linear {
            consumption_rate: Brought::Implied(ConsumptionRate::default),
            preference: Brought::Implied(ConsumersPreference::default),
        }
    }

    #[must_use]
    pub fn bioenergetic() -> Self {
        Self::Bioenergetic {
            hill_exponent: Brought::Implied(HillExponent::default),
            preference: Brought::Implied(ConsumersPreference::default),
            interference: Brought::Implied(IntraspecificInterference::default),
            half_saturation: Brought::Implied(HalfSaturationDensity::default),
        }
    }

    #[must_use]
    pub fn classic() -> Self {
        Self::Classic {
            hill_exponent: Brought::Implied(HillExponent::default),
            preference: Brought::Implied(ConsumersPreference::default),
            interference: Brought::Implied(IntraspecificInterference::default),
            handling_time: Brought::Implied(HandlingTime::default),
            attack_rate: Brought::Implied(AttackRate::default),
        }
    }

    fn kind(&self) -> FunctionalResponseKind {
        match self {
            Self::Linear { .. } => FunctionalResponseKind::Linear,
            Self::Bioenergetic { .. } => FunctionalResponseKind::Bioenergetic,
            Self::Classic { .. } => FunctionalResponseKind::Classic,
        }
    }
}

impl Blueprint for FunctionalResponse {
    fn component(&self) -> ComponentId {
        COMPONENT
    }

    fn requires(&self) -> Vec<ComponentId> {
        vec!["Foodweb", "BodyMass"]
    }

    fn implies(&self) -> Vec<Box<dyn Blueprint>> {
        let mut brought: Vec<Box<dyn Blueprint>> = Vec::new();
        match self.clone() {
            Self::Linear { consumption_rate, preference } => {
                if let Some(bp) = consumption_rate.resolve() {
                    brought.push(Box::new(bp));
                }
                if let Some(bp) = preference.resolve() {
                    brought.push(Box::new(bp));
                }
            }
            Self::Bioenergetic { hill_exponent, preference, interference, half_saturation } => {
                if let Some(bp) = hill_exponent.resolve() {
                    brought.push(Box::new(bp));
                }
                if let Some(bp) = preference.resolve() {
                    brought.push(Box::new(bp));
                }
                if let Some(bp) = interference.resolve() {
                    brought.push(Box::new(bp));
                }
                if let Some(bp) = half_saturation.resolve() {
                    brought.push(Box::new(bp));
                }
            }
            Self::Classic { hill_exponent, preference, interference, handling_time, attack_rate } => {
                if let Some(bp) = hill_exponent.resolve() {
                    brought.push(Box::new(bp));
                }
                if let Some(bp) = preference.resolve() {
                    brought.push(Box::new(bp));
                }
                if let Some(bp) = interference.resolve() {
                    brought.push(Box::new(bp));
                }
                if let Some(bp) = handling_time.resolve() {
                    brought.push(Box::new(bp));
                }
                if let Some(bp) = attack_rate.resolve() {
                    brought.push(Box::new(bp));
                }
            }
        }
        brought
    }

    fn late_check(&self, _model: &Model) -> Result<()> {
        Ok(())
    }

    fn expand(self: Box<Self>, model: &mut Model) {
        model.value.functional_response = Some(self.kind());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::body_mass::BodyMass;
    use crate::components::foodweb::Foodweb;

    #[test]
    fn linear_variant_brings_in_consumption_rate_and_preference() {
        let mut model = Model::new();
        model.add(Foodweb::AdjacencyList { n_species: 2, pairs: vec![(0, 1)] }).unwrap();
        model.add(BodyMass::Scalar(1.0)).unwrap();
        model.add(FunctionalResponse::linear()).unwrap();
        assert!(model.has_component("ConsumptionRate"));
        assert!(model.has_component("ConsumersPreference"));
        assert_eq!(model.value().functional_response, Some(FunctionalResponseKind::Linear));
    }

    #[test]
    fn classic_variant_brings_in_handling_time_and_attack_rate() {
        let mut model = Model::new();
        model.add(Foodweb::AdjacencyList { n_species: 2, pairs: vec![(0, 1)] }).unwrap();
        model.add(BodyMass::Scalar(1.0)).unwrap();
        model.add(FunctionalResponse::classic()).unwrap();
        assert!(model.has_component("HandlingTime"));
        assert!(model.has_component("AttackRate"));
    }
}
