//! Typed blueprints for every ecological-data component (§ 2, § 4.5).

pub mod biological_rates;
pub mod body_mass;
pub mod foodweb;
pub mod functional_response;
pub mod interaction_rates;
pub mod metabolic_class;
pub mod non_trophic;
pub mod producer_growth;
pub mod species;
pub mod temperature;

pub use biological_rates::{GrowthRate, MaxConsumption, Metabolism, Mortality};
pub use body_mass::BodyMass;
pub use foodweb::{Foodweb, StructuralModel, StructuralTarget};
pub use functional_response::{FunctionalResponse, FunctionalResponseKind};
pub use interaction_rates::{
    AttackRate, ConsumersPreference, ConsumptionRate, Efficiency, HalfSaturationDensity, HandlingTime, HillExponent,
    IntraspecificInterference,
};
pub use metabolic_class::{MetabolicClass, MetabolicClasses};
pub use non_trophic::{LayerTopology, NonTrophicLayer, NonTrophicLayerData, NonTrophicLayers};
pub use producer_growth::{CarryingCapacity, Nutrients, NutrientsData, ProducerCompetition, ProducerGrowth, ProducerGrowthKind};
pub use species::Species;
pub use temperature::Temperature;
