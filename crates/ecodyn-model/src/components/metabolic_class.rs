//! `MetabolicClass` (§ 3): one of `{producer, invertebrate,
//! ectotherm_vertebrate}` per species.

use crate::blueprint::{Blueprint, ComponentId};
use crate::error::{ModelError, Result};
use crate::model::Model;
use serde::{Deserialize, Serialize};

/// A species' metabolic class, used to pick allometric coefficient tables
/// (§ 4.6). Every producer (§ 3, a species with no prey) must have class
/// [`MetabolicClass::Producer`]; no non-producer may have it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetabolicClass {
    Producer,
    Invertebrate,
    EctothermVertebrate,
}

impl MetabolicClass {
    #[must_use]
    pub fn is_producer(self) -> bool {
        matches!(self, Self::Producer)
    }
}

const COMPONENT: ComponentId = "MetabolicClass";

/// The `MetabolicClass` component blueprint: one class per species,
/// defaulting producers to [`MetabolicClass::Producer`] and every other
/// species to [`MetabolicClass::Invertebrate`] when not supplied.
#[derive(Debug, Clone)]
pub struct MetabolicClasses(pub Option<Vec<MetabolicClass>>);

impl Blueprint for MetabolicClasses {
    fn component(&self) -> ComponentId {
        COMPONENT
    }

    fn requires(&self) -> Vec<ComponentId> {
        vec!["Foodweb"]
    }

    fn late_check(&self, model: &Model) -> Result<()> {
        if let Some(classes) = &self.0 {
            if classes.len() != model.value.n_species {
                return Err(ModelError::DimensionMismatch {
                    message: format!(
                        "MetabolicClasses expects {} entries, got {}",
                        model.value.n_species,
                        classes.len()
                    ),
                });
            }
            let producers: std::collections::HashSet<usize> = model.value.producers().into_iter().collect();
            for (i, class) in classes.iter().enumerate() {
                let is_producer_row = producers.contains(&i);
                if class.is_producer() != is_producer_row {
                    return Err(ModelError::InvalidClass {
                        message: format!(
                            "species {i} {} a producer row but was assigned {class:?}",
                            if is_producer_row { "is" } else { "is not" }
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    fn expand(self: Box<Self>, model: &mut Model) {
        model.value.metabolic_class = self.0.unwrap_or_else(|| {
            let producers: std::collections::HashSet<usize> = model.value.producers().into_iter().collect();
            (0..model.value.n_species)
                .map(|i| if producers.contains(&i) { MetabolicClass::Producer } else { MetabolicClass::Invertebrate })
                .collect()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::foodweb::Foodweb;

    #[test]
    fn default_assigns_producer_to_basal_species() {
        let mut model = Model::new();
        model.add(Foodweb::AdjacencyList { n_species: 2, pairs: vec![(0, 1)] }).unwrap();
        model.add(MetabolicClasses(None)).unwrap();
        assert_eq!(model.value().metabolic_class[1], MetabolicClass::Producer);
        assert_eq!(model.value().metabolic_class[0], MetabolicClass::Invertebrate);
    }

    #[test]
    fn mismatched_class_on_producer_row_is_rejected() {
        let mut model = Model::new();
        model.add(Foodweb::AdjacencyList { n_species: 2, pairs: vec![(0, 1)] }).unwrap();
        let bad = vec![MetabolicClass::Producer, MetabolicClass::Invertebrate];
        assert!(model.add(MetabolicClasses(Some(bad))).is_err());
    }
}
