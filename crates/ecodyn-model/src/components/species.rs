//! The `Species` component (§ 4.5): the species compartment of the
//! topology, created once and never removed.

use crate::blueprint::{Blueprint, ComponentId};
use crate::error::{ModelError, Result};
use crate::model::Model;
use ecodyn_graph::LabelIndex;

const COMPONENT: ComponentId = "Species";

fn default_labels(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("s{i}")).collect()
}

/// `Species::Number(n)` or `Species::Names(labels)` (§ 4.5).
#[derive(Debug, Clone)]
pub enum Species {
    Number(usize),
    Names(Vec<String>),
}

impl Species {
    fn labels(&self) -> Vec<String> {
        match self {
            Self::Number(n) => default_labels(*n),
            Self::Names(names) => names.clone(),
        }
    }
}

impl Blueprint for Species {
    fn component(&self) -> ComponentId {
        COMPONENT
    }

    fn early_check(&self) -> Result<()> {
        match self {
            Self::Number(0) => Err(ModelError::BlueprintCheckFailure {
                message: "Species::Number requires at least one species".into(),
            }),
            Self::Names(names) => {
                if names.is_empty() {
                    return Err(ModelError::BlueprintCheckFailure {
                        message: "Species::Names requires at least one label".into(),
                    });
                }
                let mut sorted = names.clone();
                sorted.sort();
                sorted.dedup();
                if sorted.len() != names.len() {
                    return Err(ModelError::BlueprintCheckFailure {
                        message: "Species::Names labels must be unique".into(),
                    });
                }
                Ok(())
            }
            Self::Number(_) => Ok(()),
        }
    }

    fn expand(self: Box<Self>, model: &mut Model) {
        let labels = self.labels();
        model.value.n_species = labels.len();
        model.value.species_labels = LabelIndex::new(labels.clone());
        model.value.topology.add_compartment("species", labels.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_variant_generates_default_labels() {
        let mut model = Model::new();
        model.add(Species::Number(3)).unwrap();
        assert_eq!(model.value().species_labels.labels(), &["s1", "s2", "s3"]);
    }

    #[test]
    fn names_variant_rejects_duplicates() {
        let bp = Species::Names(vec!["a".into(), "a".into()]);
        assert!(bp.early_check().is_err());
    }

    #[test]
    fn empty_species_set_is_rejected() {
        assert!(Species::Number(0).early_check().is_err());
    }
}
