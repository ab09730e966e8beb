//! The `BodyMass` component (§ 4.5): a strictly positive per-species mass,
//! either supplied directly or derived from a predator/prey mass ratio.

use crate::blueprint::{Blueprint, ComponentId};
use crate::error::{ModelError, Result};
use crate::model::Model;

const COMPONENT: ComponentId = "BodyMass";

/// `BodyMass::Scalar`, `BodyMass::PerSpecies`, or `BodyMass::FromRatio`
/// (§ 4.5). `FromRatio` requires `Foodweb` and derives `M_i = Z^(t_i - 1)`
/// from each species' trophic level `t_i`.
#[derive(Debug, Clone)]
pub enum BodyMass {
    Scalar(f64),
    PerSpecies(Vec<f64>),
    FromRatio(f64),
}

/// Trophic level `t_i = 1 + mean(t_j over prey j)`, producers at `t_i = 1`
/// (§ 3). Cyclic subgraphs have no well-defined fixed point; this relaxes
/// to a fixed-point iteration bounded at 64 rounds, which is exact for
/// acyclic food webs and a stable approximation otherwise (§ 3 "undefined
/// if cycles; such networks are allowed but flagged").
fn trophic_levels(adjacency: &ndarray::Array2<bool>) -> Vec<f64> {
    let n = adjacency.nrows();
    let mut levels = vec![1.0_f64; n];
    for _ in 0..64 {
        let mut next = vec![1.0_f64; n];
        for i in 0..n {
            let prey: Vec<usize> = (0..n).filter(|&j| adjacency[[i, j]]).collect();
            if !prey.is_empty() {
                let mean = prey.iter().map(|&j| levels[j]).sum::<f64>() / prey.len() as f64;
                next[i] = 1.0 + mean;
            }
        }
        let delta = next.iter().zip(&levels).map(|(a, b)| (a - b).abs()).fold(0.0, f64::max);
        levels = next;
        if delta < 1e-10 {
            break;
        }
    }
    levels
}

impl Blueprint for BodyMass {
    fn component(&self) -> ComponentId {
        COMPONENT
    }

    fn early_check(&self) -> Result<()> {
        match self {
            Self::Scalar(m) | Self::FromRatio(m) if *m <= 0.0 => Err(ModelError::BlueprintCheckFailure {
                message: format!("BodyMass requires a strictly positive value, got {m}"),
            }),
            Self::PerSpecies(values) if values.iter().any(|&m| m <= 0.0) => Err(ModelError::BlueprintCheckFailure {
                message: "BodyMass::PerSpecies requires every mass to be strictly positive".into(),
            }),
            _ => Ok(()),
        }
    }

    fn requires(&self) -> Vec<ComponentId> {
        if matches!(self, Self::FromRatio(_)) {
            vec!["Foodweb"]
        } else {
            vec!["Species"]
        }
    }

    fn late_check(&self, model: &Model) -> Result<()> {
        if let Self::PerSpecies(values) = self {
            if values.len() != model.value.n_species {
                return Err(ModelError::DimensionMismatch {
                    message: format!(
                        "BodyMass::PerSpecies expects {} entries, got {}",
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
        model.value.body_mass = match *self {
            Self::Scalar(m) => vec![m; n],
            Self::PerSpecies(values) => values,
            Self::FromRatio(z) => {
                let adjacency = model.value.foodweb.clone().unwrap_or_else(|| ndarray::Array2::from_elem((n, n), false));
                trophic_levels(&adjacency).into_iter().map(|t| z.powf(t - 1.0)).collect()
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::foodweb::Foodweb;
    use crate::components::species::Species;

    #[test]
    fn scalar_broadcasts_to_every_species() {
        let mut model = Model::new();
        model.add(Species::Number(3)).unwrap();
        model.add(BodyMass::Scalar(2.0)).unwrap();
        assert_eq!(model.value().body_mass, vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn from_ratio_gives_producers_unit_mass() {
        let mut model = Model::new();
        model.add(Foodweb::AdjacencyList { n_species: 3, pairs: vec![(0, 1), (1, 2)] }).unwrap();
        model.add(BodyMass::FromRatio(10.0)).unwrap();
        // species 2 (index 2) is the basal producer: t = 1, M = 10^0 = 1.
        assert!((model.value().body_mass[2] - 1.0).abs() < 1e-9);
        assert!(model.value().body_mass[0] > model.value().body_mass[1]);
    }

    #[test]
    fn non_positive_mass_is_rejected() {
        assert!(BodyMass::Scalar(0.0).early_check().is_err());
    }
}
