//! Producer-growth components (§ 3, § 4.5): `CarryingCapacity`,
//! `ProducerCompetition`, `Nutrients.{...}`, and the top-level
//! `ProducerGrowth` component that picks `LogisticGrowth` or
//! `NutrientIntake`.

use crate::blueprint::{Blueprint, Brought, ComponentId};
use crate::error::{ModelError, Result};
use crate::model::Model;
use ndarray::Array2;

/// Which producer-growth term the derivative kernel evaluates (§ 4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerGrowthKind {
    Logistic,
    NutrientIntake,
}

/// `CarryingCapacity` — per-producer `K_i > 0` (§ 3). Non-producer entries
/// are unused by the kernel and default to zero.
#[derive(Debug, Clone, Default)]
pub struct CarryingCapacity(pub Option<Vec<f64>>);

impl Blueprint for CarryingCapacity {
    fn component(&self) -> ComponentId {
        "CarryingCapacity"
    }

    fn requires(&self) -> Vec<ComponentId> {
        vec!["Foodweb"]
    }

    fn late_check(&self, model: &Model) -> Result<()> {
        if let Some(values) = &self.0 {
            if values.len() != model.value.n_species {
                return Err(ModelError::DimensionMismatch {
                    message: format!("CarryingCapacity expects {} entries, got {}", model.value.n_species, values.len()),
                });
            }
            let producers: std::collections::HashSet<usize> = model.value.producers().into_iter().collect();
            if producers.iter().any(|&i| values[i] <= 0.0) {
                return Err(ModelError::BlueprintCheckFailure {
                    message: "CarryingCapacity must be strictly positive for every producer".into(),
                });
            }
        }
        Ok(())
    }

    fn expand(self: Box<Self>, model: &mut Model) {
        let n = model.value.n_species;
        let producers: std::collections::HashSet<usize> = model.value.producers().into_iter().collect();
        model.value.carrying_capacity = self.0.unwrap_or_else(|| {
            (0..n).map(|i| if producers.contains(&i) { 1.0 } else { 0.0 }).collect()
        });
    }
}

/// `ProducerCompetition` — the producer-competition-for-space matrix
/// `a_pp`, defaulting to the identity (§ 3 "default: identity").
#[derive(Debug, Clone, Default)]
pub struct ProducerCompetition(pub Option<Array2<f64>>);

impl Blueprint for ProducerCompetition {
    fn component(&self) -> ComponentId {
        "ProducerCompetition"
    }

    fn requires(&self) -> Vec<ComponentId> {
        vec!["Foodweb"]
    }

    fn late_check(&self, model: &Model) -> Result<()> {
        if let Some(matrix) = &self.0 {
            let n = model.value.n_species;
            if matrix.nrows() != n || matrix.ncols() != n {
                return Err(ModelError::DimensionMismatch {
                    message: format!("ProducerCompetition expects a {n}x{n} matrix, got {}x{}", matrix.nrows(), matrix.ncols()),
                });
            }
        }
        Ok(())
    }

    fn expand(self: Box<Self>, model: &mut Model) {
        let n = model.value.n_species;
        model.value.producer_competition = Some(self.0.unwrap_or_else(|| Array2::eye(n)));
    }
}

/// A fully-specified nutrient pool (§ 3): per-nutrient turnover/supply, and
/// per-species (producer-row) concentration/half-saturation matrices. Has
/// no context-free default, so it is always brought in mandatorily
/// (`embeds`) rather than implied.
#[derive(Debug, Clone)]
pub struct Nutrients {
    pub n_nutrients: usize,
    pub turnover: Vec<f64>,
    pub supply: Vec<f64>,
    pub concentration: Array2<f64>,
    pub half_saturation: Array2<f64>,
}

impl Blueprint for Nutrients {
    fn component(&self) -> ComponentId {
        "Nutrients"
    }

    fn requires(&self) -> Vec<ComponentId> {
        vec!["Foodweb"]
    }

    fn early_check(&self) -> Result<()> {
        if self.n_nutrients == 0 {
            return Err(ModelError::BlueprintCheckFailure { message: "Nutrients requires at least one nutrient".into() });
        }
        if self.turnover.len() != self.n_nutrients || self.supply.len() != self.n_nutrients {
            return Err(ModelError::DimensionMismatch {
                message: "Nutrients turnover/supply must each have n_nutrients entries".into(),
            });
        }
        if self.turnover.iter().any(|&d| d <= 0.0) || self.supply.iter().any(|&s| s <= 0.0) {
            return Err(ModelError::BlueprintCheckFailure {
                message: "Nutrients turnover and supply must be strictly positive".into(),
            });
        }
        if self.half_saturation.iter().any(|&k| k <= 0.0) {
            return Err(ModelError::BlueprintCheckFailure {
                message: "Nutrients half_saturation must be strictly positive".into(),
            });
        }
        if self.concentration.iter().any(|&c| c < 0.0) {
            return Err(ModelError::BlueprintCheckFailure { message: "Nutrients concentration must be non-negative".into() });
        }
        Ok(())
    }

    fn late_check(&self, model: &Model) -> Result<()> {
        let n = model.value.n_species;
        let expect = (n, self.n_nutrients);
        if self.concentration.dim() != expect || self.half_saturation.dim() != expect {
            return Err(ModelError::DimensionMismatch {
                message: format!(
                    "Nutrients concentration/half_saturation must be {}x{}, got {:?}/{:?}",
                    n,
                    self.n_nutrients,
                    self.concentration.dim(),
                    self.half_saturation.dim()
                ),
            });
        }
        Ok(())
    }

    fn expand(self: Box<Self>, model: &mut Model) {
        model.value.topology.add_compartment("nutrients", self.n_nutrients);
        model.value.nutrients = Some(NutrientsData {
            n_nutrients: self.n_nutrients,
            turnover: self.turnover,
            supply: self.supply,
            concentration: self.concentration,
            half_saturation: self.half_saturation,
        });
    }
}

/// The internal value written by [`Nutrients::expand`]; [`crate::model::ModelValue`]
/// stores this directly rather than the blueprint (§ 3 "Ownership").
#[derive(Debug, Clone)]
pub struct NutrientsData {
    pub n_nutrients: usize,
    pub turnover: Vec<f64>,
    pub supply: Vec<f64>,
    pub concentration: Array2<f64>,
    pub half_saturation: Array2<f64>,
}

/// `ProducerGrowth::LogisticGrowth` or `ProducerGrowth::NutrientIntake`
/// (§ 4.5).
#[derive(Debug, Clone)]
pub enum ProducerGrowth {
    LogisticGrowth {
        carrying_capacity: Brought<CarryingCapacity>,
        competition: Brought<ProducerCompetition>,
    },
    NutrientIntake {
        nutrients: Brought<Nutrients>,
    },
}

impl ProducerGrowth {
    #[must_use]
    pub fn logistic(carrying_capacity: Vec<f64>) -> Self {
        Self::LogisticGrowth {
            carrying_capacity: Brought::Embedded(CarryingCapacity(Some(carrying_capacity))),
            competition: Brought::Implied(ProducerCompetition::default),
        }
    }

    #[must_use]
    pub fn logistic_default() -> Self {
        Self::LogisticGrowth {
            carrying_capacity: Brought::Implied(CarryingCapacity::default),
            competition: Brought::Implied(ProducerCompetition::default),
        }
    }

    #[must_use]
    pub fn nutrient_intake(nutrients: Nutrients) -> Self {
        Self::NutrientIntake { nutrients: Brought::Embedded(nutrients) }
    }

    fn kind(&self) -> ProducerGrowthKind {
        match self {
            Self::LogisticGrowth { .. } => ProducerGrowthKind::Logistic,
            Self::NutrientIntake { .. } => ProducerGrowthKind::NutrientIntake,
        }
    }
}

impl Blueprint for ProducerGrowth {
    fn component(&self) -> ComponentId {
        "ProducerGrowth"
    }

    fn requires(&self) -> Vec<ComponentId> {
        vec!["Foodweb"]
    }

    fn implies(&self) -> Vec<Box<dyn Blueprint>> {
        match self.clone() {
            Self::LogisticGrowth { carrying_capacity, competition } => {
                let mut v: Vec<Box<dyn Blueprint>> = Vec::new();
                if let Some(bp) = carrying_capacity.resolve() {
                    v.push(Box::new(bp));
                }
                if let Some(bp) = competition.resolve() {
                    v.push(Box::new(bp));
                }
                v
            }
            Self::NutrientIntake { .. } => Vec::new(),
        }
    }

    fn embeds(&self) -> Vec<Box<dyn Blueprint>> {
        match self.clone() {
            Self::NutrientIntake { nutrients } => nutrients.resolve().map(|bp| vec![Box::new(bp) as Box<dyn Blueprint>]).unwrap_or_default(),
            Self::LogisticGrowth { .. } => Vec::new(),
        }
    }

    fn expand(self: Box<Self>, model: &mut Model) {
        model.value.producer_growth = Some(self.kind());
    }
}
