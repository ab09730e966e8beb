//! Non-trophic interaction layers (§ 3, § 4.5): `competition`,
//! `facilitation`, `interference`, `refuge`. Each aggregates a topology
//! sub-specification (explicit matrix, connectance, or link count plus a
//! symmetry flag — mutually exclusive), a scalar intensity, and (except
//! interference) a functional form.

use crate::blueprint::{Blueprint, ComponentId};
use crate::error::{ModelError, Result};
use crate::model::Model;
use ndarray::Array2;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Which non-trophic layer a blueprint/value belongs to (§ 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonTrophicKind {
    Competition,
    Facilitation,
    Interference,
    Refuge,
}

impl NonTrophicKind {
    fn component(self) -> ComponentId {
        match self {
            Self::Competition => "NonTrophicCompetition",
            Self::Facilitation => "NonTrophicFacilitation",
            Self::Interference => "NonTrophicInterference",
            Self::Refuge => "NonTrophicRefuge",
        }
    }

    fn edge_kind(self) -> &'static str {
        match self {
            Self::Competition => "competition",
            Self::Facilitation => "facilitation",
            Self::Interference => "interference",
            Self::Refuge => "refuge",
        }
    }

    fn symmetric_by_default(self) -> bool {
        matches!(self, Self::Competition | Self::Interference)
    }

    /// The potential-links template this layer may assign within (§ 3):
    /// competition is producer×producer; facilitation is any→producer;
    /// refuge is protected-prey×producer-provider; interference is pairs
    /// of predators sharing at least one prey.
    fn template(self, model: &Model) -> Array2<bool> {
        let n = model.value.n_species;
        let producers: std::collections::HashSet<usize> = model.value.producers().into_iter().collect();
        let foodweb = model.value.foodweb.clone().unwrap_or_else(|| Array2::from_elem((n, n), false));
        let mut mask = Array2::from_elem((n, n), false);
        match self {
            Self::Competition => {
                for &i in &producers {
                    for &j in &producers {
                        if i != j {
                            mask[[i, j]] = true;
                        }
                    }
                }
            }
            Self::Facilitation => {
                for i in 0..n {
                    for &j in &producers {
                        if i != j {
                            mask[[i, j]] = true;
                        }
                    }
                }
            }
            Self::Refuge => {
                // mask[prey, provider]: provider must be a producer.
                for prey in 0..n {
                    for &provider in &producers {
                        if prey != provider {
                            mask[[prey, provider]] = true;
                        }
                    }
                }
            }
            Self::Interference => {
                for i in 0..n {
                    for k in 0..n {
                        if i == k {
                            continue;
                        }
                        let shares_prey = (0..n).any(|j| foodweb[[i, j]] && foodweb[[k, j]]);
                        if shares_prey {
                            mask[[i, k]] = true;
                        }
                    }
                }
            }
        }
        mask
    }
}

/// `f(x, δ) → x'`, the default growth/rate modifiers (§ 4.5):
/// competition `x < 0 ? x : max(0, x·(1 − δ))`; facilitation `x·(1 + δ)`;
/// refuge `x/(1 + δ)`; interference has no functional form.
pub type FunctionalForm = fn(f64, f64) -> f64;

fn default_form(kind: NonTrophicKind) -> Option<FunctionalForm> {
    match kind {
        NonTrophicKind::Competition => Some(|x, delta| if x < 0.0 { x } else { (x * (1.0 - delta)).max(0.0) }),
        NonTrophicKind::Facilitation => Some(|x, delta| x * (1.0 + delta)),
        NonTrophicKind::Refuge => Some(|x, delta| x / (1.0 + delta)),
        NonTrophicKind::Interference => None,
    }
}

/// How the layer's adjacency is specified; mutually exclusive (§ 4.5).
#[derive(Debug, Clone)]
pub enum LayerTopology {
    Matrix(Array2<bool>),
    Connectance(f64),
    NumberOfLinks(usize),
}

/// A blueprint for one non-trophic layer (§ 4.5). Construct via
/// [`NonTrophicLayer::competition`]/`facilitation`/`interference`/`refuge`.
#[derive(Debug, Clone)]
pub struct NonTrophicLayer {
    kind: NonTrophicKind,
    topology: LayerTopology,
    symmetric: bool,
    intensity: f64,
    seed: u64,
}

impl NonTrophicLayer {
    fn new(kind: NonTrophicKind, topology: LayerTopology, intensity: f64, seed: u64) -> Self {
        Self { kind, topology, symmetric: kind.symmetric_by_default(), intensity, seed }
    }

    #[must_use]
    pub fn competition(topology: LayerTopology, intensity: f64, seed: u64) -> Self {
        Self::new(NonTrophicKind::Competition, topology, intensity, seed)
    }

    #[must_use]
    pub fn facilitation(topology: LayerTopology, intensity: f64, seed: u64) -> Self {
        Self::new(NonTrophicKind::Facilitation, topology, intensity, seed)
    }

    #[must_use]
    pub fn interference(topology: LayerTopology, intensity: f64, seed: u64) -> Self {
        Self::new(NonTrophicKind::Interference, topology, intensity, seed)
    }

    #[must_use]
    pub fn refuge(topology: LayerTopology, intensity: f64, seed: u64) -> Self {
        Self::new(NonTrophicKind::Refuge, topology, intensity, seed)
    }

    #[must_use]
    pub fn asymmetric(mut self) -> Self {
        self.symmetric = false;
        self
    }

    fn realize(&self, template: &Array2<bool>) -> Array2<bool> {
        match &self.topology {
            LayerTopology::Matrix(explicit) => explicit.clone(),
            LayerTopology::Connectance(c) => sample_by_probability(template, *c, self.symmetric, self.seed),
            LayerTopology::NumberOfLinks(l) => sample_by_count(template, *l, self.symmetric, self.seed),
        }
    }
}

fn sample_by_probability(template: &Array2<bool>, connectance: f64, symmetric: bool, seed: u64) -> Array2<bool> {
    let n = template.nrows();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut adjacency = Array2::from_elem((n, n), false);
    for i in 0..n {
        for j in 0..n {
            if !template[[i, j]] || (symmetric && j < i) {
                continue;
            }
            if rng.gen::<f64>() < connectance {
                adjacency[[i, j]] = true;
                if symmetric && template[[j, i]] {
                    adjacency[[j, i]] = true;
                }
            }
        }
    }
    adjacency
}

fn sample_by_count(template: &Array2<bool>, links: usize, symmetric: bool, seed: u64) -> Array2<bool> {
    let n = template.nrows();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut candidates: Vec<(usize, usize)> = Vec::new();
    for i in 0..n {
        for j in 0..n {
            if template[[i, j]] && (!symmetric || j >= i) {
                candidates.push((i, j));
            }
        }
    }
    candidates.shuffle(&mut rng);
    let mut adjacency = Array2::from_elem((n, n), false);
    for &(i, j) in candidates.iter().take(links) {
        adjacency[[i, j]] = true;
        if symmetric && template[[j, i]] {
            adjacency[[j, i]] = true;
        }
    }
    adjacency
}

impl Blueprint for NonTrophicLayer {
    fn component(&self) -> ComponentId {
        self.kind.component()
    }

    fn requires(&self) -> Vec<ComponentId> {
        vec!["Foodweb"]
    }

    fn early_check(&self) -> Result<()> {
        match &self.topology {
            LayerTopology::Connectance(c) if !(0.0..=1.0).contains(c) => Err(ModelError::BlueprintCheckFailure {
                message: format!("non-trophic layer connectance must lie in [0, 1], got {c}"),
            }),
            LayerTopology::NumberOfLinks(0) => {
                Err(ModelError::BlueprintCheckFailure { message: "non-trophic layer requires at least one link".into() })
            }
            _ => Ok(()),
        }
    }

    fn late_check(&self, model: &Model) -> Result<()> {
        let template = self.kind.template(model);
        if let LayerTopology::Matrix(explicit) = &self.topology {
            let n = model.value.n_species;
            if explicit.nrows() != n || explicit.ncols() != n {
                return Err(ModelError::DimensionMismatch {
                    message: format!("non-trophic layer matrix must be {n}x{n}, got {}x{}", explicit.nrows(), explicit.ncols()),
                });
            }
            for i in 0..n {
                for j in 0..n {
                    if explicit[[i, j]] && !template[[i, j]] {
                        return Err(ModelError::TemplateViolation {
                            message: format!("({i}, {j}) is not a valid {:?} link", self.kind),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn expand(self: Box<Self>, model: &mut Model) {
        let template = self.kind.template(model);
        let adjacency = self.realize(&template);
        for i in 0..adjacency.nrows() {
            for j in 0..adjacency.ncols() {
                if adjacency[[i, j]] {
                    model.value.topology.add_edge(self.kind.edge_kind(), i, j);
                }
            }
        }
        let data = NonTrophicLayerData { adjacency, intensity: self.intensity, form: default_form(self.kind) };
        match self.kind {
            NonTrophicKind::Competition => model.value.non_trophic.competition = Some(data),
            NonTrophicKind::Facilitation => model.value.non_trophic.facilitation = Some(data),
            NonTrophicKind::Interference => model.value.non_trophic.interference = Some(data),
            NonTrophicKind::Refuge => model.value.non_trophic.refuge = Some(data),
        }
    }
}

/// A realized non-trophic layer's data (§ 3): its adjacency, intensity,
/// and (except interference) functional form.
#[derive(Debug, Clone)]
pub struct NonTrophicLayerData {
    pub adjacency: Array2<bool>,
    pub intensity: f64,
    pub form: Option<FunctionalForm>,
}

/// All four non-trophic layers a model may carry (§ 3), each independent.
#[derive(Debug, Clone, Default)]
pub struct NonTrophicLayers {
    pub competition: Option<NonTrophicLayerData>,
    pub facilitation: Option<NonTrophicLayerData>,
    pub interference: Option<NonTrophicLayerData>,
    pub refuge: Option<NonTrophicLayerData>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::foodweb::Foodweb;

    fn chain_model() -> Model {
        let mut model = Model::new();
        model.add(Foodweb::AdjacencyList { n_species: 3, pairs: vec![(0, 1), (1, 2)] }).unwrap();
        model
    }

    #[test]
    fn facilitation_matrix_must_target_producers() {
        let mut model = chain_model();
        let mut bad = Array2::from_elem((3, 3), false);
        bad[[0, 1]] = true; // species 1 is a consumer, not a producer.
        let bp = NonTrophicLayer::facilitation(LayerTopology::Matrix(bad), 1.0, 0);
        assert!(model.add(bp).is_err());
    }

    #[test]
    fn facilitation_onto_producer_is_accepted() {
        let mut model = chain_model();
        let mut matrix = Array2::from_elem((3, 3), false);
        matrix[[0, 2]] = true; // species 2 is the basal producer.
        let bp = NonTrophicLayer::facilitation(LayerTopology::Matrix(matrix), 1.0, 0);
        model.add(bp).unwrap();
        assert!(model.value().non_trophic.facilitation.is_some());
    }

    #[test]
    fn default_competition_form_floors_at_zero() {
        let form = default_form(NonTrophicKind::Competition).unwrap();
        assert_eq!(form(1.0, 2.0), 0.0);
        assert_eq!(form(-1.0, 2.0), -1.0);
    }
}
