//! The specialization path (§ 4.7 "Specialization path", § 9 design note):
//! given a frozen model, flatten the nonzero trophic indices once so that
//! every subsequent [`Derivative::evaluate`] call replays them instead of
//! re-scanning the `n x n` foodweb matrix.
//!
//! Two variants, both built from the same [`NonzeroLink`] list so they stay
//! observationally equivalent to each other and to
//! [`crate::kernel::GenericDerivative`] by construction (§ 8 invariant 4):
//!
//! - [`SpecializationVariant::Raw`] — a flat `Vec<NonzeroLink>` walked twice
//!   per call (denominators, then responses) with `n`-sized scratch buffers.
//!   No grouping indirection, which wins when `S ≲ 20` (§ 4.7).
//! - [`SpecializationVariant::Compact`] — the same links sorted and grouped
//!   by consumer into `O(1)`-bounded per-consumer slices (CSR-style offsets),
//!   so the inner loop never scans prey that aren't this consumer's.

use crate::error::{DynamicsError, Result};
use crate::response::{
    assimilation_gain, clamp_extinct, denominator_term, edge_response, logistic_growth, maintenance_loss,
    nutrient_derivative, nutrient_growth, predation_loss, refuge_adjusted_attack_rate, EdgeInputs,
};
use crate::trait_def::Derivative;
use ecodyn_model::components::{FunctionalResponseKind, NonTrophicLayerData, NutrientsData, ProducerGrowthKind};
use ecodyn_model::Model;
use ndarray::Array2;
use tracing::instrument;

/// Which specialized layout to build (§ 4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecializationVariant {
    Raw,
    Compact,
}

/// One flattened trophic edge `(i, j)` with every scalar the functional
/// response needs, precomputed once at freeze time.
#[derive(Debug, Clone, Copy)]
struct NonzeroLink {
    i: usize,
    j: usize,
    omega_ij: f64,
    attack_rate_ij: f64,
    handling_time_ij: f64,
    efficiency_ij: f64,
}

fn dense_from_sparse(sparse: &ecodyn_graph::SparseMatrix<f64>, n: usize) -> Array2<f64> {
    let mut dense = Array2::zeros((n, n));
    for (i, j) in sparse.nonzero_indices() {
        dense[[i, j]] = sparse.get(i, j).unwrap_or(0.0);
    }
    dense
}

/// A frozen model's derivative function, specialized for a fixed model
/// shape (§ 4.7 "Specialization path"). Construct via
/// [`SpecializedDerivative::try_new`].
#[derive(Debug, Clone)]
pub struct SpecializedDerivative {
    variant: SpecializationVariant,
    n_species: usize,
    n_nutrients: usize,
    kind: FunctionalResponseKind,
    links: Vec<NonzeroLink>,
    /// `Compact` only: `consumer_offsets[i]..consumer_offsets[i+1]` indexes
    /// into `links` for consumer `i`'s prey. Empty for `Raw`.
    consumer_offsets: Vec<usize>,
    /// `Compact` only: `predator_offsets[j]..predator_offsets[j+1]` indexes
    /// into `links_by_prey` for prey `j`'s predators. Empty for `Raw`.
    predator_offsets: Vec<usize>,
    links_by_prey: Vec<NonzeroLink>,
    hill_exponent: f64,
    interference_coefficient: Vec<f64>,
    half_saturation_density: Vec<f64>,
    consumption_rate: Vec<f64>,
    body_mass: Vec<f64>,
    mortality: Vec<f64>,
    metabolism: Vec<f64>,
    growth_rate: Vec<f64>,
    producer_growth_kind: Option<ProducerGrowthKind>,
    carrying_capacity: Vec<f64>,
    producer_competition: Array2<f64>,
    nutrients: Option<NutrientsData>,
    competition: Option<NonTrophicLayerData>,
    facilitation: Option<NonTrophicLayerData>,
    interference_layer: Option<NonTrophicLayerData>,
    refuge: Option<NonTrophicLayerData>,
    extinction_threshold: f64,
}

impl SpecializedDerivative {
    /// Freezes `model` into a specialized kernel of the given `variant`.
    /// Errors exactly as [`crate::kernel::GenericDerivative::try_new`] does
    /// when a required component is missing.
    pub fn try_new(model: &Model, extinction_threshold: f64, variant: SpecializationVariant) -> Result<Self> {
        let value = model.value();
        let n = value.n_species;
        let kind = value.functional_response.ok_or(DynamicsError::MissingFunctionalResponse)?;
        let foodweb = value.foodweb.clone().unwrap_or_else(|| Array2::from_elem((n, n), false));
        let preference = value
            .preference
            .as_ref()
            .map(|s| dense_from_sparse(s, n))
            .ok_or(DynamicsError::MissingComponent { component: "ConsumersPreference" })?;
        let efficiency = value.efficiency.as_ref().map(|s| dense_from_sparse(s, n)).unwrap_or_else(|| Array2::zeros((n, n)));
        let handling_time = value.handling_time.as_ref().map(|s| dense_from_sparse(s, n)).unwrap_or_else(|| Array2::zeros((n, n)));
        let attack_rate = value.attack_rate.as_ref().map(|s| dense_from_sparse(s, n)).unwrap_or_else(|| Array2::zeros((n, n)));
        let nutrients = value.nutrients.clone();
        let n_nutrients = nutrients.as_ref().map_or(0, |n| n.n_nutrients);

        let mut links = Vec::new();
        for i in 0..n {
            for j in 0..n {
                if foodweb[[i, j]] {
                    links.push(NonzeroLink {
                        i,
                        j,
                        omega_ij: preference[[i, j]],
                        attack_rate_ij: attack_rate[[i, j]],
                        handling_time_ij: handling_time[[i, j]],
                        efficiency_ij: efficiency[[i, j]],
                    });
                }
            }
        }

        let (consumer_offsets, predator_offsets, links_by_prey) = match variant {
            SpecializationVariant::Raw => (Vec::new(), Vec::new(), Vec::new()),
            SpecializationVariant::Compact => {
                let mut by_consumer = links.clone();
                by_consumer.sort_by_key(|l| l.i);
                let mut consumer_offsets = vec![0usize; n + 1];
                for link in &by_consumer {
                    consumer_offsets[link.i + 1] += 1;
                }
                for k in 0..n {
                    consumer_offsets[k + 1] += consumer_offsets[k];
                }

                let mut by_prey = links.clone();
                by_prey.sort_by_key(|l| l.j);
                let mut predator_offsets = vec![0usize; n + 1];
                for link in &by_prey {
                    predator_offsets[link.j + 1] += 1;
                }
                for k in 0..n {
                    predator_offsets[k + 1] += predator_offsets[k];
                }

                links = by_consumer;
                (consumer_offsets, predator_offsets, by_prey)
            }
        };

        Ok(Self {
            variant,
            n_species: n,
            n_nutrients,
            kind,
            links,
            consumer_offsets,
            predator_offsets,
            links_by_prey,
            hill_exponent: value.hill_exponent,
            interference_coefficient: value.interference.clone(),
            half_saturation_density: value.half_saturation_density.clone(),
            consumption_rate: value.consumption_rate.clone(),
            body_mass: value.body_mass.clone(),
            mortality: value.mortality.clone(),
            metabolism: value.metabolism.clone(),
            growth_rate: value.growth_rate.clone(),
            producer_growth_kind: value.producer_growth,
            carrying_capacity: value.carrying_capacity.clone(),
            producer_competition: value.producer_competition.clone().unwrap_or_else(|| Array2::eye(n)),
            nutrients,
            competition: value.non_trophic.competition.clone(),
            facilitation: value.non_trophic.facilitation.clone(),
            interference_layer: value.non_trophic.interference.clone(),
            refuge: value.non_trophic.refuge.clone(),
            extinction_threshold,
        })
    }

    #[must_use]
    pub fn variant(&self) -> SpecializationVariant {
        self.variant
    }

    fn consumer_links(&self, i: usize) -> &[NonzeroLink] {
        match self.variant {
            SpecializationVariant::Raw => &[],
            SpecializationVariant::Compact => &self.links[self.consumer_offsets[i]..self.consumer_offsets[i + 1]],
        }
    }

    fn prey_links(&self, j: usize) -> &[NonzeroLink] {
        match self.variant {
            SpecializationVariant::Raw => &[],
            SpecializationVariant::Compact => &self.links_by_prey[self.predator_offsets[j]..self.predator_offsets[j + 1]],
        }
    }

    fn refuge_sum(&self, j: usize, b: &[f64]) -> f64 {
        let Some(layer) = &self.refuge else { return 0.0 };
        (0..self.n_species).filter(|&k| layer.adjacency[[j, k]]).map(|k| b[k]).sum()
    }

    fn interference_term(&self, i: usize, b: &[f64]) -> f64 {
        let Some(layer) = &self.interference_layer else { return 0.0 };
        (0..self.n_species).filter(|&k| layer.adjacency[[i, k]]).map(|k| layer.intensity * b[k]).sum()
    }

    fn facilitation_multiplier(&self, i: usize, b: &[f64]) -> f64 {
        let Some(layer) = &self.facilitation else { return 1.0 };
        let sum: f64 = (0..self.n_species).filter(|&k| layer.adjacency[[k, i]]).map(|k| b[k]).sum();
        layer.form.map_or(1.0, |f| f(1.0, layer.intensity * sum))
    }

    fn competition_multiplier(&self, i: usize, b: &[f64]) -> f64 {
        let Some(layer) = &self.competition else { return 1.0 };
        let sum: f64 = (0..self.n_species).filter(|&k| layer.adjacency[[i, k]]).map(|k| b[k]).sum();
        layer.form.map_or(1.0, |f| f(1.0, layer.intensity * sum))
    }

    fn response_for(&self, link: &NonzeroLink, b: &[f64], denominator_sum: f64) -> f64 {
        let attack_rate_ij = if let Some(layer) = &self.refuge {
            refuge_adjusted_attack_rate(link.attack_rate_ij, layer.intensity, self.refuge_sum(link.j, b))
        } else {
            link.attack_rate_ij
        };
        edge_response(EdgeInputs {
            kind: self.kind,
            omega_ij: link.omega_ij,
            b_i: b[link.i],
            b_j: b[link.j],
            hill_exponent: self.hill_exponent,
            consumption_rate_i: self.consumption_rate.get(link.i).copied().unwrap_or(0.0),
            half_saturation_i: self.half_saturation_density.get(link.i).copied().unwrap_or(0.0),
            interference_i: self.interference_coefficient.get(link.i).copied().unwrap_or(0.0),
            attack_rate_ij,
            consumer_mass_i: self.body_mass.get(link.i).copied().unwrap_or(1.0),
            interference_term: self.interference_term(link.i, b),
            denominator_sum,
        })
    }

    fn producer_growth(&self, i: usize, b: &[f64], n: &[f64]) -> f64 {
        let mut g = match self.producer_growth_kind {
            Some(ProducerGrowthKind::Logistic) => {
                let competition_sum: f64 = (0..self.n_species)
                    .filter(|&k| self.producer_competition[[i, k]] != 0.0)
                    .map(|k| self.producer_competition[[i, k]] * b[k])
                    .sum();
                let capacity = self.carrying_capacity.get(i).copied().unwrap_or(1.0);
                if capacity <= 0.0 {
                    0.0
                } else {
                    logistic_growth(self.growth_rate[i], b[i], competition_sum, capacity)
                }
            }
            Some(ProducerGrowthKind::NutrientIntake) => {
                let Some(nutrients) = &self.nutrients else { return 0.0 };
                let limiting_factor = (0..nutrients.n_nutrients)
                    .map(|l| {
                        let k_il = nutrients.half_saturation[[i, l]];
                        n[l] / (k_il + n[l])
                    })
                    .fold(f64::INFINITY, f64::min);
                nutrient_growth(self.growth_rate[i], b[i], limiting_factor)
            }
            None => 0.0,
        };
        if g > 0.0 {
            g *= self.competition_multiplier(i, b);
        }
        g *= self.facilitation_multiplier(i, b);
        g
    }

    /// The `Raw` evaluation: two flat passes over `links`, accumulating into
    /// `n`-sized scratch buffers rather than grouping by consumer.
    fn evaluate_raw(&self, b: &[f64], n_state: &[f64], du: &mut [f64]) {
        let n = self.n_species;
        let mut denominator_sum = vec![0.0_f64; n];
        for link in &self.links {
            denominator_sum[link.i] += denominator_term(
                self.kind,
                link.omega_ij,
                link.attack_rate_ij,
                link.handling_time_ij,
                b[link.j],
                self.hill_exponent,
            );
        }

        let mut assimilated = vec![0.0_f64; n];
        let mut predation_sum = vec![0.0_f64; n];
        for link in &self.links {
            let response = self.response_for(link, b, denominator_sum[link.i]);
            assimilated[link.i] += link.efficiency_ij * response;
            predation_sum[link.j] += b[link.j] * response;
        }

        for i in 0..n {
            let growth = self.producer_growth(i, b, n_state);
            let gain = assimilation_gain(b[i], assimilated[i]);
            let loss = predation_loss(predation_sum[i]);
            let maintenance = maintenance_loss(self.metabolism[i], self.mortality[i], b[i]);
            du[i] = clamp_extinct(growth + gain - loss - maintenance, b[i], self.extinction_threshold);
        }
    }

    /// The `Compact` evaluation: nested loops bounded by precomputed
    /// per-consumer/per-prey offset ranges, no filtering inside the loop.
    fn evaluate_compact(&self, b: &[f64], n_state: &[f64], du: &mut [f64]) {
        let n = self.n_species;
        for i in 0..n {
            let consumer_links = self.consumer_links(i);
            let denominator_sum: f64 = consumer_links
                .iter()
                .map(|link| denominator_term(self.kind, link.omega_ij, link.attack_rate_ij, link.handling_time_ij, b[link.j], self.hill_exponent))
                .sum();
            let assimilated: f64 = consumer_links.iter().map(|link| link.efficiency_ij * self.response_for(link, b, denominator_sum)).sum();

            let predator_links = self.prey_links(i);
            let loss_sum: f64 = predator_links
                .iter()
                .map(|link| {
                    let consumer_denominator: f64 = self
                        .consumer_links(link.i)
                        .iter()
                        .map(|l| denominator_term(self.kind, l.omega_ij, l.attack_rate_ij, l.handling_time_ij, b[l.j], self.hill_exponent))
                        .sum();
                    b[link.i] * self.response_for(link, b, consumer_denominator)
                })
                .sum();

            let growth = self.producer_growth(i, b, n_state);
            let gain = assimilation_gain(b[i], assimilated);
            let loss = predation_loss(loss_sum);
            let maintenance = maintenance_loss(self.metabolism[i], self.mortality[i], b[i]);
            du[i] = clamp_extinct(growth + gain - loss - maintenance, b[i], self.extinction_threshold);
        }
    }
}

impl Derivative for SpecializedDerivative {
    #[instrument(level = "trace", skip(self, u, du), fields(n_species = self.n_species, variant = ?self.variant))]
    fn evaluate(&self, _t: f64, u: &[f64], du: &mut [f64]) {
        let n = self.n_species;
        let b = &u[..n];
        let n_state = &u[n..n + self.n_nutrients];

        match self.variant {
            SpecializationVariant::Raw => self.evaluate_raw(b, n_state, du),
            SpecializationVariant::Compact => self.evaluate_compact(b, n_state, du),
        }

        if let Some(nutrients) = &self.nutrients {
            for l in 0..nutrients.n_nutrients {
                let uptake: f64 = (0..n).map(|i| nutrients.concentration[[i, l]] * self.producer_growth(i, b, n_state) * b[i]).sum();
                du[n + l] = nutrient_derivative(nutrients.turnover[l], nutrients.supply[l], n_state[l], uptake);
            }
        }
    }

    fn state_len(&self) -> usize {
        self.n_species + self.n_nutrients
    }

    fn n_species(&self) -> usize {
        self.n_species
    }
}
