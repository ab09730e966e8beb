//! The recorded outcome of a simulation (§ 4.8 step 5, § 6).

use crate::observables;
use ecodyn_model::Model;
use std::collections::BTreeMap;
use std::ops::Range;

/// How a simulation ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RetCode {
    /// Ran to `t_max` without triggering the steady-state check.
    Completed,
    /// The steady-state callback fired (§ 4.8 step 3).
    SteadyState,
    /// Cancelled cooperatively (§ 5 "Cancellation"); the trajectory is
    /// truncated at the last accepted step.
    Cancelled,
    /// The integrator could not continue; the trajectory is truncated at
    /// the last accepted step (§ 7 "Propagation policy").
    IntegratorFailure(String),
}

/// A recorded simulation run: the accepted-step trajectory, the extinction
/// log, and a deep copy of the model it was run against (§ 5
/// "Shared-resource discipline": later mutation of the source model cannot
/// alias a recorded run).
#[derive(Debug, Clone)]
pub struct Solution {
    model: Model,
    t: Vec<f64>,
    u: Vec<Vec<f64>>,
    extinctions: Vec<(usize, f64)>,
    retcode: RetCode,
}

impl Solution {
    pub(crate) fn new(model: Model, t: Vec<f64>, u: Vec<Vec<f64>>, extinctions: Vec<(usize, f64)>, retcode: RetCode) -> Self {
        Self { model, t, u, extinctions, retcode }
    }

    /// The recorded time points, one per accepted step (including `t0`).
    #[must_use]
    pub fn t(&self) -> &[f64] {
        &self.t
    }

    /// The recorded state vectors, one per accepted step, in the same order
    /// as [`Solution::t`].
    #[must_use]
    pub fn u(&self) -> &[Vec<f64>] {
        &self.u
    }

    /// The deep-copied model this solution was run against.
    #[must_use]
    pub fn get_model(&self) -> &Model {
        &self.model
    }

    /// The raw extinction log: `(species_index, time)` pairs in strictly
    /// increasing time order, lower species index first within a tie (§ 5
    /// "Ordering").
    #[must_use]
    pub fn get_extinctions(&self) -> &[(usize, f64)] {
        &self.extinctions
    }

    /// The `(species_label, time)` extinction log, ordered by time then
    /// species index (already the log's natural order), restricted to
    /// events on or before `date` if given (§ 4.9 "Extinction queries", § C
    /// `Solution::extinction_order()`).
    #[must_use]
    pub fn extinction_order(&self, date: Option<f64>) -> BTreeMap<String, f64> {
        let labels = self.model.value().species_labels.labels();
        self.extinctions
            .iter()
            .filter(|&&(_, t)| date.map_or(true, |d| t <= d))
            .filter_map(|&(i, t)| labels.get(i).map(|label| (label.clone(), t)))
            .collect()
    }

    /// The absolute state-vector range occupied by species biomasses.
    #[must_use]
    pub fn get_species_indices(&self) -> Range<usize> {
        0..self.model.value().n_species
    }

    /// The absolute state-vector range occupied by nutrient pools (empty if
    /// the model has no [`ecodyn_model::components::Nutrients`] component).
    #[must_use]
    pub fn get_nutrients_indices(&self) -> Range<usize> {
        let n = self.model.value().n_species;
        let n_nutrients = self.model.value().nutrients.as_ref().map_or(0, |data| data.n_nutrients);
        n..n + n_nutrients
    }

    #[must_use]
    pub fn retcode(&self) -> &RetCode {
        &self.retcode
    }

    fn species_biomass_at(&self, step: usize) -> &[f64] {
        &self.u[step][self.get_species_indices()]
    }

    #[must_use]
    pub fn richness(&self, threshold: f64) -> usize {
        observables::richness(self.species_biomass_at(self.u.len() - 1), threshold)
    }

    #[must_use]
    pub fn richness_series(&self, threshold: f64) -> Vec<usize> {
        (0..self.u.len()).map(|step| observables::richness(self.species_biomass_at(step), threshold)).collect()
    }

    #[must_use]
    pub fn persistence(&self, threshold: f64) -> f64 {
        observables::persistence(self.species_biomass_at(self.u.len() - 1), threshold)
    }

    #[must_use]
    pub fn persistence_series(&self, threshold: f64) -> Vec<f64> {
        (0..self.u.len()).map(|step| observables::persistence(self.species_biomass_at(step), threshold)).collect()
    }

    #[must_use]
    pub fn total_biomass(&self) -> f64 {
        observables::total_biomass(self.species_biomass_at(self.u.len() - 1))
    }

    #[must_use]
    pub fn total_biomass_series(&self) -> Vec<f64> {
        (0..self.u.len()).map(|step| observables::total_biomass(self.species_biomass_at(step))).collect()
    }

    #[must_use]
    pub fn shannon_diversity(&self) -> f64 {
        observables::shannon_diversity(self.species_biomass_at(self.u.len() - 1))
    }

    #[must_use]
    pub fn shannon_diversity_series(&self) -> Vec<f64> {
        (0..self.u.len()).map(|step| observables::shannon_diversity(self.species_biomass_at(step))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecodyn_model::components::{BodyMass, Foodweb, FunctionalResponse};

    fn toy_model() -> Model {
        let mut model = Model::new();
        model.add(Foodweb::AdjacencyList { n_species: 2, pairs: vec![(1, 0)] }).unwrap();
        model.add(BodyMass::Scalar(1.0)).unwrap();
        model.add(FunctionalResponse::linear()).unwrap();
        model
    }

    #[test]
    fn extinction_order_filters_by_date_and_resolves_labels() {
        let model = toy_model();
        let solution = Solution::new(
            model,
            vec![0.0, 1.0, 2.0],
            vec![vec![1.0, 1.0], vec![0.0, 1.0], vec![0.0, 0.5]],
            vec![(0, 1.0)],
            RetCode::Completed,
        );
        let before = solution.extinction_order(Some(0.5));
        assert!(before.is_empty());
        let after = solution.extinction_order(Some(1.0));
        assert_eq!(after.len(), 1);
    }

    #[test]
    fn species_and_nutrient_index_ranges_partition_the_state_vector() {
        let model = toy_model();
        let solution = Solution::new(model, vec![0.0], vec![vec![1.0, 1.0]], vec![], RetCode::Completed);
        assert_eq!(solution.get_species_indices(), 0..2);
        assert_eq!(solution.get_nutrients_indices(), 2..2);
    }
}
