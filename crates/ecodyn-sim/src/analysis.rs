//! Post-extinction topology analyses (§ 4.8 step 6). Built from a model and
//! the final biomass vector of a trajectory: species with final biomass
//! `<= 0` are tombstoned before any of the queries below run, so results
//! reflect the network as it actually ended up, not as it started.

use ecodyn_graph::Topology;
use ecodyn_model::Model;
use std::collections::HashSet;

/// Builds the post-extinction topology (§ 4.8 step 6): a clone of the
/// model's topology with every species whose final biomass is `<= 0`
/// tombstoned. The species compartment is always registered first (the
/// `Species` blueprint is the first thing any `Foodweb` implies), so its
/// relative and absolute indices coincide.
#[must_use]
pub fn post_extinction_topology(model: &Model, final_biomass: &[f64]) -> Topology {
    let mut topology = model.value().topology.clone();
    for (i, &b) in final_biomass.iter().enumerate().take(model.value().n_species) {
        if b <= 0.0 {
            let _ = topology.remove_node(i, "species");
        }
    }
    topology
}

/// Producers with zero incoming and zero outgoing trophic edges in
/// `topology` (§ 4.8 step 6): they neither eat (producers never do) nor are
/// eaten, so they're fully severed from the trophic network.
#[must_use]
pub fn isolated_producers(model: &Model, topology: &Topology) -> Vec<usize> {
    model
        .value()
        .producers()
        .into_iter()
        .filter(|&i| topology.is_live(i))
        .filter(|&i| topology.incoming_indices(i, "trophic").is_empty() && topology.outgoing_indices(i, "trophic").is_empty())
        .collect()
}

fn reaches_producer(topology: &Topology, start: usize, producers: &HashSet<usize>) -> bool {
    let mut visited = HashSet::new();
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        if producers.contains(&node) {
            return true;
        }
        if !visited.insert(node) {
            continue;
        }
        stack.extend(topology.outgoing_indices(node, "trophic"));
    }
    false
}

/// Consumers with no directed trophic path (via outgoing "eats" edges) to
/// any live producer (§ 4.8 step 6): they have no food source left, even
/// indirectly.
#[must_use]
pub fn starving_consumers(model: &Model, topology: &Topology) -> Vec<usize> {
    let producers: HashSet<usize> = model.value().producers().into_iter().filter(|&i| topology.is_live(i)).collect();
    model
        .value()
        .consumers()
        .into_iter()
        .filter(|&i| topology.is_live(i))
        .filter(|&i| !reaches_producer(topology, i, &producers))
        .collect()
}

/// The post-extinction topology's weakly-connected components (§ 4.8 step
/// 6). More than one component is an advisory condition.
#[must_use]
pub fn disconnected_components(topology: &Topology) -> Vec<Topology> {
    topology.disconnected_components()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecodyn_model::components::{BodyMass, Foodweb, FunctionalResponse};

    fn chain_model() -> Model {
        let mut model = Model::new();
        model.add(Foodweb::AdjacencyList { n_species: 3, pairs: vec![(1, 0), (2, 1)] }).unwrap();
        model.add(BodyMass::Scalar(1.0)).unwrap();
        model
            .add(FunctionalResponse::linear())
            .unwrap();
        model
    }

    #[test]
    fn isolated_producer_detected_once_its_sole_predator_goes_extinct() {
        let model = chain_model();
        // species 0 is the producer, eaten only by species 1; snap 1 extinct.
        let final_biomass = vec![1.0, 0.0, 1.0];
        let topology = post_extinction_topology(&model, &final_biomass);
        assert_eq!(isolated_producers(&model, &topology), vec![0]);
    }

    #[test]
    fn starving_consumer_detected_once_its_prey_is_severed_from_producers() {
        let model = chain_model();
        // species 1 (middle) is extinct, so species 2 can no longer reach species 0.
        let final_biomass = vec![1.0, 0.0, 1.0];
        let topology = post_extinction_topology(&model, &final_biomass);
        assert_eq!(starving_consumers(&model, &topology), vec![2]);
    }

    #[test]
    fn intact_chain_has_a_single_connected_component() {
        let model = chain_model();
        let final_biomass = vec![1.0, 1.0, 1.0];
        let topology = post_extinction_topology(&model, &final_biomass);
        assert_eq!(disconnected_components(&topology).len(), 1);
    }
}
