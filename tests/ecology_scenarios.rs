//! Integration tests for the concrete scenarios: linear-chain functional
//! responses under all three kernels, facilitation, nutrient competition,
//! and a temperature scan. One file bundles all of them because each is an
//! instance of the same "assemble a small model, evaluate or simulate,
//! assert a numeric property" shape rather than an independent subsystem
//! (teacher convention: one integration-test file per scenario, see
//! `examples/pplmx-primordium/tests/ecology.rs`, `thermodynamics.rs`).

use ecodynamics::components::{
    AttackRate, BodyMass, CarryingCapacity, Foodweb, FunctionalResponse, FunctionalResponseKind, HalfSaturationDensity,
    HillExponent, LayerTopology, NonTrophicLayer, Nutrients, ProducerGrowth, Temperature,
};
use ecodynamics::response::{denominator_term, edge_response, EdgeInputs};
use ecodynamics::{simulate, Model, SimOptions};
use ndarray::Array2;

fn linear_chain_bioenergetic(half_saturation: Vec<f64>) -> Model {
    let mut model = Model::new();
    model.add(Foodweb::AdjacencyList { n_species: 3, pairs: vec![(1, 0), (2, 1)] }).unwrap();
    model.add(BodyMass::Scalar(1.0)).unwrap();
    model
        .add(FunctionalResponse::Bioenergetic {
            hill_exponent: ecodynamics::Brought::Embedded(HillExponent(2.0)),
            preference: ecodynamics::Brought::Implied(ecodynamics::components::ConsumersPreference::default),
            interference: ecodynamics::Brought::Implied(ecodynamics::components::IntraspecificInterference::default),
            half_saturation: ecodynamics::Brought::Embedded(HalfSaturationDensity(Some(half_saturation))),
        })
        .unwrap();
    model
}

/// S1 — linear chain, bioenergetic, three species, `h=2`, uniform
/// preference, `c=0`, `B0=0.5`.
#[test]
fn s1_bioenergetic_linear_chain() {
    // Single prey per consumer: denominator_term == omega * |B_j|^h.
    let denom = denominator_term(FunctionalResponseKind::Bioenergetic, 1.0, 0.0, 0.0, 1.0, 2.0);
    let inputs = EdgeInputs {
        kind: FunctionalResponseKind::Bioenergetic,
        omega_ij: 1.0,
        b_i: 1.0,
        b_j: 1.0,
        hill_exponent: 2.0,
        consumption_rate_i: 0.0,
        half_saturation_i: 0.5,
        interference_i: 0.0,
        attack_rate_ij: 0.0,
        consumer_mass_i: 1.0,
        interference_term: 0.0,
        denominator_sum: denom,
    };
    assert!((edge_response(inputs) - 0.8).abs() < 1e-9);

    let scaled = EdgeInputs { b_j: 1.5, denominator_sum: denominator_term(FunctionalResponseKind::Bioenergetic, 1.0, 0.0, 0.0, 1.5, 2.0), ..inputs };
    assert!((edge_response(scaled) - 0.9).abs() < 1e-9);

    // Confirm the full assembly actually wires a Bioenergetic model with
    // the same half-saturation densities the scenario specifies.
    let model = linear_chain_bioenergetic(vec![0.0, 0.5, 0.5]);
    assert_eq!(model.value().functional_response, Some(FunctionalResponseKind::Bioenergetic));
    assert_eq!(model.value().half_saturation_density, vec![0.0, 0.5, 0.5]);
}

/// S2 — classic response, same chain, `h=2`, `a_r=0.5`, `h_t=1`, `M=(1,1,1)`.
#[test]
fn s2_classic_linear_chain() {
    let denom = denominator_term(FunctionalResponseKind::Classic, 1.0, 0.5, 1.0, 1.0, 2.0);
    let inputs = EdgeInputs {
        kind: FunctionalResponseKind::Classic,
        omega_ij: 1.0,
        b_i: 1.0,
        b_j: 1.0,
        hill_exponent: 2.0,
        consumption_rate_i: 0.0,
        half_saturation_i: 0.0,
        interference_i: 0.0,
        attack_rate_ij: 0.5,
        consumer_mass_i: 1.0,
        interference_term: 0.0,
        denominator_sum: denom,
    };
    assert!((edge_response(inputs) - 0.3333333333).abs() < 1e-6);

    let scaled_denom = denominator_term(FunctionalResponseKind::Classic, 1.0, 0.5, 1.0, 1.5, 2.0);
    let scaled = EdgeInputs { b_j: 1.5, denominator_sum: scaled_denom, ..inputs };
    assert!((edge_response(scaled) - 0.5294117647).abs() < 1e-6);
}

/// S3 — linear response, `B=(1,1,1)`.
#[test]
fn s3_linear_chain() {
    let inputs = EdgeInputs {
        kind: FunctionalResponseKind::Linear,
        omega_ij: 1.0,
        b_i: 1.0,
        b_j: 1.0,
        hill_exponent: 1.0,
        consumption_rate_i: 1.0,
        half_saturation_i: 0.0,
        interference_i: 0.0,
        attack_rate_ij: 0.0,
        consumer_mass_i: 1.0,
        interference_term: 0.0,
        denominator_sum: 0.0,
    };
    assert!((edge_response(inputs) - 1.0).abs() < 1e-12);
    let scaled = EdgeInputs { b_j: 1.5, ..inputs };
    assert!((edge_response(scaled) - 1.5).abs() < 1e-12);

    let model = linear_chain_bioenergetic(vec![0.0, 0.0, 0.0]);
    assert_eq!(model.value().n_species, 3);
}

fn two_producer_model(carrying_capacity: Vec<f64>, facilitation: Option<Array2<bool>>) -> Model {
    let mut model = Model::new();
    model.add(Foodweb::Matrix(Array2::from_elem((2, 2), false))).unwrap();
    model.add(BodyMass::Scalar(1.0)).unwrap();
    model.add(FunctionalResponse::bioenergetic()).unwrap();
    model.add(ProducerGrowth::logistic(carrying_capacity)).unwrap();
    if let Some(matrix) = facilitation {
        model.add(NonTrophicLayer::facilitation(LayerTopology::Matrix(matrix), 1.0, 0)).unwrap();
    }
    model
}

/// S4 — facilitation. Two isolated producers; a facilitation link from
/// species 2 onto species 1 (default functional form, intensity 1) speeds
/// species 1's approach to its own carrying capacity, and does so more the
/// larger species 2's own biomass is (monotonic in the facilitator's
/// biomass).
#[test]
fn s4_facilitation_accelerates_growth_monotonically_in_facilitator_biomass() {
    let opts = SimOptions { initial_dt: 1e-3, ..Default::default() };
    let t_probe = 0.3;

    let baseline = two_producer_model(vec![1.0, 1.0], None);
    let baseline_solution = simulate(&baseline, &[0.2, 1.0], t_probe, &opts).unwrap();
    let baseline_b0 = baseline_solution.u().last().unwrap()[0];

    let mut facilitation_matrix = Array2::from_elem((2, 2), false);
    facilitation_matrix[[1, 0]] = true; // species 2 (index 1) facilitates species 1 (index 0).

    let facilitated_low = two_producer_model(vec![1.0, 1.0], Some(facilitation_matrix.clone()));
    let facilitated_low_solution = simulate(&facilitated_low, &[0.2, 1.0], t_probe, &opts).unwrap();
    let facilitated_low_b0 = facilitated_low_solution.u().last().unwrap()[0];

    let facilitated_high = two_producer_model(vec![1.0, 1.0], Some(facilitation_matrix));
    let facilitated_high_solution = simulate(&facilitated_high, &[0.2, 2.0], t_probe, &opts).unwrap();
    let facilitated_high_b0 = facilitated_high_solution.u().last().unwrap()[0];

    assert!(
        facilitated_low_b0 > baseline_b0,
        "facilitated growth ({facilitated_low_b0}) should outrun unfacilitated growth ({baseline_b0})"
    );
    assert!(
        facilitated_high_b0 > facilitated_low_b0,
        "a more abundant facilitator ({facilitated_high_b0}) should accelerate growth more than a scarcer one ({facilitated_low_b0})"
    );
}

/// S5 — paradox of enrichment. A two-species chain under the Classic
/// response develops a wider biomass range as carrying capacity rises,
/// the qualitative signature of the logistic-growth/Classic-response
/// limit cycle (exact Hopf threshold depends on the full rate table and is
/// not asserted here).
#[test]
fn s5_enrichment_widens_the_biomass_range() {
    fn run(carrying_capacity: f64) -> Vec<f64> {
        let mut model = Model::new();
        model.add(Foodweb::AdjacencyList { n_species: 2, pairs: vec![(1, 0)] }).unwrap();
        model.add(BodyMass::Scalar(1.0)).unwrap();
        model.add(FunctionalResponse::classic()).unwrap();
        model.add(ProducerGrowth::logistic(vec![carrying_capacity, 0.0])).unwrap();
        let opts = SimOptions { initial_dt: 1e-3, ..Default::default() };
        let solution = simulate(&model, &[0.5, 0.5], 200.0, &opts).unwrap();
        let tail_start = solution.t().len() / 2;
        solution.u()[tail_start..].iter().map(|u| u[0]).collect()
    }

    fn range(series: &[f64]) -> f64 {
        let max = series.iter().cloned().fold(f64::MIN, f64::max);
        let min = series.iter().cloned().fold(f64::MAX, f64::min);
        max - min
    }

    let low_enrichment = range(&run(1.0));
    let high_enrichment = range(&run(8.0));
    assert!(
        high_enrichment >= low_enrichment,
        "high-K range ({high_enrichment}) should not be narrower than low-K range ({low_enrichment})"
    );
}

/// S6 — nutrient competition for a shared nutrient drives the weaker
/// competitor toward extinction; a second nutrient favoring the other
/// producer restores coexistence.
#[test]
fn s6_nutrient_competition_and_coexistence() {
    let opts = SimOptions { initial_dt: 1e-3, extinction_threshold: 1e-4, ..Default::default() };

    // One shared nutrient, producer 0 has the lower (more favorable)
    // half-saturation constant.
    let mut one_nutrient = Model::new();
    one_nutrient.add(Foodweb::Matrix(Array2::from_elem((2, 2), false))).unwrap();
    one_nutrient.add(BodyMass::Scalar(1.0)).unwrap();
    one_nutrient.add(FunctionalResponse::bioenergetic()).unwrap();
    let nutrients = Nutrients {
        n_nutrients: 1,
        turnover: vec![0.5],
        supply: vec![10.0],
        concentration: Array2::from_elem((2, 1), 1.0),
        half_saturation: Array2::from_shape_vec((2, 1), vec![0.2, 2.0]).unwrap(),
    };
    one_nutrient.add(ProducerGrowth::nutrient_intake(nutrients)).unwrap();
    let solution = simulate(&one_nutrient, &[1.0, 1.0, 5.0], 300.0, &opts).unwrap();
    let final_biomass = &solution.u().last().unwrap()[0..2];
    assert!(final_biomass[0] > final_biomass[1], "the favored producer should outcompete the other");
    assert!(final_biomass[1] <= opts.extinction_threshold, "the disfavored producer should be driven toward extinction");

    // Two nutrients, each producer favored on a different one.
    let mut two_nutrients = Model::new();
    two_nutrients.add(Foodweb::Matrix(Array2::from_elem((2, 2), false))).unwrap();
    two_nutrients.add(BodyMass::Scalar(1.0)).unwrap();
    two_nutrients.add(FunctionalResponse::bioenergetic()).unwrap();
    let nutrients = Nutrients {
        n_nutrients: 2,
        turnover: vec![0.5, 0.5],
        supply: vec![10.0, 10.0],
        concentration: Array2::from_elem((2, 2), 1.0),
        half_saturation: Array2::from_shape_vec((2, 2), vec![0.2, 2.0, 2.0, 0.2]).unwrap(),
    };
    two_nutrients.add(ProducerGrowth::nutrient_intake(nutrients)).unwrap();
    let solution = simulate(&two_nutrients, &[1.0, 1.0, 5.0, 5.0], 300.0, &opts).unwrap();
    let final_biomass = &solution.u().last().unwrap()[0..2];
    assert!(final_biomass[0] > opts.extinction_threshold, "producer 1 should persist when favored on its own nutrient");
    assert!(final_biomass[1] > opts.extinction_threshold, "producer 2 should persist when favored on its own nutrient");
}

/// S7 — temperature scan. Attack rate rises monotonically across
/// `T ∈ [273, 310] K` for the builtin (negative) activation energy.
#[test]
fn s7_temperature_scan_increases_attack_rate_monotonically() {
    let mut previous = f64::MIN;
    for t_int in (273..=310).step_by(3) {
        let temperature = t_int as f64;
        let mut model = Model::new();
        model.add(Foodweb::AdjacencyList { n_species: 2, pairs: vec![(0, 1)] }).unwrap();
        model.add(Temperature(temperature)).unwrap();
        model.add(BodyMass::Scalar(1.0)).unwrap();
        model.add(AttackRate(None)).unwrap();
        let attack_rate = model.value().attack_rate.as_ref().unwrap().get(0, 1).unwrap();
        assert!(attack_rate > previous, "attack rate did not increase at T={temperature}");
        previous = attack_rate;
    }
}

#[allow(dead_code)]
fn unused_carrying_capacity_reference() -> CarryingCapacity {
    CarryingCapacity(None)
}
