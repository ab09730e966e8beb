//! Compares the generic derivative kernel against both specialized
//! (raw and compact) variants on the same frozen model, confirming the
//! specialization pays for itself on a foodweb with non-trivial size
//! (teacher convention: one bench file per subsystem, see
//! `examples/pplmx-primordium/crates/primordium_core/benches/brain_benchmarks.rs`).

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ecodynamics::components::{BodyMass, Foodweb, FunctionalResponse};
use ecodynamics::{default_model, DefaultModelOverrides, Derivative, GenericDerivative, SpecializationVariant, SpecializedDerivative};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn build_chain_model(n_species: usize) -> ecodynamics::Model {
    let pairs: Vec<(usize, usize)> = (1..n_species).map(|i| (i, i - 1)).collect();
    let foodweb = Foodweb::AdjacencyList { n_species, pairs };
    let overrides = DefaultModelOverrides {
        body_mass: Some(BodyMass::Scalar(1.0)),
        functional_response: Some(FunctionalResponse::bioenergetic()),
        ..Default::default()
    };
    default_model(foodweb, overrides).expect("chain model assembles")
}

fn random_state(n: usize, seed: u64) -> Vec<f64> {
    use rand::Rng;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(0.1..2.0)).collect()
}

fn bench_generic_kernel(c: &mut Criterion) {
    let model = build_chain_model(30);
    let derivative = GenericDerivative::try_new(&model, 1e-6).unwrap();
    let u = random_state(derivative.state_len(), 7);
    let mut du = vec![0.0; derivative.state_len()];

    c.bench_function("generic_kernel_30_species", |b| {
        b.iter(|| {
            derivative.evaluate(black_box(0.0), black_box(&u), black_box(&mut du));
            black_box(&du)
        })
    });
}

fn bench_specialized_raw_kernel(c: &mut Criterion) {
    let model = build_chain_model(30);
    let derivative = SpecializedDerivative::try_new(&model, 1e-6, SpecializationVariant::Raw).unwrap();
    let u = random_state(derivative.state_len(), 7);
    let mut du = vec![0.0; derivative.state_len()];

    c.bench_function("specialized_raw_kernel_30_species", |b| {
        b.iter(|| {
            derivative.evaluate(black_box(0.0), black_box(&u), black_box(&mut du));
            black_box(&du)
        })
    });
}

fn bench_specialized_compact_kernel(c: &mut Criterion) {
    let model = build_chain_model(30);
    let derivative = SpecializedDerivative::try_new(&model, 1e-6, SpecializationVariant::Compact).unwrap();
    let u = random_state(derivative.state_len(), 7);
    let mut du = vec![0.0; derivative.state_len()];

    c.bench_function("specialized_compact_kernel_30_species", |b| {
        b.iter(|| {
            derivative.evaluate(black_box(0.0), black_box(&u), black_box(&mut du));
            black_box(&du)
        })
    });
}

criterion_group!(benches, bench_generic_kernel, bench_specialized_raw_kernel, bench_specialized_compact_kernel);
criterion_main!(benches);
