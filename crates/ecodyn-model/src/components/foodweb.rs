//! The `Foodweb` component (§ 4.5): the boolean trophic adjacency matrix,
//! `A[i, j] = true` iff species `i` consumes species `j`.

use crate::blueprint::{Blueprint, ComponentId};
use crate::components::species::Species;
use crate::error::{ModelError, Result};
use crate::model::Model;
use ndarray::Array2;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;

const COMPONENT: ComponentId = "Foodweb";

/// Which structural random-graph generator to use (§ 4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralModel {
    Niche,
    Cascade,
}

/// The realized-connectance target a structural generator samples toward.
#[derive(Debug, Clone, Copy)]
pub enum StructuralTarget {
    Connectance(f64),
    NumberOfLinks(usize),
}

/// `Foodweb::Matrix`, `Foodweb::AdjacencyList`, or `Foodweb::Structural`
/// (§ 4.5).
#[derive(Debug, Clone)]
pub enum Foodweb {
    Matrix(Array2<bool>),
    AdjacencyList {
        n_species: usize,
        pairs: Vec<(usize, usize)>,
    },
    Structural {
        model: StructuralModel,
        n_species: usize,
        target: StructuralTarget,
        tolerance: f64,
        iter_max: usize,
        check_cycle: bool,
        check_disconnected: bool,
        seed: u64,
        generated: RefCell<Option<Array2<bool>>>,
    },
}

impl Foodweb {
    #[must_use]
    pub fn structural(
        model: StructuralModel,
        n_species: usize,
        target: StructuralTarget,
        tolerance: f64,
        iter_max: usize,
        seed: u64,
    ) -> Self {
        // § 9 open question: `check_cycle` defaults to `false`.
        Self::Structural {
            model,
            n_species,
            target,
            tolerance,
            iter_max,
            check_cycle: false,
            check_disconnected: false,
            seed,
            generated: RefCell::new(None),
        }
    }

    #[must_use]
    pub fn n_species(&self) -> usize {
        match self {
            Self::Matrix(a) => a.nrows(),
            Self::AdjacencyList { n_species, .. } | Self::Structural { n_species, .. } => *n_species,
        }
    }

    fn realized_matrix(&self) -> Array2<bool> {
        match self {
            Self::Matrix(a) => a.clone(),
            Self::AdjacencyList { n_species, pairs } => {
                let mut a = Array2::from_elem((*n_species, *n_species), false);
                for &(i, j) in pairs {
                    a[[i, j]] = true;
                }
                a
            }
            Self::Structural { generated, .. } => {
                generated.borrow().clone().expect("late_check must populate a structural matrix before expand")
            }
        }
    }
}

impl Blueprint for Foodweb {
    fn component(&self) -> ComponentId {
        COMPONENT
    }

    fn early_check(&self) -> Result<()> {
        match self {
            Self::Matrix(a) => {
                if a.nrows() != a.ncols() {
                    return Err(ModelError::DimensionMismatch {
                        message: format!("Foodweb::Matrix must be square, got {}x{}", a.nrows(), a.ncols()),
                    });
                }
                Ok(())
            }
            Self::AdjacencyList { n_species, pairs } => {
                for &(i, j) in pairs {
                    if i >= *n_species || j >= *n_species {
                        return Err(ModelError::OutOfBounds { index: i.max(j), size: *n_species });
                    }
                }
                Ok(())
            }
            Self::Structural { n_species, tolerance, iter_max, target, .. } => {
                if *n_species < 2 {
                    return Err(ModelError::BlueprintCheckFailure {
                        message: "structural foodweb generation requires at least 2 species".into(),
                    });
                }
                if *tolerance <= 0.0 || *iter_max == 0 {
                    return Err(ModelError::BlueprintCheckFailure {
                        message: "structural foodweb generation requires positive tolerance and iter_max".into(),
                    });
                }
                if let StructuralTarget::Connectance(c) = target {
                    if *c <= 0.0 || *c > 1.0 {
                        return Err(ModelError::BlueprintCheckFailure {
                            message: format!("connectance target must lie in (0, 1], got {c}"),
                        });
                    }
                }
                Ok(())
            }
        }
    }

    fn implies(&self) -> Vec<Box<dyn Blueprint>> {
        vec![Box::new(Species::Number(self.n_species()))]
    }

    fn late_check(&self, model: &Model) -> Result<()> {
        if model.value.n_species != self.n_species() {
            return Err(ModelError::DimensionMismatch {
                message: format!(
                    "Foodweb expects {} species, model has {}",
                    self.n_species(),
                    model.value.n_species
                ),
            });
        }
        if let Self::Structural {
            model: structural_model,
            n_species,
            target,
            tolerance,
            iter_max,
            check_cycle,
            check_disconnected,
            seed,
            generated,
        } = self
        {
            let matrix = generate_structural(
                *structural_model,
                *n_species,
                *target,
                *tolerance,
                *iter_max,
                *check_cycle,
                *check_disconnected,
                *seed,
            )?;
            *generated.borrow_mut() = Some(matrix);
        }
        Ok(())
    }

    fn expand(self: Box<Self>, model: &mut Model) {
        let matrix = self.realized_matrix();
        for i in 0..matrix.nrows() {
            for j in 0..matrix.ncols() {
                if matrix[[i, j]] {
                    model.value.topology.add_edge("trophic", i, j);
                }
            }
        }
        model.value.foodweb = Some(matrix);
    }
}

fn has_cycle(adjacency: &Array2<bool>) -> bool {
    let n = adjacency.nrows();
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }
    let mut marks = vec![Mark::Unvisited; n];

    fn visit(u: usize, adjacency: &Array2<bool>, marks: &mut [Mark]) -> bool {
        marks[u] = Mark::InProgress;
        for v in 0..adjacency.nrows() {
            if adjacency[[u, v]] {
                match marks[v] {
                    Mark::InProgress => return true,
                    Mark::Unvisited => {
                        if visit(v, adjacency, marks) {
                            return true;
                        }
                    }
                    Mark::Done => {}
                }
            }
        }
        marks[u] = Mark::Done;
        false
    }

    (0..n).any(|u| marks[u] == Mark::Unvisited && visit(u, adjacency, &mut marks))
}

fn is_weakly_connected(adjacency: &Array2<bool>) -> bool {
    let n = adjacency.nrows();
    if n == 0 {
        return true;
    }
    let mut visited = vec![false; n];
    let mut stack = vec![0usize];
    visited[0] = true;
    let mut count = 1;
    while let Some(u) = stack.pop() {
        for v in 0..n {
            if (adjacency[[u, v]] || adjacency[[v, u]]) && !visited[v] {
                visited[v] = true;
                count += 1;
                stack.push(v);
            }
        }
    }
    count == n
}

fn realized_connectance(adjacency: &Array2<bool>) -> f64 {
    let n = adjacency.nrows();
    if n == 0 {
        return 0.0;
    }
    let links = adjacency.iter().filter(|&&x| x).count();
    links as f64 / (n * n) as f64
}

fn meets_target(adjacency: &Array2<bool>, target: StructuralTarget, tolerance: f64) -> bool {
    match target {
        StructuralTarget::Connectance(c) => (realized_connectance(adjacency) - c).abs() <= tolerance,
        StructuralTarget::NumberOfLinks(l) => {
            let links = adjacency.iter().filter(|&&x| x).count();
            (links as f64 - l as f64).abs() <= tolerance
        }
    }
}

fn target_connectance(n: usize, target: StructuralTarget) -> f64 {
    match target {
        StructuralTarget::Connectance(c) => c,
        StructuralTarget::NumberOfLinks(l) => l as f64 / (n * n) as f64,
    }
}

fn sample_niche(rng: &mut ChaCha8Rng, n: usize, connectance: f64) -> Array2<bool> {
    let mut niche: Vec<f64> = (0..n).map(|_| rng.gen::<f64>()).collect();
    niche.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let beta = (1.0 / (2.0 * connectance.max(1e-6)) - 1.0).max(1e-6);
    let mut adjacency = Array2::from_elem((n, n), false);
    for i in 0..n {
        let u: f64 = rng.gen();
        let range = niche[i] * (1.0 - (1.0 - u).powf(1.0 / beta));
        let half = range / 2.0;
        let upper_bound = niche[i].min(1.0 - half).max(half);
        let center: f64 = if upper_bound > half { rng.gen_range(half..upper_bound) } else { half };
        let low = center - half;
        let high = center + half;
        for j in 0..n {
            if niche[j] >= low && niche[j] <= high {
                adjacency[[i, j]] = true;
            }
        }
    }
    adjacency
}

fn sample_cascade(rng: &mut ChaCha8Rng, n: usize, connectance: f64) -> Array2<bool> {
    let mut niche: Vec<f64> = (0..n).map(|_| rng.gen::<f64>()).collect();
    niche.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let p = if n > 1 { (2.0 * connectance * n as f64 / (n as f64 - 1.0)).min(1.0) } else { 0.0 };
    let mut adjacency = Array2::from_elem((n, n), false);
    for i in 0..n {
        for j in 0..i {
            if rng.gen::<f64>() < p {
                adjacency[[i, j]] = true;
            }
        }
    }
    adjacency
}

#[allow(clippy::too_many_arguments)]
fn generate_structural(
    model: StructuralModel,
    n: usize,
    target: StructuralTarget,
    tolerance: f64,
    iter_max: usize,
    check_cycle: bool,
    check_disconnected: bool,
    seed: u64,
) -> Result<Array2<bool>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let connectance = target_connectance(n, target);
    for attempt in 1..=iter_max {
        let adjacency = match model {
            StructuralModel::Niche => sample_niche(&mut rng, n, connectance),
            StructuralModel::Cascade => sample_cascade(&mut rng, n, connectance),
        };
        if !meets_target(&adjacency, target, tolerance) {
            continue;
        }
        if check_cycle && has_cycle(&adjacency) {
            continue;
        }
        if check_disconnected && !is_weakly_connected(&adjacency) {
            continue;
        }
        return Ok(adjacency);
    }
    Err(ModelError::FoodwebGenerationFailed {
        attempts: iter_max,
        message: "no sample met the connectance tolerance within the attempt budget".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_variant_rejects_non_square() {
        let a = Array2::from_elem((2, 3), false);
        assert!(Foodweb::Matrix(a).early_check().is_err());
    }

    #[test]
    fn adjacency_list_builds_expected_matrix() {
        let mut model = Model::new();
        model.add(Foodweb::AdjacencyList { n_species: 3, pairs: vec![(0, 1), (1, 2)] }).unwrap();
        let adjacency = model.value().foodweb.clone().unwrap();
        assert!(adjacency[[0, 1]]);
        assert!(adjacency[[1, 2]]);
        assert!(!adjacency[[0, 2]]);
    }

    #[test]
    fn structural_generation_meets_connectance_tolerance() {
        let bp = Foodweb::structural(StructuralModel::Niche, 12, StructuralTarget::Connectance(0.2), 0.08, 500, 7);
        let mut model = Model::new();
        model.add(bp).unwrap();
        let adjacency = model.value().foodweb.clone().unwrap();
        assert!((realized_connectance(&adjacency) - 0.2).abs() <= 0.08);
    }

    #[test]
    fn implausible_tolerance_eventually_fails() {
        let bp = Foodweb::structural(StructuralModel::Cascade, 4, StructuralTarget::Connectance(0.999), 1e-6, 5, 1);
        let mut model = Model::new();
        assert!(model.add(bp).is_err());
    }
}
