//! Pure biomass-vector observables (§ 4.9). Operate on a plain `&[f64]` so
//! they apply equally to a single step or to every step of a trajectory;
//! [`crate::solution::Solution`] exposes both the single-vector and the
//! series form.

/// `count(B_i > threshold)`.
#[must_use]
pub fn richness(biomass: &[f64], threshold: f64) -> usize {
    biomass.iter().filter(|&&b| b > threshold).count()
}

/// `richness / S`.
#[must_use]
pub fn persistence(biomass: &[f64], threshold: f64) -> f64 {
    if biomass.is_empty() {
        return 0.0;
    }
    richness(biomass, threshold) as f64 / biomass.len() as f64
}

/// `Σ B_i`.
#[must_use]
pub fn total_biomass(biomass: &[f64]) -> f64 {
    biomass.iter().sum()
}

/// `exp(-Σ p_i·ln p_i)` with `p_i = B_i / Σ B`. Species with non-positive
/// biomass contribute nothing (extinct species carry no information).
#[must_use]
pub fn shannon_diversity(biomass: &[f64]) -> f64 {
    let total: f64 = total_biomass(biomass);
    if total <= 0.0 {
        return 0.0;
    }
    let entropy: f64 = biomass
        .iter()
        .filter(|&&b| b > 0.0)
        .map(|&b| {
            let p = b / total;
            p * p.ln()
        })
        .sum();
    (-entropy).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn richness_counts_only_above_threshold() {
        assert_eq!(richness(&[0.0, 1.0, 2.0], 0.5), 2);
    }

    #[test]
    fn persistence_is_richness_over_total_species() {
        assert_relative_eq!(persistence(&[0.0, 1.0, 2.0, 3.0], 0.5), 0.75);
    }

    #[test]
    fn total_biomass_sums_all_entries() {
        assert_relative_eq!(total_biomass(&[1.0, 2.0, 3.0]), 6.0);
    }

    #[test]
    fn shannon_diversity_is_species_count_under_even_split() {
        // Evenly split biomass across n species gives diversity == n.
        assert_relative_eq!(shannon_diversity(&[1.0, 1.0, 1.0, 1.0]), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn shannon_diversity_ignores_extinct_species() {
        let even = shannon_diversity(&[1.0, 1.0]);
        let with_extinct = shannon_diversity(&[1.0, 1.0, 0.0]);
        assert_relative_eq!(even, with_extinct, epsilon = 1e-9);
    }

    #[test]
    fn all_extinct_has_zero_diversity() {
        assert_relative_eq!(shannon_diversity(&[0.0, 0.0]), 0.0);
    }
}
