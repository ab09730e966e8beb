//! The two canonical aliasing tables used across the model: interaction
//! kinds (§ 6 "trophic", "competition", …) and blueprint parameter names
//! (§ 6 "topology"/"A", "intensity"/"I", …).

use crate::AliasingMap;

/// The five edge kinds the topology distinguishes (§ 4.3): one trophic
/// layer plus the four non-trophic layers (§ 4.5 `NonTrophicLayer`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    Trophic,
    Competition,
    Facilitation,
    Interference,
    Refuge,
}

/// The parameter names a non-trophic layer blueprint exposes (§ 4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    Topology,
    Intensity,
    FunctionalForm,
    Connectance,
    NumberOfLinks,
    Symmetry,
}

/// Builds the standard interaction-kind aliasing map.
///
/// # Panics
///
/// Never, in practice: the alias lists below are hand-curated and covered by
/// a unit test that would catch a duplicate/ambiguous alias regression.
#[must_use]
pub fn interaction_aliases() -> AliasingMap<InteractionKind> {
    AliasingMap::build(vec![
        (InteractionKind::Trophic, vec!["trophic", "feeding", "predation"]),
        (InteractionKind::Competition, vec!["competition", "comp"]),
        (InteractionKind::Facilitation, vec!["facilitation", "facil"]),
        (InteractionKind::Interference, vec!["interference", "interf"]),
        (InteractionKind::Refuge, vec!["refuge", "shelter"]),
    ])
    .expect("builtin interaction aliases are non-ambiguous by construction")
}

/// Builds the standard blueprint-parameter aliasing map.
///
/// # Panics
///
/// Never, in practice: see [`interaction_aliases`].
#[must_use]
pub fn parameter_aliases() -> AliasingMap<ParameterKind> {
    AliasingMap::build(vec![
        (ParameterKind::Topology, vec!["topology", "A"]),
        (ParameterKind::Intensity, vec!["intensity", "I"]),
        (ParameterKind::FunctionalForm, vec!["functional_form", "F"]),
        (ParameterKind::Connectance, vec!["connectance", "C"]),
        (ParameterKind::NumberOfLinks, vec!["number_of_links", "L"]),
        (ParameterKind::Symmetry, vec!["symmetry", "sym"]),
    ])
    .expect("builtin parameter aliases are non-ambiguous by construction")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interaction_aliases_resolve() {
        let map = interaction_aliases();
        assert_eq!(map.standardize("feeding").unwrap(), InteractionKind::Trophic);
        assert_eq!(map.standardize("comp").unwrap(), InteractionKind::Competition);
    }

    #[test]
    fn parameter_aliases_resolve_short_forms() {
        let map = parameter_aliases();
        assert_eq!(map.standardize("A").unwrap(), ParameterKind::Topology);
        assert_eq!(map.standardize("L").unwrap(), ParameterKind::NumberOfLinks);
    }
}
