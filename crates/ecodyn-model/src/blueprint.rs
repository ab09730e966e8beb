//! The blueprint/component lifecycle (§ 4.4, § 9).

use crate::error::Result;
use crate::model::Model;

/// A component identity. Components are singletons: at most one is active
/// per model (§ 4.4 "Component").
pub type ComponentId = &'static str;

/// A typed parameter bundle that expands into exactly one [`ComponentId`].
///
/// [`Model::add`] drives the six-step lifecycle from § 4.4: early check,
/// conflict check, requirements check, brought expansion, late check,
/// expand. `expand` itself must not fail — every way it could fail is
/// required to have already been caught by `early_check`/`late_check`.
pub trait Blueprint: std::fmt::Debug {
    /// The component this blueprint expands into.
    fn component(&self) -> ComponentId;

    /// Structural validation independent of model state.
    fn early_check(&self) -> Result<()> {
        Ok(())
    }

    /// Components that must be active (directly, or via `implies`) before
    /// this blueprint can expand.
    fn requires(&self) -> Vec<ComponentId> {
        Vec::new()
    }

    /// Components whose presence conflicts with this one, beyond the
    /// implicit "my own component is already active" conflict.
    fn conflicts(&self) -> Vec<ComponentId> {
        Vec::new()
    }

    /// Blueprints brought in automatically only if their component is not
    /// already satisfied.
    fn implies(&self) -> Vec<Box<dyn Blueprint>> {
        Vec::new()
    }

    /// Blueprints brought in unconditionally; erroring if their component is
    /// already present is the caller's ([`Model::add`]'s) job, not this
    /// method's.
    fn embeds(&self) -> Vec<Box<dyn Blueprint>> {
        Vec::new()
    }

    /// Whether adding this blueprint when its component is already active
    /// replaces it instead of raising `ComponentConflict`.
    fn idempotent_replacement(&self) -> bool {
        false
    }

    /// Validates dimensions, templates, and cross-component constraints
    /// against the assembled model (brought blueprints already expanded).
    fn late_check(&self, model: &Model) -> Result<()> {
        let _ = model;
        Ok(())
    }

    /// Deterministically writes this blueprint's data into `model`. Must not
    /// fail: anything that could fail belongs in `early_check`/`late_check`.
    fn expand(self: Box<Self>, model: &mut Model);
}

/// How a brought-in sub-blueprint was supplied (§ 9 design note).
///
/// Concrete blueprints store this as a typed field (e.g. a `Foodweb`
/// blueprint might carry `species: Brought<SpeciesBlueprint>`) so the brought
/// parameterization is inspectable and replaceable by a caller before
/// `Model::add` consumes it, rather than being hidden inside a method body.
#[derive(Debug, Clone)]
pub enum Brought<B> {
    /// The caller supplied an explicit blueprint to bring in.
    Embedded(B),
    /// Not supplied; construct via this default-construction function if
    /// (and only if, for `implies`) the component is not already active.
    Implied(fn() -> B),
    /// Not supplied and not implied; the parent blueprint does not bring
    /// this component in at all.
    Unbrought,
}

impl<B> Brought<B> {
    /// Resolves to a concrete blueprint value unless this is `Unbrought`.
    pub fn resolve(self) -> Option<B> {
        match self {
            Self::Embedded(b) => Some(b),
            Self::Implied(f) => Some(f()),
            Self::Unbrought => None,
        }
    }

    #[must_use]
    pub fn is_unbrought(&self) -> bool {
        matches!(self, Self::Unbrought)
    }
}

impl<B> Default for Brought<B> {
    fn default() -> Self {
        Self::Unbrought
    }
}
