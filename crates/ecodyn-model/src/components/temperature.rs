//! The `Temperature` component (§ 3, § 4.6): an optional scalar (Kelvin)
//! that toggles Boltzmann–Arrhenius rate correction.
//!
//! Rate-deriving blueprints (`Metabolism`, `HandlingTime`, `AttackRate`,
//! `GrowthRate`, …) read `model.value.temperature` at their own `expand`
//! time, so `Temperature` must be added before them to take effect; adding
//! it afterwards does not retroactively recompute already-expanded rates
//! (§ 4.4 "Writing a non-terminal property" — the same reasoning applies
//! to component ordering, since recomputation would require mutating
//! already-committed derived state outside the write-hook mechanism).

use crate::blueprint::{Blueprint, ComponentId};
use crate::error::{ModelError, Result};
use crate::model::Model;

const COMPONENT: ComponentId = "Temperature";

#[derive(Debug, Clone, Copy)]
pub struct Temperature(pub f64);

impl Blueprint for Temperature {
    fn component(&self) -> ComponentId {
        COMPONENT
    }

    fn early_check(&self) -> Result<()> {
        if self.0 <= 0.0 {
            return Err(ModelError::BlueprintCheckFailure {
                message: format!("temperature must be a positive Kelvin value, got {}", self.0),
            });
        }
        Ok(())
    }

    fn expand(self: Box<Self>, model: &mut Model) {
        model.value.temperature = Some(self.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_temperature_is_rejected() {
        assert!(Temperature(-1.0).early_check().is_err());
    }

    #[test]
    fn expand_sets_model_temperature() {
        let mut model = Model::new();
        model.add(Temperature(300.0)).unwrap();
        assert_eq!(model.value().temperature, Some(300.0));
    }
}
