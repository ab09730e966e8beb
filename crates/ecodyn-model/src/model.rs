//! The assembled model value, its active-component set, and the property
//! registry (§ 4.4).

use crate::blueprint::{Blueprint, ComponentId};
use crate::components::functional_response::FunctionalResponseKind;
use crate::components::metabolic_class::MetabolicClass;
use crate::components::non_trophic::NonTrophicLayers;
use crate::components::producer_growth::{NutrientsData, ProducerGrowthKind};
use crate::config::{BoltzmannArrheniusConstants, RateCoefficientTable};
use crate::error::{ModelError, Result};
use ecodyn_graph::{LabelIndex, SparseMatrix, Topology};
use ndarray::Array2;
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::{instrument, trace, warn};

/// The internal value a [`Model`] owns once blueprints have expanded into
/// it (§ 3 "Ownership").
#[derive(Debug, Clone, Default)]
pub struct ModelValue {
    pub n_species: usize,
    pub species_labels: LabelIndex,
    pub topology: Topology,
    pub foodweb: Option<Array2<bool>>,
    pub metabolic_class: Vec<MetabolicClass>,
    pub body_mass: Vec<f64>,
    pub mortality: Vec<f64>,
    pub growth_rate: Vec<f64>,
    pub metabolism: Vec<f64>,
    pub max_consumption: Vec<f64>,
    pub efficiency: Option<SparseMatrix<f64>>,
    pub preference: Option<SparseMatrix<f64>>,
    pub handling_time: Option<SparseMatrix<f64>>,
    pub attack_rate: Option<SparseMatrix<f64>>,
    pub interference: Vec<f64>,
    pub half_saturation_density: Vec<f64>,
    pub consumption_rate: Vec<f64>,
    pub hill_exponent: f64,
    pub functional_response: Option<FunctionalResponseKind>,
    pub carrying_capacity: Vec<f64>,
    pub producer_competition: Option<Array2<f64>>,
    pub producer_growth: Option<ProducerGrowthKind>,
    pub nutrients: Option<NutrientsData>,
    pub temperature: Option<f64>,
    pub non_trophic: NonTrophicLayers,
    pub rate_table: RateCoefficientTable,
    pub boltzmann: BoltzmannArrheniusConstants,
}

impl ModelValue {
    #[must_use]
    pub fn producers(&self) -> Vec<usize> {
        match &self.foodweb {
            Some(a) => (0..self.n_species).filter(|&i| a.row(i).iter().all(|&x| !x)).collect(),
            None => Vec::new(),
        }
    }

    #[must_use]
    pub fn consumers(&self) -> Vec<usize> {
        let producers: std::collections::HashSet<usize> = self.producers().into_iter().collect();
        (0..self.n_species).filter(|i| !producers.contains(i)).collect()
    }
}

/// A named, typed value a property path resolves to.
#[derive(Debug, Clone)]
pub enum PropertyValue {
    Scalar(f64),
    Vector(Vec<f64>),
    Matrix(Array2<f64>),
    BoolMatrix(Array2<bool>),
    Labels(Vec<String>),
}

/// A single registered property: a namespaced path, a read accessor, and an
/// optional write accessor (§ 4.4 "Property access").
#[derive(Clone, Copy)]
pub struct PropertyDescriptor {
    pub path: &'static str,
    pub required_component: Option<ComponentId>,
    pub read: fn(&Model) -> PropertyValue,
    pub write: Option<fn(&mut Model, PropertyValue) -> Result<()>>,
}

impl std::fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyDescriptor").field("path", &self.path).finish()
    }
}

/// The set of properties a model exposes by dotted path (§ 4.4, § 6).
#[derive(Debug, Clone)]
pub struct PropertyRegistry {
    entries: Vec<PropertyDescriptor>,
}

fn builtin_properties() -> Vec<PropertyDescriptor> {
    vec![
        PropertyDescriptor {
            path: "species.labels",
            required_component: Some("Species"),
            read: |m| PropertyValue::Labels(m.value.species_labels.labels().to_vec()),
            write: None,
        },
        PropertyDescriptor {
            path: "trophic.matrix",
            required_component: Some("Foodweb"),
            read: |m| {
                PropertyValue::BoolMatrix(
                    m.value.foodweb.clone().unwrap_or_else(|| Array2::from_elem((0, 0), false)),
                )
            },
            write: None,
        },
        PropertyDescriptor {
            path: "body_mass",
            required_component: Some("BodyMass"),
            read: |m| PropertyValue::Vector(m.value.body_mass.clone()),
            write: None,
        },
        PropertyDescriptor {
            path: "mortality",
            required_component: Some("Mortality"),
            read: |m| PropertyValue::Vector(m.value.mortality.clone()),
            write: None,
        },
        PropertyDescriptor {
            path: "metabolism",
            required_component: Some("Metabolism"),
            read: |m| PropertyValue::Vector(m.value.metabolism.clone()),
            write: None,
        },
        PropertyDescriptor {
            path: "growth_rate",
            required_component: Some("GrowthRate"),
            read: |m| PropertyValue::Vector(m.value.growth_rate.clone()),
            write: None,
        },
        PropertyDescriptor {
            path: "carrying_capacity",
            required_component: Some("CarryingCapacity"),
            read: |m| PropertyValue::Vector(m.value.carrying_capacity.clone()),
            write: Some(|m, v| match v {
                PropertyValue::Vector(values) => {
                    if values.len() != m.value.n_species {
                        return Err(ModelError::DimensionMismatch {
                            message: format!(
                                "carrying_capacity expects {} entries, got {}",
                                m.value.n_species,
                                values.len()
                            ),
                        });
                    }
                    m.value.carrying_capacity = values;
                    m.invalidate_cache();
                    Ok(())
                }
                _ => Err(ModelError::BlueprintCheckFailure {
                    message: "carrying_capacity expects a vector".into(),
                }),
            }),
        },
        PropertyDescriptor {
            path: "nutrients.turnover",
            required_component: Some("Nutrients"),
            read: |m| {
                PropertyValue::Vector(m.value.nutrients.as_ref().map_or_else(Vec::new, |n| n.turnover.clone()))
            },
            write: None,
        },
        PropertyDescriptor {
            path: "temperature",
            required_component: None,
            read: |m| PropertyValue::Scalar(m.value.temperature.unwrap_or(m.value.boltzmann.t_ref)),
            write: Some(|m, v| match v {
                PropertyValue::Scalar(t) => {
                    m.value.temperature = Some(t);
                    m.invalidate_cache();
                    Ok(())
                }
                _ => Err(ModelError::BlueprintCheckFailure {
                    message: "temperature expects a scalar".into(),
                }),
            }),
        },
        PropertyDescriptor {
            path: "hill_exponent",
            required_component: Some("HillExponent"),
            read: |m| PropertyValue::Scalar(m.value.hill_exponent),
            write: None,
        },
    ]
}

impl Default for PropertyRegistry {
    fn default() -> Self {
        Self { entries: builtin_properties() }
    }
}

impl PropertyRegistry {
    fn get(&self, path: &str) -> Option<&PropertyDescriptor> {
        self.entries.iter().find(|e| e.path == path)
    }

    fn paths(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.path).collect()
    }
}

/// The assembled model: an internal value, the set of active component
/// tags, and a property registry (§ 4.4 "Model").
#[derive(Debug, Clone)]
pub struct Model {
    pub(crate) value: ModelValue,
    active: std::collections::HashSet<ComponentId>,
    registry: PropertyRegistry,
    cache: RefCell<HashMap<String, PropertyValue>>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// An empty model with no active components.
    #[must_use]
    pub fn new() -> Self {
        Self {
            value: ModelValue::default(),
            active: std::collections::HashSet::new(),
            registry: PropertyRegistry::default(),
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Direct, read-only access to the internal value for downstream
    /// crates (`ecodyn-dynamics`, `ecodyn-sim`) that need the raw fields
    /// rather than the dotted-path property surface.
    #[must_use]
    pub fn value(&self) -> &ModelValue {
        &self.value
    }

    /// Whether `component` is currently active.
    #[must_use]
    pub fn has_component(&self, component: ComponentId) -> bool {
        self.active.contains(component)
    }

    /// The currently active component tags.
    #[must_use]
    pub fn components(&self) -> Vec<ComponentId> {
        let mut v: Vec<ComponentId> = self.active.iter().copied().collect();
        v.sort_unstable();
        v
    }

    /// Registered property paths, filtering internal (leading-underscore)
    /// names (§ 6). None of the builtin names are internal today; the
    /// filter exists so third-party component crates can register
    /// `_cache`-style entries without polluting introspection.
    #[must_use]
    pub fn properties(&self) -> Vec<&'static str> {
        self.registry.paths().into_iter().filter(|p| !p.starts_with('_')).collect()
    }

    /// Reads a property by its dotted path.
    pub fn get_property(&self, path: &str) -> Result<PropertyValue> {
        if let Some(cached) = self.cache.borrow().get(path) {
            return Ok(cached.clone());
        }
        let descriptor = self
            .registry
            .get(path)
            .ok_or_else(|| ModelError::PropertyNotAvailable { path: path.into(), component: "<unregistered>".into() })?;
        if let Some(required) = descriptor.required_component {
            if !self.active.contains(required) {
                return Err(ModelError::PropertyNotAvailable { path: path.into(), component: required.into() });
            }
        }
        let value = (descriptor.read)(self);
        self.cache.borrow_mut().insert(path.to_string(), value.clone());
        Ok(value)
    }

    /// Writes a property by its dotted path. Properties without a
    /// registered writer are refused with [`ModelError::ReadOnly`]
    /// (§ 4.4 "Writing a non-terminal property").
    pub fn set_property(&mut self, path: &str, value: PropertyValue) -> Result<()> {
        let descriptor = *self
            .registry
            .get(path)
            .ok_or_else(|| ModelError::PropertyNotAvailable { path: path.into(), component: "<unregistered>".into() })?;
        match descriptor.write {
            Some(writer) => writer(self, value),
            None => Err(ModelError::ReadOnly { what: path.to_string() }),
        }
    }

    pub(crate) fn invalidate_cache(&mut self) {
        self.cache.get_mut().clear();
    }

    /// Adds a blueprint, running the full six-step lifecycle (§ 4.4). On
    /// failure the model is left exactly as it was: the whole lifecycle
    /// runs against a staged clone, only swapped in on success.
    #[instrument(skip(self, blueprint), fields(component = blueprint.component()))]
    pub fn add<B: Blueprint + 'static>(&mut self, blueprint: B) -> Result<()> {
        let mut staged = self.clone();
        staged.add_boxed(Box::new(blueprint))?;
        *self = staged;
        Ok(())
    }

    fn add_boxed(&mut self, blueprint: Box<dyn Blueprint>) -> Result<()> {
        blueprint.early_check()?;

        let comp = blueprint.component();
        if self.active.contains(comp) && !blueprint.idempotent_replacement() {
            return Err(ModelError::ComponentConflict { a: comp.into(), b: comp.into() });
        }
        for conflicting in blueprint.conflicts() {
            if self.active.contains(conflicting) {
                return Err(ModelError::ComponentConflict { a: comp.into(), b: conflicting.into() });
            }
        }

        for embedded in blueprint.embeds() {
            let bcomp = embedded.component();
            if self.active.contains(bcomp) {
                return Err(ModelError::ComponentConflict { a: comp.into(), b: bcomp.into() });
            }
            self.add_boxed(embedded)?;
        }
        for implied in blueprint.implies() {
            if !self.active.contains(implied.component()) {
                self.add_boxed(implied)?;
            }
        }

        for required in blueprint.requires() {
            if !self.active.contains(required) {
                return Err(ModelError::MissingRequirement { component: required.into() });
            }
        }

        blueprint.late_check(self)?;
        trace!(component = comp, "expanding blueprint");
        blueprint.expand(self);
        self.active.insert(comp);
        self.invalidate_cache();
        Ok(())
    }
}

impl<B: Blueprint + 'static> std::ops::Add<B> for Model {
    type Output = Result<Model>;

    /// `model + blueprint` produces a new model, leaving the operand
    /// untouched on both success and failure (§ 6).
    fn add(self, blueprint: B) -> Self::Output {
        let mut staged = self.clone();
        staged.add(blueprint)?;
        Ok(staged)
    }
}

/// Emits a `tracing` warning for an advisory condition detected after
/// simulation (§ 4.8 step 6, § 7 "Advisory conditions").
pub fn warn_advisory(message: &str) {
    warn!("{message}");
}
