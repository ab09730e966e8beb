//! # ecodynamics
//!
//! A library for building and simulating dynamic ecological network models
//! (food webs with optional non-trophic layers and nutrient dynamics).
//!
//! This facade crate re-exports the public surface (§ 6) assembled from the
//! workspace's five library crates:
//!
//! - [`ecodyn_aliases`] — the aliasing map behind interaction/parameter
//!   naming (§ 4.1).
//! - [`ecodyn_graph`] — bound-checked array/matrix views and the
//!   multi-compartment topology graph (§ 4.2, § 4.3).
//! - [`ecodyn_model`] — the blueprint/component assembly framework and the
//!   typed ecological-data components (§ 4.4, § 4.5, § 4.6).
//! - [`ecodyn_dynamics`] — the derivative kernel, generic and specialized
//!   (§ 4.7).
//! - [`ecodyn_sim`] — the simulation driver, observables, and post-extinction
//!   topology analyses (§ 4.8, § 4.9).
//!
//! No binary target exists in this workspace (§ 1: CLI/REPL ergonomics are
//! out of scope).

pub mod assemble;

pub use ecodyn_aliases::{interaction_aliases, parameter_aliases, AliasError, AliasingMap, InteractionKind, ParameterKind};
pub use ecodyn_dynamics::{response, Derivative, DynamicsError, GenericDerivative, SpecializationVariant, SpecializedDerivative};
pub use ecodyn_graph::{DenseMatrix, DenseMatrixMut, DenseVector, DenseVectorMut, GraphError, LabelIndex, ReadOnly, SparseMatrix, Topology};
pub use ecodyn_model::{components, Blueprint, Brought, ComponentId, Model, ModelError, ModelValue, PropertyValue};
pub use ecodyn_sim::{
    analysis, observables, simulate, simulate_with, CancellationSignal, RetCode, SimError, SimOptions, Solution,
};

pub use assemble::{default_model, DefaultModelOverrides};
