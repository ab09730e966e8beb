//! # ecodyn-dynamics
//!
//! The `dB/dt` derivative kernel (§ 4.7): wired from the active functional
//! response, producer-growth variant, and optional non-trophic layers.
//!
//! Two kernels implement the [`Derivative`] trait and are required to agree
//! up to floating-point rounding (§ 8 invariant 4, § 9 design note):
//! [`kernel::GenericDerivative`] loops over the foodweb's nonzero trophic
//! indices at every call, while [`specialized::SpecializedDerivative`]
//! flattens those indices once at freeze time and replays them without the
//! per-call filtering. No runtime code generation is involved — unlike the
//! teacher's source-of-distillation, compile-time monomorphization over the
//! functional-response tag already captures most of the win a hand-rolled
//! specializer would chase.

pub mod error;
pub mod kernel;
pub mod response;
pub mod specialized;
pub mod trait_def;

pub use error::{DynamicsError, Result};
pub use kernel::GenericDerivative;
pub use specialized::{SpecializationVariant, SpecializedDerivative};
pub use trait_def::Derivative;
