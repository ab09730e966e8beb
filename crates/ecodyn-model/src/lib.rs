//! Model assembly: the blueprint/component framework (§ 4.4) and the
//! typed ecological-data components it assembles into a [`Model`]
//! (§ 4.5), plus the rate derivations (§ 4.6) those components consume.

pub mod blueprint;
pub mod components;
pub mod config;
pub mod error;
pub mod model;
pub mod rate_derivation;

pub use blueprint::{Blueprint, Brought, ComponentId};
pub use error::{ModelError, Result};
pub use model::{Model, ModelValue, PropertyValue};
