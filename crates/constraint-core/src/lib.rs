//! # constraint-core
//!
//! The ConstraintTemplate → CustomResourceDefinition pipeline.
//!
//! [`helper::CrdHelper`] composes a constraint schema from a target's match
//! schema and a template's parameters, synthesizes and validates the CRD
//! for the minted kind, and validates constraint documents against it.
//! The platform capabilities it relies on are the traits in [`traits`].

pub mod helper;
pub mod naming;
pub mod traits;

pub use helper::{validate_targets, CrdHelper};
