//! # constraint-targets
//!
//! Targets are the enforcement points a ConstraintTemplate binds to. Each
//! one contributes the `match` schema for the constraints it enforces.
//!
//! - [`registry::TargetRegistry`] maps target names to
//!   [`MatchSchemaProvider`](constraint_core::traits::MatchSchemaProvider)s.
//! - [`registry::StaticMatchSchema`] serves a fixed schema fragment.
//! - [`config::TargetConfig`] loads a registry from TOML.

pub mod config;
pub mod registry;

pub use config::{TargetConfig, TargetEntry};
pub use registry::{StaticMatchSchema, TargetRegistry};
