//! # constraint-client
//!
//! The entry point for hosts of the constraint framework.
//!
//! [`client::Client`] keeps the registered ConstraintTemplates together with
//! the CustomResourceDefinition synthesized for each, and validates
//! constraint documents against them. [`Client::new`] wires the pipeline to
//! its default collaborators:
//!
//! | Collaborator             | Implementation                                   |
//! |--------------------------|--------------------------------------------------|
//! | `Scheme`                 | `constraint_scheme::V1beta1Scheme`               |
//! | `SchemaValidatorFactory` | `constraint_verify::JsonSchemaValidatorFactory`  |
//! | `MatchSchemaProvider`s   | `constraint_targets::TargetRegistry`             |

pub mod client;
pub mod digest;

pub use client::{Client, RegisteredTemplate};
pub use digest::definition_digest;
