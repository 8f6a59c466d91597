//! # constraint-verify
//!
//! Structural validation of constraint documents.
//!
//! [`JsonSchemaValidatorFactory`] implements
//! [`constraint_core::traits::SchemaValidatorFactory`] on top of the
//! `jsonschema` crate, compiling a CRD's OpenAPI v3 schema as a draft 4
//! JSON Schema.

pub mod engine;

pub use engine::{JsonSchemaValidator, JsonSchemaValidatorFactory};
