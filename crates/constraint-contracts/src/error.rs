//! Error types for the template → CRD pipeline.
//!
//! Every fallible operation in the constraint framework returns
//! `ConstraintResult<T>`. Variants that originate from a structural validator
//! carry the full `FieldErrorList` so callers see every problem at once.

use thiserror::Error;

use crate::field::FieldErrorList;

/// The unified error type for the constraint framework.
#[derive(Debug, Error)]
pub enum ConstraintError {
    /// The template declares zero targets, more than one target, or omits the
    /// `targets` field entirely.
    #[error("{reason}")]
    TargetCardinality { reason: String },

    /// The template's target has no registered match-schema provider.
    #[error("target not found: {target}")]
    TargetNotFound { target: String },

    /// The author-supplied parameter schema could not be converted to the
    /// internal schema representation.
    #[error("invalid parameter schema: {reason}")]
    SchemaConversion { reason: String },

    /// Converting or defaulting the synthesized definition failed.
    #[error("CRD round trip failed during {stage}: {reason}")]
    DefinitionRoundTrip { stage: String, reason: String },

    /// The synthesized definition is not a valid CustomResourceDefinition.
    #[error("invalid CustomResourceDefinition: {errors}")]
    DefinitionValidation { errors: FieldErrorList },

    /// A schema validator could not be built from the definition's schema.
    #[error("could not build schema validator: {reason}")]
    ValidatorConstruction { reason: String },

    /// The constraint document does not satisfy the definition's schema.
    #[error("{errors}")]
    InstanceSchema { errors: FieldErrorList },

    /// The constraint's metadata.name is not a valid DNS-1123 subdomain.
    #[error("Invalid Name: {}", errors.join("\n"))]
    InstanceName { name: String, errors: Vec<String> },

    /// The constraint's kind does not match the kind minted by its template.
    #[error("Wrong kind for constraint {name}. Have {have}, want {want}")]
    InstanceKind { name: String, have: String, want: String },

    /// The constraint's API group is not the constraint group.
    #[error("Wrong group for constraint {name}. Have {have}, want {want}")]
    InstanceGroup { name: String, have: String, want: String },

    /// The constraint's API version is not one this framework serves.
    #[error("Wrong version for constraint {name}. Have {have}, supported: {}", supported.join(", "))]
    InstanceVersion { name: String, have: String, supported: Vec<String> },

    /// No template has been registered for the requested constraint kind.
    #[error("no ConstraintTemplate registered for kind '{kind}'")]
    TemplateNotFound { kind: String },

    /// A configuration document is missing, unreadable, or malformed.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

/// Convenience alias used throughout the constraint crates.
pub type ConstraintResult<T> = Result<T, ConstraintError>;
