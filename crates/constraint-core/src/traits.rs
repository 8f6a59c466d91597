//! Collaborator traits for the template → CRD pipeline.
//!
//! The pipeline owns composition, synthesis and identity checks. Everything
//! the host platform normally provides sits behind one of these traits:
//!
//! - `MatchSchemaProvider`:    a target's fixed `match` schema fragment
//! - `Scheme`:                 schema conversion, CRD version round trip,
//!                             defaulting, and CRD structural validation
//! - `SchemaValidatorFactory`: builds a document validator from a CRD schema
//!
//! All implementations must be `Send + Sync`: a single `CrdHelper` is shared
//! by every validation call.

use serde_json::Value;

use constraint_contracts::{
    apiextensions::{CustomResourceDefinition, CustomResourceValidation, JsonSchemaProps},
    error::ConstraintResult,
    field::FieldErrorList,
    v1beta1,
};

/// Supplies the `match` schema for one target.
pub trait MatchSchemaProvider: Send + Sync {
    /// The schema every constraint's `spec.match` must satisfy for this target.
    ///
    /// Returns a fresh value on every call; the pipeline takes ownership.
    fn match_schema(&self) -> JsonSchemaProps;
}

/// The host platform's versioned resource model.
///
/// Conversion and defaulting never mutate their input: each step returns a
/// new value.
pub trait Scheme: Send + Sync {
    /// Convert an authored OpenAPI v3 document into the internal schema form.
    ///
    /// Malformed documents fail with `ConstraintError::SchemaConversion`.
    fn convert_schema(&self, document: &Value) -> ConstraintResult<JsonSchemaProps>;

    /// Convert an internal definition to its `v1beta1` wire form.
    ///
    /// Fails with `ConstraintError::DefinitionRoundTrip`.
    fn to_external(
        &self,
        crd: &CustomResourceDefinition,
    ) -> ConstraintResult<v1beta1::CustomResourceDefinition>;

    /// Apply the `v1beta1` defaulting rules, returning the defaulted value.
    fn apply_defaults(
        &self,
        crd: v1beta1::CustomResourceDefinition,
    ) -> ConstraintResult<v1beta1::CustomResourceDefinition>;

    /// Convert a `v1beta1` definition back to internal form.
    ///
    /// Fails with `ConstraintError::DefinitionRoundTrip`.
    fn to_internal(
        &self,
        crd: &v1beta1::CustomResourceDefinition,
    ) -> ConstraintResult<CustomResourceDefinition>;

    /// Run the platform's structural checks for CustomResourceDefinitions.
    ///
    /// Every problem is reported; an empty list means the definition is valid.
    fn validate_definition(&self, crd: &CustomResourceDefinition) -> FieldErrorList;
}

/// Validates arbitrary documents against one compiled schema.
pub trait SchemaValidator: Send + Sync {
    /// Return every schema violation in `document`. Empty means valid.
    fn validate(&self, document: &Value) -> FieldErrorList;
}

/// Compiles CRD validation schemas into `SchemaValidator`s.
pub trait SchemaValidatorFactory: Send + Sync {
    /// Build a validator for `validation`. `None` yields a validator that
    /// accepts every document.
    ///
    /// A schema the engine cannot compile fails with
    /// `ConstraintError::ValidatorConstruction`.
    fn build(
        &self,
        validation: Option<&CustomResourceValidation>,
    ) -> ConstraintResult<Box<dyn SchemaValidator>>;
}
