//! # constraint-scheme
//!
//! The `apiextensions.k8s.io/v1beta1` resource model used by the constraint
//! pipeline.
//!
//! [`V1beta1Scheme`] implements [`constraint_core::traits::Scheme`]:
//!
//! - authored OpenAPI documents → typed `JsonSchemaProps`
//! - internal CRD ⇄ `v1beta1` CRD
//! - `v1beta1` defaulting (scope, versions, conversion, printer columns, …)
//! - CRD structural validation

pub mod convert;
pub mod defaults;
pub mod validation;

use serde_json::Value;
use tracing::debug;

use constraint_contracts::{
    apiextensions::{CustomResourceDefinition, JsonSchemaProps},
    error::ConstraintResult,
    field::FieldErrorList,
    v1beta1,
};
use constraint_core::traits::Scheme;

/// The `v1beta1` scheme. Stateless; construct once and share.
#[derive(Debug, Default, Clone, Copy)]
pub struct V1beta1Scheme;

impl V1beta1Scheme {
    pub fn new() -> Self {
        Self
    }
}

impl Scheme for V1beta1Scheme {
    fn convert_schema(&self, document: &Value) -> ConstraintResult<JsonSchemaProps> {
        convert::schema_from_document(document)
    }

    fn to_external(
        &self,
        crd: &CustomResourceDefinition,
    ) -> ConstraintResult<v1beta1::CustomResourceDefinition> {
        convert::crd_to_external(crd)
    }

    fn apply_defaults(
        &self,
        crd: v1beta1::CustomResourceDefinition,
    ) -> ConstraintResult<v1beta1::CustomResourceDefinition> {
        Ok(defaults::set_defaults(crd))
    }

    fn to_internal(
        &self,
        crd: &v1beta1::CustomResourceDefinition,
    ) -> ConstraintResult<CustomResourceDefinition> {
        convert::crd_to_internal(crd)
    }

    fn validate_definition(&self, crd: &CustomResourceDefinition) -> FieldErrorList {
        let errors = validation::validate_custom_resource_definition(crd);
        debug!(
            name = %crd.metadata.name,
            error_count = errors.len(),
            "validated CustomResourceDefinition"
        );
        errors
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
