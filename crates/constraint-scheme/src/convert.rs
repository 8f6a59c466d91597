//! Conversion between the internal CRD model and `apiextensions/v1beta1`.
//!
//! Structural fields are copied one by one. The OpenAPI schema is the only
//! part whose representation changes: typed `JsonSchemaProps` internally,
//! a raw JSON document on the wire.

use serde_json::Value;

use constraint_contracts::{
    apiextensions::{
        CustomResourceColumnDefinition, CustomResourceConversion, CustomResourceDefinition,
        CustomResourceDefinitionNames, CustomResourceDefinitionSpec,
        CustomResourceDefinitionVersion, CustomResourceValidation, JsonSchemaProps,
    },
    error::{ConstraintError, ConstraintResult},
    v1beta1,
};

/// Parse an authored OpenAPI v3 document into a typed schema.
pub fn schema_from_document(document: &Value) -> ConstraintResult<JsonSchemaProps> {
    if !document.is_object() {
        return Err(ConstraintError::SchemaConversion {
            reason: format!("schema must be a JSON object, got {}", json_type(document)),
        });
    }
    serde_json::from_value(document.clone()).map_err(|e| ConstraintError::SchemaConversion {
        reason: e.to_string(),
    })
}

pub fn crd_to_external(
    crd: &CustomResourceDefinition,
) -> ConstraintResult<v1beta1::CustomResourceDefinition> {
    let spec = &crd.spec;
    let validation = match &spec.validation {
        None => None,
        Some(v) => {
            let schema = v
                .open_api_v3_schema
                .as_ref()
                .map(serde_json::to_value)
                .transpose()
                .map_err(|e| round_trip("to_external", e))?;
            Some(v1beta1::CustomResourceValidation {
                open_api_v3_schema: schema,
            })
        }
    };

    Ok(v1beta1::CustomResourceDefinition {
        api_version: v1beta1::API_VERSION.to_string(),
        kind: v1beta1::KIND.to_string(),
        metadata: crd.metadata.clone(),
        spec: v1beta1::CustomResourceDefinitionSpec {
            group: spec.group.clone(),
            version: spec.version.clone(),
            names: v1beta1::CustomResourceDefinitionNames {
                plural: spec.names.plural.clone(),
                singular: spec.names.singular.clone(),
                short_names: spec.names.short_names.clone(),
                kind: spec.names.kind.clone(),
                list_kind: spec.names.list_kind.clone(),
                categories: spec.names.categories.clone(),
            },
            scope: spec.scope.clone(),
            validation,
            versions: spec
                .versions
                .iter()
                .map(|v| v1beta1::CustomResourceDefinitionVersion {
                    name: v.name.clone(),
                    served: v.served,
                    storage: v.storage,
                })
                .collect(),
            additional_printer_columns: spec
                .additional_printer_columns
                .iter()
                .map(|c| v1beta1::CustomResourceColumnDefinition {
                    name: c.name.clone(),
                    type_: c.type_.clone(),
                    format: c.format.clone(),
                    description: c.description.clone(),
                    priority: c.priority,
                    json_path: c.json_path.clone(),
                })
                .collect(),
            conversion: spec
                .conversion
                .as_ref()
                .map(|c| v1beta1::CustomResourceConversion {
                    strategy: c.strategy.clone(),
                }),
            preserve_unknown_fields: spec.preserve_unknown_fields,
        },
    })
}

pub fn crd_to_internal(
    crd: &v1beta1::CustomResourceDefinition,
) -> ConstraintResult<CustomResourceDefinition> {
    let spec = &crd.spec;
    let validation = match &spec.validation {
        None => None,
        Some(v) => {
            let schema = v
                .open_api_v3_schema
                .clone()
                .map(serde_json::from_value::<JsonSchemaProps>)
                .transpose()
                .map_err(|e| round_trip("to_internal", e))?;
            Some(CustomResourceValidation {
                open_api_v3_schema: schema,
            })
        }
    };

    Ok(CustomResourceDefinition {
        metadata: crd.metadata.clone(),
        spec: CustomResourceDefinitionSpec {
            group: spec.group.clone(),
            version: spec.version.clone(),
            names: CustomResourceDefinitionNames {
                plural: spec.names.plural.clone(),
                singular: spec.names.singular.clone(),
                short_names: spec.names.short_names.clone(),
                kind: spec.names.kind.clone(),
                list_kind: spec.names.list_kind.clone(),
                categories: spec.names.categories.clone(),
            },
            scope: spec.scope.clone(),
            validation,
            versions: spec
                .versions
                .iter()
                .map(|v| CustomResourceDefinitionVersion {
                    name: v.name.clone(),
                    served: v.served,
                    storage: v.storage,
                })
                .collect(),
            additional_printer_columns: spec
                .additional_printer_columns
                .iter()
                .map(|c| CustomResourceColumnDefinition {
                    name: c.name.clone(),
                    type_: c.type_.clone(),
                    format: c.format.clone(),
                    description: c.description.clone(),
                    priority: c.priority,
                    json_path: c.json_path.clone(),
                })
                .collect(),
            conversion: spec.conversion.as_ref().map(|c| CustomResourceConversion {
                strategy: c.strategy.clone(),
            }),
            preserve_unknown_fields: spec.preserve_unknown_fields,
        },
    })
}

fn round_trip(stage: &str, err: serde_json::Error) -> ConstraintError {
    ConstraintError::DefinitionRoundTrip {
        stage: stage.to_string(),
        reason: err.to_string(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
