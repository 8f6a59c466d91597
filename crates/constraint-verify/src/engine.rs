//! Compiles CRD structural schemas into JSON Schema validators.
//!
//! A CRD schema is OpenAPI v3, which is close to JSON Schema draft 4 but not
//! identical. Before compiling, every schema node is rewritten:
//!
//! - `nullable: true` widens `type` to `[type, "null"]` (and admits `null`
//!   in an `enum`);
//! - `x-kubernetes-int-or-string: true` becomes an `anyOf` over integer and
//!   string, plus null when the node is nullable;
//! - the remaining `x-kubernetes-*` markers are dropped, as are the
//!   annotation keywords (`id`, `$schema`, `example`, `externalDocs`).

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use constraint_contracts::{
    apiextensions::{CustomResourceValidation, JsonSchemaProps},
    error::{ConstraintError, ConstraintResult},
    field::{FieldError, FieldErrorList, FieldPath},
};
use constraint_core::traits::{SchemaValidator, SchemaValidatorFactory};

/// Builds [`JsonSchemaValidator`]s backed by the `jsonschema` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSchemaValidatorFactory;

impl JsonSchemaValidatorFactory {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaValidatorFactory for JsonSchemaValidatorFactory {
    fn build(
        &self,
        validation: Option<&CustomResourceValidation>,
    ) -> ConstraintResult<Box<dyn SchemaValidator>> {
        let Some(schema) = validation.and_then(|v| v.open_api_v3_schema.as_ref()) else {
            debug!("no structural schema, accepting every document");
            return Ok(Box::new(AcceptAll));
        };

        let document = to_json_schema(schema)?;
        let validator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft4)
            .build(&document)
            .map_err(|e| {
                warn!(error = %e, "structural schema failed to compile");
                ConstraintError::ValidatorConstruction {
                    reason: e.to_string(),
                }
            })?;

        Ok(Box::new(JsonSchemaValidator { validator }))
    }
}

/// A compiled structural schema.
pub struct JsonSchemaValidator {
    validator: jsonschema::Validator,
}

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, document: &Value) -> FieldErrorList {
        let mut errors = FieldErrorList::new();
        for error in self.validator.iter_errors(document) {
            let pointer = error.instance_path.to_string();
            let value = compact(&error.instance);
            errors.push(FieldError::invalid(&field_path(&pointer), value, error.to_string()));
        }
        errors
    }
}

struct AcceptAll;

impl SchemaValidator for AcceptAll {
    fn validate(&self, _document: &Value) -> FieldErrorList {
        FieldErrorList::new()
    }
}

// ── Schema translation ────────────────────────────────────────────────────────

/// Render a CRD schema as a draft 4 JSON Schema document.
pub fn to_json_schema(schema: &JsonSchemaProps) -> ConstraintResult<Value> {
    let mut document =
        serde_json::to_value(schema).map_err(|e| ConstraintError::ValidatorConstruction {
            reason: e.to_string(),
        })?;
    normalize(&mut document);
    Ok(document)
}

const DROPPED_KEYS: [&str; 9] = [
    "x-kubernetes-preserve-unknown-fields",
    "x-kubernetes-embedded-resource",
    "x-kubernetes-list-type",
    "x-kubernetes-list-map-keys",
    "x-kubernetes-map-type",
    "id",
    "$schema",
    "example",
    "externalDocs",
];

fn normalize(node: &mut Value) {
    let Some(obj) = node.as_object_mut() else {
        return;
    };

    let nullable = obj.remove("nullable") == Some(Value::Bool(true));
    let int_or_string = obj.remove("x-kubernetes-int-or-string") == Some(Value::Bool(true));
    for key in DROPPED_KEYS {
        obj.remove(key);
    }

    if int_or_string && !obj.contains_key("type") {
        let mut types = vec![json!({ "type": "integer" }), json!({ "type": "string" })];
        if nullable {
            types.push(json!({ "type": "null" }));
        }
        let alternatives = json!({ "anyOf": types });
        if let Some(all_of) = obj
            .entry("allOf")
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
        {
            all_of.push(alternatives);
        }
    }

    if nullable {
        admit_null(obj);
    }

    for key in ["properties", "patternProperties", "definitions", "dependencies"] {
        if let Some(Value::Object(children)) = obj.get_mut(key) {
            children.values_mut().for_each(normalize);
        }
    }
    for key in ["items", "not", "additionalProperties", "additionalItems"] {
        if let Some(child) = obj.get_mut(key) {
            normalize(child);
        }
    }
    for key in ["allOf", "oneOf", "anyOf"] {
        if let Some(Value::Array(children)) = obj.get_mut(key) {
            children.iter_mut().for_each(normalize);
        }
    }
}

fn admit_null(obj: &mut Map<String, Value>) {
    if let Some(Value::String(type_)) = obj.get("type") {
        let widened = json!([type_, "null"]);
        obj.insert("type".to_string(), widened);
    }
    if let Some(Value::Array(values)) = obj.get_mut("enum") {
        if !values.contains(&Value::Null) {
            values.push(Value::Null);
        }
    }
}

/// `/spec/parameters/labels/0` → `spec.parameters.labels[0]`.
fn field_path(pointer: &str) -> FieldPath {
    let mut path = FieldPath::default();
    for segment in pointer.split('/').skip(1) {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        path = match segment.parse::<usize>() {
            Ok(index) if !path.as_str().is_empty() => path.index(index),
            _ => path.child(&segment),
        };
    }
    if path.as_str().is_empty() {
        FieldPath::new("<root>")
    } else {
        path
    }
}

fn compact(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use constraint_contracts::{
        apiextensions::{CustomResourceValidation, JsonSchemaProps, JsonSchemaPropsOrBool},
        error::ConstraintError,
    };
    use constraint_core::traits::SchemaValidatorFactory;

    use super::{field_path, to_json_schema, JsonSchemaValidatorFactory};

    fn props(entries: Vec<(&str, JsonSchemaProps)>) -> JsonSchemaProps {
        let map: BTreeMap<String, JsonSchemaProps> =
            entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        JsonSchemaProps::with_properties(map)
    }

    fn validation(schema: JsonSchemaProps) -> CustomResourceValidation {
        CustomResourceValidation {
            open_api_v3_schema: Some(schema),
        }
    }

    /// `spec.parameters.labels: array of string` under an otherwise open root.
    fn labels_schema() -> JsonSchemaProps {
        let labels = JsonSchemaProps {
            type_: Some("array".to_string()),
            items: Some(Box::new(JsonSchemaProps::typed("string"))),
            ..JsonSchemaProps::default()
        };
        props(vec![(
            "spec",
            props(vec![
                ("enforcementAction", JsonSchemaProps::typed("string")),
                ("parameters", props(vec![("labels", labels)])),
            ]),
        )])
    }

    // ── Translation ───────────────────────────────────────────────────────────

    #[test]
    fn test_nullable_widens_type() {
        let schema = JsonSchemaProps {
            type_: Some("string".to_string()),
            nullable: true,
            enum_: vec![json!("a")],
            ..JsonSchemaProps::default()
        };
        let doc = to_json_schema(&schema).unwrap();
        assert_eq!(doc["type"], json!(["string", "null"]));
        assert_eq!(doc["enum"], json!(["a", null]));
        assert!(doc.get("nullable").is_none());
    }

    #[test]
    fn test_kubernetes_markers_are_translated() {
        let schema = props(vec![
            (
                "port",
                JsonSchemaProps {
                    x_int_or_string: true,
                    ..JsonSchemaProps::default()
                },
            ),
            (
                "raw",
                JsonSchemaProps {
                    type_: Some("object".to_string()),
                    x_preserve_unknown_fields: Some(true),
                    x_embedded_resource: true,
                    ..JsonSchemaProps::default()
                },
            ),
        ]);
        let doc = to_json_schema(&schema).unwrap();
        assert_eq!(
            doc["properties"]["port"]["allOf"][0]["anyOf"],
            json!([{ "type": "integer" }, { "type": "string" }])
        );
        assert_eq!(doc["properties"]["raw"], json!({ "type": "object" }));
    }

    #[test]
    fn test_nullable_int_or_string_admits_null() {
        let schema = JsonSchemaProps {
            x_int_or_string: true,
            nullable: true,
            ..JsonSchemaProps::default()
        };
        let doc = to_json_schema(&schema).unwrap();
        assert_eq!(
            doc["allOf"][0]["anyOf"],
            json!([{ "type": "integer" }, { "type": "string" }, { "type": "null" }])
        );

        let root = props(vec![("port", schema)]);
        let validator = JsonSchemaValidatorFactory::new()
            .build(Some(&validation(root)))
            .unwrap();
        assert!(validator.validate(&json!({ "port": null })).is_empty());
        assert!(validator.validate(&json!({ "port": 80 })).is_empty());
        assert!(validator.validate(&json!({ "port": "http" })).is_empty());
        assert_eq!(validator.validate(&json!({ "port": true })).len(), 1);
    }

    #[test]
    fn test_nested_keyword_maps_are_translated() {
        let mut pattern_properties = BTreeMap::new();
        pattern_properties.insert(
            "^lbl".to_string(),
            JsonSchemaProps {
                type_: Some("string".to_string()),
                nullable: true,
                x_map_type: Some("atomic".to_string()),
                ..JsonSchemaProps::default()
            },
        );
        let schema = JsonSchemaProps {
            type_: Some("object".to_string()),
            pattern_properties,
            example: Some(json!({ "lblA": "x" })),
            ..JsonSchemaProps::default()
        };
        let doc = to_json_schema(&schema).unwrap();
        assert_eq!(
            doc,
            json!({
                "type": "object",
                "patternProperties": { "^lbl": { "type": ["string", "null"] } }
            })
        );

        let validator = JsonSchemaValidatorFactory::new()
            .build(Some(&validation(schema)))
            .unwrap();
        assert!(validator.validate(&json!({ "lblA": null, "other": 5 })).is_empty());
        let errors: Vec<String> = validator.validate(&json!({ "lblA": 5 })).iter().map(|e| e.path.clone()).collect();
        assert_eq!(errors, vec!["lblA".to_string()]);
    }

    #[test]
    fn test_field_path_from_pointer() {
        assert_eq!(field_path("/spec/parameters/labels/0").as_str(), "spec.parameters.labels[0]");
        assert_eq!(field_path("/metadata/a~1b").as_str(), "metadata.a/b");
        assert_eq!(field_path("").as_str(), "<root>");
    }

    // ── Validation ────────────────────────────────────────────────────────────

    #[test]
    fn test_missing_schema_accepts_everything() {
        let factory = JsonSchemaValidatorFactory::new();
        let validator = factory.build(None).unwrap();
        assert!(validator.validate(&json!({ "anything": [1, 2, 3] })).is_empty());

        let empty = CustomResourceValidation::default();
        let validator = factory.build(Some(&empty)).unwrap();
        assert!(validator.validate(&json!("not even an object")).is_empty());
    }

    #[test]
    fn test_conforming_document_passes() {
        let validator = JsonSchemaValidatorFactory::new()
            .build(Some(&validation(labels_schema())))
            .unwrap();
        let doc = json!({
            "apiVersion": "constraints.gatekeeper.sh/v1beta1",
            "kind": "K8sRequiredLabels",
            "metadata": { "name": "must-have-owner" },
            "spec": {
                "enforcementAction": "deny",
                "parameters": { "labels": ["owner"] },
                "match": { "kinds": [] }
            }
        });
        let errors = validator.validate(&doc);
        assert!(errors.is_empty(), "{errors}");
    }

    #[test]
    fn test_type_mismatch_reports_path() {
        let validator = JsonSchemaValidatorFactory::new()
            .build(Some(&validation(labels_schema())))
            .unwrap();
        let doc = json!({ "spec": { "parameters": { "labels": "owner" } } });
        let errors = validator.validate(&doc);
        assert_eq!(errors.len(), 1);
        let rendered = errors.to_string();
        assert!(rendered.starts_with("spec.parameters.labels: Invalid value: \"owner\""), "{rendered}");
    }

    #[test]
    fn test_every_violation_is_reported() {
        let validator = JsonSchemaValidatorFactory::new()
            .build(Some(&validation(labels_schema())))
            .unwrap();
        let doc = json!({
            "spec": {
                "enforcementAction": 7,
                "parameters": { "labels": ["ok", 3] }
            }
        });
        let errors: Vec<String> = validator.validate(&doc).iter().map(|e| e.path.clone()).collect();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&"spec.enforcementAction".to_string()));
        assert!(errors.contains(&"spec.parameters.labels[1]".to_string()));
    }

    #[test]
    fn test_closed_object_rejects_unknown_fields() {
        let schema = JsonSchemaProps {
            type_: Some("object".to_string()),
            additional_properties: Some(Box::new(JsonSchemaPropsOrBool::Allows(false))),
            ..JsonSchemaProps::default()
        };
        let validator = JsonSchemaValidatorFactory::new()
            .build(Some(&validation(schema)))
            .unwrap();
        assert!(validator.validate(&json!({})).is_empty());
        assert_eq!(validator.validate(&json!({ "extra": 1 })).len(), 1);
    }

    #[test]
    fn test_uncompilable_schema_fails_construction() {
        let schema = JsonSchemaProps {
            type_: Some("string".to_string()),
            pattern: Some("([unclosed".to_string()),
            ..JsonSchemaProps::default()
        };
        let err = JsonSchemaValidatorFactory::new()
            .build(Some(&validation(schema)))
            .err()
            .unwrap();
        assert!(matches!(err, ConstraintError::ValidatorConstruction { .. }));
    }
}
