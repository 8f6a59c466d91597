//! Structural validation of CustomResourceDefinitions.
//!
//! Mirrors the checks the platform runs when a CRD is created under
//! `apiextensions/v1beta1`, so a bad definition is caught when its template
//! is registered rather than when the first constraint arrives.

use std::collections::HashSet;

use constraint_contracts::{
    apiextensions::{
        CustomResourceDefinition, CustomResourceDefinitionNames, CustomResourceDefinitionSpec,
        JsonSchemaProps, JsonSchemaPropsOrBool, JsonSchemaPropsOrStringArray,
    },
    field::{FieldError, FieldErrorList, FieldPath},
};
use constraint_core::naming::{is_dns1035_label, is_dns1123_subdomain};

const SUPPORTED_SCOPES: [&str; 2] = ["Cluster", "Namespaced"];
const SUPPORTED_CONVERSION_STRATEGIES: [&str; 2] = ["None", "Webhook"];
const SUPPORTED_SCHEMA_TYPES: [&str; 6] = ["array", "boolean", "integer", "number", "object", "string"];
const SUPPORTED_COLUMN_TYPES: [&str; 5] = ["integer", "number", "string", "boolean", "date"];
const SUPPORTED_LIST_TYPES: [&str; 3] = ["atomic", "set", "map"];
const SUPPORTED_MAP_TYPES: [&str; 2] = ["granular", "atomic"];

/// Validate a whole definition. Every problem found is returned.
pub fn validate_custom_resource_definition(crd: &CustomResourceDefinition) -> FieldErrorList {
    let mut errors = FieldErrorList::new();

    let expected_name = format!("{}.{}", crd.spec.names.plural, crd.spec.group);
    if crd.metadata.name != expected_name {
        errors.push(FieldError::invalid(
            &FieldPath::new("metadata").child("name"),
            &crd.metadata.name,
            format!("must be spec.names.plural+\".\"+spec.group ({expected_name})"),
        ));
    }

    validate_spec(&crd.spec, &FieldPath::new("spec"), &mut errors);
    errors
}

fn validate_spec(spec: &CustomResourceDefinitionSpec, path: &FieldPath, errors: &mut FieldErrorList) {
    let group_path = path.child("group");
    if spec.group.is_empty() {
        errors.push(FieldError::required(&group_path, ""));
    } else {
        for msg in is_dns1123_subdomain(&spec.group) {
            errors.push(FieldError::invalid(&group_path, &spec.group, msg));
        }
        if !spec.group.contains('.') {
            errors.push(FieldError::invalid(
                &group_path,
                &spec.group,
                "should be a domain with at least one dot",
            ));
        }
    }

    if spec.scope.is_empty() {
        errors.push(FieldError::required(&path.child("scope"), ""));
    } else if !SUPPORTED_SCOPES.contains(&spec.scope.as_str()) {
        errors.push(FieldError::not_supported(&path.child("scope"), &spec.scope, &SUPPORTED_SCOPES));
    }

    validate_versions(spec, path, errors);
    validate_names(&spec.names, &path.child("names"), errors);

    if let Some(conversion) = &spec.conversion {
        if !SUPPORTED_CONVERSION_STRATEGIES.contains(&conversion.strategy.as_str()) {
            errors.push(FieldError::not_supported(
                &path.child("conversion").child("strategy"),
                &conversion.strategy,
                &SUPPORTED_CONVERSION_STRATEGIES,
            ));
        }
    }

    for (i, column) in spec.additional_printer_columns.iter().enumerate() {
        let column_path = path.child("additionalPrinterColumns").index(i);
        if column.name.is_empty() {
            errors.push(FieldError::required(&column_path.child("name"), ""));
        }
        if !SUPPORTED_COLUMN_TYPES.contains(&column.type_.as_str()) {
            errors.push(FieldError::not_supported(
                &column_path.child("type"),
                &column.type_,
                &SUPPORTED_COLUMN_TYPES,
            ));
        }
        if column.json_path.is_empty() {
            errors.push(FieldError::required(&column_path.child("JSONPath"), ""));
        }
    }

    let schema = spec
        .validation
        .as_ref()
        .and_then(|v| v.open_api_v3_schema.as_ref());
    if let Some(schema) = schema {
        let schema_path = path.child("validation").child("openAPIV3Schema");
        validate_root_schema(schema, &schema_path, errors);
    }
}

fn validate_versions(spec: &CustomResourceDefinitionSpec, path: &FieldPath, errors: &mut FieldErrorList) {
    let versions_path = path.child("versions");
    if spec.versions.is_empty() {
        errors.push(FieldError::required(&versions_path, "must have at least one version"));
        return;
    }

    let mut seen = HashSet::new();
    let mut storage_count = 0;
    let mut any_served = false;
    for (i, version) in spec.versions.iter().enumerate() {
        let name_path = versions_path.index(i).child("name");
        check_name(&name_path, &version.name, is_dns1035_label, errors);
        if !seen.insert(version.name.as_str()) {
            errors.push(FieldError::duplicate(&name_path, &version.name));
        }
        if version.storage {
            storage_count += 1;
        }
        any_served |= version.served;
    }

    if storage_count != 1 {
        errors.push(FieldError::invalid(
            &versions_path,
            storage_count,
            "must have exactly one version marked as storage version",
        ));
    }
    if !any_served {
        errors.push(FieldError::invalid(
            &versions_path,
            "",
            "must have at least one version marked as served",
        ));
    }
    if spec.version != spec.versions[0].name {
        errors.push(FieldError::invalid(
            &path.child("version"),
            &spec.version,
            "must match the first version in spec.versions",
        ));
    }
}

fn validate_names(names: &CustomResourceDefinitionNames, path: &FieldPath, errors: &mut FieldErrorList) {
    check_name(&path.child("plural"), &names.plural, is_dns1035_label, errors);
    check_name(&path.child("singular"), &names.singular, is_dns1035_label, errors);
    check_name(&path.child("kind"), &names.kind.to_lowercase(), is_dns1035_label, errors);
    check_name(&path.child("listKind"), &names.list_kind.to_lowercase(), is_dns1035_label, errors);

    if !names.kind.is_empty() && names.kind == names.list_kind {
        errors.push(FieldError::invalid(
            &path.child("listKind"),
            &names.list_kind,
            "kind and listKind cannot be the same",
        ));
    }

    for (i, short_name) in names.short_names.iter().enumerate() {
        check_name(&path.child("shortNames").index(i), short_name, is_dns1035_label, errors);
    }
    for (i, category) in names.categories.iter().enumerate() {
        check_name(&path.child("categories").index(i), category, is_dns1035_label, errors);
    }
}

fn check_name(
    path: &FieldPath,
    value: &str,
    check: fn(&str) -> Vec<String>,
    errors: &mut FieldErrorList,
) {
    if value.is_empty() {
        errors.push(FieldError::required(path, ""));
        return;
    }
    for msg in check(value) {
        errors.push(FieldError::invalid(path, value, msg));
    }
}

fn validate_root_schema(schema: &JsonSchemaProps, path: &FieldPath, errors: &mut FieldErrorList) {
    if let Some(type_) = schema.type_.as_deref() {
        if type_ != "object" {
            errors.push(FieldError::invalid(
                &path.child("type"),
                type_,
                "must be object at the root",
            ));
        }
    }

    if let Some(metadata) = schema.properties.get("metadata") {
        let metadata_path = path.child("properties").key("metadata");
        for key in metadata.properties.keys() {
            if key != "name" && key != "generateName" {
                errors.push(FieldError::forbidden(
                    &metadata_path.child("properties").key(key),
                    "must not specify anything other than name and generateName",
                ));
            }
        }
    }

    validate_schema(schema, path, errors);
}

fn validate_schema(schema: &JsonSchemaProps, path: &FieldPath, errors: &mut FieldErrorList) {
    if schema.ref_.is_some() {
        errors.push(FieldError::forbidden(&path.child("$ref"), "$ref is not supported"));
    }

    if let Some(type_) = schema.type_.as_deref() {
        if !SUPPORTED_SCHEMA_TYPES.contains(&type_) {
            errors.push(FieldError::not_supported(&path.child("type"), type_, &SUPPORTED_SCHEMA_TYPES));
        }
        if schema.x_int_or_string {
            errors.push(FieldError::forbidden(
                &path.child("type"),
                "must be empty if x-kubernetes-int-or-string is true",
            ));
        }
    }

    if schema.unique_items {
        errors.push(FieldError::forbidden(
            &path.child("uniqueItems"),
            "uniqueItems cannot be set to true since the runtime complexity becomes quadratic",
        ));
    }

    let restricts_additional = matches!(
        schema.additional_properties.as_deref(),
        Some(JsonSchemaPropsOrBool::Allows(false)) | Some(JsonSchemaPropsOrBool::Schema(_))
    );
    if !schema.properties.is_empty() && restricts_additional {
        errors.push(FieldError::forbidden(
            &path.child("additionalProperties"),
            "additionalProperties and properties are mutual exclusive",
        ));
    }

    for (i, required) in schema.required.iter().enumerate() {
        if required.is_empty() {
            errors.push(FieldError::invalid(&path.child("required").index(i), "", "must not be empty"));
        }
    }

    if let (Some(min), Some(max)) = (&schema.minimum, &schema.maximum) {
        if min.as_f64() > max.as_f64() {
            errors.push(FieldError::invalid(&path.child("minimum"), min, "must be less than or equal to maximum"));
        }
    }
    if let (Some(min), Some(max)) = (schema.min_length, schema.max_length) {
        if min > max {
            errors.push(FieldError::invalid(&path.child("minLength"), min, "must be less than or equal to maxLength"));
        }
    }
    if let (Some(min), Some(max)) = (schema.min_items, schema.max_items) {
        if min > max {
            errors.push(FieldError::invalid(&path.child("minItems"), min, "must be less than or equal to maxItems"));
        }
    }

    validate_list_markers(schema, path, errors);

    for (field, children) in [
        ("properties", &schema.properties),
        ("patternProperties", &schema.pattern_properties),
        ("definitions", &schema.definitions),
    ] {
        for (name, child) in children {
            validate_schema(child, &path.child(field).key(name), errors);
        }
    }
    for (name, dependency) in &schema.dependencies {
        if let JsonSchemaPropsOrStringArray::Schema(child) = dependency {
            validate_schema(child, &path.child("dependencies").key(name), errors);
        }
    }
    if let Some(items) = &schema.items {
        validate_schema(items, &path.child("items"), errors);
    }
    if let Some(JsonSchemaPropsOrBool::Schema(extra)) = schema.additional_items.as_deref() {
        validate_schema(extra, &path.child("additionalItems"), errors);
    }
    for (field, children) in [("allOf", &schema.all_of), ("oneOf", &schema.one_of), ("anyOf", &schema.any_of)] {
        for (i, child) in children.iter().enumerate() {
            validate_schema(child, &path.child(field).index(i), errors);
        }
    }
    if let Some(not) = &schema.not {
        validate_schema(not, &path.child("not"), errors);
    }
    if let Some(JsonSchemaPropsOrBool::Schema(extra)) = schema.additional_properties.as_deref() {
        validate_schema(extra, &path.child("additionalProperties"), errors);
    }
}

fn validate_list_markers(schema: &JsonSchemaProps, path: &FieldPath, errors: &mut FieldErrorList) {
    let type_ = schema.type_.as_deref();

    if let Some(list_type) = schema.x_list_type.as_deref() {
        let list_type_path = path.child("x-kubernetes-list-type");
        if !SUPPORTED_LIST_TYPES.contains(&list_type) {
            errors.push(FieldError::not_supported(&list_type_path, list_type, &SUPPORTED_LIST_TYPES));
        }
        if type_ != Some("array") {
            errors.push(FieldError::invalid(&list_type_path, list_type, "must only be used if type is array"));
        }
        if list_type == "map" && schema.x_list_map_keys.is_empty() {
            errors.push(FieldError::required(
                &path.child("x-kubernetes-list-map-keys"),
                "must not be empty if x-kubernetes-list-type is map",
            ));
        }
    }
    if !schema.x_list_map_keys.is_empty() && schema.x_list_type.as_deref() != Some("map") {
        errors.push(FieldError::forbidden(
            &path.child("x-kubernetes-list-map-keys"),
            "must be empty if x-kubernetes-list-type is not map",
        ));
    }

    if let Some(map_type) = schema.x_map_type.as_deref() {
        let map_type_path = path.child("x-kubernetes-map-type");
        if !SUPPORTED_MAP_TYPES.contains(&map_type) {
            errors.push(FieldError::not_supported(&map_type_path, map_type, &SUPPORTED_MAP_TYPES));
        }
        if type_ != Some("object") {
            errors.push(FieldError::invalid(&map_type_path, map_type, "must only be used if type is object"));
        }
    }
}
