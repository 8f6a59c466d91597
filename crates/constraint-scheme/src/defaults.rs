//! Defaulting rules for `apiextensions/v1beta1` CustomResourceDefinitions.

use constraint_contracts::v1beta1::{
    CustomResourceColumnDefinition, CustomResourceConversion, CustomResourceDefinition,
    CustomResourceDefinitionVersion,
};

/// Fill in every unset field the platform defaults on admission.
///
/// Fields that are already set are left alone, so defaulting an already
/// defaulted definition changes nothing.
pub fn set_defaults(mut crd: CustomResourceDefinition) -> CustomResourceDefinition {
    let spec = &mut crd.spec;

    if spec.scope.is_empty() {
        spec.scope = "Namespaced".to_string();
    }

    if spec.versions.is_empty() && !spec.version.is_empty() {
        spec.versions.push(CustomResourceDefinitionVersion {
            name: spec.version.clone(),
            served: true,
            storage: true,
        });
    }
    if spec.version.is_empty() {
        if let Some(first) = spec.versions.first() {
            spec.version = first.name.clone();
        }
    }

    match spec.conversion.as_mut() {
        None => {
            spec.conversion = Some(CustomResourceConversion {
                strategy: "None".to_string(),
            })
        }
        Some(conversion) if conversion.strategy.is_empty() => {
            conversion.strategy = "None".to_string();
        }
        Some(_) => {}
    }

    if spec.names.singular.is_empty() {
        spec.names.singular = spec.names.kind.to_lowercase();
    }
    if spec.names.list_kind.is_empty() && !spec.names.kind.is_empty() {
        spec.names.list_kind = format!("{}List", spec.names.kind);
    }

    if spec.preserve_unknown_fields.is_none() {
        spec.preserve_unknown_fields = Some(true);
    }

    if spec.additional_printer_columns.is_empty() {
        spec.additional_printer_columns.push(CustomResourceColumnDefinition {
            name: "Age".to_string(),
            type_: "date".to_string(),
            format: String::new(),
            description: String::new(),
            priority: 0,
            json_path: ".metadata.creationTimestamp".to_string(),
        });
    }

    crd
}
