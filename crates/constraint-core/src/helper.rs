//! The template → CRD pipeline.
//!
//! `CrdHelper` turns a ConstraintTemplate into the CustomResourceDefinition
//! for the constraint kind it mints, and later validates constraint
//! documents against that definition:
//!
//!   validate_targets → create_schema → create_crd → validate_crd   (once)
//!   validate_cr                                                    (per constraint)
//!
//! The helper holds no mutable state. Every call builds fresh values and
//! never mutates the template or definition it is given, so one helper can
//! serve concurrent callers.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use constraint_contracts::{
    apiextensions::{
        CustomResourceDefinition, CustomResourceDefinitionNames, CustomResourceDefinitionSpec,
        CustomResourceDefinitionVersion, CustomResourceValidation, JsonSchemaProps,
    },
    error::{ConstraintError, ConstraintResult},
    meta::ObjectMeta,
    templates::ConstraintTemplate,
    unstructured::Unstructured,
    CONSTRAINT_GROUP, LEGACY_VERSION, STORAGE_VERSION, SUPPORTED_VERSIONS,
};

use crate::{
    naming::is_dns1123_subdomain,
    traits::{MatchSchemaProvider, Scheme, SchemaValidatorFactory},
};

/// Ensure the template binds exactly one target.
///
/// A missing `targets` field, an empty map, and a multi-target map each get
/// their own message, since each needs a different fix from the author.
pub fn validate_targets(templ: &ConstraintTemplate) -> ConstraintResult<()> {
    let reason = match &templ.spec.targets {
        None => r#"field "targets" not specified in ConstraintTemplate spec"#,
        Some(targets) if targets.is_empty() => {
            "no targets specified: ConstraintTemplate must specify one target"
        }
        Some(targets) if targets.len() > 1 => "multi-target templates are not currently supported",
        Some(_) => return Ok(()),
    };
    Err(ConstraintError::TargetCardinality {
        reason: reason.to_string(),
    })
}

/// Builds and checks CRDs for constraint kinds.
pub struct CrdHelper {
    scheme: Box<dyn Scheme>,
    validators: Box<dyn SchemaValidatorFactory>,
}

impl CrdHelper {
    pub fn new(scheme: Box<dyn Scheme>, validators: Box<dyn SchemaValidatorFactory>) -> Self {
        Self { scheme, validators }
    }

    /// Combine the target's match schema and the template's parameter schema
    /// into the schema of the constraint resource.
    ///
    /// The result has a single top-level property `spec` holding `match` and
    /// `enforcementAction`, plus `parameters` when the template declares a
    /// parameter schema.
    pub fn create_schema(
        &self,
        templ: &ConstraintTemplate,
        target: &dyn MatchSchemaProvider,
    ) -> ConstraintResult<JsonSchemaProps> {
        validate_targets(templ)?;

        let mut props = BTreeMap::new();
        props.insert("match".to_string(), target.match_schema());
        props.insert(
            "enforcementAction".to_string(),
            JsonSchemaProps::typed("string"),
        );

        if let Some(document) = templ.parameter_schema() {
            let parameters = self.scheme.convert_schema(document)?;
            props.insert("parameters".to_string(), parameters);
        }

        debug!(
            kind = %templ.constraint_kind(),
            has_parameters = props.contains_key("parameters"),
            "composed constraint schema"
        );

        let mut root = BTreeMap::new();
        root.insert("spec".to_string(), JsonSchemaProps::with_properties(props));
        Ok(JsonSchemaProps::with_properties(root))
    }

    /// Wrap `schema` in the CRD for the template's constraint kind.
    ///
    /// The CRD is pushed through the `v1beta1` round trip so platform
    /// defaults are present before validation, then named
    /// `<plural>.constraints.gatekeeper.sh`.
    pub fn create_crd(
        &self,
        templ: &ConstraintTemplate,
        schema: JsonSchemaProps,
    ) -> ConstraintResult<CustomResourceDefinition> {
        let kind = templ.constraint_kind();
        let plural = kind.to_lowercase();

        let crd = CustomResourceDefinition {
            metadata: ObjectMeta::default(),
            spec: CustomResourceDefinitionSpec {
                group: CONSTRAINT_GROUP.to_string(),
                version: STORAGE_VERSION.to_string(),
                names: CustomResourceDefinitionNames {
                    plural: plural.clone(),
                    singular: plural.clone(),
                    short_names: Vec::new(),
                    kind: kind.to_string(),
                    list_kind: format!("{kind}List"),
                    categories: vec!["all".to_string(), "constraint".to_string()],
                },
                scope: "Cluster".to_string(),
                validation: Some(CustomResourceValidation {
                    open_api_v3_schema: Some(schema),
                }),
                versions: vec![
                    CustomResourceDefinitionVersion {
                        name: STORAGE_VERSION.to_string(),
                        served: true,
                        storage: true,
                    },
                    CustomResourceDefinitionVersion {
                        name: LEGACY_VERSION.to_string(),
                        served: true,
                        storage: false,
                    },
                ],
                additional_printer_columns: Vec::new(),
                conversion: None,
                preserve_unknown_fields: None,
            },
        };

        // Defaulting is only defined for the versioned form.
        let external = self.scheme.to_external(&crd)?;
        let defaulted = self.scheme.apply_defaults(external)?;
        let mut out = self.scheme.to_internal(&defaulted)?;

        out.metadata.name = format!("{plural}.{CONSTRAINT_GROUP}");
        debug!(name = %out.metadata.name, "synthesized constraint CRD");
        Ok(out)
    }

    /// Run the platform's CRD validation and aggregate every error.
    pub fn validate_crd(&self, crd: &CustomResourceDefinition) -> ConstraintResult<()> {
        let errors = self.scheme.validate_definition(crd);
        if errors.is_empty() {
            info!(name = %crd.metadata.name, "constraint CRD passed validation");
            return Ok(());
        }
        warn!(
            name = %crd.metadata.name,
            error_count = errors.len(),
            "constraint CRD failed validation"
        );
        Err(ConstraintError::DefinitionValidation { errors })
    }

    /// Validate a constraint document against the CRD of its kind.
    ///
    /// Checks run in a fixed order and stop at the first failure: schema
    /// validation, name syntax, kind, group, version.
    pub fn validate_cr(
        &self,
        cr: &Unstructured,
        crd: &CustomResourceDefinition,
    ) -> ConstraintResult<()> {
        let validator = self.validators.build(crd.spec.validation.as_ref())?;

        let errors = validator.validate(cr.object());
        if !errors.is_empty() {
            warn!(
                name = %cr.name(),
                error_count = errors.len(),
                "constraint failed schema validation"
            );
            return Err(ConstraintError::InstanceSchema { errors });
        }

        let name_errors = is_dns1123_subdomain(cr.name());
        if !name_errors.is_empty() {
            return Err(ConstraintError::InstanceName {
                name: cr.name().to_string(),
                errors: name_errors,
            });
        }

        let gvk = cr.group_version_kind();
        if gvk.kind != crd.spec.names.kind {
            return Err(ConstraintError::InstanceKind {
                name: cr.name().to_string(),
                have: gvk.kind,
                want: crd.spec.names.kind.clone(),
            });
        }
        if gvk.group != CONSTRAINT_GROUP {
            return Err(ConstraintError::InstanceGroup {
                name: cr.name().to_string(),
                have: gvk.group,
                want: CONSTRAINT_GROUP.to_string(),
            });
        }
        if !SUPPORTED_VERSIONS.contains(&gvk.version.as_str()) {
            return Err(ConstraintError::InstanceVersion {
                name: cr.name().to_string(),
                have: gvk.version,
                supported: SUPPORTED_VERSIONS.iter().map(|v| v.to_string()).collect(),
            });
        }

        debug!(name = %cr.name(), kind = %gvk.kind, "constraint passed validation");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
