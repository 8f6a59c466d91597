//! # constraint-contracts
//!
//! Shared types for the constraint framework: the ConstraintTemplate model,
//! the internal and `v1beta1` CustomResourceDefinition models, untyped
//! constraint documents, field errors, and the framework error type.
//!
//! No pipeline logic lives in this crate, only data definitions.

pub mod apiextensions;
pub mod error;
pub mod field;
pub mod meta;
pub mod templates;
pub mod unstructured;
pub mod v1beta1;

/// API group every synthesized constraint kind is served under.
pub const CONSTRAINT_GROUP: &str = "constraints.gatekeeper.sh";

/// Served and storage version of synthesized constraint kinds.
pub const STORAGE_VERSION: &str = "v1beta1";

/// Served-only legacy version of synthesized constraint kinds.
pub const LEGACY_VERSION: &str = "v1alpha1";

/// Every version a constraint instance may declare.
pub const SUPPORTED_VERSIONS: [&str; 2] = [STORAGE_VERSION, LEGACY_VERSION];

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use error::ConstraintError;
    use field::{FieldError, FieldErrorList, FieldPath};
    use templates::{ConstraintTemplate, Target};
    use unstructured::{GroupVersionKind, Unstructured};

    fn template_with_params() -> ConstraintTemplate {
        ConstraintTemplate::new("K8sRequiredLabels", "admission.k8s.gatekeeper.sh", Target::with_rego("package k8srequiredlabels"))
            .with_parameters(json!({
                "properties": {
                    "labels": { "type": "array", "items": { "type": "string" } }
                }
            }))
    }

    // ── Template copies ──────────────────────────────────────────────────────

    #[test]
    fn template_clone_is_structurally_equal() {
        let original = template_with_params();
        let copy = original.clone();
        assert_eq!(original, copy);
    }

    #[test]
    fn mutating_clone_targets_leaves_original_untouched() {
        let original = template_with_params();
        let mut copy = original.clone();

        let targets = copy.spec.targets.as_mut().unwrap();
        targets.insert("second.target".to_string(), Target::default());
        targets.get_mut("admission.k8s.gatekeeper.sh").unwrap().rego = "changed".to_string();

        let original_targets = original.spec.targets.as_ref().unwrap();
        assert_eq!(original_targets.len(), 1);
        assert_eq!(
            original_targets["admission.k8s.gatekeeper.sh"].rego,
            "package k8srequiredlabels"
        );
    }

    #[test]
    fn mutating_clone_schema_leaves_original_untouched() {
        let original = template_with_params();
        let mut copy = original.clone();

        let schema = copy
            .spec
            .crd
            .spec
            .validation
            .as_mut()
            .and_then(|v| v.open_api_v3_schema.as_mut())
            .unwrap();
        schema["properties"]["labels"]["type"] = json!("string");
        copy.spec.crd.spec.names.kind = "Renamed".to_string();

        assert_eq!(
            original.parameter_schema().unwrap()["properties"]["labels"]["type"],
            json!("array")
        );
        assert_eq!(original.constraint_kind(), "K8sRequiredLabels");
    }

    #[test]
    fn mutating_original_leaves_clone_untouched() {
        let mut original = template_with_params();
        let copy = original.clone();

        original.spec.crd.spec.validation = None;
        original.spec.targets = None;

        assert!(copy.parameter_schema().is_some());
        assert_eq!(copy.spec.targets.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn absent_validation_clones_to_absent() {
        let original = ConstraintTemplate::new("K8sAllowedRepos", "t1", Target::default());
        let copy = original.clone();
        assert!(copy.spec.crd.spec.validation.is_none());
        assert!(copy.parameter_schema().is_none());
    }

    // ── Template serde ───────────────────────────────────────────────────────

    #[test]
    fn template_reads_authored_document() {
        let doc = json!({
            "apiVersion": "templates.gatekeeper.sh/v1beta1",
            "kind": "ConstraintTemplate",
            "metadata": { "name": "k8srequiredlabels" },
            "spec": {
                "crd": {
                    "spec": {
                        "names": { "kind": "K8sRequiredLabels" },
                        "validation": { "openAPIV3Schema": { "properties": { "labels": { "type": "array" } } } }
                    }
                },
                "targets": { "admission.k8s.gatekeeper.sh": { "rego": "package x" } }
            }
        });

        let templ: ConstraintTemplate = serde_json::from_value(doc).unwrap();
        assert_eq!(templ.constraint_kind(), "K8sRequiredLabels");
        assert_eq!(templ.metadata.name, "k8srequiredlabels");
        assert!(templ.parameter_schema().is_some());
        assert!(templ.spec.targets.unwrap().contains_key("admission.k8s.gatekeeper.sh"));
    }

    #[test]
    fn template_without_targets_field_reads_as_none() {
        let doc = json!({
            "spec": { "crd": { "spec": { "names": { "kind": "K" } } } }
        });
        let templ: ConstraintTemplate = serde_json::from_value(doc).unwrap();
        assert!(templ.spec.targets.is_none());
    }

    // ── Unstructured ─────────────────────────────────────────────────────────

    #[test]
    fn unstructured_accessors_read_identity_fields() {
        let cr = Unstructured::new(json!({
            "apiVersion": "constraints.gatekeeper.sh/v1beta1",
            "kind": "K8sRequiredLabels",
            "metadata": { "name": "ns-must-have-owner" }
        }));
        assert_eq!(cr.name(), "ns-must-have-owner");
        assert_eq!(cr.kind(), "K8sRequiredLabels");
        assert_eq!(
            cr.group_version_kind(),
            GroupVersionKind {
                group: CONSTRAINT_GROUP.to_string(),
                version: "v1beta1".to_string(),
                kind: "K8sRequiredLabels".to_string(),
            }
        );
    }

    #[test]
    fn unstructured_missing_fields_read_as_empty() {
        let cr = Unstructured::new(json!({ "spec": {} }));
        assert_eq!(cr.name(), "");
        assert_eq!(cr.kind(), "");
        assert_eq!(cr.api_version(), "");
    }

    #[test]
    fn group_version_parse_handles_core_and_malformed() {
        let core = GroupVersionKind::parse("v1", "Pod");
        assert_eq!(core.group, "");
        assert_eq!(core.version, "v1");

        let malformed = GroupVersionKind::parse("a/b/c", "Pod");
        assert_eq!(malformed.group, "");
        assert_eq!(malformed.version, "");
    }

    // ── Field errors ─────────────────────────────────────────────────────────

    #[test]
    fn field_path_renders_children_and_indices() {
        let path = FieldPath::new("spec").child("versions").index(1).child("name");
        assert_eq!(path.as_str(), "spec.versions[1].name");
        assert_eq!(FieldPath::default().child("kind").as_str(), "kind");
    }

    #[test]
    fn field_error_list_aggregates_messages() {
        let path = FieldPath::new("spec");
        let mut errors = FieldErrorList::new();
        errors.push(FieldError::required(&path.child("group"), ""));
        assert_eq!(errors.to_string(), "spec.group: Required value");

        errors.push(FieldError::invalid(&path.child("scope"), "Galaxy", "bad scope"));
        let msg = errors.to_string();
        assert!(msg.starts_with('['));
        assert!(msg.contains("spec.scope: Invalid value: \"Galaxy\": bad scope"));
    }

    // ── ConstraintError display messages ─────────────────────────────────────

    #[test]
    fn error_instance_kind_display_names_both_kinds() {
        let err = ConstraintError::InstanceKind {
            name: "c1".to_string(),
            have: "Other".to_string(),
            want: "K8sRequiredLabels".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Have Other"));
        assert!(msg.contains("want K8sRequiredLabels"));
    }

    #[test]
    fn error_instance_name_joins_errors_by_newline() {
        let err = ConstraintError::InstanceName {
            name: "Bad".to_string(),
            errors: vec!["first".to_string(), "second".to_string()],
        };
        assert_eq!(err.to_string(), "Invalid Name: first\nsecond");
    }

    #[test]
    fn error_instance_version_lists_supported_versions() {
        let err = ConstraintError::InstanceVersion {
            name: "c1".to_string(),
            have: "v2".to_string(),
            supported: SUPPORTED_VERSIONS.iter().map(|v| v.to_string()).collect(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Have v2"));
        assert!(msg.contains("v1beta1, v1alpha1"));
    }

    #[test]
    fn error_round_trip_display_names_stage() {
        let err = ConstraintError::DefinitionRoundTrip {
            stage: "to_external".to_string(),
            reason: "boom".to_string(),
        };
        assert!(err.to_string().contains("to_external"));
    }
}
