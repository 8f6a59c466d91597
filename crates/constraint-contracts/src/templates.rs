//! The ConstraintTemplate resource.
//!
//! A template names the constraint kind it mints (`spec.crd.spec.names.kind`),
//! optionally declares a parameter schema, and binds to exactly one target.
//!
//! Every type here owns its data outright, so `Clone` yields a fully
//! independent copy: mutating a clone's targets, names or schema document
//! never reaches the original. Templates held in a shared registry are read
//! through `Arc`; a consumer that needs to adapt one clones it first.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::meta::ObjectMeta;

/// Author-facing template that, once registered, mints a constraint kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintTemplate {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub spec: ConstraintTemplateSpec,
    #[serde(default)]
    pub status: ConstraintTemplateStatus,
}

impl ConstraintTemplate {
    pub const API_VERSION: &'static str = "templates.gatekeeper.sh/v1beta1";
    pub const KIND: &'static str = "ConstraintTemplate";

    /// Build a template minting `kind`, bound to a single `target`.
    ///
    /// The template's own name is the lower-cased kind, which is how the
    /// admission path expects templates to be named.
    pub fn new(kind: impl Into<String>, target: impl Into<String>, target_spec: Target) -> Self {
        let kind = kind.into();
        let mut targets = BTreeMap::new();
        targets.insert(target.into(), target_spec);
        Self {
            api_version: Self::API_VERSION.to_string(),
            kind: Self::KIND.to_string(),
            metadata: ObjectMeta::named(kind.to_lowercase()),
            spec: ConstraintTemplateSpec {
                crd: Crd {
                    spec: CrdSpec {
                        names: CrdNames { kind },
                        validation: None,
                    },
                },
                targets: Some(targets),
            },
            status: ConstraintTemplateStatus::default(),
        }
    }

    /// Attach an OpenAPI v3 parameter schema document.
    pub fn with_parameters(mut self, schema: Value) -> Self {
        self.spec.crd.spec.validation = Some(Validation {
            open_api_v3_schema: Some(schema),
        });
        self
    }

    /// The constraint kind this template mints.
    pub fn constraint_kind(&self) -> &str {
        &self.spec.crd.spec.names.kind
    }

    /// The author-supplied parameter schema, if one is declared.
    pub fn parameter_schema(&self) -> Option<&Value> {
        self.spec
            .crd
            .spec
            .validation
            .as_ref()
            .and_then(|v| v.open_api_v3_schema.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintTemplateSpec {
    pub crd: Crd,

    /// Target name → target. `None` means the field was omitted, which is
    /// reported differently from an empty map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<BTreeMap<String, Target>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Crd {
    pub spec: CrdSpec,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CrdSpec {
    pub names: CrdNames,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CrdNames {
    #[serde(default)]
    pub kind: String,
}

/// Wrapper around the author's parameter schema document.
///
/// The document is kept in its authored (external) form; it is only
/// converted to a typed schema during synthesis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Validation {
    #[serde(
        rename = "openAPIV3Schema",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub open_api_v3_schema: Option<Value>,
}

/// A policy target binding. The match schema for the target is supplied by
/// its provider at synthesis time and is never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Target {
    /// Policy source evaluated by the target's engine. Opaque to this crate.
    #[serde(default)]
    pub rego: String,
}

impl Target {
    pub fn with_rego(rego: impl Into<String>) -> Self {
        Self { rego: rego.into() }
    }
}

/// Platform bookkeeping for a template.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConstraintTemplateStatus {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub created: bool,
}
