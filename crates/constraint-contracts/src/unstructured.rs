//! Untyped resource documents.
//!
//! Constraint instances are validated before any typed model exists for
//! their kind, so they are handled as raw JSON with a few accessors for the
//! identity fields the pipeline checks.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An arbitrary resource document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Unstructured(Value);

impl Unstructured {
    pub fn new(object: Value) -> Self {
        Self(object)
    }

    pub fn object(&self) -> &Value {
        &self.0
    }

    /// `metadata.name`, or `""` when absent.
    pub fn name(&self) -> &str {
        self.str_at("/metadata/name")
    }

    /// `kind`, or `""` when absent.
    pub fn kind(&self) -> &str {
        self.str_at("/kind")
    }

    /// `apiVersion`, or `""` when absent.
    pub fn api_version(&self) -> &str {
        self.str_at("/apiVersion")
    }

    pub fn group_version_kind(&self) -> GroupVersionKind {
        GroupVersionKind::parse(self.api_version(), self.kind())
    }

    fn str_at(&self, pointer: &str) -> &str {
        self.0.pointer(pointer).and_then(Value::as_str).unwrap_or_default()
    }
}

impl From<Value> for Unstructured {
    fn from(object: Value) -> Self {
        Self::new(object)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupVersionKind {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    /// Split an `apiVersion` of the form `group/version` (or a bare `version`
    /// for the core group). A value with more than one `/` is unparseable and
    /// yields an empty group and version.
    pub fn parse(api_version: &str, kind: &str) -> Self {
        let (group, version) = match api_version.split_once('/') {
            None => ("", api_version),
            Some((_, rest)) if rest.contains('/') => ("", ""),
            Some((group, version)) => (group, version),
        };
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        }
    }
}
