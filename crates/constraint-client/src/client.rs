//! Template registry and constraint admission.
//!
//! Registering a template runs the whole synthesis pipeline once:
//!
//!   validate_targets → resolve target → create_schema → create_crd → validate_crd
//!
//! and stores the template next to its definition, keyed by constraint kind.
//! Constraint documents are then validated against the definition of their
//! kind.
//!
//! Registered entries are immutable and shared as `Arc`s. The registry lock
//! is held only to insert, remove or clone an entry, never while a pipeline
//! step runs.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use tracing::{debug, info, warn};

use constraint_contracts::{
    apiextensions::CustomResourceDefinition,
    error::{ConstraintError, ConstraintResult},
    templates::ConstraintTemplate,
    unstructured::Unstructured,
};
use constraint_core::{helper::validate_targets, CrdHelper};
use constraint_scheme::V1beta1Scheme;
use constraint_targets::TargetRegistry;
use constraint_verify::JsonSchemaValidatorFactory;

/// A template that passed registration, with the definition synthesized
/// for it.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredTemplate {
    pub template: ConstraintTemplate,
    pub crd: CustomResourceDefinition,
}

impl RegisteredTemplate {
    pub fn kind(&self) -> &str {
        self.template.constraint_kind()
    }
}

pub struct Client {
    helper: CrdHelper,
    targets: TargetRegistry,
    templates: RwLock<HashMap<String, Arc<RegisteredTemplate>>>,
}

impl Client {
    /// A client using the `v1beta1` scheme and the JSON Schema validator.
    pub fn new(targets: TargetRegistry) -> Self {
        let helper = CrdHelper::new(
            Box::new(V1beta1Scheme::new()),
            Box::new(JsonSchemaValidatorFactory::new()),
        );
        Self::with_helper(helper, targets)
    }

    /// A client driving a caller-assembled pipeline.
    pub fn with_helper(helper: CrdHelper, targets: TargetRegistry) -> Self {
        Self {
            helper,
            targets,
            templates: RwLock::new(HashMap::new()),
        }
    }

    pub fn targets(&self) -> &TargetRegistry {
        &self.targets
    }

    /// The pipeline, for checking a constraint against a specific
    /// definition rather than the one registered for its kind.
    pub fn helper(&self) -> &CrdHelper {
        &self.helper
    }

    /// Synthesize and validate the definition for `template`, then register
    /// it under its constraint kind.
    ///
    /// Re-registering a kind replaces the previous entry. Nothing is stored
    /// when any step fails.
    pub fn add_template(
        &self,
        template: ConstraintTemplate,
    ) -> ConstraintResult<CustomResourceDefinition> {
        validate_targets(&template)?;

        let target_name = template
            .spec
            .targets
            .as_ref()
            .and_then(|targets| targets.keys().next())
            .cloned()
            .unwrap_or_default();
        let provider = self.targets.get(&target_name).ok_or_else(|| {
            warn!(target_name = %target_name, "template names an unregistered target");
            ConstraintError::TargetNotFound {
                target: target_name.clone(),
            }
        })?;

        let schema = self.helper.create_schema(&template, provider.as_ref())?;
        let crd = self.helper.create_crd(&template, schema)?;
        self.helper.validate_crd(&crd)?;

        let kind = template.constraint_kind().to_string();
        let entry = Arc::new(RegisteredTemplate {
            template,
            crd: crd.clone(),
        });
        let replaced = self
            .templates
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind.clone(), entry)
            .is_some();

        info!(
            kind = %kind,
            target_name = %target_name,
            crd = %crd.metadata.name,
            replaced,
            "registered constraint template"
        );
        Ok(crd)
    }

    pub fn get_template(&self, kind: &str) -> Option<Arc<RegisteredTemplate>> {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(kind)
            .cloned()
    }

    pub fn remove_template(&self, kind: &str) -> Option<Arc<RegisteredTemplate>> {
        let removed = self
            .templates
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(kind);
        if removed.is_some() {
            info!(kind = %kind, "removed constraint template");
        }
        removed
    }

    /// Registered constraint kinds, sorted.
    pub fn template_kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self
            .templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        kinds.sort();
        kinds
    }

    /// Validate a constraint document against the definition registered for
    /// its kind.
    pub fn validate_constraint(&self, constraint: &Unstructured) -> ConstraintResult<()> {
        let kind = constraint.kind();
        let entry = self.get_template(kind).ok_or_else(|| {
            debug!(kind = %kind, name = %constraint.name(), "no template for constraint kind");
            ConstraintError::TemplateNotFound {
                kind: kind.to_string(),
            }
        })?;
        self.helper.validate_cr(constraint, &entry.crd)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
