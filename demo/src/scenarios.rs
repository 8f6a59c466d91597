//! Built-in end-to-end scenarios.
//!
//! A: a parameterless template synthesizes a two-version CRD whose schema
//!     holds only `match` and `enforcementAction`.
//! B: a constraint named `My_Bad_Name` is rejected with the offending
//!     characters listed.
//! C: a constraint whose kind differs from the definition's is rejected,
//!     even though its body satisfies the schema.

use serde_json::json;

use constraint_client::{definition_digest, Client};
use constraint_contracts::{
    error::{ConstraintError, ConstraintResult},
    templates::{ConstraintTemplate, Target},
    unstructured::Unstructured,
};

use crate::{load_targets, ADMISSION_TARGET};

/// Run A, B and C in sequence against one client.
pub fn run_all() -> ConstraintResult<()> {
    let client = Client::new(load_targets(None)?);
    scenario_a(&client)?;
    scenario_b(&client)?;
    scenario_c(&client)?;
    Ok(())
}

fn required_labels() -> ConstraintTemplate {
    ConstraintTemplate::new(
        "K8sRequiredLabels",
        ADMISSION_TARGET,
        Target::with_rego("package k8srequiredlabels\n"),
    )
}

fn scenario_a(client: &Client) -> ConstraintResult<()> {
    println!("=== Scenario A: synthesize a parameterless template ===");
    println!();

    let crd = client.add_template(required_labels())?;
    let spec_fields: Vec<&str> = crd
        .schema()
        .and_then(|schema| schema.properties.get("spec"))
        .map(|spec| spec.properties.keys().map(String::as_str).collect())
        .unwrap_or_default();
    let versions: Vec<&str> = crd.spec.versions.iter().map(|v| v.name.as_str()).collect();

    println!("  CRD name:     {}", crd.metadata.name);
    println!("  Plural:       {}", crd.spec.names.plural);
    println!("  ListKind:     {}", crd.spec.names.list_kind);
    println!("  Versions:     {}", versions.join(", "));
    println!("  spec fields:  {}", spec_fields.join(", "));
    println!("  Digest:       {}", definition_digest(&crd)?);
    println!("  RESULT: SUCCESS (expected)");
    println!();
    Ok(())
}

fn scenario_b(client: &Client) -> ConstraintResult<()> {
    println!("=== Scenario B: constraint with an invalid name ===");
    println!();

    let constraint = Unstructured::new(json!({
        "apiVersion": "constraints.gatekeeper.sh/v1beta1",
        "kind": "K8sRequiredLabels",
        "metadata": { "name": "My_Bad_Name" },
        "spec": {}
    }));

    match client.validate_constraint(&constraint) {
        Err(ConstraintError::InstanceName { errors, .. }) => {
            println!("  Rejected: Invalid Name");
            for error in &errors {
                println!("    - {error}");
            }
            println!("  RESULT: InstanceName (expected)");
        }
        Err(e) => return Err(e),
        Ok(()) => println!("  Unexpectedly accepted"),
    }
    println!();
    Ok(())
}

fn scenario_c(client: &Client) -> ConstraintResult<()> {
    println!("=== Scenario C: constraint of the wrong kind ===");
    println!();

    let constraint = Unstructured::new(json!({
        "apiVersion": "constraints.gatekeeper.sh/v1beta1",
        "kind": "Other",
        "metadata": { "name": "must-have-owner" },
        "spec": { "match": { "namespaces": ["default"] } }
    }));

    let entry = client
        .get_template("K8sRequiredLabels")
        .ok_or_else(|| ConstraintError::TemplateNotFound {
            kind: "K8sRequiredLabels".to_string(),
        })?;

    match client.helper().validate_cr(&constraint, &entry.crd) {
        Err(e @ ConstraintError::InstanceKind { .. }) => {
            println!("  Rejected: {e}");
            println!("  RESULT: InstanceKind (expected)");
        }
        Err(e) => return Err(e),
        Ok(()) => println!("  Unexpectedly accepted"),
    }
    println!();
    Ok(())
}
