//! Constraint framework demo CLI
//!
//! Synthesizes the CustomResourceDefinition for a ConstraintTemplate and
//! validates constraint documents against it.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- synthesize --template demo/templates/k8srequiredlabels.json
//!   cargo run -p demo -- validate --template demo/templates/k8srequiredlabels.json \
//!       --constraint demo/constraints/ns-must-have-owner.json

mod scenarios;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use constraint_client::{definition_digest, Client};
use constraint_contracts::{
    error::{ConstraintError, ConstraintResult},
    templates::ConstraintTemplate,
    unstructured::Unstructured,
};
use constraint_core::traits::Scheme;
use constraint_scheme::V1beta1Scheme;
use constraint_targets::{TargetConfig, TargetRegistry};

/// Target registered when no `--targets` file is given.
const ADMISSION_TARGET: &str = "admission.k8s.gatekeeper.sh";

const DEFAULT_TARGETS: &str = include_str!("../targets.toml");

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "demo",
    about = "ConstraintTemplate → CRD synthesis and constraint validation",
    long_about = "Synthesizes the CustomResourceDefinition a ConstraintTemplate mints and\n\
                  validates constraint documents against it."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the built-in scenarios in sequence.
    RunAll,
    /// Print the apiextensions/v1beta1 CRD synthesized for a template.
    Synthesize {
        /// ConstraintTemplate JSON document.
        #[arg(long)]
        template: PathBuf,
        /// Targets TOML file. Defaults to the bundled admission target.
        #[arg(long)]
        targets: Option<PathBuf>,
    },
    /// Validate a constraint against the CRD synthesized for its template.
    Validate {
        #[arg(long)]
        template: PathBuf,
        /// Constraint JSON document.
        #[arg(long)]
        constraint: PathBuf,
        #[arg(long)]
        targets: Option<PathBuf>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for pipeline tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::RunAll => scenarios::run_all(),
        Command::Synthesize { template, targets } => synthesize(&template, targets.as_deref()),
        Command::Validate {
            template,
            constraint,
            targets,
        } => validate(&template, &constraint, targets.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn synthesize(template: &Path, targets: Option<&Path>) -> ConstraintResult<()> {
    let client = Client::new(load_targets(targets)?);
    let crd = client.add_template(load_template(template)?)?;

    // Print the wire form the platform would receive.
    let external = V1beta1Scheme::new().to_external(&crd)?;
    let rendered = serde_json::to_string_pretty(&external).map_err(|e| ConstraintError::ConfigError {
        reason: format!("failed to render CRD: {}", e),
    })?;
    println!("{rendered}");
    eprintln!("digest: {}", definition_digest(&crd)?);
    Ok(())
}

fn validate(template: &Path, constraint: &Path, targets: Option<&Path>) -> ConstraintResult<()> {
    let client = Client::new(load_targets(targets)?);
    let kind = client
        .add_template(load_template(template)?)?
        .spec
        .names
        .kind;
    let constraint = Unstructured::new(read_json(constraint)?);

    info!(kind = %kind, name = %constraint.name(), "validating constraint");
    client.validate_constraint(&constraint)?;
    println!("constraint '{}' is valid for kind {}", constraint.name(), kind);
    Ok(())
}

// ── Loading ───────────────────────────────────────────────────────────────────

fn load_targets(path: Option<&Path>) -> ConstraintResult<TargetRegistry> {
    let config = match path {
        Some(path) => TargetConfig::from_file(path)?,
        None => TargetConfig::from_toml_str(DEFAULT_TARGETS)?,
    };
    config.into_registry()
}

fn load_template(path: &Path) -> ConstraintResult<ConstraintTemplate> {
    serde_json::from_value(read_json(path)?).map_err(|e| ConstraintError::ConfigError {
        reason: format!("'{}' is not a ConstraintTemplate: {}", path.display(), e),
    })
}

fn read_json(path: &Path) -> ConstraintResult<Value> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConstraintError::ConfigError {
        reason: format!("failed to read '{}': {}", path.display(), e),
    })?;
    serde_json::from_str(&contents).map_err(|e| ConstraintError::ConfigError {
        reason: format!("'{}' is not valid JSON: {}", path.display(), e),
    })
}
