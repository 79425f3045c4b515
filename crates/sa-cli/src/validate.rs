//! # Validate Subcommand
//!
//! Links a data document to its shadow tree, which runs a full validation
//! pass, and reports the findings. Exits with status 1 when any error
//! finding exists.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use sa_core::{Finding, PropertySummary};

use crate::document::{build_session, load_config, load_data, load_shadow};

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Data document (JSON or YAML).
    #[arg(long)]
    pub data: PathBuf,

    /// Shadow tree document (JSON or YAML).
    #[arg(long)]
    pub shadow: PathBuf,

    /// Registration key of the data object.
    #[arg(long, default_value = "data")]
    pub key: String,

    /// City list for `cityParamsValidation` (a sequence of names).
    #[arg(long)]
    pub cities: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Outcome of validating one document.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub key: String,
    pub errors: usize,
    pub warnings: usize,
    pub findings: Vec<Finding>,
    pub by_property: Vec<PropertySummary>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.errors == 0
    }
}

/// Validate a data document against a shadow tree.
pub fn validate_document(args: &ValidateArgs, config: Option<&Path>) -> Result<ValidationReport> {
    let config = load_config(config)?;
    let shadow = load_shadow(&args.shadow, &config.syntax)?;
    let data = load_data(&args.data)?;
    let binding_on_link = config.enable_binding_on_link;

    let mut session = build_session(config, args.cities.as_deref())?;
    let mut obj = session.link(args.key.as_str(), data, shadow)?;
    if !binding_on_link {
        // Link does not validate while binding stays off.
        session.validate_all(&mut obj)?;
    }

    let findings = session.findings();
    Ok(ValidationReport {
        key: args.key.clone(),
        errors: findings.error_count(),
        warnings: findings.warnings().count(),
        findings: findings.findings().to_vec(),
        by_property: findings.by_property(),
    })
}

/// Run the `validate` subcommand.
pub fn run_validate(args: &ValidateArgs, config: Option<&Path>) -> Result<u8> {
    let report = validate_document(args, config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.findings.is_empty() {
        println!("OK: no findings for '{}'", report.key);
    } else {
        let status = if report.passed() { "OK" } else { "FAIL" };
        println!(
            "{status}: {} error(s), {} warning(s) for '{}'",
            report.errors, report.warnings, report.key
        );
        for finding in &report.findings {
            println!("  {finding}");
        }
    }

    Ok(if report.passed() { 0 } else { 1 })
}
