//! # Check-Shadow Subcommand
//!
//! Parses a shadow tree, runs the registration checks and reports:
//!
//! - the number of annotated fields per rule kind,
//! - annotations no built-in handler answers to,
//! - with `--data`, data fields that have no annotation entry.
//!
//! With `--strict`, unregistered annotations or coverage gaps exit with
//! status 1.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use sa_core::path;
use sa_engine::{HandlerTable, RuleKind, ShadowNode};

use crate::document::{build_session, load_config, load_data, load_shadow};

/// Arguments for the `check-shadow` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Shadow tree document (JSON or YAML).
    #[arg(long)]
    pub shadow: PathBuf,

    /// Data document to check coverage against.
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Fail on unregistered annotations and coverage gaps.
    #[arg(long)]
    pub strict: bool,
}

/// Findings of a shadow tree check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShadowReport {
    pub depth: usize,
    pub annotated_fields: usize,
    pub validators: usize,
    pub converters: usize,
    pub processors: usize,
    /// `(kind, annotation)` pairs without a registered handler, sorted.
    pub unregistered: BTreeSet<(String, String)>,
    /// Data paths without an annotation entry.
    pub coverage_gaps: Vec<String>,
}

impl ShadowReport {
    pub fn is_clean(&self) -> bool {
        self.unregistered.is_empty() && self.coverage_gaps.is_empty()
    }
}

/// Check a shadow tree document.
pub fn check_shadow(args: &CheckArgs, config: Option<&Path>) -> Result<ShadowReport> {
    let config = load_config(config)?;
    let shadow = load_shadow(&args.shadow, &config.syntax)?;
    shadow
        .check(config.max_cascade_depth)
        .with_context(|| format!("{} failed registration checks", args.shadow.display()))?;

    let session = build_session(config, None)?;
    let mut report = ShadowReport {
        depth: shadow.depth(),
        ..ShadowReport::default()
    };
    tally(&shadow, "", session.handlers(), &mut report);

    if let Some(data_path) = &args.data {
        let data = load_data(data_path)?;
        report.coverage_gaps = shadow.coverage_gaps(&data, &session.config().syntax);
    }
    Ok(report)
}

fn tally(node: &ShadowNode, base: &str, handlers: &HandlerTable, report: &mut ShadowReport) {
    for (field, annotations) in node.annotated_fields() {
        report.annotated_fields += 1;
        for annotation in annotations {
            let name = annotation.name();
            let registered = match annotation.kind() {
                RuleKind::Validator => {
                    report.validators += 1;
                    handlers.validator(name).is_some()
                }
                RuleKind::Converter => {
                    report.converters += 1;
                    handlers.converter(name).is_some()
                }
                RuleKind::Processor => {
                    report.processors += 1;
                    handlers.processor(name).is_some()
                }
            };
            if !registered {
                tracing::debug!(field = %path::join(base, field), annotation = name, "no handler");
                report
                    .unregistered
                    .insert((annotation.kind().to_string(), name.to_string()));
            }
        }
    }
    for (field, child) in node.children() {
        tally(child, &path::join(base, field), handlers, report);
    }
}

/// Run the `check-shadow` subcommand.
pub fn run_check(args: &CheckArgs, config: Option<&Path>) -> Result<u8> {
    let report = check_shadow(args, config)?;

    println!("OK: {} parsed", args.shadow.display());
    println!("  Depth:            {}", report.depth);
    println!("  Annotated fields: {}", report.annotated_fields);
    println!(
        "  Rules:            {} validator(s), {} converter(s), {} processor(s)",
        report.validators, report.converters, report.processors
    );

    if !report.unregistered.is_empty() {
        println!("Unregistered annotations (skipped at dispatch):");
        for (kind, name) in &report.unregistered {
            println!("  {kind:<9} {name}");
        }
    }
    if !report.coverage_gaps.is_empty() {
        println!("Data fields without annotation entries:");
        for gap in &report.coverage_gaps {
            println!("  {gap}");
        }
    }

    Ok(if args.strict && !report.is_clean() { 1 } else { 0 })
}
