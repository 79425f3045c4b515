//! # Document Loading
//!
//! Data documents, shadow trees, city lists and engine configuration are
//! read from disk here. Files ending in `.yaml` or `.yml` are parsed as
//! YAML, everything else as JSON.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use sa_core::FieldValue;
use sa_engine::{EngineConfig, Session, ShadowNode, ShadowSyntax};
use sa_rules::{builtin_handlers, StaticCityDirectory};

/// Read a JSON or YAML document.
pub fn load_document(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    if is_yaml(path) {
        serde_yaml::from_str(&text).with_context(|| format!("invalid YAML in {}", path.display()))
    } else {
        serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
    }
}

/// Read a data document.
pub fn load_data(path: &Path) -> Result<FieldValue> {
    Ok(FieldValue::from(load_document(path)?))
}

/// Read and parse a shadow tree document.
pub fn load_shadow(path: &Path, syntax: &ShadowSyntax) -> Result<ShadowNode> {
    let document = load_document(path)?;
    ShadowNode::from_json(&document, syntax)
        .with_context(|| format!("invalid shadow tree in {}", path.display()))
}

/// Read a city list: a sequence of names.
pub fn load_cities(path: &Path) -> Result<StaticCityDirectory> {
    let document = load_document(path)?;
    let Some(entries) = document.as_array() else {
        bail!("{}: city list must be a sequence of names", path.display());
    };
    let mut names = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry.as_str() {
            Some(name) => names.push(name.to_string()),
            None => bail!("{}: city names must be strings, found {entry}", path.display()),
        }
    }
    Ok(StaticCityDirectory::new(names))
}

/// Load the engine configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("failed to load engine config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

/// A session with every built-in rule registered.
///
/// Without a city list the city rule knows no cities.
pub fn build_session(config: EngineConfig, cities: Option<&Path>) -> Result<Session> {
    let directory = match cities {
        Some(path) => load_cities(path)?,
        None => StaticCityDirectory::default(),
    };
    tracing::debug!(cities = directory.len(), "city directory loaded");
    let handlers = builtin_handlers(Arc::new(directory)).context("failed to build rule set")?;
    Ok(Session::new(config, Arc::new(handlers))?)
}

/// Write a data document as pretty JSON to `out`, or to stdout.
pub fn write_data(data: &FieldValue, out: Option<&Path>) -> Result<()> {
    let text = serde_json::to_string_pretty(data).context("failed to serialize data")?;
    match out {
        Some(path) => std::fs::write(path, format!("{text}\n"))
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}
