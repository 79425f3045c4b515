//! # Field Binding
//!
//! Change-triggered re-validation of bound data objects.
//!
//! A [`BoundObject`] pairs a data object with its registration key and the
//! set of field paths that are *watched*. `Session::install_accessors` walks
//! the data depth-first, converts annotated fields forward, and marks every
//! field it passes as watched. From then on `Session::set_field` is the
//! mutation entry point: it stores the value and, when binding is enabled
//! and the value actually changed, dispatches the field's annotations and
//! notifies the [`RefreshListener`]s.

use std::collections::BTreeSet;

use sa_core::path;
use sa_core::{EngineError, FieldValue, FindingRegistry, ObjectKey};

use crate::config::ShadowSyntax;
use crate::dispatch::RuleContext;

/// A data object together with its registration key.
///
/// The caller owns this handle; the engine only reads and writes the data
/// through it.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundObject {
    key: ObjectKey,
    data: FieldValue,
    watched: BTreeSet<String>,
}

impl BoundObject {
    pub(crate) fn new(key: ObjectKey, data: FieldValue) -> Self {
        Self {
            key,
            data,
            watched: BTreeSet::new(),
        }
    }

    pub fn key(&self) -> &ObjectKey {
        &self.key
    }

    pub fn data(&self) -> &FieldValue {
        &self.data
    }

    /// Mutable access that bypasses change detection, for bulk population.
    pub fn data_mut(&mut self) -> &mut FieldValue {
        &mut self.data
    }

    /// The value at `path`.
    pub fn get(&self, path: &str) -> Option<&FieldValue> {
        path::resolve(&self.data, path)
    }

    /// Whether writes to `path` trigger dispatch.
    pub fn is_watched(&self, path: &str) -> bool {
        self.watched.contains(path)
    }

    /// All watched paths, sorted.
    pub fn watched(&self) -> impl Iterator<Item = &str> {
        self.watched.iter().map(String::as_str)
    }

    /// Release the data object.
    pub fn into_inner(self) -> FieldValue {
        self.data
    }

    pub(crate) fn parts_mut(&mut self) -> (&ObjectKey, &mut FieldValue, &mut BTreeSet<String>) {
        (&self.key, &mut self.data, &mut self.watched)
    }
}

/// Outcome of `Session::set_field`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldChange {
    /// The new value equals the old one; nothing ran.
    Unchanged,
    /// The value was stored without dispatch: binding disabled, field not
    /// watched, or no annotations declared.
    Stored,
    /// The value was stored, the field's annotations ran and listeners were
    /// notified.
    Dispatched,
}

/// Receives a notification after every change-triggered dispatch.
pub trait RefreshListener {
    fn refresh(&mut self, findings: &FindingRegistry);
}

impl<F> RefreshListener for F
where
    F: FnMut(&FindingRegistry),
{
    fn refresh(&mut self, findings: &FindingRegistry) {
        self(findings)
    }
}

/// Visit every data field under `base` depth-first, children before their
/// container, skipping reserved keys.
pub(crate) fn walk_fields(
    ctx: &mut RuleContext<'_>,
    base: &str,
    syntax: &ShadowSyntax,
    visit: &mut dyn FnMut(&mut RuleContext<'_>, &str) -> Result<(), EngineError>,
) -> Result<(), EngineError> {
    let keys: Vec<String> = match ctx.value(base) {
        Some(FieldValue::Record(map)) => map
            .keys()
            .filter(|k| !syntax.is_reserved(k))
            .cloned()
            .collect(),
        Some(FieldValue::List(items)) => (0..items.len()).map(|i| i.to_string()).collect(),
        _ => return Ok(()),
    };

    for key in keys {
        let field_path = path::join(base, &key);
        if ctx.value(&field_path).is_some_and(FieldValue::is_container) {
            walk_fields(ctx, &field_path, syntax, visit)?;
        }
        visit(ctx, &field_path)?;
    }
    Ok(())
}
