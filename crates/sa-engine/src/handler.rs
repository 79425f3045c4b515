//! # Rule Handlers
//!
//! The three handler capabilities and the table they are registered in.
//!
//! Each handler reports its own annotation name; [`HandlerTable::register`]
//! files it under that name, last registration wins. The table is built at
//! startup and read-only afterwards, so sessions share it behind an `Arc`.
//!
//! Handlers receive the declared config payload, the full property path of
//! the field and a [`RuleContext`] through which they read and write the data
//! object and the finding registry.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use sa_core::EngineError;

use crate::dispatch::RuleContext;
use crate::shadow::RuleKind;

/// Inspects a field and records or clears findings.
pub trait Validator: Send + Sync {
    /// The annotation name this validator answers to.
    fn annotation_name(&self) -> &str;

    /// Validate the field at `path`.
    fn validate(
        &self,
        config: &Value,
        path: &str,
        ctx: &mut RuleContext<'_>,
    ) -> Result<(), EngineError>;
}

/// Converts a field between its raw and rich representations in place.
pub trait Converter: Send + Sync {
    /// The annotation name this converter answers to.
    fn annotation_name(&self) -> &str;

    /// Raw → rich.
    fn to(&self, config: &Value, path: &str, ctx: &mut RuleContext<'_>) -> Result<(), EngineError>;

    /// Rich → raw.
    fn from(&self, config: &Value, path: &str, ctx: &mut RuleContext<'_>)
        -> Result<(), EngineError>;
}

/// Computed-field side effect.
pub trait Processor: Send + Sync {
    /// The annotation name this processor answers to.
    fn annotation_name(&self) -> &str;

    /// Run the side effect triggered by the field at `path`.
    fn process(
        &self,
        config: &Value,
        path: &str,
        ctx: &mut RuleContext<'_>,
    ) -> Result<(), EngineError>;
}

/// Whole-object validation run after a full validation pass of one
/// registered object, for rules spanning several fields.
pub trait ObjectValidator: Send + Sync {
    fn validate_object(&self, ctx: &mut RuleContext<'_>) -> Result<(), EngineError>;
}

/// A registered handler of any kind.
#[derive(Clone)]
pub enum RuleHandler {
    Validator(Arc<dyn Validator>),
    Converter(Arc<dyn Converter>),
    Processor(Arc<dyn Processor>),
}

impl RuleHandler {
    pub fn validator(handler: impl Validator + 'static) -> Self {
        Self::Validator(Arc::new(handler))
    }

    pub fn converter(handler: impl Converter + 'static) -> Self {
        Self::Converter(Arc::new(handler))
    }

    pub fn processor(handler: impl Processor + 'static) -> Self {
        Self::Processor(Arc::new(handler))
    }

    pub fn annotation_name(&self) -> &str {
        match self {
            Self::Validator(h) => h.annotation_name(),
            Self::Converter(h) => h.annotation_name(),
            Self::Processor(h) => h.annotation_name(),
        }
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            Self::Validator(_) => RuleKind::Validator,
            Self::Converter(_) => RuleKind::Converter,
            Self::Processor(_) => RuleKind::Processor,
        }
    }
}

impl std::fmt::Debug for RuleHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleHandler")
            .field("kind", &self.kind())
            .field("annotation", &self.annotation_name())
            .finish()
    }
}

/// Annotation name → handler, one map per kind.
#[derive(Clone, Default)]
pub struct HandlerTable {
    validators: HashMap<String, Arc<dyn Validator>>,
    converters: HashMap<String, Arc<dyn Converter>>,
    processors: HashMap<String, Arc<dyn Processor>>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its self-reported annotation name.
    ///
    /// Returns the handler previously registered under that name and kind.
    pub fn register(&mut self, handler: RuleHandler) -> Option<RuleHandler> {
        let name = handler.annotation_name().to_string();
        tracing::debug!(annotation = %name, kind = %handler.kind(), "registering rule handler");
        match handler {
            RuleHandler::Validator(h) => self
                .validators
                .insert(name, h)
                .map(RuleHandler::Validator),
            RuleHandler::Converter(h) => self
                .converters
                .insert(name, h)
                .map(RuleHandler::Converter),
            RuleHandler::Processor(h) => self
                .processors
                .insert(name, h)
                .map(RuleHandler::Processor),
        }
    }

    pub fn validator(&self, name: &str) -> Option<&Arc<dyn Validator>> {
        self.validators.get(name)
    }

    pub fn converter(&self, name: &str) -> Option<&Arc<dyn Converter>> {
        self.converters.get(name)
    }

    pub fn processor(&self, name: &str) -> Option<&Arc<dyn Processor>> {
        self.processors.get(name)
    }

    /// Total number of registered handlers.
    pub fn len(&self) -> usize {
        self.validators.len() + self.converters.len() + self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(kind, name)` of every handler, sorted by name.
    pub fn names(&self) -> Vec<(RuleKind, &str)> {
        let mut names: Vec<(RuleKind, &str)> = self
            .validators
            .keys()
            .map(|n| (RuleKind::Validator, n.as_str()))
            .chain(self.converters.keys().map(|n| (RuleKind::Converter, n.as_str())))
            .chain(self.processors.keys().map(|n| (RuleKind::Processor, n.as_str())))
            .collect();
        names.sort_by(|a, b| a.1.cmp(b.1));
        names
    }
}

impl std::fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerTable")
            .field("handlers", &self.names())
            .finish()
    }
}
