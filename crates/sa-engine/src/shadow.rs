//! # Shadow Metadata Model
//!
//! A [`ShadowNode`] mirrors one level of a data object. For each field it can
//! hold an ordered [`AnnotationSet`] (the field's rules) and, for nested
//! records and lists, a child node describing the nested shape. One child
//! node describes *every* element of a list.
//!
//! ## Textual Form
//!
//! Shadow trees are written as plain mappings where a reserved prefix marks
//! annotation entries:
//!
//! ```yaml
//! sa$email: { notEmptyValidation: {}, emailValidation: {} }
//! sa$address: { beanValidation: {} }
//! address:
//!   sa$street: { notEmptyValidation: {} }
//! ```
//!
//! `sa$email` annotates field `email`; the plain key `address` holds the
//! nested node. Annotation kinds are classified once, at parse time, by name
//! suffix (see [`RuleKind::classify`]). Code that builds trees directly
//! states the kind explicitly through the [`Annotation`] constructors.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use sa_core::path;
use sa_core::{FieldValue, ShadowError};

use crate::config::ShadowSyntax;

/// The capability a rule handler provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Inspects a field and records or clears findings.
    Validator,
    /// Transforms a field between raw and rich representations.
    Converter,
    /// Computed-field side effect.
    Processor,
}

impl RuleKind {
    /// Classify an annotation name by suffix. Anything that is neither a
    /// validation nor a conversion is a processor, so new processor kinds
    /// need no change here.
    pub fn classify(name: &str, syntax: &ShadowSyntax) -> Self {
        if name.ends_with(&syntax.validation_suffix) {
            Self::Validator
        } else if name.ends_with(&syntax.conversion_suffix) {
            Self::Converter
        } else {
            Self::Processor
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validator => f.write_str("validator"),
            Self::Converter => f.write_str("converter"),
            Self::Processor => f.write_str("processor"),
        }
    }
}

/// One declared rule on a field.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    name: String,
    kind: RuleKind,
    config: Value,
}

impl Annotation {
    pub fn new(name: impl Into<String>, kind: RuleKind, config: Value) -> Self {
        Self {
            name: name.into(),
            kind,
            config,
        }
    }

    pub fn validator(name: impl Into<String>) -> Self {
        Self::new(name, RuleKind::Validator, Value::Null)
    }

    pub fn converter(name: impl Into<String>) -> Self {
        Self::new(name, RuleKind::Converter, Value::Null)
    }

    pub fn processor(name: impl Into<String>) -> Self {
        Self::new(name, RuleKind::Processor, Value::Null)
    }

    /// Replace the config payload.
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// Raw config payload. `Null` when none was declared.
    pub fn config(&self) -> &Value {
        &self.config
    }

    /// Deserialize the config payload into a handler's typed config.
    ///
    /// A missing payload deserializes like an empty mapping, so configs whose
    /// fields all have defaults need not be spelled out.
    pub fn config_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        typed_config(&self.config)
    }
}

/// Deserialize a raw config payload, treating `Null` as `{}`.
pub fn typed_config<T: DeserializeOwned>(config: &Value) -> Result<T, serde_json::Error> {
    match config {
        Value::Null => serde_json::from_value(Value::Object(serde_json::Map::new())),
        other => T::deserialize(other),
    }
}

/// The ordered annotations declared on one field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationSet {
    annotations: Vec<Annotation>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an annotation. A second annotation with the same name replaces
    /// the first in place.
    pub fn push(&mut self, annotation: Annotation) {
        match self.annotations.iter_mut().find(|a| a.name == annotation.name) {
            Some(existing) => *existing = annotation,
            None => self.annotations.push(annotation),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.annotations.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Annotations of one kind, in declaration order.
    pub fn of_kind(&self, kind: RuleKind) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(move |a| a.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}

impl FromIterator<Annotation> for AnnotationSet {
    fn from_iter<I: IntoIterator<Item = Annotation>>(iter: I) -> Self {
        let mut set = Self::new();
        for annotation in iter {
            set.push(annotation);
        }
        set
    }
}

impl<'s> IntoIterator for &'s AnnotationSet {
    type Item = &'s Annotation;
    type IntoIter = std::slice::Iter<'s, Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One level of a shadow tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShadowNode {
    annotated: IndexMap<String, AnnotationSet>,
    children: IndexMap<String, ShadowNode>,
}

impl ShadowNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: declare annotations on `field`.
    pub fn annotate(
        mut self,
        field: impl Into<String>,
        annotations: impl IntoIterator<Item = Annotation>,
    ) -> Self {
        self.insert_annotations(field, annotations.into_iter().collect());
        self
    }

    /// Builder: declare the nested shape of `field`.
    pub fn nest(mut self, field: impl Into<String>, node: ShadowNode) -> Self {
        self.insert_child(field, node);
        self
    }

    pub fn insert_annotations(&mut self, field: impl Into<String>, set: AnnotationSet) {
        self.annotated.insert(field.into(), set);
    }

    pub fn insert_child(&mut self, field: impl Into<String>, node: ShadowNode) {
        self.children.insert(field.into(), node);
    }

    /// `annotated(field)`: the annotations declared on a direct field.
    pub fn annotations(&self, field: &str) -> Option<&AnnotationSet> {
        self.annotated.get(field)
    }

    /// The nested shape of a direct field.
    pub fn child(&self, field: &str) -> Option<&ShadowNode> {
        self.children.get(field)
    }

    /// Every annotated direct field, in declaration order.
    pub fn annotated_fields(&self) -> impl Iterator<Item = (&str, &AnnotationSet)> {
        self.annotated.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &ShadowNode)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The node describing the container at `path`.
    ///
    /// List index segments are skipped: the node of `items` also describes
    /// `items.3`. A record key made of digits still matches first.
    pub fn node_at(&self, path: &str) -> Option<&ShadowNode> {
        let mut node = self;
        for segment in path::segments(path) {
            node = match node.children.get(segment) {
                Some(child) => child,
                None if path::is_index(segment) => node,
                None => return None,
            };
        }
        Some(node)
    }

    /// The annotations for the last segment of `path`, navigating the tree
    /// in lockstep with the path.
    pub fn annotations_for(&self, path: &str) -> Option<&AnnotationSet> {
        let (parent, field) = path::split_last(path);
        self.node_at(parent)?.annotations(field)
    }

    /// Number of nested levels, counting this one.
    pub fn depth(&self) -> usize {
        1 + self.children.values().map(ShadowNode::depth).max().unwrap_or(0)
    }

    /// Registration checks: bounded depth and named annotations.
    pub fn check(&self, max_depth: usize) -> Result<(), ShadowError> {
        let depth = self.depth();
        if depth > max_depth {
            return Err(ShadowError::TooDeep {
                depth,
                limit: max_depth,
            });
        }
        self.check_names("")
    }

    fn check_names(&self, base: &str) -> Result<(), ShadowError> {
        for (field, set) in &self.annotated {
            if set.iter().any(|a| a.name.trim().is_empty()) {
                return Err(ShadowError::EmptyAnnotationName {
                    field: path::join(base, field),
                });
            }
        }
        for (field, child) in &self.children {
            child.check_names(&path::join(base, field))?;
        }
        Ok(())
    }

    /// Parse the textual form.
    ///
    /// Every plain key must hold a nested mapping; every reserved key must
    /// hold a mapping of annotation name to config.
    pub fn from_json(value: &Value, syntax: &ShadowSyntax) -> Result<Self, ShadowError> {
        Self::parse(value, "", syntax, true)
    }

    /// Read a data object that carries its own inline annotations.
    ///
    /// Plain keys holding scalars or lists are data, not shape, and are
    /// skipped; nested records are read as nested nodes.
    pub fn from_inline(data: &FieldValue, syntax: &ShadowSyntax) -> Result<Self, ShadowError> {
        Self::parse(&data.to_json(), "", syntax, false)
    }

    fn parse(
        value: &Value,
        base: &str,
        syntax: &ShadowSyntax,
        strict: bool,
    ) -> Result<Self, ShadowError> {
        let map = value.as_object().ok_or_else(|| ShadowError::NotAMapping {
            path: base.to_string(),
            found: json_kind(value).to_string(),
        })?;

        let mut node = Self::new();
        for (key, entry) in map {
            if let Some(field) = syntax.field_of(key) {
                let field_path = path::join(base, field);
                let names = entry
                    .as_object()
                    .ok_or_else(|| ShadowError::InvalidAnnotations {
                        field: field_path.clone(),
                        found: json_kind(entry).to_string(),
                    })?;
                let set = names
                    .iter()
                    .map(|(name, config)| {
                        Annotation::new(name.clone(), RuleKind::classify(name, syntax), config.clone())
                    })
                    .collect();
                node.insert_annotations(field, set);
            } else if entry.is_object() || strict {
                let child = Self::parse(entry, &path::join(base, key), syntax, strict)?;
                node.insert_child(key.clone(), child);
            }
        }
        Ok(node)
    }

    /// Data paths that have no annotation entry in this tree.
    ///
    /// List indices are reported as `*`, once per distinct path.
    pub fn coverage_gaps(&self, data: &FieldValue, syntax: &ShadowSyntax) -> Vec<String> {
        let mut gaps = Vec::new();
        collect_gaps(Some(self), data, "", syntax, &mut gaps);
        gaps
    }
}

fn collect_gaps(
    node: Option<&ShadowNode>,
    data: &FieldValue,
    base: &str,
    syntax: &ShadowSyntax,
    gaps: &mut Vec<String>,
) {
    match data {
        FieldValue::Record(map) => {
            for (key, value) in map {
                if syntax.is_reserved(key) {
                    continue;
                }
                let field_path = path::join(base, key);
                if node.and_then(|n| n.annotations(key)).is_none() && !gaps.contains(&field_path) {
                    gaps.push(field_path.clone());
                }
                if value.is_container() {
                    collect_gaps(node.and_then(|n| n.child(key)), value, &field_path, syntax, gaps);
                }
            }
        }
        FieldValue::List(items) => {
            let element_path = path::join(base, "*");
            for item in items {
                collect_gaps(node, item, &element_path, syntax, gaps);
            }
        }
        _ => {}
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}
