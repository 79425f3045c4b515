//! # Annotation Dispatch Engine
//!
//! Walks a data object and its shadow tree in lockstep and invokes the
//! handlers declared for a field.
//!
//! ## Dispatch
//!
//! [`dispatch`] resolves the annotation set of one path and runs it in
//! declaration order:
//!
//! | Kind | Action |
//! |---|---|
//! | Validator | `validate(config, path, ctx)` |
//! | Converter | skipped; conversions only run in the explicit converter passes |
//! | Processor | `process(config, path, ctx)` |
//!
//! A handler missing from the [`HandlerTable`] is a configuration gap: it is
//! logged and the rule counts as passing.
//!
//! ## Cascade
//!
//! [`cascade_validate`] runs the same classification over every annotated
//! field directly under the node at a path. One annotation on a container
//! thereby validates all of its immediate children.
//!
//! ## Termination
//!
//! A shadow tree is an owned tree, so cascades always move to strictly
//! deeper paths. Handlers, however, may call back into [`RuleContext::dispatch`]
//! and [`RuleContext::cascade`] freely. Every [`RuleContext`] therefore
//! carries a frame stack: re-entering an active frame is a
//! [`CascadeError::Cycle`], and more than `max_cascade_depth` nested frames
//! is a [`CascadeError::DepthExceeded`].

use sa_core::path;
use sa_core::{
    CascadeError, EngineError, FieldValue, Finding, FindingRegistry, ObjectKey,
};

use crate::handler::HandlerTable;
use crate::shadow::{AnnotationSet, RuleKind, ShadowNode};

/// Frame stack of one top-level engine call.
#[derive(Debug)]
struct CascadeGuard {
    stack: Vec<String>,
    limit: usize,
}

impl CascadeGuard {
    fn new(limit: usize) -> Self {
        Self {
            stack: Vec::new(),
            limit,
        }
    }

    fn enter(&mut self, frame: String) -> Result<(), CascadeError> {
        if self.stack.contains(&frame) {
            return Err(CascadeError::Cycle {
                frame,
                active: self.stack.clone(),
            });
        }
        if self.stack.len() >= self.limit {
            return Err(CascadeError::DepthExceeded {
                frame,
                limit: self.limit,
            });
        }
        self.stack.push(frame);
        Ok(())
    }

    fn leave(&mut self) {
        self.stack.pop();
    }
}

/// Everything a handler may touch during one engine call.
pub struct RuleContext<'a> {
    data: &'a mut FieldValue,
    owner: Option<&'a ObjectKey>,
    shadow: &'a ShadowNode,
    handlers: &'a HandlerTable,
    findings: &'a mut FindingRegistry,
    guard: CascadeGuard,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        data: &'a mut FieldValue,
        owner: Option<&'a ObjectKey>,
        shadow: &'a ShadowNode,
        handlers: &'a HandlerTable,
        findings: &'a mut FindingRegistry,
        max_depth: usize,
    ) -> Self {
        Self {
            data,
            owner,
            shadow,
            handlers,
            findings,
            guard: CascadeGuard::new(max_depth),
        }
    }

    /// The root of the data object.
    pub fn root(&self) -> &FieldValue {
        &*self.data
    }

    pub fn root_mut(&mut self) -> &mut FieldValue {
        &mut *self.data
    }

    /// The value at `path`, `None` if any segment is absent.
    pub fn value(&self, path: &str) -> Option<&FieldValue> {
        path::resolve(&*self.data, path)
    }

    /// Store a value through the parent container of `path`.
    pub fn set_value(
        &mut self,
        path: &str,
        value: FieldValue,
    ) -> Result<Option<FieldValue>, EngineError> {
        Ok(path::assign(self.data, path, value)?)
    }

    /// Registration key of the object being processed; `None` for unbound
    /// data.
    pub fn owner(&self) -> Option<&'a ObjectKey> {
        self.owner
    }

    pub fn shadow(&self) -> &'a ShadowNode {
        self.shadow
    }

    pub fn handlers(&self) -> &'a HandlerTable {
        self.handlers
    }

    pub fn findings(&self) -> &FindingRegistry {
        &*self.findings
    }

    /// Record an error finding for `(path, rule_key)`, owned by this object.
    pub fn report(&mut self, path: &str, rule_key: &str) -> bool {
        let finding = Finding::error(path, rule_key, self.owner.cloned());
        self.findings.add(finding)
    }

    /// Record a warning finding for `(path, rule_key)`.
    pub fn report_warning(&mut self, path: &str, rule_key: &str) -> bool {
        let finding = Finding::warning(path, rule_key, self.owner.cloned());
        self.findings.add(finding)
    }

    /// Clear the finding for `(path, rule_key)`, if any.
    pub fn clear(&mut self, path: &str, rule_key: &str) -> bool {
        self.findings.remove(path, rule_key)
    }

    /// Report when `failed`, clear otherwise.
    pub fn record(&mut self, path: &str, rule_key: &str, failed: bool) {
        if failed {
            self.report(path, rule_key);
        } else {
            self.clear(path, rule_key);
        }
    }

    /// Dispatch the annotations of another path within this call.
    pub fn dispatch(&mut self, path: &str) -> Result<(), EngineError> {
        dispatch(self, path)
    }

    /// Cascade over the children of another path within this call.
    pub fn cascade(&mut self, path: &str) -> Result<(), EngineError> {
        cascade_validate(self, path)
    }

    fn enter(&mut self, kind: &str, path: &str) -> Result<(), CascadeError> {
        self.guard.enter(format!("{kind}:{path}"))
    }

    fn leave(&mut self) {
        self.guard.leave();
    }
}

impl std::fmt::Debug for RuleContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleContext")
            .field("owner", &self.owner)
            .field("frames", &self.guard.stack)
            .finish_non_exhaustive()
    }
}

/// Run every annotation declared for `path`.
pub fn dispatch(ctx: &mut RuleContext<'_>, path: &str) -> Result<(), EngineError> {
    let shadow = ctx.shadow();
    let Some(annotations) = shadow.annotations_for(path) else {
        tracing::trace!(path, "no annotations declared");
        return Ok(());
    };
    if annotations.is_empty() {
        return Ok(());
    }

    ctx.enter("dispatch", path)?;
    let result = run_annotations(ctx, annotations, path);
    ctx.leave();
    result
}

/// Run the annotations of every annotated field directly under `path`.
pub fn cascade_validate(ctx: &mut RuleContext<'_>, path: &str) -> Result<(), EngineError> {
    let shadow = ctx.shadow();
    let Some(node) = shadow.node_at(path) else {
        tracing::debug!(path, "no shadow node; cascade skipped");
        return Ok(());
    };

    ctx.enter("cascade", path)?;
    let mut result = Ok(());
    for (field, annotations) in node.annotated_fields() {
        result = run_annotations(ctx, annotations, &path::join(path, field));
        if result.is_err() {
            break;
        }
    }
    ctx.leave();
    result
}

fn run_annotations(
    ctx: &mut RuleContext<'_>,
    annotations: &AnnotationSet,
    path: &str,
) -> Result<(), EngineError> {
    let handlers = ctx.handlers();
    for annotation in annotations {
        let name = annotation.name();
        match annotation.kind() {
            RuleKind::Validator => match handlers.validator(name) {
                Some(validator) => {
                    tracing::debug!(annotation = name, path, "running validator");
                    validator.validate(annotation.config(), path, ctx)?;
                }
                None => tracing::warn!(annotation = name, path, "validator not registered; rule skipped"),
            },
            RuleKind::Converter => {}
            RuleKind::Processor => match handlers.processor(name) {
                Some(processor) => {
                    tracing::debug!(annotation = name, path, "running processor");
                    processor.process(annotation.config(), path, ctx)?;
                }
                None => tracing::warn!(annotation = name, path, "processor not registered; rule skipped"),
            },
        }
    }
    Ok(())
}

/// Direction of a converter pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Raw → rich.
    To,
    /// Rich → raw.
    From,
}

/// Run every converter declared for `path` in the given direction.
pub fn convert(
    ctx: &mut RuleContext<'_>,
    path: &str,
    direction: Direction,
) -> Result<(), EngineError> {
    let shadow = ctx.shadow();
    let handlers = ctx.handlers();
    let Some(annotations) = shadow.annotations_for(path) else {
        return Ok(());
    };

    for annotation in annotations.of_kind(RuleKind::Converter) {
        let name = annotation.name();
        let Some(converter) = handlers.converter(name) else {
            tracing::warn!(annotation = name, path, "converter not registered; conversion skipped");
            continue;
        };
        match direction {
            Direction::To => converter.to(annotation.config(), path, ctx)?,
            Direction::From => converter.from(annotation.config(), path, ctx)?,
        }
    }
    Ok(())
}

/// Raw → rich conversion of the field at `path`.
pub fn convert_to(ctx: &mut RuleContext<'_>, path: &str) -> Result<(), EngineError> {
    convert(ctx, path, Direction::To)
}

/// Rich → raw conversion of the field at `path`.
pub fn convert_from(ctx: &mut RuleContext<'_>, path: &str) -> Result<(), EngineError> {
    convert(ctx, path, Direction::From)
}
