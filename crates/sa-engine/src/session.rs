//! # Session
//!
//! The context object every engine operation runs against. A session owns
//! the shadow registry, the finding registry, the binding gate and the
//! refresh listeners; the handler table is shared read-only.
//!
//! ## Lifecycle
//!
//! 1. [`Session::register`] (or [`Session::link`]) associates a data object
//!    with its shadow tree and hands back a [`BoundObject`].
//! 2. [`Session::install_accessors`] converts annotated fields forward and
//!    marks them watched.
//! 3. With binding enabled, [`Session::set_field`] re-dispatches every
//!    changed watched field and notifies the listeners.
//! 4. [`Session::export_plain`] produces a copy with conversions reversed.

use std::collections::BTreeSet;
use std::sync::Arc;

use sa_core::path;
use sa_core::{EngineError, FieldValue, FindingRegistry, ObjectKey};

use crate::binding::{walk_fields, BoundObject, FieldChange, RefreshListener};
use crate::config::EngineConfig;
use crate::dispatch::{self, Direction, RuleContext};
use crate::handler::{HandlerTable, ObjectValidator};
use crate::registry::ShadowRegistry;
use crate::shadow::ShadowNode;

pub struct Session {
    config: EngineConfig,
    handlers: Arc<HandlerTable>,
    shadows: ShadowRegistry,
    findings: FindingRegistry,
    binding_enabled: bool,
    listeners: Vec<Box<dyn RefreshListener>>,
}

impl Session {
    /// Create a session after checking `config`. Binding starts disabled.
    pub fn new(config: EngineConfig, handlers: Arc<HandlerTable>) -> Result<Self, EngineError> {
        config.check()?;
        Ok(Self {
            config,
            handlers,
            shadows: ShadowRegistry::new(),
            findings: FindingRegistry::new(),
            binding_enabled: false,
            listeners: Vec::new(),
        })
    }

    /// A session with the default configuration.
    pub fn with_handlers(handlers: Arc<HandlerTable>) -> Self {
        Self {
            config: EngineConfig::default(),
            handlers,
            shadows: ShadowRegistry::new(),
            findings: FindingRegistry::new(),
            binding_enabled: false,
            listeners: Vec::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn handlers(&self) -> &HandlerTable {
        &self.handlers
    }

    // ─── Registration ───────────────────────────────────────────────────

    /// Register `data` under `key` with its shadow tree.
    ///
    /// The tree is checked first. Data fields without an annotation entry
    /// are logged, not rejected. Registering an existing key replaces its
    /// tree.
    pub fn register(
        &mut self,
        key: impl Into<ObjectKey>,
        data: FieldValue,
        shadow: ShadowNode,
    ) -> Result<BoundObject, EngineError> {
        let key = key.into();
        shadow.check(self.config.max_cascade_depth)?;

        let gaps = shadow.coverage_gaps(&data, &self.config.syntax);
        if !gaps.is_empty() {
            tracing::debug!(object = %key, gaps = ?gaps, "data fields without annotation entries");
        }

        if self.shadows.insert(key.clone(), shadow).is_some() {
            tracing::debug!(object = %key, "shadow tree replaced");
        } else {
            tracing::debug!(object = %key, "object registered");
        }
        Ok(BoundObject::new(key, data))
    }

    /// Register, install accessors over the whole object and, when
    /// `enable_binding_on_link` is set, enable binding and run a full
    /// validation pass.
    pub fn link(
        &mut self,
        key: impl Into<ObjectKey>,
        data: FieldValue,
        shadow: ShadowNode,
    ) -> Result<BoundObject, EngineError> {
        let mut obj = self.register(key, data, shadow)?;
        self.install_accessors(&mut obj, "")?;
        if self.config.enable_binding_on_link {
            self.enable_binding();
            self.validate_all(&mut obj)?;
            self.notify_refresh();
        }
        Ok(obj)
    }

    /// Run `validator` at the end of every [`Session::validate_all`] of the
    /// object registered under `key`.
    pub fn register_object_validator(
        &mut self,
        key: impl Into<ObjectKey>,
        validator: impl ObjectValidator + 'static,
    ) {
        self.shadows.set_object_validator(key.into(), Arc::new(validator));
    }

    /// The registered shadow tree of `obj`.
    pub fn shadow_node_for(&self, obj: &BoundObject) -> Option<&ShadowNode> {
        self.shadows.get(obj.key())
    }

    pub fn shadows(&self) -> &ShadowRegistry {
        &self.shadows
    }

    // ─── Binding gate ───────────────────────────────────────────────────

    pub fn enable_binding(&mut self) {
        self.binding_enabled = true;
    }

    pub fn disable_binding(&mut self) {
        self.binding_enabled = false;
    }

    pub fn is_binding_enabled(&self) -> bool {
        self.binding_enabled
    }

    pub fn add_refresh_listener(&mut self, listener: impl RefreshListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Hand the current findings to every listener.
    pub fn notify_refresh(&mut self) {
        for listener in &mut self.listeners {
            listener.refresh(&self.findings);
        }
    }

    // ─── Dispatch ───────────────────────────────────────────────────────

    pub fn dispatch(&mut self, obj: &mut BoundObject, path: &str) -> Result<(), EngineError> {
        let (mut ctx, _) = self.context(obj)?;
        dispatch::dispatch(&mut ctx, path)
    }

    pub fn cascade_validate(&mut self, obj: &mut BoundObject, path: &str) -> Result<(), EngineError> {
        let (mut ctx, _) = self.context(obj)?;
        dispatch::cascade_validate(&mut ctx, path)
    }

    /// Cascade over the top level, then run the object validator of `obj`,
    /// if one is registered.
    pub fn validate_all(&mut self, obj: &mut BoundObject) -> Result<(), EngineError> {
        let object_validator = self.shadows.object_validator(obj.key()).cloned();
        let (mut ctx, _) = self.context(obj)?;
        dispatch::cascade_validate(&mut ctx, "")?;
        if let Some(validator) = object_validator {
            validator.validate_object(&mut ctx)?;
        }
        Ok(())
    }

    /// Dispatch on a data object that carries its own inline annotations
    /// instead of a registered tree. Findings have no owner.
    pub fn dispatch_unbound(&mut self, data: &mut FieldValue, path: &str) -> Result<(), EngineError> {
        let shadow = ShadowNode::from_inline(data, &self.config.syntax)?;
        let mut ctx = RuleContext::new(
            data,
            None,
            &shadow,
            &self.handlers,
            &mut self.findings,
            self.config.max_cascade_depth,
        );
        dispatch::dispatch(&mut ctx, path)
    }

    // ─── Binding ────────────────────────────────────────────────────────

    /// Walk the container at `path` depth-first, convert every field
    /// forward and mark it watched.
    pub fn install_accessors(&mut self, obj: &mut BoundObject, path: &str) -> Result<(), EngineError> {
        let syntax = self.config.syntax.clone();
        let (mut ctx, watched) = self.context(obj)?;
        walk_fields(&mut ctx, path, &syntax, &mut |ctx, field| {
            dispatch::convert_to(ctx, field)?;
            watched.insert(field.to_string());
            Ok(())
        })?;
        tracing::debug!(base = path, watched = watched.len(), "accessors installed");
        Ok(())
    }

    /// Store `value` at `path` and, when binding is enabled and the field
    /// is watched, annotated and actually changed, dispatch it and notify
    /// the listeners.
    pub fn set_field(
        &mut self,
        obj: &mut BoundObject,
        path: &str,
        value: FieldValue,
    ) -> Result<FieldChange, EngineError> {
        if obj.get(path) == Some(&value) {
            return Ok(FieldChange::Unchanged);
        }
        path::assign(obj.data_mut(), path, value)?;
        tracing::trace!(object = %obj.key(), path, "field written");

        if !self.binding_enabled || !obj.is_watched(path) {
            return Ok(FieldChange::Stored);
        }
        let annotated = self
            .shadows
            .get(obj.key())
            .and_then(|shadow| shadow.annotations_for(path))
            .is_some_and(|set| !set.is_empty());
        if !annotated {
            return Ok(FieldChange::Stored);
        }

        self.dispatch(obj, path)?;
        self.notify_refresh();
        Ok(FieldChange::Dispatched)
    }

    // ─── Conversion ─────────────────────────────────────────────────────

    /// Run every converter of the object in `direction`, in place.
    pub fn convert_tree(&mut self, obj: &mut BoundObject, direction: Direction) -> Result<(), EngineError> {
        let syntax = self.config.syntax.clone();
        let (mut ctx, _) = self.context(obj)?;
        walk_fields(&mut ctx, "", &syntax, &mut |ctx, field| {
            dispatch::convert(ctx, field, direction)
        })
    }

    /// A copy of the object's data with every conversion reversed. The
    /// bound data and the session's findings are left untouched.
    pub fn export_plain(&self, obj: &BoundObject) -> Result<FieldValue, EngineError> {
        let shadow = self
            .shadows
            .get(obj.key())
            .ok_or_else(|| EngineError::UnknownObject(obj.key().to_string()))?;
        let mut copy = obj.data().clone();
        let mut scratch = FindingRegistry::new();
        let mut ctx = RuleContext::new(
            &mut copy,
            Some(obj.key()),
            shadow,
            &self.handlers,
            &mut scratch,
            self.config.max_cascade_depth,
        );
        walk_fields(&mut ctx, "", &self.config.syntax, &mut |ctx, field| {
            dispatch::convert_from(ctx, field)
        })?;
        Ok(copy)
    }

    // ─── Findings ───────────────────────────────────────────────────────

    pub fn findings(&self) -> &FindingRegistry {
        &self.findings
    }

    pub fn clear_findings(&mut self) {
        self.findings.clear();
    }

    fn context<'s>(
        &'s mut self,
        obj: &'s mut BoundObject,
    ) -> Result<(RuleContext<'s>, &'s mut BTreeSet<String>), EngineError> {
        let (key, data, watched) = obj.parts_mut();
        let shadow = self
            .shadows
            .get(key)
            .ok_or_else(|| EngineError::UnknownObject(key.to_string()))?;
        let ctx = RuleContext::new(
            data,
            Some(key),
            shadow,
            &self.handlers,
            &mut self.findings,
            self.config.max_cascade_depth,
        );
        Ok((ctx, watched))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("handlers", &self.handlers)
            .field("shadows", &self.shadows)
            .field("findings", &self.findings.len())
            .field("binding_enabled", &self.binding_enabled)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
