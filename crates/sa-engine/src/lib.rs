//! # sa-engine — Shadow Annotation Engine
//!
//! Attaches a parallel shadow tree of rule annotations to a plain data
//! object, walks both in lockstep and invokes the handlers the annotations
//! name.
//!
//! ## Modules
//!
//! - **Shadow** (`shadow.rs`): [`ShadowNode`] trees, [`Annotation`]s with an
//!   explicit [`RuleKind`], parsing of the textual `sa$field` form.
//!
//! - **Handlers** (`handler.rs`): the [`Validator`], [`Converter`] and
//!   [`Processor`] capabilities and the [`HandlerTable`] they register in.
//!
//! - **Dispatch** (`dispatch.rs`): [`dispatch()`], [`cascade_validate()`] and
//!   the converter passes, all running against a [`RuleContext`] that
//!   carries the cascade guard.
//!
//! - **Registry** (`registry.rs`): registration key → shadow tree.
//!
//! - **Binding** (`binding.rs`): [`BoundObject`] handles, watched fields and
//!   [`RefreshListener`]s.
//!
//! - **Session** (`session.rs`): the context object that owns the
//!   registries and exposes every engine operation.
//!
//! - **Config** (`config.rs`): [`EngineConfig`], loadable from YAML.
//!
//! ## Key Design Principles
//!
//! 1. **No ambient state.** Registries live in a [`Session`]; the handler
//!    table is an `Arc` shared read-only between sessions.
//!
//! 2. **Kinds are classified once.** Annotation names are classified by
//!    suffix when a shadow tree is parsed, never during dispatch.
//!
//! 3. **Bounded recursion.** Every top-level call carries a frame stack.
//!    Re-entrance and excessive nesting are fatal [`CascadeError`]s instead
//!    of stack overflows.
//!
//! 4. **Configuration gaps are not errors.** A declared annotation without a
//!    registered handler is logged and skipped.
//!
//! ## Crate Policy
//!
//! - Depends only on `sa-core` among workspace crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.
//!
//! [`CascadeError`]: sa_core::CascadeError

pub mod binding;
pub mod config;
pub mod dispatch;
pub mod handler;
pub mod registry;
pub mod session;
pub mod shadow;

pub use binding::{BoundObject, FieldChange, RefreshListener};
pub use config::{EngineConfig, ShadowSyntax};
pub use dispatch::{
    cascade_validate, convert, convert_from, convert_to, dispatch, Direction, RuleContext,
};
pub use handler::{
    Converter, HandlerTable, ObjectValidator, Processor, RuleHandler, Validator,
};
pub use registry::ShadowRegistry;
pub use session::Session;
pub use shadow::{typed_config, Annotation, AnnotationSet, RuleKind, ShadowNode};
