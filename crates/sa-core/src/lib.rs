//! # sa-core — Foundational Types for Shadow Annotations
//!
//! This crate is the leaf of the shadow-annotations workspace. It defines the
//! data that every other crate operates on and nothing else: it has no notion
//! of shadow trees, handlers or dispatch.
//!
//! ## Key Design Principles
//!
//! 1. **One value tree.** [`FieldValue`] models the caller's data object:
//!    records, lists and scalars, plus the `Decimal` variant produced by
//!    decimal conversions. No untyped `Any` maps.
//!
//! 2. **Navigation never fails loudly.** The [`path`] resolver returns
//!    `Option` for every lookup. Sparse, half-filled data is the normal case
//!    during interactive editing, so a missing intermediate is `None`, not an
//!    error.
//!
//! 3. **Findings are data, not errors.** [`FindingRegistry`] is an ordered,
//!    deduplicated collection keyed by `(property, rule_key)`. Validation
//!    failures never travel through `Result`.
//!
//! 4. **Explicit object identity.** [`ObjectKey`] pairs a data object with its
//!    shadow tree without writing anything into the data object itself.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sa-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod finding;
pub mod identity;
pub mod path;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use error::{CascadeError, ConfigError, EngineError, PathError, ShadowError};
pub use finding::{Finding, FindingRegistry, PropertySummary, Severity};
pub use identity::ObjectKey;
pub use value::{FieldValue, Record};
