//! # Error Types
//!
//! Defines the fatal error types of the annotation engine. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Validation failures are *not* errors. They are recorded as
//!   [`Finding`](crate::finding::Finding)s and never raised.
//! - A missing handler for a declared annotation is a configuration gap. It
//!   is logged by the engine and never reaches this module.
//! - What remains is genuinely fatal: malformed shadow trees, unbounded
//!   cascades, writes to paths that do not exist, and unreadable
//!   configuration.

use thiserror::Error;

/// Top-level error type for the annotation engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The shadow tree could not be parsed or failed registration checks.
    #[error("shadow tree error: {0}")]
    Shadow(#[from] ShadowError),

    /// Cascading dispatch did not terminate within its bounds.
    #[error("cascade error: {0}")]
    Cascade(#[from] CascadeError),

    /// A write targeted a path that does not exist in the data object.
    #[error("path error: {0}")]
    Path(#[from] PathError),

    /// Engine configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No shadow tree is registered under the given object key.
    #[error("no shadow tree registered for object '{0}'")]
    UnknownObject(String),

    /// A rule handler failed for a reason other than a validation finding.
    #[error("rule '{rule}' failed at '{path}': {reason}")]
    Rule {
        /// Annotation name of the failing handler.
        rule: String,
        /// Property path the handler was invoked for.
        path: String,
        /// Handler-supplied reason.
        reason: String,
    },
}

/// Error while parsing or registering a shadow tree.
#[derive(Error, Debug)]
pub enum ShadowError {
    /// A shadow node was not a mapping.
    #[error("shadow node at '{path}' must be a mapping, found {found}")]
    NotAMapping {
        /// Path of the offending node.
        path: String,
        /// Kind of value found instead.
        found: String,
    },

    /// The annotation entry for a field was not a mapping of name to config.
    #[error("annotations for field '{field}' must be a mapping of name to config, found {found}")]
    InvalidAnnotations {
        /// Field path whose annotation entry is malformed.
        field: String,
        /// Kind of value found instead.
        found: String,
    },

    /// An annotation was declared with an empty name.
    #[error("empty annotation name on field '{field}'")]
    EmptyAnnotationName {
        /// Field path carrying the empty annotation.
        field: String,
    },

    /// The shadow tree nests deeper than cascading dispatch is allowed to go.
    #[error("shadow tree depth {depth} exceeds the cascade limit of {limit}")]
    TooDeep {
        /// Measured depth of the tree.
        depth: usize,
        /// Configured limit.
        limit: usize,
    },
}

/// Error raised by the cascade guard.
///
/// Either variant means the shadow declarations (or a custom handler) would
/// recurse without bound. The engine surfaces these instead of exhausting the
/// stack.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CascadeError {
    /// A dispatch frame was re-entered while still active.
    #[error("re-entrant dispatch of '{frame}' (active frames: {})", .active.join(" -> "))]
    Cycle {
        /// The frame that was entered twice.
        frame: String,
        /// The frames active at the time, outermost first.
        active: Vec<String>,
    },

    /// The frame stack grew beyond the configured limit.
    #[error("cascade depth limit of {limit} exceeded at '{frame}'")]
    DepthExceeded {
        /// The frame that would have exceeded the limit.
        frame: String,
        /// Configured limit.
        limit: usize,
    },
}

/// Error writing through a property path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The container of the last segment does not exist.
    #[error("no container for '{path}'")]
    MissingParent {
        /// The full path that was written.
        path: String,
    },

    /// The container exists but cannot hold the last segment
    /// (a scalar, or a list indexed out of range or by a non-numeric key).
    #[error("cannot assign '{segment}' inside a {container} at '{path}'")]
    NotAssignable {
        /// The full path that was written.
        path: String,
        /// Last path segment.
        segment: String,
        /// Kind of the container found.
        container: String,
    },

    /// The empty path addresses the root, which cannot be replaced in place.
    #[error("the root of a data object cannot be assigned")]
    RootAssignment,
}

/// Error loading engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("cannot read '{path}': {source}")]
    Io {
        /// Path of the configuration file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration text is not valid.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
