//! # Object Keys
//!
//! An [`ObjectKey`] ties a data object to its shadow tree in the registry.
//! The key lives in the engine's `BoundObject` handle held by the caller,
//! never inside the data object, so the domain entity's own field namespace
//! stays untouched.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration key of a data object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Create a key from a caller-chosen name such as `"user"`.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Generate a fresh unique key for an object registered without a name.
    pub fn generate() -> Self {
        Self(format!("obj:{}", Uuid::new_v4()))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ObjectKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ObjectKey {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
