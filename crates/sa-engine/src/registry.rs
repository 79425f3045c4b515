//! # Shadow Registry
//!
//! Maps registration keys to the shadow trees that describe the objects
//! registered under them, plus the optional whole-object validator of each
//! key. The registry owns the trees; data objects only carry their key.

use std::collections::HashMap;
use std::sync::Arc;

use sa_core::ObjectKey;

use crate::handler::ObjectValidator;
use crate::shadow::ShadowNode;

#[derive(Default)]
pub struct ShadowRegistry {
    shadows: HashMap<ObjectKey, ShadowNode>,
    object_validators: HashMap<ObjectKey, Arc<dyn ObjectValidator>>,
}

impl ShadowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `key` with `shadow`, returning the tree it replaces.
    pub fn insert(&mut self, key: ObjectKey, shadow: ShadowNode) -> Option<ShadowNode> {
        self.shadows.insert(key, shadow)
    }

    pub fn get(&self, key: &ObjectKey) -> Option<&ShadowNode> {
        self.shadows.get(key)
    }

    pub fn contains(&self, key: &ObjectKey) -> bool {
        self.shadows.contains_key(key)
    }

    /// Drop the tree and the object validator of `key`.
    pub fn remove(&mut self, key: &ObjectKey) -> Option<ShadowNode> {
        self.object_validators.remove(key);
        self.shadows.remove(key)
    }

    pub fn set_object_validator(&mut self, key: ObjectKey, validator: Arc<dyn ObjectValidator>) {
        self.object_validators.insert(key, validator);
    }

    pub fn object_validator(&self, key: &ObjectKey) -> Option<&Arc<dyn ObjectValidator>> {
        self.object_validators.get(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&ObjectKey> {
        let mut keys: Vec<&ObjectKey> = self.shadows.keys().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.shadows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shadows.is_empty()
    }
}

impl std::fmt::Debug for ShadowRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShadowRegistry")
            .field("keys", &self.keys())
            .field("object_validators", &self.object_validators.len())
            .finish()
    }
}
