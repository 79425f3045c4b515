//! # Engine Configuration
//!
//! Tunables of the annotation engine, loadable from YAML. Every field has a
//! default, so an empty document (or no file at all) yields the stock
//! configuration.
//!
//! ```yaml
//! syntax:
//!   reserved_prefix: "sa$"
//!   validation_suffix: "Validation"
//!   conversion_suffix: "Conversion"
//! max_cascade_depth: 64
//! enable_binding_on_link: true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use sa_core::ConfigError;

/// Textual conventions of shadow trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShadowSyntax {
    /// Prefix marking an annotation entry: `sa$name` annotates field `name`.
    pub reserved_prefix: String,
    /// Annotation names ending in this suffix are validators.
    pub validation_suffix: String,
    /// Annotation names ending in this suffix are converters.
    pub conversion_suffix: String,
}

impl Default for ShadowSyntax {
    fn default() -> Self {
        Self {
            reserved_prefix: "sa$".to_string(),
            validation_suffix: "Validation".to_string(),
            conversion_suffix: "Conversion".to_string(),
        }
    }
}

impl ShadowSyntax {
    /// Whether a key belongs to the annotation system rather than the data.
    pub fn is_reserved(&self, key: &str) -> bool {
        key.starts_with(&self.reserved_prefix)
    }

    /// The annotated field name of a reserved key: `sa$email` → `email`.
    pub fn field_of<'k>(&self, key: &'k str) -> Option<&'k str> {
        key.strip_prefix(self.reserved_prefix.as_str())
    }

    /// The reserved key annotating `field`.
    pub fn annotation_key(&self, field: &str) -> String {
        format!("{}{}", self.reserved_prefix, field)
    }
}

/// Engine-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Shadow tree conventions.
    pub syntax: ShadowSyntax,
    /// Maximum number of nested dispatch/cascade frames per top-level call.
    /// Also bounds the depth of registered shadow trees.
    pub max_cascade_depth: usize,
    /// Whether `Session::link` enables binding and runs a full validation.
    pub enable_binding_on_link: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            syntax: ShadowSyntax::default(),
            max_cascade_depth: 64,
            enable_binding_on_link: true,
        }
    }
}

impl EngineConfig {
    /// Parse and check a YAML configuration document.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty mapping.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self =
            serde_yaml::from_str(text).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Load a YAML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Reject configurations the engine cannot operate with.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.max_cascade_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_cascade_depth must be at least 1".to_string(),
            ));
        }
        let syntax = &self.syntax;
        if syntax.reserved_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "syntax.reserved_prefix must not be empty".to_string(),
            ));
        }
        if syntax.validation_suffix.is_empty() || syntax.conversion_suffix.is_empty() {
            return Err(ConfigError::Invalid(
                "annotation suffixes must not be empty".to_string(),
            ));
        }
        if syntax.validation_suffix == syntax.conversion_suffix {
            return Err(ConfigError::Invalid(format!(
                "validation and conversion suffixes are both '{}'",
                syntax.validation_suffix
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(EngineConfig::from_yaml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = EngineConfig::from_yaml_str("max_cascade_depth: 8\n").unwrap();
        assert_eq!(config.max_cascade_depth, 8);
        assert_eq!(config.syntax.reserved_prefix, "sa$");
        assert!(config.enable_binding_on_link);
    }

    #[test]
    fn custom_syntax() {
        let config = EngineConfig::from_yaml_str(
            "syntax:\n  reserved_prefix: \"@\"\n  validation_suffix: Check\n",
        )
        .unwrap();
        assert!(config.syntax.is_reserved("@email"));
        assert_eq!(config.syntax.field_of("@email"), Some("email"));
        assert_eq!(config.syntax.conversion_suffix, "Conversion");
    }

    #[test]
    fn rejects_zero_depth() {
        let err = EngineConfig::from_yaml_str("max_cascade_depth: 0").unwrap_err();
        assert!(err.to_string().contains("max_cascade_depth"));
    }

    #[test]
    fn rejects_identical_suffixes() {
        let err = EngineConfig::from_yaml_str(
            "syntax:\n  validation_suffix: X\n  conversion_suffix: X\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(EngineConfig::from_yaml_str("max_depth: 3").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "enable_binding_on_link: false").unwrap();
        let config = EngineConfig::from_file(file.path()).unwrap();
        assert!(!config.enable_binding_on_link);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = EngineConfig::from_file("/nonexistent/engine.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
