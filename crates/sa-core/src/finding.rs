//! # Finding Registry
//!
//! Ordered collection of validation findings for a session.
//!
//! ## Uniqueness Invariant
//!
//! At most one [`Finding`] exists per `(property, rule_key)` pair. Adding a
//! duplicate keeps the existing entry in place (and its position), and
//! removal targets the exact pair. Validators can therefore report on every
//! pass without tracking what they reported before.
//!
//! Errors and warnings share one registry so their relative order is kept;
//! [`FindingRegistry::errors`] and [`FindingRegistry::warnings`] are views.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::identity::ObjectKey;

/// How a finding should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks submission of the data object.
    #[default]
    Error,
    /// Informational; does not block.
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// A recorded validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Dotted path of the offending field, relative to the data object root.
    pub property: String,
    /// Key of the rule that failed, e.g. `"notEmptyValidation"`.
    pub rule_key: String,
    /// Registration key of the data object the field belongs to.
    pub owner: Option<ObjectKey>,
    /// Error or warning.
    pub severity: Severity,
}

impl Finding {
    /// An error finding.
    pub fn error(
        property: impl Into<String>,
        rule_key: impl Into<String>,
        owner: Option<ObjectKey>,
    ) -> Self {
        Self {
            property: property.into(),
            rule_key: rule_key.into(),
            owner,
            severity: Severity::Error,
        }
    }

    /// A warning finding.
    pub fn warning(
        property: impl Into<String>,
        rule_key: impl Into<String>,
        owner: Option<ObjectKey>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(property, rule_key, owner)
        }
    }

    /// One-line message: `"<property> <rule_key>"`.
    pub fn message(&self) -> String {
        format!("{} {}", self.property, self.rule_key)
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.owner {
            Some(owner) => write!(f, "[{}] {}.{}: {}", self.severity, owner, self.property, self.rule_key),
            None => write!(f, "[{}] {}: {}", self.severity, self.property, self.rule_key),
        }
    }
}

/// All findings reported against one property, grouped for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySummary {
    /// The property path.
    pub property: String,
    /// Owner of the first finding for this property.
    pub owner: Option<ObjectKey>,
    /// Space-separated messages of every finding for this property.
    pub message: String,
    /// Number of findings grouped here.
    pub count: usize,
}

/// Ordered, deduplicated set of findings.
#[derive(Debug, Clone, Default)]
pub struct FindingRegistry {
    findings: Vec<Finding>,
}

impl FindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finding. Returns `false` if the `(property, rule_key)` pair
    /// was already present, in which case nothing changes.
    pub fn add(&mut self, finding: Finding) -> bool {
        if self.contains(&finding.property, &finding.rule_key) {
            return false;
        }
        self.findings.push(finding);
        true
    }

    /// Remove the finding for `(property, rule_key)`. Returns whether one was
    /// present.
    pub fn remove(&mut self, property: &str, rule_key: &str) -> bool {
        let before = self.findings.len();
        self.findings
            .retain(|f| !(f.property == property && f.rule_key == rule_key));
        self.findings.len() != before
    }

    pub fn contains(&self, property: &str, rule_key: &str) -> bool {
        self.findings
            .iter()
            .any(|f| f.property == property && f.rule_key == rule_key)
    }

    /// All findings in insertion order.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Findings reported against one property.
    pub fn for_property<'a>(&'a self, property: &'a str) -> impl Iterator<Item = &'a Finding> {
        self.findings.iter().filter(move |f| f.property == property)
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Drop every finding.
    pub fn clear(&mut self) {
        self.findings.clear();
    }

    /// Drop every finding owned by `owner`.
    pub fn clear_owner(&mut self, owner: &ObjectKey) {
        self.findings.retain(|f| f.owner.as_ref() != Some(owner));
    }

    /// Group findings per property, in order of first appearance.
    ///
    /// This is the shape a form layer needs to decorate each control with
    /// one combined message.
    pub fn by_property(&self) -> Vec<PropertySummary> {
        let mut grouped: IndexMap<&str, PropertySummary> = IndexMap::new();
        for finding in &self.findings {
            grouped
                .entry(finding.property.as_str())
                .and_modify(|summary| {
                    summary.message.push(' ');
                    summary.message.push_str(&finding.message());
                    summary.count += 1;
                })
                .or_insert_with(|| PropertySummary {
                    property: finding.property.clone(),
                    owner: finding.owner.clone(),
                    message: finding.message(),
                    count: 1,
                });
        }
        grouped.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Option<ObjectKey> {
        Some(ObjectKey::new("user"))
    }

    #[test]
    fn duplicate_pair_is_ignored() {
        let mut reg = FindingRegistry::new();
        assert!(reg.add(Finding::error("email", "notEmptyValidation", owner())));
        assert!(!reg.add(Finding::error("email", "notEmptyValidation", owner())));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn same_property_different_rules_coexist() {
        let mut reg = FindingRegistry::new();
        reg.add(Finding::error("email", "notEmptyValidation", owner()));
        reg.add(Finding::error("email", "emailFormat", owner()));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.for_property("email").count(), 2);
    }

    #[test]
    fn removing_absent_pair_is_noop() {
        let mut reg = FindingRegistry::new();
        reg.add(Finding::error("email", "emailFormat", owner()));
        assert!(!reg.remove("email", "notEmptyValidation"));
        assert!(!reg.remove("name", "emailFormat"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn remove_targets_exact_pair() {
        let mut reg = FindingRegistry::new();
        reg.add(Finding::error("email", "notEmptyValidation", owner()));
        reg.add(Finding::error("email", "emailFormat", owner()));
        assert!(reg.remove("email", "emailFormat"));
        assert_eq!(reg.findings()[0].rule_key, "notEmptyValidation");
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn errors_and_warnings_are_views() {
        let mut reg = FindingRegistry::new();
        reg.add(Finding::warning("name", "shortName", owner()));
        reg.add(Finding::error("email", "emailFormat", owner()));
        assert_eq!(reg.error_count(), 1);
        assert_eq!(reg.warnings().count(), 1);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn clear_owner_keeps_other_objects() {
        let mut reg = FindingRegistry::new();
        reg.add(Finding::error("email", "emailFormat", owner()));
        reg.add(Finding::error("email", "emailFormat2", Some(ObjectKey::new("other"))));
        reg.clear_owner(&ObjectKey::new("user"));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.findings()[0].owner, Some(ObjectKey::new("other")));
        reg.clear();
        assert!(reg.is_empty());
    }

    #[test]
    fn by_property_groups_messages() {
        let mut reg = FindingRegistry::new();
        reg.add(Finding::error("email", "notEmptyValidation", owner()));
        reg.add(Finding::error("name", "notEmptyValidation", owner()));
        reg.add(Finding::error("email", "emailFormat", owner()));
        let summary = reg.by_property();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].property, "email");
        assert_eq!(summary[0].count, 2);
        assert_eq!(
            summary[0].message,
            "email notEmptyValidation email emailFormat"
        );
        assert_eq!(summary[1].property, "name");
    }

    #[test]
    fn display_includes_owner() {
        let f = Finding::error("address.street", "notEmptyValidation", owner());
        assert_eq!(
            f.to_string(),
            "[error] user.address.street: notEmptyValidation"
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// No sequence of adds ever produces two findings for one pair.
            #[test]
            fn pairs_stay_unique(
                ops in prop::collection::vec(("[a-c]", "[x-z]"), 0..40)
            ) {
                let mut reg = FindingRegistry::new();
                for (property, rule) in &ops {
                    reg.add(Finding::error(property.as_str(), rule.as_str(), None));
                }
                let mut seen = std::collections::HashSet::new();
                for f in reg.findings() {
                    prop_assert!(seen.insert((f.property.clone(), f.rule_key.clone())));
                }
            }
        }
    }
}
