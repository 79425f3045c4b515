//! `cityParamsValidation`: the field must name a city known to a
//! [`CityDirectory`].

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;

use sa_core::{EngineError, FieldValue};
use sa_engine::{RuleContext, Validator};

pub const CITY_PARAMS: &str = "cityParamsValidation";

/// Lookup of known city names, supplied by the embedding application.
pub trait CityDirectory: Send + Sync {
    fn find_by_name(&self, name: &str) -> bool;
}

/// A fixed list of city names. Matching is exact after trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticCityDirectory {
    names: BTreeSet<String>,
}

impl StaticCityDirectory {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.into().trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl CityDirectory for StaticCityDirectory {
    fn find_by_name(&self, name: &str) -> bool {
        self.names.contains(name.trim())
    }
}

pub struct CityParamsValidator {
    directory: Arc<dyn CityDirectory>,
}

impl CityParamsValidator {
    pub fn new(directory: Arc<dyn CityDirectory>) -> Self {
        Self { directory }
    }
}

impl Validator for CityParamsValidator {
    fn annotation_name(&self) -> &str {
        CITY_PARAMS
    }

    fn validate(&self, _: &Value, path: &str, ctx: &mut RuleContext<'_>) -> Result<(), EngineError> {
        let known = ctx
            .value(path)
            .and_then(FieldValue::display_text)
            .is_some_and(|name| !name.is_empty() && self.directory.find_by_name(&name));
        ctx.record(path, CITY_PARAMS, !known);
        Ok(())
    }
}

impl std::fmt::Debug for CityParamsValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CityParamsValidator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::session_with;
    use sa_engine::{Annotation, RuleHandler, ShadowNode};
    use serde_json::json;

    fn directory() -> Arc<dyn CityDirectory> {
        Arc::new(StaticCityDirectory::new(["Humenné", " Košice ", ""]))
    }

    #[test]
    fn static_directory_trims_and_skips_blanks() {
        let cities = StaticCityDirectory::new(["Humenné", " Košice ", ""]);
        assert_eq!(cities.len(), 2);
        assert!(cities.find_by_name("Košice"));
        assert!(cities.find_by_name(" Humenné"));
        assert!(!cities.find_by_name("humenné"));
    }

    #[test]
    fn unknown_and_empty_cities_fail() {
        let mut session = session_with([RuleHandler::validator(CityParamsValidator::new(directory()))]);
        let shadow = ShadowNode::new().nest(
            "address",
            ShadowNode::new().annotate("city", [Annotation::validator(CITY_PARAMS)]),
        );
        let data = FieldValue::from(json!({"address": {"city": "Atlantis"}}));
        let mut obj = session.register("user", data, shadow).unwrap();

        session.dispatch(&mut obj, "address.city").unwrap();
        assert!(session.findings().contains("address.city", CITY_PARAMS));

        *obj.data_mut() = FieldValue::from(json!({"address": {"city": ""}}));
        session.dispatch(&mut obj, "address.city").unwrap();
        assert_eq!(session.findings().len(), 1);

        *obj.data_mut() = FieldValue::from(json!({"address": {"city": "Humenné"}}));
        session.dispatch(&mut obj, "address.city").unwrap();
        assert!(session.findings().is_empty());
    }
}
