//! `notEmptyValidation`: the field must hold a value other than null or the
//! empty string. An absent field fails too.

use serde_json::Value;

use sa_core::{EngineError, FieldValue};
use sa_engine::{RuleContext, Validator};

pub const NOT_EMPTY: &str = "notEmptyValidation";

#[derive(Debug, Clone, Copy, Default)]
pub struct NotEmptyValidator;

impl Validator for NotEmptyValidator {
    fn annotation_name(&self) -> &str {
        NOT_EMPTY
    }

    fn validate(&self, _: &Value, path: &str, ctx: &mut RuleContext<'_>) -> Result<(), EngineError> {
        let empty = ctx.value(path).map_or(true, FieldValue::is_blank);
        ctx.record(path, NOT_EMPTY, empty);
        Ok(())
    }
}
