//! Pseudo-validators that only fan out: they record no findings of their
//! own.
//!
//! - `beanValidation` cascades over the annotated children of a record.
//! - `arrayValidation` cascades over every element of a list, each element
//!   described by the same shadow node.

use serde_json::Value;

use sa_core::{path, EngineError, FieldValue};
use sa_engine::{RuleContext, Validator};

pub const BEAN: &str = "beanValidation";
pub const ARRAY: &str = "arrayValidation";

#[derive(Debug, Clone, Copy, Default)]
pub struct BeanValidator;

impl Validator for BeanValidator {
    fn annotation_name(&self) -> &str {
        BEAN
    }

    fn validate(&self, _: &Value, path: &str, ctx: &mut RuleContext<'_>) -> Result<(), EngineError> {
        ctx.cascade(path)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayValidator;

impl Validator for ArrayValidator {
    fn annotation_name(&self) -> &str {
        ARRAY
    }

    fn validate(&self, _: &Value, path: &str, ctx: &mut RuleContext<'_>) -> Result<(), EngineError> {
        let len = match ctx.value(path) {
            Some(FieldValue::List(items)) => items.len(),
            _ => return Ok(()),
        };
        for index in 0..len {
            ctx.cascade(&path::join(path, &index.to_string()))?;
        }
        Ok(())
    }
}
