//! `bigConversion`: raw numbers and numeric text become exact decimals on
//! the way in and plain floats on the way out.
//!
//! Falsy values (null, empty text, zero, false) are left alone in both
//! directions. A value that cannot be read as a number is logged and left
//! unchanged.

use serde_json::Value;

use sa_core::{EngineError, FieldValue};
use sa_engine::{Converter, RuleContext};

pub const BIG: &str = "bigConversion";

#[derive(Debug, Clone, Copy, Default)]
pub struct DecimalConverter;

impl Converter for DecimalConverter {
    fn annotation_name(&self) -> &str {
        BIG
    }

    fn to(&self, _: &Value, path: &str, ctx: &mut RuleContext<'_>) -> Result<(), EngineError> {
        let Some(value) = ctx.value(path).filter(|v| v.is_truthy()) else {
            return Ok(());
        };
        if value.is_decimal() {
            return Ok(());
        }
        match value.as_decimal() {
            Some(decimal) => {
                ctx.set_value(path, FieldValue::Decimal(decimal))?;
            }
            None => {
                tracing::warn!(path, found = value.kind_name(), "value is not numeric; conversion skipped");
            }
        }
        Ok(())
    }

    fn from(&self, _: &Value, path: &str, ctx: &mut RuleContext<'_>) -> Result<(), EngineError> {
        let Some(value) = ctx.value(path).filter(|v| v.is_truthy()) else {
            return Ok(());
        };
        let number = match value {
            FieldValue::Number(_) => return Ok(()),
            FieldValue::Text(text) => text.trim().parse::<f64>().ok(),
            other => other.as_f64(),
        };
        match number {
            Some(number) => {
                ctx.set_value(path, FieldValue::Number(number))?;
            }
            None => {
                tracing::warn!(path, found = value.kind_name(), "value is not numeric; conversion skipped");
            }
        }
        Ok(())
    }
}
