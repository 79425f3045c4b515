//! `calculation`: recomputes derived totals whenever one of their inputs
//! is dispatched.
//!
//! Two sums are maintained:
//!
//! | Target | Inputs | Arithmetic |
//! |---|---|---|
//! | `total` | `value1`, `value2` | float, or decimal when both are decimals |
//! | `totalNumber` | `address.note.number1`, `address.note.number2` | decimal only |
//!
//! The decimal sum is computed only once both inputs are present and already
//! converted to decimals; until then the target keeps its old value. The
//! field paths can be overridden through the annotation's config payload.

use serde::Deserialize;
use serde_json::Value;

use sa_core::{EngineError, FieldValue};
use sa_engine::{typed_config, Processor, RuleContext};

pub const CALCULATION: &str = "calculation";

/// Field paths of the two computed totals.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ComputedTotalConfig {
    pub value1: String,
    pub value2: String,
    pub total: String,
    pub number1: String,
    pub number2: String,
    pub total_number: String,
}

impl Default for ComputedTotalConfig {
    fn default() -> Self {
        Self {
            value1: "value1".to_string(),
            value2: "value2".to_string(),
            total: "total".to_string(),
            number1: "address.note.number1".to_string(),
            number2: "address.note.number2".to_string(),
            total_number: "totalNumber".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ComputedTotalProcessor;

impl Processor for ComputedTotalProcessor {
    fn annotation_name(&self) -> &str {
        CALCULATION
    }

    fn process(&self, config: &Value, path: &str, ctx: &mut RuleContext<'_>) -> Result<(), EngineError> {
        let config: ComputedTotalConfig = typed_config(config).map_err(|e| EngineError::Rule {
            rule: CALCULATION.to_string(),
            path: path.to_string(),
            reason: format!("invalid config: {e}"),
        })?;

        match plain_sum(ctx.value(&config.value1), ctx.value(&config.value2)) {
            Some(total) => {
                ctx.set_value(&config.total, total)?;
            }
            None => tracing::trace!(target_field = %config.total, "inputs not summable; total kept"),
        }

        match decimal_sum(ctx.value(&config.number1), ctx.value(&config.number2)) {
            Some(total) => {
                ctx.set_value(&config.total_number, total)?;
            }
            None => tracing::trace!(target_field = %config.total_number, "decimal inputs not ready; total kept"),
        }
        Ok(())
    }
}

fn plain_sum(a: Option<&FieldValue>, b: Option<&FieldValue>) -> Option<FieldValue> {
    match (a?, b?) {
        (FieldValue::Number(x), FieldValue::Number(y)) => Some(FieldValue::Number(x + y)),
        (FieldValue::Decimal(x), FieldValue::Decimal(y)) => x.checked_add(*y).map(FieldValue::Decimal),
        _ => None,
    }
}

fn decimal_sum(a: Option<&FieldValue>, b: Option<&FieldValue>) -> Option<FieldValue> {
    let (a, b) = (a?, b?);
    if !a.is_truthy() || !b.is_truthy() {
        return None;
    }
    match (a, b) {
        (FieldValue::Decimal(x), FieldValue::Decimal(y)) => x.checked_add(*y).map(FieldValue::Decimal),
        _ => None,
    }
}
