//! # Field Values
//!
//! [`FieldValue`] is the in-memory form of the caller's data object: ordered
//! records, lists and scalars. It deserializes from any self-describing
//! format (JSON, YAML) and serializes back with two rules:
//!
//! - `Decimal` values serialize as decimal strings, so no precision is lost
//!   on the way out.
//! - Integral `Number`s serialize as integers (`5`, not `5.0`).
//!
//! ## Truthiness
//!
//! Rules in this system were written against loosely typed form data, where
//! "is there a value" is a truthiness test. [`FieldValue::is_truthy`] and
//! [`FieldValue::is_blank`] encode that test once so every rule agrees on it:
//! `Null`, `false`, `0`, `NaN` and `""` are falsy; containers and decimals are
//! always truthy.

use std::str::FromStr;

use indexmap::IndexMap;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

/// An ordered string-keyed mapping of field values.
pub type Record = IndexMap<String, FieldValue>;

/// Largest magnitude at which every integer is exactly representable in `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A node of a data object tree.
///
/// Variant order matters for deserialization: untagged input is matched
/// top to bottom, so strings always become `Text` and numbers `Number`.
/// `Decimal` only appears through conversion.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Explicit absence of a value.
    #[default]
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Floating-point number.
    Number(f64),
    /// Text.
    Text(String),
    /// Ordered sequence.
    List(Vec<FieldValue>),
    /// Nested record.
    Record(Record),
    /// Arbitrary-precision decimal, produced by decimal conversion.
    Decimal(Decimal),
}

impl FieldValue {
    /// Short lowercase name of the variant, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Record(_) => "record",
            Self::Decimal(_) => "decimal",
        }
    }

    /// Loose truthiness of form data.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Text(s) => !s.is_empty(),
            Self::List(_) | Self::Record(_) | Self::Decimal(_) => true,
        }
    }

    /// `true` for `Null` and the empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Whether the value is a record or a list.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Record(_) | Self::List(_))
    }

    /// Whether the value is a decimal.
    pub fn is_decimal(&self) -> bool {
        matches!(self, Self::Decimal(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of numbers and decimals.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Decimal(d) => d.to_f64(),
            _ => None,
        }
    }

    /// Decimal view of decimals, finite numbers and numeric text.
    ///
    /// Numbers go through their shortest round-trip text form so that
    /// `0.9999` becomes exactly `0.9999` rather than its binary expansion.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Decimal(d) => Some(*d),
            Self::Number(n) if n.is_finite() => parse_decimal(&format_number(*n)),
            Self::Text(s) => parse_decimal(s.trim()),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Self::Record(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<FieldValue>> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Direct child of a record by key.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.as_record().and_then(|map| map.get(key))
    }

    /// Text form of a scalar, as a form field would display it.
    ///
    /// Containers and `Null` have no text form.
    pub fn display_text(&self) -> Option<String> {
        match self {
            Self::Null | Self::List(_) | Self::Record(_) => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Number(n) => Some(format_number(*n)),
            Self::Text(s) => Some(s.clone()),
            Self::Decimal(d) => Some(d.normalize().to_string()),
        }
    }

    /// Convert from a `serde_json::Value`.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(map) => Self::Record(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert to a `serde_json::Value`, with decimals as strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => number_to_json(*n),
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Decimal(d) => serde_json::Value::String(d.to_string()),
            Self::List(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Record(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) if is_integral(*n) => serializer.serialize_i64(*n as i64),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Decimal(d) => serializer.serialize_str(&d.to_string()),
            Self::List(items) => items.serialize(serializer),
            Self::Record(map) => map.serialize(serializer),
        }
    }
}

fn is_integral(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER
}

/// Format a number the way a form displays it: integers without a fraction.
fn format_number(n: f64) -> String {
    if is_integral(n) {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if is_integral(n) {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        Self::from_json(value)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Decimal> for FieldValue {
    fn from(d: Decimal) -> Self {
        Self::Decimal(d)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        Self::List(items)
    }
}

impl From<Record> for FieldValue {
    fn from(map: Record) -> Self {
        Self::Record(map)
    }
}
