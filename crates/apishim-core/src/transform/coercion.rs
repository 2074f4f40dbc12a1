//! Best-effort typing of textual template output
//!
//! Template rendering always yields text, so rendered values are
//! reinterpreted with a fixed, ordered policy: integer, then float, then
//! boolean, otherwise the string itself. Integer literals too large for a
//! JSON number stay strings rather than losing digits through a float.

use serde_json::{Number, Value};

/// Result of coercing a rendered string
#[derive(Debug, Clone, PartialEq)]
pub enum CoercedValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    String(String),
}

impl From<CoercedValue> for Value {
    fn from(value: CoercedValue) -> Self {
        match value {
            CoercedValue::Int(i) => Value::Number(i.into()),
            CoercedValue::UInt(u) => Value::Number(u.into()),
            CoercedValue::Float(f) => Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(f.to_string())),
            CoercedValue::Bool(b) => Value::Bool(b),
            CoercedValue::String(s) => Value::String(s),
        }
    }
}

/// Coerce a rendered string
///
/// Surrounding whitespace is trimmed first. Integers are only attempted for
/// optionally signed digit runs; non-finite floats (`inf`, `NaN`) stay strings.
pub fn coerce(raw: &str) -> CoercedValue {
    let value = raw.trim();

    if is_integer_literal(value) {
        if let Ok(i) = value.parse::<i64>() {
            return CoercedValue::Int(i);
        }
        if let Ok(u) = value.parse::<u64>() {
            return CoercedValue::UInt(u);
        }
        return CoercedValue::String(value.to_string());
    }

    if let Ok(f) = value.parse::<f64>() {
        if f.is_finite() {
            return CoercedValue::Float(f);
        }
    }

    match value.to_lowercase().as_str() {
        "true" => CoercedValue::Bool(true),
        "false" => CoercedValue::Bool(false),
        _ => CoercedValue::String(value.to_string()),
    }
}

fn is_integer_literal(value: &str) -> bool {
    let digits = value.strip_prefix(|c| c == '+' || c == '-').unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Coerce a JSON value; anything but a string passes through untouched
pub fn coerce_value(value: Value) -> Value {
    match value {
        Value::String(s) => coerce(&s).into(),
        other => other,
    }
}
