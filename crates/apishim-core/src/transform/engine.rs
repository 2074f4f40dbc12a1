//! Sandboxed expression evaluation on top of `tera`
//!
//! Each evaluation gets a fresh `Tera` instance holding exactly one inline
//! template, so expressions cannot include, extend or import anything else.
//! Functions that reach the host (environment, clock, randomness) are
//! replaced with ones that fail.

use crate::transform::coercion::coerce;
use crate::transform::error::TransformationError;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tera::{Context, Tera};

const TEMPLATE_NAME: &str = "transform";

const HOST_FUNCTIONS: &[&str] = &["get_env", "now", "get_random"];

/// Evaluates transform expressions against a JSON context
#[derive(Debug, Default, Clone, Copy)]
pub struct ExpressionEngine;

impl ExpressionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Render `expression` against `context` and coerce the result
    pub fn evaluate(
        &self,
        expression: &str,
        context: &Map<String, Value>,
        field: &str,
    ) -> Result<Value, TransformationError> {
        let mut tera = sandboxed();
        tera.add_raw_template(TEMPLATE_NAME, expression)
            .map_err(|e| TransformationError::Syntax {
                field: field.to_string(),
                message: describe(&e),
            })?;

        let mut ctx = Context::new();
        for (key, value) in context {
            ctx.insert(key.as_str(), value);
        }

        let rendered = tera
            .render(TEMPLATE_NAME, &ctx)
            .map_err(|e| classify_render_error(&e, field))?;

        Ok(coerce(&rendered).into())
    }
}

fn sandboxed() -> Tera {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.register_filter("to_upper", to_upper);
    tera.register_filter("to_lower", to_lower);
    for &name in HOST_FUNCTIONS {
        tera.register_function(name, move |_: &HashMap<String, Value>| -> tera::Result<Value> {
            Err(tera::Error::msg(format!(
                "function '{}' is not available in transforms",
                name
            )))
        });
    }
    tera
}

fn to_upper(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(as_text(value).to_uppercase()))
}

fn to_lower(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(as_text(value).to_lowercase()))
}

// Falsy values (null, false, zero, empty) render as an empty string.
fn as_text(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::Number(n) if n.as_f64() == Some(0.0) => String::new(),
        Value::Array(items) if items.is_empty() => String::new(),
        Value::Object(map) if map.is_empty() => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn classify_render_error(err: &tera::Error, field: &str) -> TransformationError {
    let message = describe(err);
    if message.contains("not found in context") {
        TransformationError::UndefinedVariable {
            field: field.to_string(),
            message,
        }
    } else {
        TransformationError::Render {
            field: field.to_string(),
            message,
        }
    }
}

// Tera nests the useful detail in the source chain.
fn describe(err: &tera::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        parts.push(inner.to_string());
        source = inner.source();
    }
    parts.join(": ")
}
