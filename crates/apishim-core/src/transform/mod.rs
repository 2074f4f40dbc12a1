//! Field transformation
//!
//! Computes the value of one field mapping from the collected V1 responses:
//! a static stub, a templated expression, or a direct dot-path copy.
//!
//! Copyright (c) 2025 Apishim Team
//! Licensed under the Apache-2.0 license

pub mod coercion;
pub mod engine;
pub mod error;
pub mod path;

pub use coercion::{coerce, coerce_value, CoercedValue};
pub use engine::ExpressionEngine;
pub use error::TransformationError;
pub use path::get_nested_value;

use crate::types::V1Responses;
use apishim_schemas::FieldMapping;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Context key aliasing the mapping's own source body
pub const SOURCE_ALIAS: &str = "source";

/// Applies field mappings against collected V1 responses
#[derive(Debug, Default, Clone)]
pub struct FieldTransformer {
    engine: ExpressionEngine,
}

impl FieldTransformer {
    pub fn new() -> Self {
        Self {
            engine: ExpressionEngine::new(),
        }
    }

    /// Evaluate an expression against an explicit context
    pub fn evaluate(
        &self,
        expression: &str,
        context: &Map<String, Value>,
        field_name: &str,
    ) -> Result<Value, TransformationError> {
        self.engine.evaluate(expression, context, field_name)
    }

    /// Compute the value of one field mapping
    ///
    /// Stubs return `stub_value` untouched. A missing direct-copy value is not
    /// an error and yields `null`.
    pub fn apply_mapping(
        &self,
        responses: &V1Responses,
        mapping: &FieldMapping,
    ) -> Result<Value, TransformationError> {
        if mapping.is_stub() {
            return Ok(mapping.stub_value.clone());
        }

        let body = responses
            .get(&mapping.source)
            .ok_or_else(|| TransformationError::SourceNotFound {
                field: mapping.v2_path.clone(),
                source_name: mapping.source.clone(),
            })?;

        if let Some(expression) = mapping.effective_transform() {
            let context = build_context(responses, &mapping.source);
            return self.evaluate(expression, &context, &mapping.v2_path);
        }

        let v1_path = mapping
            .effective_v1_path()
            .ok_or_else(|| TransformationError::MissingMapping {
                field: mapping.v2_path.clone(),
            })?;

        match get_nested_value(body, v1_path) {
            Some(value) => Ok(value.clone()),
            None => {
                warn!(
                    field = %mapping.v2_path,
                    source = %mapping.source,
                    v1_path,
                    "V1 field not found, using null"
                );
                Ok(Value::Null)
            }
        }
    }
}

/// Template context for a mapping sourced from `source`
///
/// Holds every response under its call name. The source body's top-level
/// keys and the `source` alias are added underneath; call names always win
/// on collision.
pub fn build_context(responses: &V1Responses, source: &str) -> Map<String, Value> {
    let mut context = Map::new();

    if let Some(body) = responses.get(source) {
        if let Value::Object(fields) = body {
            for (key, value) in fields {
                context.insert(key.clone(), value.clone());
            }
        }
        context.insert(SOURCE_ALIAS.to_string(), body.clone());
    }

    for (name, body) in responses {
        context.insert(name.clone(), body.clone());
    }

    debug!(source, keys = context.len(), "Built transform context");
    context
}
