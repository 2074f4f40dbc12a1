//! V2 response assembly
//!
//! Applies every field mapping in declaration order and deposits each value
//! at its dot path in the output document.

use crate::transform::{path::path_segments, FieldTransformer, TransformationError};
use crate::types::V1Responses;
use apishim_schemas::MappingConfig;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Failure to assemble a V2 document; always fatal to the request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResponseBuilderError {
    #[error("Failed to build field '{field}': {source}")]
    Transformation {
        field: String,
        #[source]
        source: TransformationError,
    },

    /// An intermediate path segment already holds a non-object value
    #[error("Cannot set '{path}': '{segment}' is not an object")]
    PathConflict { path: String, segment: String },

    #[error("Invalid output path '{path}'")]
    InvalidPath { path: String },
}

/// Builds V2 documents from V1 responses
#[derive(Debug, Default, Clone)]
pub struct ResponseBuilder {
    transformer: FieldTransformer,
}

impl ResponseBuilder {
    pub fn new() -> Self {
        Self {
            transformer: FieldTransformer::new(),
        }
    }

    pub fn with_transformer(transformer: FieldTransformer) -> Self {
        Self { transformer }
    }

    /// Build the V2 document for `config` from `responses`
    ///
    /// No partial document is ever returned: the first failing field aborts
    /// the build.
    pub fn build(
        &self,
        config: &MappingConfig,
        responses: &V1Responses,
    ) -> Result<Value, ResponseBuilderError> {
        let mut output = Map::new();

        for mapping in &config.field_mappings {
            let value = self
                .transformer
                .apply_mapping(responses, mapping)
                .map_err(|source| ResponseBuilderError::Transformation {
                    field: mapping.v2_path.clone(),
                    source,
                })?;

            debug!(field = %mapping.v2_path, source = %mapping.source, "Setting V2 field");
            set_nested_value(&mut output, &mapping.v2_path, value)?;
        }

        Ok(Value::Object(output))
    }
}

/// Store `value` at dot path `path`, creating intermediate objects
///
/// The last segment is overwritten if present. An intermediate segment that
/// exists but is not an object is a conflict.
pub fn set_nested_value(
    target: &mut Map<String, Value>,
    path: &str,
    value: Value,
) -> Result<(), ResponseBuilderError> {
    let segments: Vec<&str> = path_segments(path).collect();
    let Some((last, parents)) = segments.split_last() else {
        return Err(ResponseBuilderError::InvalidPath {
            path: path.to_string(),
        });
    };

    let mut current = target;
    for segment in parents {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match entry {
            Value::Object(map) => map,
            _ => {
                return Err(ResponseBuilderError::PathConflict {
                    path: path.to_string(),
                    segment: segment.to_string(),
                })
            }
        };
    }

    current.insert(last.to_string(), value);
    Ok(())
}
