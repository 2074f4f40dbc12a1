//! MappingConfig validation: structural and referential rules
//!
//! Rules run in document order and stop at the first violation, so a bad
//! document is rejected as a whole without affecting any other document.
//!
//! Copyright (c) 2025 Apishim Team
//! Licensed under the Apache-2.0 license

use crate::model::{FieldMapping, MappingConfig, Metadata, V1ApiCall, STUB_SOURCE};
use crate::validation::base::{SchemaValidator, ValidationContext};
use crate::validation::error::{ValidationError, ValidationResult};
use serde_json::Value;
use std::collections::HashSet;

/// Opening delimiter every transform expression must contain
pub const EXPRESSION_OPEN: &str = "{{";
/// Closing delimiter every transform expression must contain
pub const EXPRESSION_CLOSE: &str = "}}";

/// Validator for decoded mapping configuration documents
#[derive(Debug, Default, Clone, Copy)]
pub struct MappingConfigValidator;

impl MappingConfigValidator {
    pub fn new() -> Self {
        Self
    }

    fn validate_endpoint(&self, config: &MappingConfig, ctx: &ValidationContext) -> ValidationResult<()> {
        if config.endpoint.v2_path.trim().is_empty() {
            let ctx = ctx.child("endpoint").child("v2_path");
            return Err(ValidationError::rule(
                &ctx.path,
                "endpoint v2_path must not be empty",
                "non_empty",
                "a URL path such as /api/v2/resource",
                "empty string",
            ));
        }
        Ok(())
    }

    fn validate_calls(&self, calls: &[V1ApiCall], ctx: &ValidationContext) -> ValidationResult<()> {
        let ctx = ctx.child("v1_calls");
        if calls.is_empty() {
            return Err(ValidationError::rule(
                &ctx.path,
                "at least one V1 call is required",
                "non_empty",
                "1 or more items",
                "0 items",
            ));
        }

        let mut seen = HashSet::new();
        for (index, call) in calls.iter().enumerate() {
            let name_ctx = ctx.child_index(index).child("name");
            if !is_valid_call_name(&call.name) {
                return Err(ValidationError::rule(
                    &name_ctx.path,
                    format!(
                        "V1 call name '{}' must be non-empty and contain only letters, digits and underscores",
                        call.name
                    ),
                    "call_name_format",
                    "alphanumeric characters and '_'",
                    format!("'{}'", call.name),
                ));
            }
            if !seen.insert(call.name.as_str()) {
                return Err(ValidationError::rule(
                    &name_ctx.path,
                    format!("duplicate V1 call name '{}'", call.name),
                    "unique_call_name",
                    "a name not used by an earlier call",
                    format!("'{}'", call.name),
                ));
            }
        }
        Ok(())
    }

    fn validate_field_mappings(
        &self,
        config: &MappingConfig,
        ctx: &ValidationContext,
    ) -> ValidationResult<()> {
        let ctx = ctx.child("field_mappings");
        if config.field_mappings.is_empty() {
            return Err(ValidationError::rule(
                &ctx.path,
                "at least one field mapping is required",
                "non_empty",
                "1 or more items",
                "0 items",
            ));
        }

        let call_names: HashSet<&str> = config.v1_calls.iter().map(|c| c.name.as_str()).collect();
        for (index, mapping) in config.field_mappings.iter().enumerate() {
            self.validate_field_mapping(mapping, &call_names, config, &ctx.child_index(index))?;
        }
        Ok(())
    }

    fn validate_field_mapping(
        &self,
        mapping: &FieldMapping,
        call_names: &HashSet<&str>,
        config: &MappingConfig,
        ctx: &ValidationContext,
    ) -> ValidationResult<()> {
        if mapping.v2_path.trim().is_empty() {
            return Err(ValidationError::rule(
                &ctx.child("v2_path").path,
                "field mapping v2_path must not be empty",
                "non_empty",
                "a dot path such as insured.name",
                "empty string",
            ));
        }

        if mapping.source != STUB_SOURCE && !call_names.contains(mapping.source.as_str()) {
            return Err(ValidationError::rule(
                &ctx.child("source").path,
                format!(
                    "field mapping '{}' references unknown source '{}'; declared V1 calls: [{}]",
                    mapping.v2_path,
                    mapping.source,
                    config.call_names().join(", ")
                ),
                "source_reference",
                "'stub' or a declared v1_calls name",
                format!("'{}'", mapping.source),
            ));
        }

        if let Some(transform) = mapping.effective_transform() {
            if !transform.contains(EXPRESSION_OPEN) || !transform.contains(EXPRESSION_CLOSE) {
                return Err(ValidationError::rule(
                    &ctx.child("transform").path,
                    format!(
                        "transform for '{}' must be a template expression using {} and {}",
                        mapping.v2_path, EXPRESSION_OPEN, EXPRESSION_CLOSE
                    ),
                    "expression_delimiters",
                    format!("both '{}' and '{}'", EXPRESSION_OPEN, EXPRESSION_CLOSE),
                    format!("'{}'", transform),
                ));
            }
        }

        Ok(())
    }

    fn validate_metadata(&self, metadata: &Metadata, ctx: &ValidationContext) -> ValidationResult<()> {
        let score = metadata.confidence_score;
        if !(0.0..=1.0).contains(&score) {
            return Err(ValidationError::rule(
                &ctx.child("metadata").child("confidence_score").path,
                "confidence_score must lie between 0.0 and 1.0",
                "range",
                "0.0 <= confidence_score <= 1.0",
                score.to_string(),
            ));
        }
        Ok(())
    }
}

impl SchemaValidator for MappingConfigValidator {
    type Input = MappingConfig;

    fn validate_with_context(
        &self,
        config: &MappingConfig,
        ctx: &ValidationContext,
    ) -> ValidationResult<()> {
        self.validate_endpoint(config, ctx)?;
        self.validate_calls(&config.v1_calls, ctx)?;
        self.validate_field_mappings(config, ctx)?;
        if let Some(metadata) = &config.metadata {
            self.validate_metadata(metadata, ctx)?;
        }
        Ok(())
    }
}

fn is_valid_call_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Decode and validate a raw document tree
///
/// The root must be an object. Decoding failures (missing required fields,
/// unknown enum values, wrong types) are reported as structural violations.
pub fn validate_document(raw: &Value) -> ValidationResult<MappingConfig> {
    let ctx = ValidationContext::new();
    if !raw.is_object() {
        return Err(ValidationError::rule(
            &ctx.path,
            "configuration document must be a mapping",
            "root_type",
            "object",
            json_type_name(raw),
        ));
    }

    let config: MappingConfig = serde_json::from_value(raw.clone()).map_err(|e| {
        ValidationError::rule(
            &ctx.path,
            format!("invalid configuration structure: {}", e),
            "structure",
            "a document matching the MappingConfig schema",
            e.to_string(),
        )
    })?;

    MappingConfigValidator::new().validate_with_context(&config, &ctx)?;
    Ok(config)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
