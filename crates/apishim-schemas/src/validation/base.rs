//! Base validation trait and path tracking
//!
//! Copyright (c) 2025 Apishim Team
//! Licensed under the Apache-2.0 license

use crate::validation::error::ValidationResult;

/// Tracks the JSON path of the node currently being validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationContext {
    pub path: String,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self {
            path: "$".to_string(),
        }
    }

    /// Create a child context for an object key
    pub fn child<P: AsRef<str>>(&self, segment: P) -> Self {
        Self {
            path: format!("{}.{}", self.path, segment.as_ref()),
        }
    }

    /// Create a child context for an array index
    pub fn child_index(&self, index: usize) -> Self {
        Self {
            path: format!("{}[{}]", self.path, index),
        }
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Base trait for document validators
pub trait SchemaValidator {
    /// The type being validated
    type Input;

    /// Validate from the document root
    fn validate(&self, input: &Self::Input) -> ValidationResult<()> {
        self.validate_with_context(input, &ValidationContext::new())
    }

    /// Validate a node located at `context.path`
    fn validate_with_context(
        &self,
        input: &Self::Input,
        context: &ValidationContext,
    ) -> ValidationResult<()>;
}
