//! Validation error types for mapping configuration documents
//!
//! Copyright (c) 2025 Apishim Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single rule violation with expected/actual context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// The rule that was violated
    pub rule: String,
    /// What was expected
    pub expected: String,
    /// What was actually found
    pub actual: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rule '{}' violated: expected {}, but found {}",
            self.rule, self.expected, self.actual
        )
    }
}

/// Document validation error, rooted at a `$` JSON path
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub struct ValidationError {
    /// JSON path where the error occurred
    pub path: String,
    /// Human-readable error message
    pub message: String,
    /// Violated rules
    pub schema_violations: Vec<Violation>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation error at '{}': {}", self.path, self.message)?;

        for violation in &self.schema_violations {
            write!(f, "\n  - {}", violation)?;
        }

        Ok(())
    }
}

impl ValidationError {
    pub fn new<P, M>(path: P, message: M) -> Self
    where
        P: Into<String>,
        M: Into<String>,
    {
        Self {
            path: path.into(),
            message: message.into(),
            schema_violations: Vec::new(),
        }
    }

    pub fn with_violations<P, M>(path: P, message: M, violations: Vec<Violation>) -> Self
    where
        P: Into<String>,
        M: Into<String>,
    {
        Self {
            path: path.into(),
            message: message.into(),
            schema_violations: violations,
        }
    }

    /// Shorthand for an error carrying exactly one violation
    pub fn rule<P, M, R, E, A>(path: P, message: M, rule: R, expected: E, actual: A) -> Self
    where
        P: Into<String>,
        M: Into<String>,
        R: Into<String>,
        E: Into<String>,
        A: Into<String>,
    {
        Self::with_violations(
            path,
            message,
            vec![Self::create_violation(rule, expected, actual)],
        )
    }

    pub fn create_violation<R, E, A>(rule: R, expected: E, actual: A) -> Violation
    where
        R: Into<String>,
        E: Into<String>,
        A: Into<String>,
    {
        Violation {
            rule: rule.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;
