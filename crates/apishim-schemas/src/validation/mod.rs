//! Validation for mapping configuration documents
//!
//! Structural rules are enforced by typed decoding, then referential and
//! sanity rules run on the decoded document. The first violation wins.
//!
//! Copyright (c) 2025 Apishim Team
//! Licensed under the Apache-2.0 license

pub mod base;
pub mod error;
pub mod mapping_config;

pub use base::{SchemaValidator, ValidationContext};
pub use error::{ValidationError, ValidationResult, Violation};
pub use mapping_config::{validate_document, MappingConfigValidator, EXPRESSION_CLOSE, EXPRESSION_OPEN};
