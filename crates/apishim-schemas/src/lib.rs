//! Apishim Schemas - mapping configuration model, validation and storage
//!
//! A mapping configuration document describes one V2 endpoint: the legacy V1
//! calls that feed it and the field mappings that assemble its response.
//! This crate provides:
//!
//! - **Model**: typed `serde` representation of the document
//! - **Validation**: fail-fast structural and referential rules
//! - **Loader**: YAML/JSON parsing with format detection
//! - **Store**: a directory of named documents with atomic writes
//!
//! ## Quick Start
//!
//! ```rust
//! use apishim_schemas::validate_document;
//! use serde_json::json;
//!
//! let doc = json!({
//!     "endpoint": {"v2_path": "/api/v2/policies/{policyId}", "v2_method": "GET"},
//!     "v1_calls": [{"name": "get_policy", "endpoint": "/api/v1/policy/{id}"}],
//!     "field_mappings": [
//!         {"v2_path": "policyNumber", "source": "get_policy", "v1_path": "policy_num"}
//!     ]
//! });
//!
//! let config = validate_document(&doc).unwrap();
//! assert_eq!(config.call_names(), vec!["get_policy"]);
//! ```
//!
//! Copyright (c) 2025 Apishim Team
//! Licensed under the Apache-2.0 license

pub mod loader;
pub mod model;
pub mod store;
pub mod validation;

pub use loader::{load_config_file, DocumentParser, Format, LoaderError, LoaderResult};
pub use model::{
    AmbiguousMapping, EndpointSpec, FieldMapping, HttpMethod, MappingConfig, Metadata,
    ParamLocation, ParamMapping, StubType, V1ApiCall, STUB_SOURCE,
};
pub use store::{is_valid_id, ConfigStore, LoadOutcome};
pub use validation::{
    validate_document, MappingConfigValidator, SchemaValidator, ValidationContext,
    ValidationError, ValidationResult, Violation,
};
