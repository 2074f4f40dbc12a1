//! Document parsing for YAML and JSON formats
//!
//! Copyright (c) 2025 Apishim Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use crate::model::MappingConfig;
use crate::validation::validate_document;
use serde_json::Value;
use std::path::Path;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML format (.yaml, .yml)
    Yaml,
    /// JSON format (.json)
    Json,
}

impl Format {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> LoaderResult<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(LoaderError::unsupported_format(path.to_path_buf())),
        }
    }

    /// Get file extensions for this format
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Format::Yaml => &["yaml", "yml"],
            Format::Json => &["json"],
        }
    }

    /// Whether a path carries an extension of any supported format
    pub fn is_supported(path: &Path) -> bool {
        Self::from_path(path).is_ok()
    }
}

/// Parser producing JSON value trees from configuration documents
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentParser;

impl DocumentParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a file, detecting format from extension
    pub fn parse_file(&self, path: &Path) -> LoaderResult<Value> {
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| LoaderError::io_error(path.to_path_buf(), e))?;

        self.parse_content(&content, format, path)
    }

    /// Parse content with explicit format; `path` is only used for errors
    pub fn parse_content(&self, content: &str, format: Format, path: &Path) -> LoaderResult<Value> {
        match format {
            Format::Yaml => self.parse_yaml(content, path),
            Format::Json => self.parse_json(content, path),
        }
    }

    pub fn parse_yaml(&self, content: &str, path: &Path) -> LoaderResult<Value> {
        let yaml_value: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| LoaderError::yaml_parse_error(path.to_path_buf(), e))?;

        serde_json::to_value(yaml_value)
            .map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e))
    }

    pub fn parse_json(&self, content: &str, path: &Path) -> LoaderResult<Value> {
        serde_json::from_str(content)
            .map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e))
    }

    /// Parse and validate a file into a typed configuration
    pub fn load_config(&self, path: &Path) -> LoaderResult<MappingConfig> {
        let raw = self.parse_file(path)?;
        validate_document(&raw).map_err(|e| LoaderError::validation_error(path.to_path_buf(), e))
    }
}
