//! Error types for document loading and storage
//!
//! Copyright (c) 2025 Apishim Team
//! Licensed under the Apache-2.0 license

use crate::validation::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

#[derive(Error, Debug)]
pub enum LoaderError {
    /// File I/O errors
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse YAML file '{path}': {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Failed to parse JSON file '{path}': {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Unsupported file format for '{path}'. Expected .yaml, .yml, or .json")]
    UnsupportedFormat { path: PathBuf },

    /// The document parsed but broke a schema rule
    #[error("Invalid configuration '{path}': {source}")]
    Validation {
        path: PathBuf,
        source: ValidationError,
    },

    #[error("Configuration '{id}' not found")]
    NotFound { id: String },

    #[error("Invalid configuration id '{id}': only letters, digits, '_' and '-' are allowed")]
    InvalidId { id: String },

    #[error("Failed to serialize configuration '{id}': {source}")]
    Serialize {
        id: String,
        source: serde_yaml::Error,
    },
}

impl LoaderError {
    pub fn io_error(path: PathBuf, error: std::io::Error) -> Self {
        Self::Io {
            path,
            source: error,
        }
    }

    pub fn yaml_parse_error(path: PathBuf, error: serde_yaml::Error) -> Self {
        Self::YamlParse {
            path,
            source: error,
        }
    }

    pub fn json_parse_error(path: PathBuf, error: serde_json::Error) -> Self {
        Self::JsonParse {
            path,
            source: error,
        }
    }

    pub fn unsupported_format(path: PathBuf) -> Self {
        Self::UnsupportedFormat { path }
    }

    pub fn validation_error(path: PathBuf, error: ValidationError) -> Self {
        Self::Validation {
            path,
            source: error,
        }
    }

    pub fn not_found<S: Into<String>>(id: S) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Whether this error was caused by the document content rather than
    /// by the filesystem
    pub fn is_content_error(&self) -> bool {
        matches!(
            self,
            Self::YamlParse { .. } | Self::JsonParse { .. } | Self::Validation { .. }
        )
    }

    /// The underlying validation error, if any
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation { source, .. } => Some(source),
            _ => None,
        }
    }
}
