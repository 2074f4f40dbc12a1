//! Error types and exit codes for the CLI

use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration document could not be loaded or stored
    #[error(transparent)]
    Loader(#[from] apishim_schemas::LoaderError),

    #[error(transparent)]
    Server(#[from] apishim_server::ServerError),

    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Settings file or override is unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// One or more documents failed validation
    #[error("{failed} of {total} configuration(s) failed validation")]
    ValidationFailed { failed: usize, total: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error with context
    #[error("{0:#}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Loader(e) if e.is_content_error() => 4,
            Self::Loader(apishim_schemas::LoaderError::NotFound { .. }) => 3,
            Self::Loader(_) => 2,
            Self::Server(_) => 6,
            Self::FileNotFound { .. } => 3,
            Self::Config(_) => 5,
            Self::ValidationFailed { .. } => 4,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Other(_) => 99,
        }
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    }
}
