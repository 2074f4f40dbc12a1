//! Transformation error taxonomy

use thiserror::Error;

/// Failure to compute the value of one field mapping
///
/// Every variant names the V2 field being computed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformationError {
    /// The expression could not be parsed
    #[error("Syntax error in transform for field '{field}': {message}")]
    Syntax { field: String, message: String },

    /// The expression referenced a name absent from the context
    #[error("Undefined variable in transform for field '{field}': {message}")]
    UndefinedVariable { field: String, message: String },

    /// Any other evaluation failure (bad filter argument, type error)
    #[error("Failed to evaluate transform for field '{field}': {message}")]
    Render { field: String, message: String },

    #[error("Source '{source_name}' not found in V1 responses for field '{field}'")]
    SourceNotFound { field: String, source_name: String },

    #[error("Field '{field}' has no v1_path and no transform")]
    MissingMapping { field: String },
}

impl TransformationError {
    /// The V2 field this error belongs to
    pub fn field(&self) -> &str {
        match self {
            Self::Syntax { field, .. }
            | Self::UndefinedVariable { field, .. }
            | Self::Render { field, .. }
            | Self::SourceNotFound { field, .. }
            | Self::MissingMapping { field } => field,
        }
    }
}
