//! Error types for the Apishim core library
//!
//! Each pipeline stage has its own error type; `Error` gathers them for
//! callers that drive the whole pipeline.

use crate::orchestrator::V1OrchestratorError;
use crate::response::ResponseBuilderError;
use crate::transform::TransformationError;
use thiserror::Error;

/// Main error type for Apishim core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid orchestrator or client configuration
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// A V1 call failed or returned an error status
    #[error(transparent)]
    Orchestration(#[from] V1OrchestratorError),

    /// A field could not be computed
    #[error(transparent)]
    Transformation(#[from] TransformationError),

    /// The V2 document could not be assembled
    #[error(transparent)]
    ResponseBuilder(#[from] ResponseBuilderError),
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn configuration<M: Into<String>>(message: M) -> Self {
        Error::Configuration {
            message: message.into(),
            source: None,
        }
    }
}
