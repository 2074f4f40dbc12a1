//! V1 error classification
//!
//! Maps V1 HTTP outcomes onto the status a V2 caller should see.

use serde_json::{json, Value};
use thiserror::Error;

/// A failed V1 interaction, carrying the status to report upstream
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct V1OrchestratorError {
    pub message: String,
    /// HTTP status for the V2 response
    pub status: u16,
    pub details: Option<Value>,
}

impl V1OrchestratorError {
    pub fn new<M: Into<String>>(message: M, status: u16, details: Option<Value>) -> Self {
        Self {
            message: message.into(),
            status,
            details,
        }
    }

    /// A path parameter required by a V1 call is absent from the request
    pub fn missing_path_param(v2_param: &str) -> Self {
        Self::new(
            format!("Missing required path parameter: {}", v2_param),
            400,
            None,
        )
    }

    /// Classify a non-success V1 status
    ///
    /// Returns `None` for 1xx-3xx statuses, which are treated as success.
    pub fn from_status(call: &str, status: u16, body: String) -> Option<Self> {
        match status {
            404 => Some(Self::new(
                format!("Resource not found in V1 API: {}", call),
                404,
                Some(json!({"v1_response": body})),
            )),
            500..=599 => Some(Self::new(
                format!("V1 API server error: {}", call),
                502,
                Some(json!({"v1_status": status, "v1_response": body})),
            )),
            400..=499 => Some(Self::new(
                format!("V1 API client error: {}", call),
                status,
                Some(json!({"v1_response": body})),
            )),
            _ => None,
        }
    }

    pub fn timeout(call: &str) -> Self {
        Self::new(format!("V1 API timeout: {}", call), 504, None)
    }

    pub fn network(call: &str, error: &dyn std::error::Error) -> Self {
        Self::new(
            format!("V1 API network error: {}", call),
            502,
            Some(json!({"error": error.to_string()})),
        )
    }

    /// A success status whose body is not JSON
    pub fn invalid_body(call: &str, error: &serde_json::Error) -> Self {
        Self::new(
            format!("V1 API returned an invalid JSON body: {}", call),
            502,
            Some(json!({"error": error.to_string()})),
        )
    }

    /// Stable machine-readable code, e.g. `V1_ERROR_502`
    pub fn error_code(&self) -> String {
        format!("V1_ERROR_{}", self.status)
    }
}
