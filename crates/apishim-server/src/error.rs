//! HTTP error responses
//!
//! Every failure leaves the server as `{error, code, request_id, details?}`
//! with a stable `code`.

use apishim_core::{RequestId, ResponseBuilderError, V1OrchestratorError};
use apishim_schemas::LoaderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use thiserror::Error;

/// Error returned by request handlers
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub details: Option<Value>,
    pub request_id: RequestId,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    code: &'a str,
    request_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a Value>,
}

impl ApiError {
    pub fn new<C, M>(status: StatusCode, code: C, message: M, request_id: &RequestId) -> Self
    where
        C: Into<String>,
        M: Into<String>,
    {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
            request_id: request_id.clone(),
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// No V2 route for the request
    pub fn route_not_found(method: &str, path: &str, request_id: &RequestId) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("No endpoint configured for {} {}", method, path),
            request_id,
        )
    }

    /// Parameters could not be extracted from the request
    pub fn invalid_request<R: Into<String>>(reason: R, request_id: &RequestId) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "INVALID_REQUEST",
            "Invalid request parameters",
            request_id,
        )
        .with_details(json!({ "reason": reason.into() }))
    }

    /// A V1 interaction failed; the status comes from the orchestrator
    pub fn from_v1(error: V1OrchestratorError, request_id: &RequestId) -> Self {
        let status =
            StatusCode::from_u16(error.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = match error.status {
            404 => "Resource not found in legacy system",
            502 => "Legacy system error",
            504 => "Legacy system timeout",
            _ => "API error",
        };
        let details = error
            .details
            .clone()
            .unwrap_or_else(|| json!({ "reason": error.message }));

        Self::new(status, error.error_code(), message, request_id).with_details(details)
    }

    pub fn transformation(_error: &ResponseBuilderError, request_id: &RequestId) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "TRANSFORMATION_ERROR",
            "Failed to transform response",
            request_id,
        )
    }

    /// Generic failure; never carries internals
    pub fn internal(request_id: &RequestId) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Internal server error",
            request_id,
        )
    }

    /// Map a config store failure onto the management API codes
    pub fn from_store(error: &LoaderError, request_id: &RequestId) -> Self {
        match error {
            LoaderError::NotFound { id } => Self::new(
                StatusCode::NOT_FOUND,
                "CONFIG_NOT_FOUND",
                format!("Configuration '{}' not found", id),
                request_id,
            ),
            LoaderError::InvalidId { .. } => Self::new(
                StatusCode::BAD_REQUEST,
                "INVALID_CONFIG_ID",
                error.to_string(),
                request_id,
            ),
            LoaderError::Validation { source, .. } => {
                let details = if source.schema_violations.is_empty() {
                    json!({ "path": source.path })
                } else {
                    json!({ "path": source.path, "violations": source.schema_violations })
                };
                Self::new(
                    StatusCode::BAD_REQUEST,
                    "CONFIG_INVALID",
                    format!("Invalid configuration: {}", source.message),
                    request_id,
                )
                .with_details(details)
            }
            e if e.is_content_error() => Self::new(
                StatusCode::BAD_REQUEST,
                "CONFIG_INVALID",
                e.to_string(),
                request_id,
            ),
            _ => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                "Failed to access configuration storage",
                request_id,
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
            code: &self.code,
            request_id: self.request_id.as_str(),
            details: self.details.as_ref(),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Failures while starting or running the server
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration store error: {0}")]
    Store(#[from] LoaderError),

    #[error(transparent)]
    Core(#[from] apishim_core::Error),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;
