//! Configuration management endpoints under `/configs`
//!
//! Used by the review tooling to inspect and replace mapping documents.
//! Writes go to the store first and are then swapped into the live route
//! table.

use crate::error::ApiError;
use crate::state::AppState;
use apishim_core::RequestId;
use apishim_schemas::{
    validate_document, ConfigStore, DocumentParser, LoaderError, LoaderResult, MappingConfig,
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::Path as FsPath;
use std::sync::Arc;
use tracing::{info, warn};

/// Listing entry for one stored document
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub id: String,
    pub endpoint: String,
    pub total_mappings: usize,
    pub approved_mappings: usize,
    pub confidence_score: Option<f64>,
    pub generated_at: Option<DateTime<Utc>>,
    pub v1_calls_count: usize,
    pub has_ambiguous: bool,
}

impl ConfigSummary {
    pub fn new(id: &str, config: &MappingConfig) -> Self {
        Self {
            id: id.to_string(),
            endpoint: format!("{} {}", config.endpoint.v2_method, config.endpoint.v2_path),
            total_mappings: config.field_mappings.len(),
            approved_mappings: config.approved_count(),
            confidence_score: config.metadata.as_ref().map(|m| m.confidence_score),
            generated_at: config.metadata.as_ref().map(|m| m.generated_at),
            v1_calls_count: config.v1_calls.len(),
            has_ambiguous: config.has_ambiguous(),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/configs", get(list_configs))
        .route(
            "/configs/:id",
            get(get_config).put(put_config).delete(delete_config),
        )
        .route("/configs/:id/export", get(export_config))
}

async fn list_configs(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Result<Json<Value>, ApiError> {
    let outcomes = with_store(&state, &request_id, |store| store.load_all()).await?;

    let summaries: Vec<ConfigSummary> = outcomes
        .into_iter()
        .filter_map(|outcome| match outcome.result {
            Ok(config) => Some(ConfigSummary::new(&outcome.id, &config)),
            Err(e) => {
                warn!(id = %outcome.id, error = %e, "Omitting invalid configuration from listing");
                None
            }
        })
        .collect();

    Ok(Json(json!({ "success": true, "data": summaries })))
}

async fn get_config(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let config = with_store(&state, &request_id, move |store| store.get(&id)).await?;
    Ok(Json(json!({ "success": true, "data": config })))
}

async fn export_config(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let filename = format!("attachment; filename=\"{}.yaml\"", id);
    let yaml = with_store(&state, &request_id, move |store| store.export_yaml(&id)).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/yaml".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        yaml,
    )
        .into_response())
}

/// Replace a document; accepts JSON, or YAML when the content type says so
async fn put_config(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let content = std::str::from_utf8(&body).map_err(|_| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "CONFIG_INVALID",
            "Configuration body is not valid UTF-8",
            &request_id,
        )
    })?;

    let parser = DocumentParser::new();
    let origin = FsPath::new("request body");
    let raw = if is_yaml(&headers) {
        parser.parse_yaml(content, origin)
    } else {
        parser.parse_json(content, origin)
    }
    .map_err(|e| ApiError::from_store(&e, &request_id))?;

    let candidate = validate_document(&raw).map_err(|e| {
        ApiError::from_store(&LoaderError::validation_error(origin.to_path_buf(), e), &request_id)
    })?;
    if let Some(owner) = state.registry.snapshot().conflicting_id(&id, &candidate) {
        let route = format!("{} {}", candidate.endpoint.v2_method, candidate.endpoint.v2_path);
        warn!(request_id = %request_id, id = %id, owner = %owner, route = %route, "Rejected configuration with a duplicate route");
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "CONFIG_INVALID",
            format!("Invalid configuration: route {} is already served by '{}'", route, owner),
            &request_id,
        )
        .with_details(json!({ "route": route, "conflicts_with": owner })));
    }

    let stored_id = id.clone();
    let config = with_store(&state, &request_id, move |store| store.put(&stored_id, &raw)).await?;

    info!(
        request_id = %request_id,
        id = %id,
        endpoint = %format!("{} {}", config.endpoint.v2_method, config.endpoint.v2_path),
        "Configuration updated"
    );
    state.registry.upsert(&id, config);

    Ok(Json(json!({
        "success": true,
        "message": format!("Configuration '{}' saved", id),
    })))
}

async fn delete_config(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let deleted_id = id.clone();
    with_store(&state, &request_id, move |store| store.delete(&deleted_id)).await?;

    state.registry.remove(&id);
    info!(request_id = %request_id, id = %id, "Configuration deleted");

    Ok(Json(json!({
        "success": true,
        "message": format!("Configuration '{}' deleted", id),
    })))
}

fn is_yaml(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |ct| ct.contains("yaml"))
}

/// Run a blocking store operation off the async workers
async fn with_store<T, F>(state: &AppState, request_id: &RequestId, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&ConfigStore) -> LoaderResult<T> + Send + 'static,
{
    let store = Arc::clone(&state.store);
    match tokio::task::spawn_blocking(move || op(&store)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            warn!(request_id = %request_id, error = %e, "Configuration store operation failed");
            Err(ApiError::from_store(&e, request_id))
        }
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "Configuration store task failed");
            Err(ApiError::internal(request_id))
        }
    }
}
