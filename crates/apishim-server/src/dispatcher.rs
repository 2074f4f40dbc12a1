//! V2 request dispatch
//!
//! Every request that is not a built-in route lands here. The path is
//! resolved against the current route table, parameters are merged, and the
//! matched document drives the orchestrator and response builder.

use crate::error::ApiError;
use crate::registry::RouteMatch;
use crate::state::AppState;
use apishim_core::redaction::redact_json_value;
use apishim_core::{RequestId, V2Params};
use apishim_schemas::HttpMethod;
use axum::{
    body::{to_bytes, Bytes},
    extract::{Request, State},
    Extension, Json,
};
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, error, info, warn};

/// Fallback handler serving all configured V2 endpoints
pub async fn dispatch(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    request: Request,
) -> Result<Json<Value>, ApiError> {
    let method_name = request.method().as_str().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);

    let table = state.registry.snapshot();
    let matched = HttpMethod::from_str(&method_name)
        .ok()
        .and_then(|method| table.match_route(method, &path).map(|m| (method, m)));
    let Some((method, RouteMatch { endpoint, raw_params })) = matched else {
        debug!(request_id = %request_id, method = %method_name, path = %path, "No route");
        return Err(ApiError::route_not_found(&method_name, &path, &request_id));
    };

    info!(
        request_id = %request_id,
        config_id = %endpoint.id,
        endpoint = %format!("{} {}", method, endpoint.path()),
        "Handling V2 request"
    );

    let body = if method.accepts_body() {
        let bytes = to_bytes(request.into_body(), state.body_limit)
            .await
            .map_err(|e| {
                warn!(request_id = %request_id, error = %e, "Failed to read request body");
                ApiError::invalid_request("Failed to read request body", &request_id)
            })?;
        Some(bytes)
    } else {
        None
    };

    let params = extract_params(&raw_params, query.as_deref(), body.as_ref())
        .map_err(|reason| {
            warn!(request_id = %request_id, reason = %reason, "Invalid request parameters");
            ApiError::invalid_request(reason, &request_id)
        })?;

    let mut logged = Value::Object(params.clone());
    redact_json_value(&mut logged);
    debug!(request_id = %request_id, params = %logged, "Merged V2 parameters");

    let responses = state
        .orchestrator
        .orchestrate_with_request_id(&endpoint.config, &params, &request_id)
        .await
        .map_err(|e| {
            warn!(
                request_id = %request_id,
                status = e.status,
                error = %e,
                "V1 orchestration failed"
            );
            ApiError::from_v1(e, &request_id)
        })?;

    let document = state
        .builder
        .build(&endpoint.config, &responses)
        .map_err(|e| {
            error!(request_id = %request_id, error = %e, "Response transformation failed");
            ApiError::transformation(&e, &request_id)
        })?;

    info!(request_id = %request_id, config_id = %endpoint.id, "V2 request completed");
    Ok(Json(document))
}

/// Merge path, query and body parameters; later sources win
///
/// `raw_path` values are percent-decoded. A body that is not JSON counts as
/// absent; JSON that is not an object is rejected.
pub fn extract_params(
    raw_path: &[(String, String)],
    query: Option<&str>,
    body: Option<&Bytes>,
) -> Result<V2Params, String> {
    let mut params = V2Params::new();

    for (name, raw) in raw_path {
        let decoded = urlencoding::decode(raw)
            .map_err(|_| format!("Path parameter '{}' is not valid UTF-8", name))?;
        params.insert(name.clone(), Value::String(decoded.into_owned()));
    }

    if let Some(query) = query {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params.insert(key.into_owned(), Value::String(value.into_owned()));
        }
    }

    if let Some(bytes) = body.filter(|b| !b.is_empty()) {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(fields)) => params.extend(fields),
            Ok(Value::Null) => {}
            Ok(_) => return Err("Request body must be a JSON object".to_string()),
            Err(e) => debug!(error = %e, "Ignoring non-JSON request body"),
        }
    }

    Ok(params)
}
