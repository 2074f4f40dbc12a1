//! Router assembly and server entry point

use crate::config_routes;
use crate::dispatcher::dispatch;
use crate::error::{ApiError, ServerError, ServerResult};
use crate::state::AppState;
use apishim_core::RequestId;
use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

pub const SERVICE_NAME: &str = "apishim";

/// Correlation header set on every response
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Marks a response produced for a caught panic
#[derive(Debug, Clone, Copy)]
struct Panicked;

/// Build the full application router
///
/// Built-in routes take precedence; everything else is dispatched against
/// the configured V2 endpoints.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origins);

    Router::new()
        .route("/health", get(health))
        .route("/", get(root))
        .merge(config_routes::router())
        .fallback(dispatch)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn(assign_request_id))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy for the review UI
///
/// `*` opens the API to any origin without credentials. An explicit list
/// mirrors the requested methods and headers and allows credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Bind `addr` and serve until Ctrl-C
pub async fn serve(addr: SocketAddr, state: AppState) -> ServerResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let local = listener.local_addr().unwrap_or(addr);

    info!(
        addr = %local,
        endpoints_loaded = state.registry.snapshot().len(),
        v1_base_url = %state.orchestrator.config().normalized_base_url(),
        "Apishim listening"
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Attach a fresh request id to the request and echo it on the response
async fn assign_request_id(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::new();
    request.extensions_mut().insert(request_id.clone());

    let mut response = next.run(request).await;
    if response.extensions().get::<Panicked>().is_some() {
        error!(request_id = %request_id, "Handler panicked");
        response = ApiError::internal(&request_id).into_response();
    }

    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn panic_response(_payload: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let mut response = axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response();
    response.extensions_mut().insert(Panicked);
    response
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints_loaded": state.registry.snapshot().len(),
    }))
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    let table = state.registry.snapshot();
    let endpoints: Vec<Value> = table
        .endpoints()
        .map(|e| json!({ "id": e.id, "path": e.path(), "method": e.method() }))
        .collect();

    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": endpoints,
    }))
}
