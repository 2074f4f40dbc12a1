//! Apishim Server - HTTP surface of the V2-to-V1 adapter
//!
//! Serves one V2 route per loaded mapping document, plus:
//!
//! - `GET /health` and `GET /` for liveness and discovery
//! - `/configs` for listing, fetching, replacing and deleting documents
//!
//! Every response carries an `X-Request-ID` header; error bodies repeat it
//! as `request_id`.
//!
//! Copyright (c) 2025 Apishim Team
//! Licensed under the Apache-2.0 license

pub mod app;
pub mod config_routes;
pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod state;

pub use app::{build_router, serve, REQUEST_ID_HEADER, SERVICE_NAME};
pub use config_routes::ConfigSummary;
pub use error::{ApiError, ServerError, ServerResult};
pub use registry::{Endpoint, Registry, RouteMatch, RouteTable};
pub use state::AppState;
