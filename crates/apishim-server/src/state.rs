//! Shared application state

use crate::error::ServerResult;
use crate::registry::{Registry, RouteTable};
use apishim_core::{OrchestratorConfig, ResponseBuilder, V1Orchestrator};
use apishim_schemas::ConfigStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Largest inbound body the dispatcher will read
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Browser origin of the config review UI
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Process-wide context handed to every handler
///
/// Built once at startup; the route table inside `registry` is the only part
/// that changes afterwards.
#[derive(Debug, Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub orchestrator: V1Orchestrator,
    pub builder: ResponseBuilder,
    pub store: Arc<ConfigStore>,
    pub body_limit: usize,
    /// Origins allowed to call the API from a browser; `*` allows any
    pub cors_origins: Vec<String>,
}

impl AppState {
    pub fn new(store: ConfigStore, registry: Registry, orchestrator: V1Orchestrator) -> Self {
        Self {
            registry: Arc::new(registry),
            orchestrator,
            builder: ResponseBuilder::new(),
            store: Arc::new(store),
            body_limit: DEFAULT_BODY_LIMIT,
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
        }
    }

    /// Load every document from `store` and set up the V1 client
    ///
    /// Broken documents are logged and skipped; they never prevent startup.
    pub fn load(store: ConfigStore, v1: OrchestratorConfig) -> ServerResult<Self> {
        let orchestrator = V1Orchestrator::new(v1)?;
        let (table, failed) = RouteTable::from_store(&store)?;

        for (id, error) in &failed {
            warn!(id = %id, error = %error, "Configuration not loaded");
        }
        info!(
            configs_dir = %store.dir().display(),
            endpoints_loaded = table.len(),
            failed = failed.len(),
            "Loaded endpoint configurations"
        );

        Ok(Self::new(store, Registry::new(table), orchestrator))
    }

    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }
}
