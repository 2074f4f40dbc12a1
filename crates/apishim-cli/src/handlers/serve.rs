//! `serve` command

use crate::cli::ServeArgs;
use crate::config::Settings;
use crate::error::Result;
use crate::output::OutputWriter;
use apishim_schemas::ConfigStore;
use apishim_server::AppState;
use tracing::{info, instrument};

#[instrument(skip_all)]
pub async fn handle_serve(
    args: ServeArgs,
    mut settings: Settings,
    output: &mut OutputWriter,
) -> Result<()> {
    settings.apply_serve_args(&args);
    let addr = settings.bind_addr()?;

    info!(
        configs_dir = %settings.configs_dir.display(),
        v1_base_url = %settings.v1.base_url,
        "Starting Apishim"
    );

    let store = ConfigStore::open(&settings.configs_dir)?;
    let state = AppState::load(store, settings.orchestrator_config())?
        .with_cors_origins(settings.server.cors_origins.clone());

    output.info(&format!(
        "Serving {} endpoint(s) on http://{} (V1: {})",
        state.registry.snapshot().len(),
        addr,
        settings.v1.base_url
    ))?;

    apishim_server::serve(addr, state).await?;
    output.info("Server stopped")?;
    Ok(())
}
