//! `configs` command: inspect and manage the configuration directory

use crate::cli::{ConfigsAction, ConfigsArgs};
use crate::config::Settings;
use crate::error::Result;
use crate::output::OutputWriter;
use apishim_schemas::ConfigStore;
use apishim_server::ConfigSummary;
use tracing::instrument;

#[instrument(skip_all, fields(action = ?args.action))]
pub async fn handle_configs(
    args: ConfigsArgs,
    settings: &Settings,
    output: &mut OutputWriter,
) -> Result<()> {
    let dir = args.configs_dir.as_ref().unwrap_or(&settings.configs_dir);
    let store = ConfigStore::open(dir)?;

    match args.action {
        ConfigsAction::List => list(&store, output),
        ConfigsAction::Show { id } => {
            let config = store.get(&id)?;
            if output.is_human() {
                output.writeln(store.export_yaml(&id)?.trim_end())
            } else {
                output.data(&config)
            }
        }
        ConfigsAction::Delete { id } => {
            store.delete(&id)?;
            output.success(&format!("Deleted configuration '{}'", id))
        }
    }
}

fn list(store: &ConfigStore, output: &mut OutputWriter) -> Result<()> {
    let mut summaries = Vec::new();
    let mut broken = Vec::new();

    for outcome in store.load_all()? {
        match outcome.result {
            Ok(config) => summaries.push(ConfigSummary::new(&outcome.id, &config)),
            Err(e) => broken.push((outcome.id, e)),
        }
    }

    if !output.is_human() {
        return output.data(&summaries);
    }

    output.section(&format!("Configurations in {}", store.dir().display()))?;
    if summaries.is_empty() {
        output.info("No configurations found")?;
    }
    for summary in &summaries {
        let confidence = summary
            .confidence_score
            .map(|c| format!("{:.0}%", c * 100.0))
            .unwrap_or_else(|| "-".to_string());
        output.writeln(&format!(
            "  {:<24} {:<40} mappings {}/{} approved  confidence {}{}",
            summary.id,
            summary.endpoint,
            summary.approved_mappings,
            summary.total_mappings,
            confidence,
            if summary.has_ambiguous { "  (ambiguous)" } else { "" }
        ))?;
    }
    for (id, error) in &broken {
        output.error(&format!("  {}: {}", id, error))?;
    }
    Ok(())
}
