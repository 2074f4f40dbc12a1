//! `validate` command

use crate::cli::ValidateArgs;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use apishim_schemas::{DocumentParser, LoaderError};
use serde_json::json;
use tracing::{debug, instrument, warn};

/// Validate every file, reporting each; fails if any file is invalid
#[instrument(skip_all, fields(files = args.files.len()))]
pub async fn handle_validate(args: ValidateArgs, output: &mut OutputWriter) -> Result<()> {
    let parser = DocumentParser::new();
    let total = args.files.len();
    let mut failed = 0;
    let mut report = Vec::with_capacity(total);

    for path in &args.files {
        if !path.exists() {
            return Err(Error::FileNotFound { path: path.clone() });
        }

        debug!(path = %path.display(), "Validating configuration");
        match parser.load_config(path) {
            Ok(config) => {
                output.success(&format!(
                    "✓ {} ({} {}, {} V1 call(s), {} field mapping(s))",
                    path.display(),
                    config.endpoint.v2_method,
                    config.endpoint.v2_path,
                    config.v1_calls.len(),
                    config.field_mappings.len()
                ))?;
                if args.detailed && output.is_human() {
                    output.data(&config)?;
                }
                report.push(json!({"file": path, "valid": true}));
            }
            Err(LoaderError::Validation { source, .. }) => {
                failed += 1;
                warn!(path = %path.display(), error = %source, "Invalid configuration");
                output.error(&format!("✗ {}", path.display()))?;
                if output.is_human() {
                    output.validation_error(&source)?;
                }
                report.push(json!({"file": path, "valid": false, "error": source}));
            }
            Err(e) if e.is_content_error() => {
                failed += 1;
                warn!(path = %path.display(), error = %e, "Unparsable configuration");
                output.error(&format!("✗ {}: {}", path.display(), e))?;
                report.push(json!({"file": path, "valid": false, "error": e.to_string()}));
            }
            Err(e) => return Err(e.into()),
        }
    }

    if !output.is_human() {
        output.data(&report)?;
    }

    if failed > 0 {
        Err(Error::ValidationFailed { failed, total })
    } else {
        Ok(())
    }
}
