//! Logging setup for the CLI
//!
//! - Structured `tracing` output in compact, full or JSON format
//! - Optional file output through a non-blocking appender
//! - Timing spans for top-level operations

use crate::config::LogSettings;
use crate::error::{Error, Result};
use is_terminal::IsTerminal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter
    pub level: String,
    pub format: LogFormat,
    /// Colorize console output when attached to a terminal
    pub console: bool,
    /// Write to this file instead of stderr
    pub file: Option<PathBuf>,
    pub thread_ids: bool,
    /// Include file and line numbers
    pub source_location: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    Compact,
    Full,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "compact" => Some(LogFormat::Compact),
            "full" => Some(LogFormat::Full),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            console: true,
            file: None,
            thread_ids: false,
            source_location: false,
        }
    }
}

impl LoggingConfig {
    /// Create logging config from verbosity level
    pub fn from_verbosity(verbosity: u8) -> Self {
        let mut config = Self::default();

        match verbosity {
            0 => config.level = "warn".to_string(),
            1 => config.level = "info".to_string(),
            2 => {
                config.level = "debug".to_string();
                config.source_location = true;
            }
            _ => {
                config.level = "trace".to_string();
                config.format = LogFormat::Full;
                config.source_location = true;
                config.thread_ids = true;
            }
        }

        config
    }

    /// Apply values from the settings file
    pub fn merge_with_settings(&mut self, settings: &LogSettings) {
        if let Some(level) = &settings.level {
            self.level = level.clone();
        }
        if let Some(format) = settings.format.as_deref().and_then(LogFormat::parse) {
            self.format = format;
        }
        if let Some(file) = &settings.file {
            self.file = Some(file.clone());
        }
    }

    /// Apply environment overrides
    pub fn merge_with_env(&mut self) {
        // RUST_LOG takes precedence
        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            self.level = rust_log;
        }

        if let Ok(format) = std::env::var("APISHIM_LOG_FORMAT") {
            match LogFormat::parse(&format) {
                Some(format) => self.format = format,
                None => eprintln!("Warning: invalid APISHIM_LOG_FORMAT '{}', using default", format),
            }
        }

        if let Ok(file) = std::env::var("APISHIM_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
    }
}

/// Initialize the global subscriber
///
/// The returned guard flushes file output on drop and must be held for the
/// life of the process.
pub fn init_logging(config: LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_new(&config.level)
        .map_err(|e| Error::config(format!("Invalid log filter '{}': {}", config.level, e)))?;

    let (writer, guard, ansi) = match &config.file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let name = path
                .file_name()
                .ok_or_else(|| Error::config(format!("Invalid log file: {}", path.display())))?;
            let appender = tracing_appender::rolling::never(dir.unwrap_or(std::path::Path::new(".")), name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard), false)
        }
        None => (
            BoxMakeWriter::new(std::io::stderr),
            None,
            config.console && std::io::stderr().is_terminal(),
        ),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(config.thread_ids)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    let installed = match config.format {
        LogFormat::Compact => builder.with_ansi(ansi).compact().try_init(),
        LogFormat::Full => builder.with_ansi(ansi).try_init(),
        // JSON should not have ANSI codes
        LogFormat::Json => builder.with_ansi(false).json().try_init(),
    };
    installed.map_err(|e| Error::config(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!(config = ?config, "Logging system initialized");
    Ok(guard)
}

/// Performance timing utilities
pub mod timing {
    use std::time::Instant;
    use tracing::Span;

    /// Logs the duration of an operation when dropped
    pub struct Timer {
        start: Instant,
        span: Span,
        operation: &'static str,
    }

    impl Timer {
        pub fn new(operation: &'static str) -> Self {
            Self {
                start: Instant::now(),
                span: tracing::info_span!("operation", operation, duration_ms = tracing::field::Empty),
                operation,
            }
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            let duration_ms = self.start.elapsed().as_millis() as u64;
            self.span.record("duration_ms", duration_ms);
            tracing::debug!(operation = self.operation, duration_ms, "Operation completed");
        }
    }
}
