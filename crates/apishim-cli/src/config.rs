//! Settings for the CLI and server
//!
//! Values are layered, later layers winning:
//! - Defaults
//! - Settings file (YAML/JSON)
//! - Environment variables
//! - Command-line flags

use crate::cli::ServeArgs;
use crate::error::{Error, Result};
use anyhow::Context;
use apishim_core::orchestrator::DEFAULT_V1_BASE_URL;
use apishim_core::OrchestratorConfig;
use apishim_server::state::DEFAULT_CORS_ORIGIN;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub v1: V1Settings,
    /// Directory holding mapping configurations
    pub configs_dir: PathBuf,
    pub logging: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Browser origins allowed by CORS; `*` allows any
    pub cors_origins: Vec<String>,
}

/// Legacy V1 API connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct V1Settings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

/// Logging overrides from the settings file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,
    /// Log format (compact, full, json)
    pub format: Option<String>,
    pub file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            v1: V1Settings::default(),
            configs_dir: PathBuf::from("configs"),
            logging: LogSettings::default(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
        }
    }
}

impl Default for V1Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_V1_BASE_URL.to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl Settings {
    /// Load settings from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );
        let settings = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        Ok(settings)
    }

    /// Load from `file` or the first default location that exists, then
    /// apply environment overrides
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut settings = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default_paths()
                .into_iter()
                .find(|p| p.is_file())
                .map(|p| {
                    tracing::debug!(path = %p.display(), "Using settings file");
                    Self::from_file(&p)
                })
                .transpose()?
                .unwrap_or_default(),
        };

        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Default settings file locations, in lookup order
    fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("apishim.yaml"), PathBuf::from("apishim.json")];

        if let Some(config_dir) = dirs::config_dir() {
            let apishim_dir = config_dir.join("apishim");
            paths.push(apishim_dir.join("config.yaml"));
            paths.push(apishim_dir.join("config.json"));
        }

        paths
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("V1_BASE_URL") {
            self.v1.base_url = url;
        }
        if let Some(dir) = lookup("CONFIG_DIR") {
            self.configs_dir = PathBuf::from(dir);
        }
        if let Some(host) = lookup("APISHIM_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("APISHIM_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::config(format!("APISHIM_PORT is not a valid port: {}", port)))?;
        }
        if let Some(origins) = lookup("APISHIM_CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(secs) = lookup("APISHIM_V1_TIMEOUT_SECS") {
            self.v1.timeout_secs = secs.parse().map_err(|_| {
                Error::config(format!("APISHIM_V1_TIMEOUT_SECS is not a number: {}", secs))
            })?;
        }
        Ok(())
    }

    /// Apply `serve` flags
    pub fn apply_serve_args(&mut self, args: &ServeArgs) {
        if let Some(host) = &args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(url) = &args.v1_base_url {
            self.v1.base_url = url.clone();
        }
        if let Some(dir) = &args.configs_dir {
            self.configs_dir = dir.clone();
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.server.host.parse().map_err(|_| {
            Error::config(format!("Invalid server host '{}': expected an IP address", self.server.host))
        })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig::new(self.v1.base_url.clone())
            .with_timeout(Duration::from_secs(self.v1.timeout_secs))
            .with_connect_timeout(Duration::from_secs(self.v1.connect_timeout_secs))
    }
}
