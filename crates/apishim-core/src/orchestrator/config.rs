//! Orchestrator settings: V1 base URL and timeouts

use crate::error::{Error, Result};
use std::time::Duration;

/// Base URL used when none is configured
pub const DEFAULT_V1_BASE_URL: &str = "http://localhost:8001";

/// Connection settings for the V1 system
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Absolute http(s) URL every call endpoint is appended to
    pub base_url: String,
    /// Upper bound for one V1 call, connect to last body byte
    pub timeout: Duration,
    /// Time allowed to establish a connection
    pub connect_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_V1_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl OrchestratorConfig {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Base URL without trailing slashes
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(Error::configuration("V1 timeout cannot be zero"));
        }
        if self.connect_timeout.is_zero() {
            return Err(Error::configuration("V1 connect timeout cannot be zero"));
        }

        let url = url::Url::parse(&self.base_url).map_err(|e| Error::Configuration {
            message: format!("Invalid V1 base URL '{}'", self.base_url),
            source: Some(anyhow::Error::new(e)),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::configuration(format!(
                "V1 base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if url.query().is_some() {
            return Err(Error::configuration("V1 base URL must not carry a query string"));
        }
        Ok(())
    }
}
