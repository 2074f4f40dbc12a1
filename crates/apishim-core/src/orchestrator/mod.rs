//! V1 orchestration
//!
//! Executes the V1 calls of one mapping document strictly in declaration
//! order, stopping at the first failure. A single `reqwest::Client` (and its
//! connection pool) is shared by all concurrent requests.
//!
//! Copyright (c) 2025 Apishim Team
//! Licensed under the Apache-2.0 license

pub mod builder;
pub mod config;
pub mod error;

pub use builder::{build_body, build_query_params, build_v1_url};
pub use config::{OrchestratorConfig, DEFAULT_V1_BASE_URL};
pub use error::V1OrchestratorError;

use crate::error::{Error, Result};
use crate::redaction::redact_pairs;
use crate::types::{RequestId, V1Responses, V2Params};
use apishim_schemas::{HttpMethod, MappingConfig, V1ApiCall};
use reqwest::{Client, Method, StatusCode};
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::{error, info, info_span, Instrument};

/// Executes V1 calls for mapping documents
#[derive(Debug, Clone)]
pub struct V1Orchestrator {
    client: Client,
    config: OrchestratorConfig,
}

impl V1Orchestrator {
    /// Validate `config` and build the shared HTTP client
    pub fn new(config: OrchestratorConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| Error::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(anyhow::Error::new(e)),
            })?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run every V1 call of `mapping` under a fresh correlation id
    pub async fn orchestrate(
        &self,
        mapping: &MappingConfig,
        params: &V2Params,
    ) -> std::result::Result<V1Responses, V1OrchestratorError> {
        self.orchestrate_with_request_id(mapping, params, &RequestId::new())
            .await
    }

    /// Run every V1 call of `mapping` under the caller's correlation id
    ///
    /// Calls run one after another; the first error is returned unchanged and
    /// later calls are never started.
    pub async fn orchestrate_with_request_id(
        &self,
        mapping: &MappingConfig,
        params: &V2Params,
        request_id: &RequestId,
    ) -> std::result::Result<V1Responses, V1OrchestratorError> {
        info!(
            request_id = %request_id,
            endpoint = %format!("{} {}", mapping.endpoint.v2_method, mapping.endpoint.v2_path),
            v1_call_count = mapping.v1_calls.len(),
            "Orchestrating V1 calls"
        );

        let mut responses = V1Responses::new();
        for call in &mapping.v1_calls {
            let body = self.execute_v1_call(call, params, request_id).await?;
            responses.insert(call.name.clone(), body);
        }

        info!(
            request_id = %request_id,
            v1_calls_completed = responses.len(),
            "All V1 calls successful"
        );
        Ok(responses)
    }

    /// Execute a single V1 call and decode its JSON body
    pub async fn execute_v1_call(
        &self,
        call: &V1ApiCall,
        params: &V2Params,
        request_id: &RequestId,
    ) -> std::result::Result<Value, V1OrchestratorError> {
        let url = build_v1_url(self.config.normalized_base_url(), call, params)?;
        let query = build_query_params(call, params);
        let body = build_body(call, params);

        let span = info_span!(
            "v1_call",
            request_id = %request_id,
            v1_call = %call.name,
            method = %call.method,
            url = %url,
        );
        self.send(call, &url, &query, body.as_ref())
            .instrument(span)
            .await
    }

    async fn send(
        &self,
        call: &V1ApiCall,
        url: &str,
        query: &[(String, String)],
        body: Option<&Map<String, Value>>,
    ) -> std::result::Result<Value, V1OrchestratorError> {
        info!(query = %redact_pairs(query), "Executing V1 call");
        let started = Instant::now();

        let mut request = self
            .client
            .request(to_reqwest_method(call.method), url)
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let bytes = response.bytes().await?;
            Ok::<(StatusCode, _), reqwest::Error>((status, bytes))
        };
        let outcome = tokio::time::timeout(self.config.timeout, exchange).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let (status, bytes) = match outcome {
            Err(_) => {
                error!(elapsed_ms, "V1 call timeout");
                return Err(V1OrchestratorError::timeout(&call.name));
            }
            Ok(Err(e)) if e.is_timeout() => {
                error!(elapsed_ms, error = %e, "V1 call timeout");
                return Err(V1OrchestratorError::timeout(&call.name));
            }
            Ok(Err(e)) => {
                error!(elapsed_ms, error = %e, "V1 call network error");
                return Err(V1OrchestratorError::network(&call.name, &e));
            }
            Ok(Ok(exchange)) => exchange,
        };

        let text = String::from_utf8_lossy(&bytes).into_owned();
        if let Some(err) = V1OrchestratorError::from_status(&call.name, status.as_u16(), text) {
            error!(status = status.as_u16(), elapsed_ms, "V1 call failed");
            return Err(err);
        }

        let data: Value = serde_json::from_slice(&bytes).map_err(|e| {
            error!(status = status.as_u16(), elapsed_ms, error = %e, "V1 response is not JSON");
            V1OrchestratorError::invalid_body(&call.name, &e)
        })?;

        info!(status = status.as_u16(), elapsed_ms, "V1 call successful");
        Ok(data)
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Patch => Method::PATCH,
    }
}
