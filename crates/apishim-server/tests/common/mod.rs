//! Shared fixtures for server tests

#![allow(dead_code)]

#[path = "../../../apishim-core/tests/common/mod.rs"]
mod stub;

pub use stub::{RecordedRequest, StubRoute, V1Stub};

use apishim_core::OrchestratorConfig;
use apishim_schemas::ConfigStore;
use apishim_server::{build_router, AppState};
use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

pub const POLICY_YAML: &str = r#"
version: "1.0"
endpoint:
  v2_path: /api/v2/policies/{policyId}
  v2_method: GET
v1_calls:
  - name: get_policy
    endpoint: /api/v1/policy/{id}
    method: GET
    params:
      path:
        - v2_param: policyId
          v1_param: id
          location: path
  - name: get_customer
    endpoint: /api/v1/customer
    method: GET
    params:
      query:
        - v2_param: policyId
          v1_param: policy_id
          location: path
field_mappings:
  - v2_path: policyNumber
    source: get_policy
    v1_path: policy_num
    approved: true
  - v2_path: status
    source: get_policy
    v1_path: policy_status
  - v2_path: insured.name
    source: get_customer
    transform: "{{ get_customer.first_name }} {{ get_customer.last_name }}"
  - v2_path: legacyFlag
    source: stub
    stub_value: null
    stub_type: "null"
metadata:
  generated_at: "2025-01-15T10:30:00Z"
  confidence_score: 0.85
"#;

pub const CLAIMS_JSON: &str = r#"{
  "endpoint": {"v2_path": "/api/v2/claims", "v2_method": "POST"},
  "v1_calls": [{
    "name": "create_claim",
    "endpoint": "/api/v1/claims",
    "method": "POST",
    "params": {
      "query": [{"v2_param": "channel", "v1_param": "src", "location": "query"}],
      "body": [
        {"v2_param": "policyId", "v1_param": "policy_id", "location": "body"},
        {"v2_param": "amount", "v1_param": "claim_amount", "location": "body"}
      ]
    }
  }],
  "field_mappings": [
    {"v2_path": "claimId", "source": "create_claim", "v1_path": "claim.id"}
  ]
}"#;

/// A running adapter wired to a stub V1 server
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub stub: V1Stub,
    pub dir: TempDir,
}

impl TestApp {
    /// Start with the given `(file name, content)` documents on disk
    pub async fn start(files: &[(&str, &str)]) -> Self {
        Self::start_with_timeout(files, Duration::from_secs(5)).await
    }

    pub async fn start_with_timeout(files: &[(&str, &str)], timeout: Duration) -> Self {
        let stub = V1Stub::start().await;
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }

        let store = ConfigStore::open(dir.path()).unwrap();
        let v1 = OrchestratorConfig::new(stub.base_url()).with_timeout(timeout);
        let state = AppState::load(store, v1).unwrap();

        Self {
            router: build_router(state.clone()),
            state,
            stub,
            dir,
        }
    }

    pub fn config_dir(&self) -> &Path {
        self.dir.path()
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            request_id,
            content_type,
            headers,
            text: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Request::delete(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn send_body(
        &self,
        method: &str,
        uri: &str,
        content_type: &str,
        body: &str,
    ) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub request_id: Option<String>,
    pub content_type: Option<String>,
    pub headers: HeaderMap,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).unwrap()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
