//! Stub V1 server for integration tests
//!
//! A real axum server on an ephemeral port that answers configured paths
//! with canned JSON and records every request it receives.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Clone, Debug)]
pub struct StubRoute {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl StubRoute {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone, Default)]
struct StubState {
    routes: Arc<Mutex<HashMap<String, StubRoute>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct V1Stub {
    base_url: String,
    state: StubState,
    server: JoinHandle<()>,
}

impl V1Stub {
    pub async fn start() -> Self {
        let state = StubState::default();
        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            server,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn route(&self, path: &str, route: StubRoute) -> &Self {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert(path.to_string(), route);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path == path).count()
    }
}

impl Drop for V1Stub {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(State(state): State<StubState>, method: Method, uri: Uri, body: Bytes) -> Response {
    let path = uri.path().to_string();
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        body: serde_json::from_slice(&body).ok(),
    });

    let route = state.routes.lock().unwrap().get(&path).cloned();
    match route {
        Some(route) => {
            if !route.delay.is_zero() {
                tokio::time::sleep(route.delay).await;
            }
            let status = StatusCode::from_u16(route.status).unwrap();
            (status, [(header::CONTENT_TYPE, "application/json")], route.body).into_response()
        }
        None => (StatusCode::NOT_FOUND, "no stub route").into_response(),
    }
}
