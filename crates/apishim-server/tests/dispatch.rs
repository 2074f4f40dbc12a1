//! End-to-end dispatch through the router against a stub V1 server

mod common;

use axum::http::StatusCode;
use common::{StubRoute, TestApp, CLAIMS_JSON, POLICY_YAML};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;

async fn policy_app() -> TestApp {
    let app = TestApp::start(&[("policy.yaml", POLICY_YAML)]).await;
    app.stub
        .route(
            "/api/v1/policy/POL123",
            StubRoute::json(200, json!({"policy_num": "POL123", "policy_status": "active"})),
        )
        .route(
            "/api/v1/customer",
            StubRoute::json(200, json!({"first_name": "Jane", "last_name": "Smith"})),
        );
    app
}

#[tokio::test]
async fn test_policy_document_is_assembled() {
    let app = policy_app().await;

    let response = app.get("/api/v2/policies/POL123").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.request_id.is_some());
    assert_eq!(
        response.json(),
        json!({
            "policyNumber": "POL123",
            "status": "active",
            "insured": {"name": "Jane Smith"},
            "legacyFlag": null
        })
    );

    let requests = app.stub.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].path, "/api/v1/policy/POL123");
    assert_eq!(requests[1].query.as_deref(), Some("policy_id=POL123"));
}

#[tokio::test]
async fn test_request_ids_are_unique() {
    let app = policy_app().await;
    let first = app.get("/api/v2/policies/POL123").await;
    let second = app.get("/health").await;
    assert_ne!(first.request_id, second.request_id);
}

#[tokio::test]
async fn test_undefined_variable_fails_the_request() {
    let config = POLICY_YAML.replace(
        "{{ get_customer.first_name }} {{ get_customer.last_name }}",
        "{{ get_customer.middle_name }}",
    );
    let app = TestApp::start(&[("policy.yaml", config.as_str())]).await;
    app.stub
        .route("/api/v1/policy/POL123", StubRoute::json(200, json!({"policy_num": "POL123"})))
        .route("/api/v1/customer", StubRoute::json(200, json!({"first_name": "Jane"})));

    let response = app.get("/api/v2/policies/POL123").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);

    let body = response.json();
    assert_eq!(body["code"], "TRANSFORMATION_ERROR");
    assert_eq!(body["error"], "Failed to transform response");
    assert_eq!(body["request_id"].as_str(), response.request_id.as_deref());
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_v1_not_found() {
    let app = TestApp::start(&[("policy.yaml", POLICY_YAML)]).await;
    app.stub.route(
        "/api/v1/policy/NOPE",
        StubRoute::json(404, json!({"detail": "no such policy"})),
    );

    let response = app.get("/api/v2/policies/NOPE").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let body = response.json();
    assert_eq!(body["code"], "V1_ERROR_404");
    assert_eq!(body["error"], "Resource not found in legacy system");
    assert!(body["details"]["v1_response"]
        .as_str()
        .unwrap()
        .contains("no such policy"));
    // fail-fast: the customer call never ran
    assert_eq!(app.stub.hits("/api/v1/customer"), 0);
}

#[tokio::test]
async fn test_v1_server_error_maps_to_bad_gateway() {
    let app = TestApp::start(&[("policy.yaml", POLICY_YAML)]).await;
    app.stub
        .route("/api/v1/policy/POL123", StubRoute::json(200, json!({"policy_num": "POL123"})))
        .route("/api/v1/customer", StubRoute::raw(500, "boom"));

    let response = app.get("/api/v2/policies/POL123").await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);

    let body = response.json();
    assert_eq!(body["code"], "V1_ERROR_502");
    assert_eq!(body["error"], "Legacy system error");
    assert_eq!(body["details"]["v1_status"], 500);
}

#[tokio::test]
async fn test_v1_timeout_maps_to_gateway_timeout() {
    let app = TestApp::start_with_timeout(&[("policy.yaml", POLICY_YAML)], Duration::from_millis(200))
        .await;
    app.stub.route(
        "/api/v1/policy/SLOW",
        StubRoute::json(200, json!({})).delayed(Duration::from_secs(2)),
    );

    let response = app.get("/api/v2/policies/SLOW").await;
    assert_eq!(response.status, StatusCode::GATEWAY_TIMEOUT);

    let body = response.json();
    assert_eq!(body["code"], "V1_ERROR_504");
    assert_eq!(body["error"], "Legacy system timeout");
    assert!(body["details"].is_object());
}

#[tokio::test]
async fn test_unknown_route() {
    let app = policy_app().await;

    for (method, uri) in [
        ("GET", "/api/v2/unknown"),
        ("DELETE", "/api/v2/policies/POL123"),
        ("GET", "/api/v2/policies/POL123/extra"),
    ] {
        let response = app.send_body(method, uri, "application/json", "").await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{} {}", method, uri);
        assert_eq!(response.json()["code"], "NOT_FOUND");
        assert!(response.request_id.is_some());
    }
    assert!(app.stub.requests().is_empty());
}

#[tokio::test]
async fn test_body_and_query_params_reach_v1() {
    let app = TestApp::start(&[("claims.json", CLAIMS_JSON)]).await;
    app.stub.route(
        "/api/v1/claims",
        StubRoute::json(201, json!({"claim": {"id": "CLM-9"}})),
    );

    let response = app
        .send_body(
            "POST",
            "/api/v2/claims?channel=web",
            "application/json",
            r#"{"policyId": "POL123", "amount": 250, "note": "ignored"}"#,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({"claimId": "CLM-9"}));

    let requests = app.stub.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].query.as_deref(), Some("src=web"));
    assert_eq!(
        requests[0].body,
        Some(json!({"policy_id": "POL123", "claim_amount": 250}))
    );
}

#[tokio::test]
async fn test_non_object_body_is_rejected() {
    let app = TestApp::start(&[("claims.json", CLAIMS_JSON)]).await;

    let response = app
        .send_body("POST", "/api/v2/claims", "application/json", "[1, 2, 3]")
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["code"], "INVALID_REQUEST");
    assert!(app.stub.requests().is_empty());
}

#[tokio::test]
async fn test_non_json_body_counts_as_absent() {
    let app = TestApp::start(&[("claims.json", CLAIMS_JSON)]).await;
    app.stub.route(
        "/api/v1/claims",
        StubRoute::json(200, json!({"claim": {"id": "CLM-1"}})),
    );

    let response = app
        .send_body("POST", "/api/v2/claims", "text/plain", "hello")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    // the body group is declared, so an empty JSON object is still sent
    assert_eq!(app.stub.requests()[0].body, Some(json!({})));
}

#[tokio::test]
async fn test_health_and_index() {
    let app = TestApp::start(&[
        ("policy.yaml", POLICY_YAML),
        ("claims.json", CLAIMS_JSON),
        ("broken.yaml", "endpoint: [unclosed"),
    ])
    .await;

    let health = app.get("/health").await.json();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["service"], "apishim");
    assert_eq!(health["endpoints_loaded"], 2);

    let index = app.get("/").await.json();
    assert_eq!(
        index["endpoints"],
        json!([
            {"id": "claims", "path": "/api/v2/claims", "method": "POST"},
            {"id": "policy", "path": "/api/v2/policies/{policyId}", "method": "GET"}
        ])
    );
}
