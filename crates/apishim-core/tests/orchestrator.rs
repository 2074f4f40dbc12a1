//! Orchestrator tests against a live stub V1 server

mod common;

use apishim_core::{
    OrchestratorConfig, RequestId, ResponseBuilder, V1Orchestrator, V2Params,
};
use apishim_schemas::{validate_document, MappingConfig};
use common::{StubRoute, V1Stub};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::Duration;

fn params(value: Value) -> V2Params {
    match value {
        Value::Object(map) => map,
        _ => panic!("params must be an object"),
    }
}

fn orchestrator(stub: &V1Stub) -> V1Orchestrator {
    V1Orchestrator::new(OrchestratorConfig::new(format!("{}/", stub.base_url()))).unwrap()
}

fn two_call_config() -> MappingConfig {
    validate_document(&json!({
        "endpoint": {"v2_path": "/api/v2/policies/{policyId}", "v2_method": "GET"},
        "v1_calls": [
            {
                "name": "get_policy",
                "endpoint": "/api/v1/policy/{id}",
                "params": {"path": [{"v2_param": "policyId", "v1_param": "id", "location": "path"}]}
            },
            {
                "name": "get_customer",
                "endpoint": "/api/v1/customer",
                "params": {"query": [{"v2_param": "policyId", "v1_param": "policy_id", "location": "path"}]}
            }
        ],
        "field_mappings": [
            {"v2_path": "policyNumber", "source": "get_policy", "v1_path": "policy_num"},
            {"v2_path": "insured.name", "source": "get_customer",
             "transform": "{{ get_customer.first_name }} {{ get_customer.last_name }}"}
        ]
    }))
    .unwrap()
}

#[tokio::test]
async fn test_sequential_calls_collect_responses() {
    let stub = V1Stub::start().await;
    stub.route("/api/v1/policy/POL123", StubRoute::json(200, json!({"policy_num": "POL123"})))
        .route(
            "/api/v1/customer",
            StubRoute::json(200, json!({"first_name": "Jane", "last_name": "Smith"})),
        );

    let config = two_call_config();
    let responses = orchestrator(&stub)
        .orchestrate(&config, &params(json!({"policyId": "POL123"})))
        .await
        .unwrap();

    assert_eq!(responses.len(), 2);
    assert_eq!(responses["get_policy"], json!({"policy_num": "POL123"}));

    let requests = stub.requests();
    assert_eq!(requests[0].path, "/api/v1/policy/POL123");
    assert_eq!(requests[1].path, "/api/v1/customer");
    assert_eq!(requests[1].query.as_deref(), Some("policy_id=POL123"));

    let document = ResponseBuilder::new().build(&config, &responses).unwrap();
    assert_eq!(
        document,
        json!({"policyNumber": "POL123", "insured": {"name": "Jane Smith"}})
    );
}

#[tokio::test]
async fn test_fail_fast_on_server_error() {
    let stub = V1Stub::start().await;
    stub.route("/api/v1/policy/POL123", StubRoute::raw(500, "boom"))
        .route("/api/v1/customer", StubRoute::json(200, json!({})));

    let err = orchestrator(&stub)
        .orchestrate(&two_call_config(), &params(json!({"policyId": "POL123"})))
        .await
        .unwrap_err();

    assert_eq!(err.status, 502);
    assert_eq!(err.details, Some(json!({"v1_status": 500, "v1_response": "boom"})));
    assert_eq!(stub.hits("/api/v1/policy/POL123"), 1);
    assert_eq!(stub.hits("/api/v1/customer"), 0);
}

#[tokio::test]
async fn test_status_mapping() {
    let stub = V1Stub::start().await;
    let config = two_call_config();
    let orchestrator = orchestrator(&stub);
    let p = params(json!({"policyId": "POL123"}));

    for (v1_status, expected) in [(404u16, 404u16), (503, 502), (400, 400), (409, 409), (422, 422)] {
        stub.route("/api/v1/policy/POL123", StubRoute::raw(v1_status, "{}"));
        let err = orchestrator.orchestrate(&config, &p).await.unwrap_err();
        assert_eq!(err.status, expected, "V1 status {}", v1_status);
        assert_eq!(err.error_code(), format!("V1_ERROR_{}", expected));
    }
}

#[tokio::test]
async fn test_timeout_maps_to_504() {
    let stub = V1Stub::start().await;
    stub.route(
        "/api/v1/policy/POL123",
        StubRoute::json(200, json!({})).delayed(Duration::from_millis(500)),
    );

    let orchestrator = V1Orchestrator::new(
        OrchestratorConfig::new(stub.base_url()).with_timeout(Duration::from_millis(50)),
    )
    .unwrap();
    let err = orchestrator
        .orchestrate(&two_call_config(), &params(json!({"policyId": "POL123"})))
        .await
        .unwrap_err();

    assert_eq!(err.status, 504);
    assert_eq!(stub.hits("/api/v1/customer"), 0);
}

#[tokio::test]
async fn test_network_error_maps_to_502() {
    // Bind then drop a listener so the port is closed.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let orchestrator =
        V1Orchestrator::new(OrchestratorConfig::new(format!("http://127.0.0.1:{}", port))).unwrap();

    let err = orchestrator
        .orchestrate(&two_call_config(), &params(json!({"policyId": "POL123"})))
        .await
        .unwrap_err();

    assert_eq!(err.status, 502);
    assert!(err.details.unwrap().get("error").is_some());
}

#[tokio::test]
async fn test_missing_path_param_never_calls_v1() {
    let stub = V1Stub::start().await;

    let err = orchestrator(&stub)
        .orchestrate(&two_call_config(), &V2Params::new())
        .await
        .unwrap_err();

    assert_eq!(err.status, 400);
    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn test_non_json_success_body() {
    let stub = V1Stub::start().await;
    stub.route("/api/v1/policy/POL123", StubRoute::raw(200, "<html>"));

    let err = orchestrator(&stub)
        .orchestrate(&two_call_config(), &params(json!({"policyId": "POL123"})))
        .await
        .unwrap_err();
    assert_eq!(err.status, 502);
}

#[tokio::test]
async fn test_body_params_sent_as_json() {
    let stub = V1Stub::start().await;
    stub.route("/api/v1/claims", StubRoute::json(201, json!({"claim_id": "C-9"})));

    let config = validate_document(&json!({
        "endpoint": {"v2_path": "/api/v2/claims", "v2_method": "POST"},
        "v1_calls": [{
            "name": "create_claim",
            "endpoint": "/api/v1/claims",
            "method": "post",
            "params": {"body": [
                {"v2_param": "amount", "v1_param": "claim_amount", "location": "body"},
                {"v2_param": "policyId", "v1_param": "policy", "location": "query"}
            ]}
        }],
        "field_mappings": [{"v2_path": "claimId", "source": "create_claim", "v1_path": "claim_id"}]
    }))
    .unwrap();

    let request_id = RequestId::new();
    let responses = orchestrator(&stub)
        .orchestrate_with_request_id(
            &config,
            &params(json!({"amount": 250, "policyId": "POL1"})),
            &request_id,
        )
        .await
        .unwrap();

    assert_eq!(responses["create_claim"]["claim_id"], "C-9");
    let recorded = &stub.requests()[0];
    assert_eq!(recorded.method, "POST");
    assert_eq!(recorded.body, Some(json!({"claim_amount": 250, "policy": "POL1"})));
}
