use std::path::PathBuf;

use assert_matches::assert_matches;
use reqwest::Method;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_api::ApiClient;
use shared_config::AppConfig;
use shared_models::{ApiError, AuthErrorKind};

fn test_config(base_url: &str) -> AppConfig {
    AppConfig {
        api_base_url: base_url.to_string(),
        socket_url: "ws://localhost:5000".to_string(),
        session_file: PathBuf::from("session.json"),
        poll_interval_seconds: 30,
        request_timeout_seconds: 5,
    }
}

#[tokio::test]
async fn attaches_bearer_token_and_decodes_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dokter/getbyid/d-1"))
        .and(header("Authorization", "Bearer token-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "d-1",
            "nama": "dr. Test"
        })))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&test_config(&mock_server.uri()));
    let result: Value = client
        .request(Method::GET, "/dokter/getbyid/d-1", Some("token-abc"), None)
        .await
        .unwrap();

    assert_eq!(result["nama"], "dr. Test");
}

#[tokio::test]
async fn unauthorized_response_maps_to_auth_error_and_notifies() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jadwal/getall"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&test_config(&mock_server.uri()));
    let mut unauthorized = client.subscribe_unauthorized();

    let result: Result<Value, ApiError> = client
        .request(Method::GET, "/jadwal/getall", Some("stale-token"), None)
        .await;

    assert_matches!(result, Err(ApiError::Auth(AuthErrorKind::TokenInvalid)));
    assert!(unauthorized.try_recv().is_ok());
}

#[tokio::test]
async fn rejected_credentials_do_not_signal_forced_logout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dokter/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("wrong password"))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&test_config(&mock_server.uri()));
    let mut unauthorized = client.subscribe_unauthorized();

    // No bearer token on the login call: the 401 is the caller's error, not
    // an expired session.
    let result: Result<Value, ApiError> = client
        .request(
            Method::POST,
            "/dokter/login",
            None,
            Some(json!({ "email": "dokter@example.com", "password": "salah" })),
        )
        .await;

    assert_matches!(result, Err(ApiError::Auth(AuthErrorKind::TokenInvalid)));
    assert!(unauthorized.try_recv().is_err());
}

#[tokio::test]
async fn conflict_and_not_found_keep_server_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dokter/jadwal/add/d-1"))
        .respond_with(ResponseTemplate::new(409).set_body_string("jadwal pada tanggal ini sudah ada"))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&test_config(&mock_server.uri()));
    let result: Result<Value, ApiError> = client
        .request(
            Method::POST,
            "/dokter/jadwal/add/d-1",
            Some("token"),
            Some(json!({"tanggal": "2025-04-10"})),
        )
        .await;

    match result {
        Err(ApiError::Conflict(msg)) => assert!(msg.contains("sudah ada")),
        other => panic!("expected conflict, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn malformed_payload_is_a_validation_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/chatlist/u-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&test_config(&mock_server.uri()));
    let result: Result<Vec<Value>, ApiError> = client
        .request(Method::GET, "/chatlist/u-1", Some("token"), None)
        .await;

    assert_matches!(result, Err(ApiError::Validation(_)));
}
