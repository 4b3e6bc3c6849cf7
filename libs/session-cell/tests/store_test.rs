use std::sync::Arc;

use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use session_cell::{FileSessionStorage, MemorySessionStorage, SessionStore};
use shared_api::ApiClient;
use shared_models::Credentials;
use shared_utils::test_utils::{MockBackendResponses, TestConfig};

fn credentials() -> Credentials {
    Credentials {
        email: "dokter@example.com".to_string(),
        password: "rahasia123".to_string(),
    }
}

async fn store_for(mock_server: &MockServer) -> SessionStore {
    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    let api = Arc::new(ApiClient::new(&config));
    SessionStore::new(api, Box::new(MemorySessionStorage::new()))
}

#[tokio::test]
async fn login_creates_and_persists_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dokter/login"))
        .and(body_json(json!({
            "email": "dokter@example.com",
            "password": "rahasia123"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(MockBackendResponses::login_response("d-1")),
        )
        .mount(&mock_server)
        .await;

    let store = store_for(&mock_server).await;
    let session = store.login(credentials()).await.unwrap();

    assert_eq!(session.user_id, "d-1");
    assert_eq!(store.user_id().await.as_deref(), Some("d-1"));
}

#[tokio::test]
async fn login_failure_kinds_map_to_fixed_errors() {
    for (status, expected_message) in [
        (401, "Email atau password salah"),
        (404, "Akun tidak ditemukan"),
        (429, "Terlalu banyak percobaan, coba lagi nanti"),
    ] {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/dokter/login"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&mock_server)
            .await;

        let store = store_for(&mock_server).await;
        let err = store.login(credentials()).await.unwrap_err();

        assert_eq!(err.user_message(), expected_message);
        assert!(store.session().await.is_none());
    }
}

#[tokio::test]
async fn logout_is_idempotent_without_a_session() {
    let mock_server = MockServer::start().await;
    let store = store_for(&mock_server).await;

    store.logout().await;
    store.logout().await;

    assert!(store.session().await.is_none());
}

#[tokio::test]
async fn file_storage_round_trips_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let session_path = dir.path().join("session.json");

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dokter/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(MockBackendResponses::login_response("d-9")),
        )
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    let api = Arc::new(ApiClient::new(&config));

    let store = SessionStore::new(
        api.clone(),
        Box::new(FileSessionStorage::new(session_path.clone())),
    );
    store.login(credentials()).await.unwrap();

    // Simulated restart: a fresh store restores from the same file.
    let restarted = SessionStore::new(api, Box::new(FileSessionStorage::new(session_path)));
    let restored = restarted.restore().await.unwrap();
    assert_eq!(restored.unwrap().user_id, "d-9");

    restarted.logout().await;
    assert_matches!(restarted.restore().await, Ok(None));
}
