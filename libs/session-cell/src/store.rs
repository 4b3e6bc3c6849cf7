use std::sync::Arc;

use reqwest::Method;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use shared_api::ApiClient;
use shared_models::{Credentials, LoginResponse, Session};

use crate::error::SessionError;
use crate::storage::SessionStorage;

/// Holds the one active session. Lifecycle spans login (or restore) to
/// logout; forced invalidation after a 401 goes through the same `logout`
/// path.
pub struct SessionStore {
    api: Arc<ApiClient>,
    storage: Box<dyn SessionStorage>,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    pub fn new(api: Arc<ApiClient>, storage: Box<dyn SessionStorage>) -> Self {
        Self {
            api,
            storage,
            current: RwLock::new(None),
        }
    }

    /// Authenticate against the backend and make the returned session the
    /// active one. Failure kinds map one-to-one onto fixed UI messages.
    pub async fn login(&self, credentials: Credentials) -> Result<Session, SessionError> {
        debug!("Logging in as {}", credentials.email);

        let response: LoginResponse = self
            .api
            .request(
                Method::POST,
                "/dokter/login",
                None,
                Some(json!({
                    "email": credentials.email,
                    "password": credentials.password,
                })),
            )
            .await?;

        let session = Session::from(response);
        if let Err(e) = self.storage.save(&session).await {
            // A session that cannot be persisted is still usable for this run.
            warn!("Failed to persist session: {}", e);
        }
        *self.current.write().await = Some(session.clone());

        info!("Session started for user {}", session.user_id);
        Ok(session)
    }

    /// Load the persisted session from the previous run, if any.
    pub async fn restore(&self) -> Result<Option<Session>, SessionError> {
        let session = self.storage.load().await?;
        if let Some(ref s) = session {
            debug!("Restored session for user {}", s.user_id);
        }
        *self.current.write().await = session.clone();
        Ok(session)
    }

    /// Idempotent: safe to call when no session exists.
    pub async fn logout(&self) {
        let had_session = self.current.write().await.take().is_some();
        if let Err(e) = self.storage.clear().await {
            warn!("Failed to clear persisted session: {}", e);
        }
        if had_session {
            info!("Session ended");
        }
    }

    pub async fn session(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.current.read().await.as_ref().map(|s| s.auth_token.clone())
    }

    pub async fn user_id(&self) -> Option<String> {
        self.current.read().await.as_ref().map(|s| s.user_id.clone())
    }
}
