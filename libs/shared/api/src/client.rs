use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    multipart::Form,
    Client, Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use shared_config::AppConfig;
use shared_models::ApiError;

/// Authenticated REST transport. Every request carries the caller's bearer
/// token; a 401/403 on a token-bearing request is published on the
/// `unauthorized` channel so the sync layer can force a logout. Rejected
/// credentials on the login call stay an ordinary auth error.
pub struct ApiClient {
    client: Client,
    base_url: String,
    unauthorized: broadcast::Sender<()>,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .unwrap_or_else(|_| Client::new());
        let (unauthorized, _) = broadcast::channel(8);

        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            unauthorized,
        }
    }

    /// Subscribe to forced-logout notifications (one per rejected token).
    pub fn subscribe_unauthorized(&self) -> broadcast::Receiver<()> {
        self.unauthorized.subscribe()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self, auth_token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        headers
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut req = self
            .client
            .request(method, &url)
            .headers(self.headers(auth_token));

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await.map_err(|e| self.map_transport(e))?;
        self.decode(response, auth_token.is_some()).await
    }

    /// Multipart upload (profile photo). The bearer header is still attached;
    /// reqwest sets the multipart content type itself.
    pub async fn upload_multipart<T>(
        &self,
        path: &str,
        auth_token: Option<&str>,
        form: Form,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Uploading multipart form to {}", url);

        let mut req = self.client.post(&url).multipart(form);
        if let Some(token) = auth_token {
            req = req.bearer_auth(token);
        }

        let response = req.send().await.map_err(|e| self.map_transport(e))?;
        self.decode(response, auth_token.is_some()).await
    }

    async fn decode<T>(&self, response: reqwest::Response, authenticated: bool) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);

            // Only a rejected token means the session died; a 401 on an
            // unauthenticated call (login) is the caller's problem.
            if authenticated
                && (status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN)
            {
                // Receivers may be gone during shutdown; nothing to do then.
                let _ = self.unauthorized.send(());
            }

            return Err(ApiError::from_status(status.as_u16(), error_text));
        }

        // Malformed payloads must not propagate into the caches; a body the
        // schema rejects is a validation failure, not a decode panic.
        response.json::<T>().await.map_err(|e| {
            warn!("Rejected malformed response payload: {}", e);
            ApiError::Validation(format!("malformed response payload: {}", e))
        })
    }

    fn map_transport(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Network(format!("request timed out: {}", err))
        } else {
            ApiError::Network(err.to_string())
        }
    }
}
