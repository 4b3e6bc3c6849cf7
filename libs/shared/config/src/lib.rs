use std::env;
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 30;
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 20;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub socket_url: String,
    pub session_file: PathBuf,
    pub poll_interval_seconds: u64,
    pub request_timeout_seconds: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("API_BASE_URL not set, using empty value");
                    String::new()
                }),
            socket_url: env::var("SOCKET_URL")
                .unwrap_or_else(|_| {
                    warn!("SOCKET_URL not set, using empty value");
                    String::new()
                }),
            session_file: env::var("SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    warn!("SESSION_FILE not set, using ./session.json");
                    PathBuf::from("session.json")
                }),
            poll_interval_seconds: env::var("POLL_INTERVAL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECONDS),
            request_timeout_seconds: env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.api_base_url.is_empty() && !self.socket_url.is_empty()
    }
}
