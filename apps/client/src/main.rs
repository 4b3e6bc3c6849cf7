use std::env;
use std::sync::Arc;

use anyhow::{bail, Context};
use dotenv::dotenv;
use tokio::sync::RwLock;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use appointment_cell::AppointmentService;
use chat_cell::{ChatService, ChatThreadCache};
use session_cell::{FileSessionStorage, SessionStore};
use shared_api::ApiClient;
use shared_config::AppConfig;
use shared_models::Credentials;
use sync_cell::{SyncController, WebSocketEventStream};

/// Headless runner: signs in (or restores the previous session) and keeps the
/// appointment and chat caches in sync until interrupted.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting dokter sync client");

    // Load configuration
    let config = Arc::new(AppConfig::from_env());
    if !config.is_configured() {
        bail!("API_BASE_URL and SOCKET_URL must be set");
    }

    let api = Arc::new(ApiClient::new(&config));
    let session = Arc::new(SessionStore::new(
        api.clone(),
        Box::new(FileSessionStorage::new(config.session_file.clone())),
    ));

    // Prefer the persisted session; fall back to credential login.
    let restored = session.restore().await.unwrap_or_else(|e| {
        warn!("Could not restore persisted session: {}", e);
        None
    });
    if restored.is_none() {
        let credentials = Credentials {
            email: env::var("DOKTER_EMAIL").context("DOKTER_EMAIL not set")?,
            password: env::var("DOKTER_PASSWORD").context("DOKTER_PASSWORD not set")?,
        };
        session
            .login(credentials)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e.user_message()))?;
    }

    let appointments = Arc::new(AppointmentService::new(api.clone()));
    let chats = Arc::new(ChatService::new(api.clone()));
    let cache = Arc::new(RwLock::new(ChatThreadCache::new()));
    let stream = WebSocketEventStream::new(config.socket_url.clone());

    let (mut controller, handle) = SyncController::new(
        config,
        &api,
        session,
        appointments,
        chats,
        cache,
        stream,
    );

    tokio::select! {
        result = controller.run() => {
            result.context("sync stopped")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
            handle.shutdown();
        }
    }

    Ok(())
}
