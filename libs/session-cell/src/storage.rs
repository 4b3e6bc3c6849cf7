use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use shared_models::Session;

use crate::error::SessionError;

/// Where the token and user id live between app restarts. The file-backed
/// implementation stands in for the platform's secure storage.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn save(&self, session: &Session) -> Result<(), SessionError>;
    async fn load(&self) -> Result<Option<Session>, SessionError>;
    async fn clear(&self) -> Result<(), SessionError>;
}

pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn save(&self, session: &Session) -> Result<(), SessionError> {
        let data = serde_json::to_vec_pretty(session)
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        tokio::fs::write(&self.path, data)
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        debug!("Session persisted to {}", self.path.display());
        Ok(())
    }

    async fn load(&self) -> Result<Option<Session>, SessionError> {
        match tokio::fs::read(&self.path).await {
            Ok(data) => {
                let session = serde_json::from_slice(&data)
                    .map_err(|e| SessionError::Storage(e.to_string()))?;
                Ok(Some(session))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SessionError::Storage(e.to_string())),
        }
    }

    async fn clear(&self) -> Result<(), SessionError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            // Clearing an absent session is a no-op, logout is idempotent.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Storage(e.to_string())),
        }
    }
}

/// In-memory storage for tests and ephemeral runs.
#[derive(Default)]
pub struct MemorySessionStorage {
    inner: RwLock<Option<Session>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn save(&self, session: &Session) -> Result<(), SessionError> {
        *self.inner.write().await = Some(session.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.inner.read().await.clone())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        *self.inner.write().await = None;
        Ok(())
    }
}
