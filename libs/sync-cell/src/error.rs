use thiserror::Error;

use shared_models::ApiError;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("No active session")]
    NoActiveSession,

    #[error("Session expired, forced logout")]
    SessionExpired,

    #[error("Event stream error: {0}")]
    Stream(String),

    #[error("Event stream is not subscribed")]
    StreamUnavailable,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transport error: {0}")]
    Api(#[from] ApiError),
}
