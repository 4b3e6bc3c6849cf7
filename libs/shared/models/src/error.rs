use thiserror::Error;

use crate::auth::AuthErrorKind;

/// Transport-level error taxonomy shared by every service that talks to the
/// backend. Cell-specific errors wrap this via `#[from]`.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Authentication error: {0:?}")]
    Auth(AuthErrorKind),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),
}

impl ApiError {
    /// Map an HTTP status plus error body onto the taxonomy. 401/403 are
    /// always auth failures; everything else in the 4xx range that is not a
    /// missing resource or a conflict is treated as a validation problem.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => ApiError::Auth(AuthErrorKind::TokenInvalid),
            404 => ApiError::NotFound(body),
            409 => ApiError::Conflict(body),
            429 => ApiError::Auth(AuthErrorKind::RateLimited),
            400..=499 => ApiError::Validation(body),
            _ => ApiError::Server {
                status,
                message: body,
            },
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth(_))
    }

    /// Transient failures leave the previous cache snapshot intact and are
    /// retried on the next polling tick rather than immediately.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Server { .. })
    }
}
