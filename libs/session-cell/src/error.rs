use thiserror::Error;

use shared_models::{ApiError, AuthErrorKind};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Too many login attempts")]
    RateLimited,

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Transport error: {0}")]
    Transport(ApiError),
}

impl SessionError {
    /// The UI maps every auth failure to one fixed message; nothing from the
    /// server body leaks past this boundary.
    pub fn user_message(&self) -> &'static str {
        match self {
            SessionError::InvalidCredentials => AuthErrorKind::InvalidCredentials.user_message(),
            SessionError::AccountNotFound => AuthErrorKind::AccountNotFound.user_message(),
            SessionError::RateLimited => AuthErrorKind::RateLimited.user_message(),
            SessionError::Storage(_) | SessionError::Transport(_) => {
                "Terjadi kesalahan, coba lagi"
            }
        }
    }
}

impl From<ApiError> for SessionError {
    fn from(err: ApiError) -> Self {
        match err {
            // On the login endpoint a rejected token means rejected credentials.
            ApiError::Auth(AuthErrorKind::TokenInvalid)
            | ApiError::Auth(AuthErrorKind::InvalidCredentials) => {
                SessionError::InvalidCredentials
            }
            ApiError::Auth(AuthErrorKind::RateLimited) => SessionError::RateLimited,
            ApiError::NotFound(_) => SessionError::AccountNotFound,
            other => SessionError::Transport(other),
        }
    }
}
