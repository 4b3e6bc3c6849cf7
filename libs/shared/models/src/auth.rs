use serde::{Deserialize, Serialize};

/// The one active session: who is logged in and the bearer token the backend
/// issued for them. Created at login, destroyed on logout or a 401.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub auth_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Wire shape of `POST /dokter/login`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub id: String,
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Session {
            user_id: response.id,
            auth_token: response.token,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorKind {
    InvalidCredentials,
    AccountNotFound,
    RateLimited,
    TokenInvalid,
}

impl AuthErrorKind {
    /// Fixed user-facing message per kind. The UI shows these verbatim and
    /// never sees the underlying response body.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthErrorKind::InvalidCredentials => "Email atau password salah",
            AuthErrorKind::AccountNotFound => "Akun tidak ditemukan",
            AuthErrorKind::RateLimited => "Terlalu banyak percobaan, coba lagi nanti",
            AuthErrorKind::TokenInvalid => "Sesi berakhir, silakan masuk kembali",
        }
    }
}
