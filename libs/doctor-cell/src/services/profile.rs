use std::sync::Arc;
use std::sync::OnceLock;

use regex::Regex;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};

use shared_api::ApiClient;

use crate::error::DoctorError;
use crate::models::{ChangePasswordRequest, DoctorProfile, UpdateProfileRequest};

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\w.+-]+@[\w-]+\.[\w.-]+$").unwrap())
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Indonesian mobile numbers: 08 prefix, 10-13 digits total.
    RE.get_or_init(|| Regex::new(r"^08\d{8,11}$").unwrap())
}

/// Doctor account operations: profile fetch/update, password change, photo
/// upload and account deletion.
pub struct ProfileService {
    api: Arc<ApiClient>,
}

impl ProfileService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn get_profile(
        &self,
        doctor_id: &str,
        auth_token: &str,
    ) -> Result<DoctorProfile, DoctorError> {
        debug!("Fetching profile for doctor {}", doctor_id);

        let path = format!("/dokter/getbyid/{}", doctor_id);
        let profile = self
            .api
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;
        Ok(profile)
    }

    pub async fn update_profile(
        &self,
        doctor_id: &str,
        request: UpdateProfileRequest,
        auth_token: &str,
    ) -> Result<DoctorProfile, DoctorError> {
        if let Some(ref email) = request.email {
            if !email_re().is_match(email) {
                return Err(DoctorError::Validation(format!("email tidak valid: {}", email)));
            }
        }
        if let Some(ref no_telp) = request.no_telp {
            if !phone_re().is_match(no_telp) {
                return Err(DoctorError::Validation(format!(
                    "nomor telepon tidak valid: {}",
                    no_telp
                )));
            }
        }

        let path = format!("/dokter/update/{}", doctor_id);
        let body = serde_json::to_value(&request)
            .map_err(|e| DoctorError::Validation(e.to_string()))?;
        let updated = self
            .api
            .request(Method::PATCH, &path, Some(auth_token), Some(body))
            .await?;
        Ok(updated)
    }

    pub async fn change_password(
        &self,
        request: ChangePasswordRequest,
        auth_token: &str,
    ) -> Result<(), DoctorError> {
        if request.password_baru.len() < 8 {
            return Err(DoctorError::Validation(
                "password baru minimal 8 karakter".to_string(),
            ));
        }

        let body = serde_json::to_value(&request)
            .map_err(|e| DoctorError::Validation(e.to_string()))?;
        let _: Value = self
            .api
            .request(
                Method::PATCH,
                "/dokter/ubah-password",
                Some(auth_token),
                Some(body),
            )
            .await?;

        info!("Password changed");
        Ok(())
    }

    /// Upload a new profile photo; returns the stored photo path.
    pub async fn upload_photo(
        &self,
        image: Vec<u8>,
        file_name: &str,
        auth_token: &str,
    ) -> Result<String, DoctorError> {
        let part = Part::bytes(image)
            .file_name(file_name.to_string())
            .mime_str("image/jpeg")
            .map_err(|e| DoctorError::Validation(e.to_string()))?;
        let form = Form::new().part("foto", part);

        let response: Value = self
            .api
            .upload_multipart("/dokter/upload", Some(auth_token), form)
            .await?;

        response
            .get("foto")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| DoctorError::Validation("upload response missing foto path".to_string()))
    }

    pub async fn delete_account(
        &self,
        doctor_id: &str,
        auth_token: &str,
    ) -> Result<(), DoctorError> {
        let path = format!("/dokter/delete/{}", doctor_id);
        let _: Value = self
            .api
            .request(Method::DELETE, &path, Some(auth_token), None)
            .await?;

        info!("Account {} deleted", doctor_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(email_re().is_match("dokter@example.com"));
        assert!(!email_re().is_match("bukan-email"));
    }

    #[test]
    fn phone_validation() {
        assert!(phone_re().is_match("081234567890"));
        assert!(!phone_re().is_match("12345"));
        assert!(!phone_re().is_match("+6281234567890"));
    }
}
