use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Method;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use shared_api::ApiClient;
use shared_models::ApiError;

use crate::error::DoctorError;
use crate::models::{parse_wire_time, ScheduleSlot, UpsertScheduleRequest};
use crate::registry::ScheduleRegistry;

/// Schedule Slot CRUD against the `/dokter/jadwal/*` endpoints, backed by the
/// local registry. All mutations are confirmed by the server before the
/// registry changes; a failed fetch leaves the previous snapshot intact.
pub struct ScheduleService {
    api: Arc<ApiClient>,
    registry: RwLock<ScheduleRegistry>,
}

impl ScheduleService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            registry: RwLock::new(ScheduleRegistry::new()),
        }
    }

    /// Replace the cached schedule with the server's list for this doctor.
    pub async fn refresh(&self, doctor_id: &str, auth_token: &str) -> Result<(), DoctorError> {
        debug!("Refreshing schedule for doctor {}", doctor_id);

        let path = format!("/dokter/jadwal/{}", doctor_id);
        let snapshot: Vec<ScheduleSlot> = self
            .api
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        self.registry.write().await.apply_snapshot(snapshot);
        Ok(())
    }

    /// Create a slot. Rejects locally when the cached registry already holds
    /// that date, and maps the server's duplicate answer the same way, so the
    /// at-most-one-per-date invariant holds whichever side catches it first.
    pub async fn add(
        &self,
        doctor_id: &str,
        request: UpsertScheduleRequest,
        auth_token: &str,
    ) -> Result<ScheduleSlot, DoctorError> {
        self.validate_times(&request)?;

        if self.registry.read().await.contains(request.tanggal) {
            return Err(DoctorError::ScheduleConflict(request.tanggal));
        }

        let path = format!("/dokter/jadwal/add/{}", doctor_id);
        let created: ScheduleSlot = self
            .api
            .request(
                Method::POST,
                &path,
                Some(auth_token),
                Some(json!({
                    "tanggal": request.tanggal,
                    "jam_mulai": request.jam_mulai,
                    "jam_selesai": request.jam_selesai,
                })),
            )
            .await
            .map_err(|e| self.map_upsert_error(e, request.tanggal))?;

        debug!("Schedule created for {}", created.tanggal);
        self.registry.write().await.upsert(created.clone());
        Ok(created)
    }

    /// Update the slot for a date; the backend answers 404 when no slot
    /// exists for it.
    pub async fn update(
        &self,
        doctor_id: &str,
        request: UpsertScheduleRequest,
        auth_token: &str,
    ) -> Result<ScheduleSlot, DoctorError> {
        self.validate_times(&request)?;

        let path = format!("/dokter/{}/jadwal/update", doctor_id);
        let updated: ScheduleSlot = self
            .api
            .request(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(json!({
                    "tanggal": request.tanggal,
                    "jam_mulai": request.jam_mulai,
                    "jam_selesai": request.jam_selesai,
                })),
            )
            .await
            .map_err(|e| self.map_upsert_error(e, request.tanggal))?;

        self.registry.write().await.upsert(updated.clone());
        Ok(updated)
    }

    pub async fn delete(
        &self,
        doctor_id: &str,
        tanggal: NaiveDate,
        auth_token: &str,
    ) -> Result<(), DoctorError> {
        let path = format!("/dokter/jadwal/hapus/{}", doctor_id);
        let _: Value = self
            .api
            .request(
                Method::DELETE,
                &path,
                Some(auth_token),
                Some(json!({ "tanggal": tanggal })),
            )
            .await
            .map_err(|e| self.map_upsert_error(e, tanggal))?;

        if self.registry.write().await.remove(tanggal).is_none() {
            warn!("Deleted schedule for {} was not in the local cache", tanggal);
        }
        Ok(())
    }

    /// Current cached slots, ordered by date.
    pub async fn schedule(&self) -> Vec<ScheduleSlot> {
        self.registry.read().await.all()
    }

    pub async fn slot_for(&self, date: NaiveDate) -> Option<ScheduleSlot> {
        self.registry.read().await.get(date).cloned()
    }

    fn validate_times(&self, request: &UpsertScheduleRequest) -> Result<(), DoctorError> {
        let start = parse_wire_time(&request.jam_mulai)
            .ok_or_else(|| DoctorError::Validation(format!("jam tidak valid: {}", request.jam_mulai)))?;
        let end = parse_wire_time(&request.jam_selesai).ok_or_else(|| {
            DoctorError::Validation(format!("jam tidak valid: {}", request.jam_selesai))
        })?;

        if end <= start {
            return Err(DoctorError::InvalidTimeRange {
                jam_mulai: request.jam_mulai.clone(),
                jam_selesai: request.jam_selesai.clone(),
            });
        }
        Ok(())
    }

    fn map_upsert_error(&self, err: ApiError, tanggal: NaiveDate) -> DoctorError {
        match err {
            ApiError::Conflict(_) => DoctorError::ScheduleConflict(tanggal),
            ApiError::NotFound(_) => DoctorError::ScheduleNotFound(tanggal),
            other => DoctorError::Transport(other),
        }
    }
}
