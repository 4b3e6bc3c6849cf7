use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use reqwest::Method;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use shared_api::ApiClient;

use crate::error::AppointmentError;
use crate::models::{Appointment, AppointmentStatus};
use crate::registry::AppointmentRegistry;

/// Owns the Appointment Registry. Mutations flow only through here: `refresh`
/// replaces the set from a server snapshot, `update_status` runs the
/// optimistic accept/reject workflow.
pub struct AppointmentService {
    api: Arc<ApiClient>,
    registry: RwLock<AppointmentRegistry>,
    // Ticket taken before each fetch; the registry rejects snapshots whose
    // ticket is older than the last applied one.
    fetch_ticket: AtomicU64,
}

impl AppointmentService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            registry: RwLock::new(AppointmentRegistry::new()),
            fetch_ticket: AtomicU64::new(0),
        }
    }

    /// Fetch the server snapshot and replace the registry's contents with the
    /// entries belonging to this doctor. A failed fetch leaves the previous
    /// snapshot intact.
    pub async fn refresh(&self, doctor_id: &str, auth_token: &str) -> Result<(), AppointmentError> {
        let ticket = self.fetch_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Refreshing appointments for doctor {} (v{})", doctor_id, ticket);

        let all: Vec<Appointment> = self
            .api
            .request(Method::GET, "/jadwal/getall", Some(auth_token), None)
            .await?;

        let mine: Vec<Appointment> = all
            .into_iter()
            .filter(|a| a.doctor_id == doctor_id)
            .collect();

        let mut registry = self.registry.write().await;
        if !registry.apply_snapshot(mine, ticket) {
            debug!("Appointment snapshot v{} arrived after a newer one", ticket);
        }
        Ok(())
    }

    /// Accept or reject a pending appointment. The new status is applied
    /// locally first; any failure reverts it so the UI never silently shows
    /// an unconfirmed status.
    pub async fn update_status(
        &self,
        id: &str,
        new_status: AppointmentStatus,
        doctor_id: &str,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let previous = {
            let mut registry = self.registry.write().await;
            let current = registry
                .get(id)
                .ok_or_else(|| AppointmentError::NotFound(id.to_string()))?;

            if current.doctor_id != doctor_id {
                return Err(AppointmentError::Unauthorized);
            }
            if !current.status.can_transition_to(new_status) {
                return Err(AppointmentError::InvalidStatusTransition {
                    from: current.status,
                    to: new_status,
                });
            }

            // Optimistic apply; reverted below if the server does not confirm.
            registry
                .set_status(id, new_status)
                .ok_or_else(|| AppointmentError::NotFound(id.to_string()))?
        };

        let path = format!("/jadwal/update/status/{}", id);
        let result: Result<Appointment, _> = self
            .api
            .request(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(json!({ "status_konsul": new_status })),
            )
            .await;

        match result {
            Ok(confirmed) => {
                info!("Appointment {} moved to {}", id, confirmed.status);
                self.registry.write().await.upsert(confirmed.clone());
                Ok(confirmed)
            }
            Err(e) => {
                warn!("Status update for {} failed, reverting to {}: {}", id, previous, e);
                self.registry.write().await.set_status(id, previous);
                Err(AppointmentError::Transport(e))
            }
        }
    }

    /// Partition view ordered by consultation date descending.
    pub async fn by_status(&self, status: AppointmentStatus) -> Vec<Appointment> {
        self.registry.read().await.by_status(status)
    }

    pub async fn get(&self, id: &str) -> Option<Appointment> {
        self.registry.read().await.get(id).cloned()
    }

    pub async fn all(&self) -> Vec<Appointment> {
        self.registry.read().await.all()
    }

    pub async fn is_empty(&self) -> bool {
        self.registry.read().await.is_empty()
    }
}
