use std::collections::HashMap;

use tracing::debug;

use crate::models::{Appointment, AppointmentStatus};

/// In-memory cache of the doctor's appointments, keyed by id. Snapshots carry
/// a monotonically increasing version; an older snapshot arriving after a
/// newer one is discarded, so refresh is idempotent and order-independent.
#[derive(Debug, Default)]
pub struct AppointmentRegistry {
    entries: HashMap<String, Appointment>,
    snapshot_version: u64,
}

impl AppointmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full replace: server membership wins, which also drops any optimistic
    /// entry the server never confirmed. Returns false when the snapshot is
    /// stale and was ignored.
    pub fn apply_snapshot(&mut self, snapshot: Vec<Appointment>, version: u64) -> bool {
        if version <= self.snapshot_version {
            debug!(
                "Discarding stale appointment snapshot v{} (have v{})",
                version, self.snapshot_version
            );
            return false;
        }

        self.entries = snapshot.into_iter().map(|a| (a.id.clone(), a)).collect();
        self.snapshot_version = version;
        true
    }

    pub fn snapshot_version(&self) -> u64 {
        self.snapshot_version
    }

    pub fn get(&self, id: &str) -> Option<&Appointment> {
        self.entries.get(id)
    }

    /// Local status write used for the optimistic apply and its revert.
    /// Returns the previous status so the caller can restore it.
    pub fn set_status(&mut self, id: &str, status: AppointmentStatus) -> Option<AppointmentStatus> {
        let entry = self.entries.get_mut(id)?;
        let previous = entry.status;
        entry.status = status;
        Some(previous)
    }

    /// Apply a single server-confirmed record (the PATCH echo).
    pub fn upsert(&mut self, appointment: Appointment) {
        self.entries.insert(appointment.id.clone(), appointment);
    }

    /// Partition view, recomputed on read: appointments in `status`, ordered
    /// by consultation date descending.
    pub fn by_status(&self, status: AppointmentStatus) -> Vec<Appointment> {
        let mut matching: Vec<Appointment> = self
            .entries
            .values()
            .filter(|a| a.status == status)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.consultation_key().cmp(&a.consultation_key()));
        matching
    }

    pub fn all(&self) -> Vec<Appointment> {
        self.entries.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
