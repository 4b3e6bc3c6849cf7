use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==============================================================================
// APPOINTMENT ("JANJI") MODELS
// ==============================================================================

/// A patient's consultation request. Status starts at `pending`; `diterima`
/// and `ditolak` are terminal and only ever reached from `pending`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "diterima")]
    Accepted,
    #[serde(rename = "ditolak")]
    Rejected,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 3] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Accepted,
        AppointmentStatus::Rejected,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Accepted | AppointmentStatus::Rejected)
    }

    /// The only legal transitions are pending -> accepted and
    /// pending -> rejected.
    pub fn can_transition_to(&self, target: AppointmentStatus) -> bool {
        matches!(self, AppointmentStatus::Pending) && target.is_terminal()
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Accepted => write!(f, "diterima"),
            AppointmentStatus::Rejected => write!(f, "ditolak"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: String,
    #[serde(rename = "id_dokter")]
    pub doctor_id: String,
    #[serde(rename = "id_masyarakat")]
    pub patient_id: String,
    #[serde(rename = "nama_masyarakat")]
    pub patient_name: String,
    #[serde(rename = "foto_masyarakat")]
    pub patient_photo: Option<String>,
    pub tanggal: NaiveDate,
    pub jam: String,
    pub keluhan: String,
    #[serde(rename = "status_konsul")]
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// Sort key for the partition views: consultation date, then the slot
    /// time string ("HH:MM" compares correctly lexicographically).
    pub fn consultation_key(&self) -> (NaiveDate, &str) {
        (self.tanggal, self.jam.as_str())
    }
}
