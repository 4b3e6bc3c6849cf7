use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

// ==============================================================================
// DOCTOR PROFILE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub id: String,
    pub nama: String,
    pub email: String,
    pub no_telp: String,
    pub spesialis: Option<String>,
    pub foto: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nama: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_telp: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangePasswordRequest {
    pub password_lama: String,
    pub password_baru: String,
}

// ==============================================================================
// SCHEDULE SLOT ("JADWAL") MODELS
// ==============================================================================

/// One consultation window for one calendar date. The backend keeps at most
/// one record per (doctor, date); times travel as "HH:MM" strings on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleSlot {
    pub tanggal: NaiveDate,
    pub jam_mulai: String,
    pub jam_selesai: String,
}

/// Derived per-interval view of a schedule window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlot {
    pub time: String,
    pub available: bool,
}

impl ScheduleSlot {
    pub fn start_time(&self) -> Option<NaiveTime> {
        parse_wire_time(&self.jam_mulai)
    }

    pub fn end_time(&self) -> Option<NaiveTime> {
        parse_wire_time(&self.jam_selesai)
    }

    /// Expand the window into ordered interval slots, flagging entries in
    /// `booked` as unavailable. Returns an empty list if the times fail to
    /// parse; callers validate before storing, so that only happens on
    /// records the server produced.
    pub fn time_slots(&self, interval_minutes: i64, booked: &[String]) -> Vec<TimeSlot> {
        let (Some(start), Some(end)) = (self.start_time(), self.end_time()) else {
            return Vec::new();
        };

        let mut slots = Vec::new();
        let mut cursor = start;
        while cursor < end {
            let label = cursor.format("%H:%M").to_string();
            slots.push(TimeSlot {
                available: !booked.contains(&label),
                time: label,
            });
            cursor += chrono::Duration::minutes(interval_minutes);
        }
        slots
    }
}

/// Accepts both "HH:MM" (the app's format) and "HH:MM:SS" (what some backend
/// rows carry).
pub fn parse_wire_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertScheduleRequest {
    pub tanggal: NaiveDate,
    pub jam_mulai: String,
    pub jam_selesai: String,
}
