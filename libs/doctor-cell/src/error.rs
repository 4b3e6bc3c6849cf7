use chrono::NaiveDate;
use thiserror::Error;

use shared_models::ApiError;

#[derive(Error, Debug)]
pub enum DoctorError {
    #[error("Schedule already exists for {0}")]
    ScheduleConflict(NaiveDate),

    #[error("No schedule exists for {0}")]
    ScheduleNotFound(NaiveDate),

    #[error("End time {jam_selesai} is not after start time {jam_mulai}")]
    InvalidTimeRange {
        jam_mulai: String,
        jam_selesai: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Doctor not found")]
    NotFound,

    #[error("Transport error: {0}")]
    Transport(#[from] ApiError),
}

impl DoctorError {
    /// Blocking alert copy for validation and conflict failures.
    pub fn user_message(&self) -> String {
        match self {
            DoctorError::ScheduleConflict(_) => "jadwal pada tanggal ini sudah ada".to_string(),
            DoctorError::ScheduleNotFound(_) => "jadwal pada tanggal ini tidak ditemukan".to_string(),
            DoctorError::InvalidTimeRange { .. } => {
                "jam akhir tidak boleh lebih awal dari jam mulai".to_string()
            }
            DoctorError::Validation(msg) => msg.clone(),
            DoctorError::NotFound => "dokter tidak ditemukan".to_string(),
            DoctorError::Transport(_) => "terjadi kesalahan jaringan, coba lagi".to_string(),
        }
    }
}
