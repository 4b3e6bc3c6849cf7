use thiserror::Error;

use shared_models::ApiError;

use crate::models::AppointmentStatus;

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Appointment not found: {0}")]
    NotFound(String),

    #[error("Appointment cannot move from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Appointment belongs to another doctor")]
    Unauthorized,

    #[error("Transport error: {0}")]
    Transport(#[from] ApiError),
}

impl AppointmentError {
    /// Recoverable failures keep the previous local state visible; the UI
    /// shows a transient notice and may retry.
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppointmentError::Transport(e) => e.is_transient(),
            _ => false,
        }
    }
}
