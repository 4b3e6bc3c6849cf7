pub mod error;
pub mod models;
pub mod registry;
pub mod services;

pub use error::DoctorError;
pub use models::*;
pub use registry::ScheduleRegistry;
pub use services::{ProfileService, ScheduleService};
