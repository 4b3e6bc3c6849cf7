pub mod error;
pub mod models;
pub mod registry;
pub mod services;

pub use error::AppointmentError;
pub use models::*;
pub use registry::AppointmentRegistry;
pub use services::AppointmentService;
