pub mod cache;
pub mod error;
pub mod models;
pub mod services;

pub use cache::{AppendOutcome, ChatThreadCache};
pub use error::ChatError;
pub use models::*;
pub use services::ChatService;
