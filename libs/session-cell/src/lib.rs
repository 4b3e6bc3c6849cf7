pub mod error;
pub mod storage;
pub mod store;

pub use error::SessionError;
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};
pub use store::SessionStore;
