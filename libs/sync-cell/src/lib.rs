pub mod controller;
pub mod error;
pub mod events;
pub mod stream;

pub use controller::{SyncController, SyncHandle};
pub use error::SyncError;
pub use events::{LiveEvent, OutboundEvent};
pub use stream::{EventStream, WebSocketEventStream};
