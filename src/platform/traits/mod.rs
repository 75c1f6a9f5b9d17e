//! Platform abstraction traits
//!
//! Narrow interfaces consumed by the orchestration core. Board crates
//! implement these against their HAL; tests use the mocks.

mod logsink;
mod store;
mod transport;

pub use logsink::LogSink;
pub use store::{KeyValueStore, MAX_KEY_LEN, MAX_STRING_LEN};
pub use transport::{ChannelKind, SessionHandle, TransportConfig, TransportInterface};
