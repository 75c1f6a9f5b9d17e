//! Platform abstraction layer
//!
//! The orchestration core never touches hardware directly. Everything it
//! needs from the board (the receiver bus, the persistent key-value store,
//! the raw log sink) is expressed as a trait here, with mock implementations
//! for host testing.

pub mod error;
pub mod mock;
pub mod traits;

pub use error::{LogSinkError, PlatformError, Result, StoreError, TransportError};
