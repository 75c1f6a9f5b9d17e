//! Mock platform implementations for testing
//!
//! In-memory stand-ins for the platform traits. They record every call for
//! test verification and support failure injection for the recovery paths.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled

#![cfg(any(test, feature = "mock"))]

mod logsink;
mod store;
mod transport;

pub use logsink::MockLogSink;
pub use store::MockStore;
pub use transport::{MockTransport, TransportTransaction};
