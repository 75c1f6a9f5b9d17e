//! Core cross-cutting services
//!
//! Logging macros and the platform-agnostic traits for time and shared state.

pub mod logging;
pub mod traits;
