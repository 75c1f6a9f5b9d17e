//! Platform error types
//!
//! This module defines error types for platform operations.

use core::fmt;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
///
/// All platform implementations map their HAL-specific errors to these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlatformError {
    /// Transport (receiver bus) operation failed
    Transport(TransportError),
    /// Persistent store operation failed
    Store(StoreError),
    /// Raw log sink operation failed
    LogSink(LogSinkError),
    /// Invalid configuration provided
    InvalidConfig,
    /// Resource not available
    ResourceUnavailable,
}

/// Transport-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Opening the device failed
    OpenFailed,
    /// Operation on a device that is not open
    NotOpen,
    /// Frame write failed
    WriteFailed,
    /// Receive session could not be started
    StartFailed,
    /// Receive session could not be stopped
    StopFailed,
    /// Timeout occurred
    Timeout,
}

/// Persistent-store-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Namespace could not be opened
    InitFailed,
    /// Key does not exist in the namespace
    KeyNotFound,
    /// Read failed
    ReadFailed,
    /// Write failed
    WriteFailed,
    /// Erase failed
    EraseFailed,
    /// Key or value exceeds the store's size limits
    ValueTooLong,
}

/// Log-sink-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LogSinkError {
    /// Append failed
    WriteFailed,
    /// Sink is not available (e.g. storage unmounted)
    Unavailable,
}

impl From<TransportError> for PlatformError {
    fn from(e: TransportError) -> Self {
        PlatformError::Transport(e)
    }
}

impl From<StoreError> for PlatformError {
    fn from(e: StoreError) -> Self {
        PlatformError::Store(e)
    }
}

impl From<LogSinkError> for PlatformError {
    fn from(e: LogSinkError) -> Self {
        PlatformError::LogSink(e)
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Transport(e) => write!(f, "Transport error: {:?}", e),
            PlatformError::Store(e) => write!(f, "Store error: {:?}", e),
            PlatformError::LogSink(e) => write!(f, "Log sink error: {:?}", e),
            PlatformError::InvalidConfig => write!(f, "Invalid configuration"),
            PlatformError::ResourceUnavailable => write!(f, "Resource not available"),
        }
    }
}
