//! Raw log sink trait

use crate::platform::Result;

/// Append-only sink for raw receiver traffic.
///
/// The consumer task drains the in-memory log ring into a sink on its own
/// cadence. File naming, size limits, and rotation are the sink's concern.
pub trait LogSink {
    /// Append bytes to the sink, returning the number written
    fn append(&mut self, data: &[u8]) -> Result<usize>;

    /// Flush buffered bytes to backing storage
    fn flush(&mut self) -> Result<()>;
}
