//! Mock log sink implementation for testing

use crate::platform::{error::LogSinkError, traits::LogSink, Result};
use std::vec::Vec;

/// Mock log sink
///
/// Captures appended bytes in memory for test verification.
#[derive(Debug, Default)]
pub struct MockLogSink {
    captured: Vec<u8>,
    flush_count: u32,
    fail_append: bool,
}

impl MockLogSink {
    /// Create a new mock sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes appended so far
    pub fn captured(&self) -> &[u8] {
        &self.captured
    }

    /// Number of flush calls
    pub fn flush_count(&self) -> u32 {
        self.flush_count
    }

    /// Make `append` fail with `WriteFailed`
    pub fn set_fail_append(&mut self, fail: bool) {
        self.fail_append = fail;
    }
}

impl LogSink for MockLogSink {
    fn append(&mut self, data: &[u8]) -> Result<usize> {
        if self.fail_append {
            return Err(LogSinkError::WriteFailed.into());
        }
        self.captured.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<()> {
        self.flush_count += 1;
        Ok(())
    }
}
