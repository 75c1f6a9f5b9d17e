//! Mock transport implementation for testing

use crate::platform::{
    error::TransportError,
    traits::{ChannelKind, SessionHandle, TransportConfig, TransportInterface},
    Result,
};
use std::vec::Vec;

/// Transport transaction type for logging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportTransaction {
    /// Open attempt (recorded even when injected to fail)
    Open { address: u8 },
    /// Close call
    Close,
    /// Outbound frame
    SendFrame(Vec<u8>),
    /// Receive session started
    StartReceive(ChannelKind),
    /// Receive session stopped
    StopReceive(u32),
}

/// Mock transport implementation
///
/// Records all transactions for test verification and allows injecting
/// failures on open, send, and session start.
#[derive(Debug, Default)]
pub struct MockTransport {
    open: bool,
    transactions: Vec<TransportTransaction>,
    next_handle: u32,
    active_sessions: Vec<u32>,
    fail_open_attempts: u32,
    fail_send: bool,
    fail_start_receive: bool,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Get transaction log (for test verification)
    pub fn transactions(&self) -> Vec<TransportTransaction> {
        self.transactions.clone()
    }

    /// Frames sent so far, oldest first
    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.transactions
            .iter()
            .filter_map(|t| match t {
                TransportTransaction::SendFrame(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    /// Clear transaction log
    pub fn clear_transactions(&mut self) {
        self.transactions.clear();
    }

    /// Make the next `n` open attempts fail with `OpenFailed`
    pub fn fail_next_opens(&mut self, n: u32) {
        self.fail_open_attempts = n;
    }

    /// Make every `send_frame` fail with `WriteFailed`
    pub fn set_fail_send(&mut self, fail: bool) {
        self.fail_send = fail;
    }

    /// Make every `start_receive` fail with `StartFailed`
    pub fn set_fail_start_receive(&mut self, fail: bool) {
        self.fail_start_receive = fail;
    }

    /// Number of currently running receive sessions
    pub fn session_count(&self) -> usize {
        self.active_sessions.len()
    }
}

impl TransportInterface for MockTransport {
    fn open(&mut self, config: &TransportConfig) -> Result<()> {
        self.transactions.push(TransportTransaction::Open {
            address: config.address,
        });
        if self.fail_open_attempts > 0 {
            self.fail_open_attempts -= 1;
            return Err(TransportError::OpenFailed.into());
        }
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.transactions.push(TransportTransaction::Close);
        self.open = false;
        self.active_sessions.clear();
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn send_frame(&mut self, data: &[u8]) -> Result<()> {
        if !self.open {
            return Err(TransportError::NotOpen.into());
        }
        self.transactions
            .push(TransportTransaction::SendFrame(data.to_vec()));
        if self.fail_send {
            return Err(TransportError::WriteFailed.into());
        }
        Ok(())
    }

    fn start_receive(&mut self, channel: ChannelKind) -> Result<SessionHandle> {
        if !self.open {
            return Err(TransportError::NotOpen.into());
        }
        self.transactions
            .push(TransportTransaction::StartReceive(channel));
        if self.fail_start_receive {
            return Err(TransportError::StartFailed.into());
        }
        let handle = self.next_handle;
        self.next_handle += 1;
        self.active_sessions.push(handle);
        Ok(SessionHandle(handle))
    }

    fn stop_receive(&mut self, handle: SessionHandle) -> Result<()> {
        self.transactions
            .push(TransportTransaction::StopReceive(handle.0));
        match self.active_sessions.iter().position(|&h| h == handle.0) {
            Some(idx) => {
                self.active_sessions.remove(idx);
                Ok(())
            }
            None => Err(TransportError::StopFailed.into()),
        }
    }
}
