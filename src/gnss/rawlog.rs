//! Raw receiver traffic log ring
//!
//! One byte ring shared by all profiles: the first profile to enable
//! logging becomes the owner, later profiles share the ring, and only the
//! owner tears it down. The dispatcher pushes raw frames as they arrive; a
//! consumer task drains the ring into a [`LogSink`](crate::platform::traits::LogSink)
//! on its own cadence. When the ring fills, the oldest bytes are evicted
//! and counted.

use heapless::Deque;

/// Ring capacity in bytes
pub const RAW_LOG_CAPACITY: usize = 2048;

/// Shared raw-message log ring
pub struct RawLogBuffer {
    buf: Deque<u8, RAW_LOG_CAPACITY>,
    overflow_count: u32,
    owner: Option<u8>,
}

impl RawLogBuffer {
    pub const fn new() -> Self {
        Self {
            buf: Deque::new(),
            overflow_count: 0,
            owner: None,
        }
    }

    /// Activate logging for a profile.
    ///
    /// The first caller becomes the owner; later callers share the ring.
    pub fn enable(&mut self, profile: u8) {
        if self.owner.is_none() {
            self.owner = Some(profile);
        }
    }

    /// Deactivate logging.
    ///
    /// Only the owning profile tears the ring down; calls from other
    /// profiles (or while inactive) are no-ops.
    pub fn disable(&mut self, profile: u8) {
        if self.owner == Some(profile) {
            self.owner = None;
            self.buf.clear();
            self.overflow_count = 0;
        }
    }

    /// Whether any profile has logging active
    pub fn is_enabled(&self) -> bool {
        self.owner.is_some()
    }

    /// Owning profile id, if active
    pub fn owner(&self) -> Option<u8> {
        self.owner
    }

    /// Append raw bytes, evicting the oldest on overflow.
    ///
    /// Ignored while no profile has logging active.
    pub fn push(&mut self, data: &[u8]) {
        if self.owner.is_none() {
            return;
        }
        for &b in data {
            if self.buf.is_full() {
                self.buf.pop_front();
                self.overflow_count = self.overflow_count.saturating_add(1);
            }
            // Cannot fail: a slot was just freed if the ring was full
            let _ = self.buf.push_back(b);
        }
    }

    /// Move up to `out.len()` bytes out of the ring, oldest first.
    ///
    /// Returns the number of bytes written into `out`.
    pub fn drain_into(&mut self, out: &mut [u8]) -> usize {
        let mut n = 0;
        while n < out.len() {
            match self.buf.pop_front() {
                Some(b) => {
                    out[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        n
    }

    /// Bytes currently buffered
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True when no bytes are buffered
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes lost to eviction since activation
    pub fn overflow_count(&self) -> u32 {
        self.overflow_count
    }
}

impl Default for RawLogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_ignored_while_disabled() {
        let mut ring = RawLogBuffer::new();
        ring.push(b"dropped");
        assert!(ring.is_empty());
    }

    #[test]
    fn test_first_owner_wins() {
        let mut ring = RawLogBuffer::new();
        ring.enable(1);
        ring.enable(0);
        assert_eq!(ring.owner(), Some(1));

        // Non-owner disable is a no-op
        ring.disable(0);
        assert!(ring.is_enabled());

        ring.disable(1);
        assert!(!ring.is_enabled());
    }

    #[test]
    fn test_push_drain_round_trip() {
        let mut ring = RawLogBuffer::new();
        ring.enable(0);
        ring.push(b"$GNGGA,1");
        ring.push(b"85115.00");

        let mut out = [0u8; 32];
        let n = ring.drain_into(&mut out);
        assert_eq!(&out[..n], b"$GNGGA,185115.00");
        assert!(ring.is_empty());
    }

    #[test]
    fn test_partial_drain_keeps_remainder() {
        let mut ring = RawLogBuffer::new();
        ring.enable(0);
        ring.push(b"abcdef");

        let mut out = [0u8; 4];
        assert_eq!(ring.drain_into(&mut out), 4);
        assert_eq!(&out, b"abcd");
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let mut ring = RawLogBuffer::new();
        ring.enable(0);

        for _ in 0..RAW_LOG_CAPACITY {
            ring.push(&[0xAA]);
        }
        assert_eq!(ring.overflow_count(), 0);

        ring.push(&[0xBB, 0xCC]);
        assert_eq!(ring.overflow_count(), 2);
        assert_eq!(ring.len(), RAW_LOG_CAPACITY);

        // Drain everything; the tail must carry the newest bytes
        let mut out = [0u8; RAW_LOG_CAPACITY];
        let n = ring.drain_into(&mut out);
        assert_eq!(n, RAW_LOG_CAPACITY);
        assert_eq!(&out[n - 2..n], &[0xBB, 0xCC]);
    }

    #[test]
    fn test_disable_clears_ring() {
        let mut ring = RawLogBuffer::new();
        ring.enable(0);
        ring.push(b"data");
        ring.disable(0);

        ring.enable(1);
        assert!(ring.is_empty());
        assert_eq!(ring.overflow_count(), 0);
    }
}
