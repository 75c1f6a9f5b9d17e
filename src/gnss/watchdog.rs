//! Receiver liveness watchdog
//!
//! The dispatcher stamps the watchdog on every accepted frame; the FSM
//! checks for expiry only while in `DeviceReady` and restarts the device
//! when the receiver has gone quiet. The timestamp is an atomic so feeds
//! from receive context are lock-free against the polled FSM.

use portable_atomic::{AtomicBool, AtomicU64, Ordering};

/// Silence threshold before a restart is triggered
pub const WATCHDOG_TIMEOUT_MS: u64 = 10_000;

/// Per-device liveness tracker
#[derive(Debug)]
pub struct Watchdog {
    last_feed_us: AtomicU64,
    armed: AtomicBool,
}

impl Watchdog {
    pub const fn new() -> Self {
        Self {
            last_feed_us: AtomicU64::new(0),
            armed: AtomicBool::new(false),
        }
    }

    /// Arm the watchdog, stamping the current time as the baseline
    pub fn arm(&self, now_us: u64) {
        self.last_feed_us.store(now_us, Ordering::Relaxed);
        self.armed.store(true, Ordering::Relaxed);
    }

    /// Disarm (device stopping or restarting)
    pub fn disarm(&self) {
        self.armed.store(false, Ordering::Relaxed);
    }

    /// Record receiver activity
    pub fn feed(&self, now_us: u64) {
        self.last_feed_us.store(now_us, Ordering::Relaxed);
    }

    /// Whether the silence threshold has elapsed since the last feed.
    ///
    /// Always false while disarmed.
    pub fn is_timed_out(&self, now_us: u64) -> bool {
        if !self.armed.load(Ordering::Relaxed) {
            return false;
        }
        let last = self.last_feed_us.load(Ordering::Relaxed);
        now_us.saturating_sub(last) > WATCHDOG_TIMEOUT_MS * 1000
    }
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}
