//! Monotonic time source abstraction
//!
//! The FSM compares elapsed time against wall-clock gates (open retry budget,
//! restart grace period, watchdog threshold) rather than scheduling timers,
//! so all it needs is a monotonic microsecond counter and a bounded delay.

/// Monotonic clock with bounded blocking delay
pub trait Clock {
    /// Microseconds since an arbitrary epoch, monotonic
    fn now_us(&self) -> u64;

    /// Block for the given number of milliseconds
    fn delay_ms(&mut self, ms: u32);

    /// Milliseconds since the epoch
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }
}

// ============================================================================
// Embassy Implementation
// ============================================================================

/// Clock backed by the Embassy time driver
#[cfg(feature = "embassy")]
#[derive(Debug, Default)]
pub struct EmbassyClock;

#[cfg(feature = "embassy")]
impl Clock for EmbassyClock {
    fn now_us(&self) -> u64 {
        embassy_time::Instant::now().as_micros()
    }

    fn delay_ms(&mut self, ms: u32) {
        embassy_time::block_for(embassy_time::Duration::from_millis(ms as u64));
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Mock clock with simulated time.
///
/// Delays advance the simulated counter instead of sleeping, so the bounded
/// retry loops and elapsed-time gates run instantly in tests.
#[derive(Debug, Default)]
pub struct MockClock {
    now_us: u64,
}

impl MockClock {
    /// Create a mock clock starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance simulated time by microseconds
    pub fn advance_us(&mut self, us: u64) {
        self.now_us = self.now_us.wrapping_add(us);
    }

    /// Advance simulated time by milliseconds
    pub fn advance_ms(&mut self, ms: u64) {
        self.advance_us(ms.saturating_mul(1000));
    }
}

impl Clock for MockClock {
    fn now_us(&self) -> u64 {
        self.now_us
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance_ms(ms as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_clock_advance() {
        let mut clock = MockClock::new();
        assert_eq!(clock.now_us(), 0);

        clock.advance_ms(3);
        assert_eq!(clock.now_us(), 3000);
        assert_eq!(clock.now_ms(), 3);
    }

    #[test]
    fn test_mock_clock_delay_advances_time() {
        let mut clock = MockClock::new();
        clock.delay_ms(50);
        assert_eq!(clock.now_ms(), 50);
    }
}
