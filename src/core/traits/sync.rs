//! Synchronized state abstraction for cross-context access.
//!
//! The lifecycle FSM is polled from the application loop while the message
//! dispatcher runs from transport receive contexts; both mutate the same
//! registry. The application wraps the registry in a `SharedState` so every
//! entry point serializes on one mutex.

/// Platform-agnostic synchronized state access.
///
/// Implementations:
/// - `EmbassyState<T>` for embedded targets using Embassy's critical-section Mutex
/// - `MockState<T>` for host testing using RefCell (single-threaded)
///
/// # Example
///
/// ```ignore
/// fn feed_frame<S: SharedState<Registry>>(state: &S, frame: &[u8]) {
///     state.with_mut(|reg| reg.on_binary_frame(0, frame));
/// }
/// ```
pub trait SharedState<T> {
    /// Access state immutably.
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R;

    /// Access state mutably.
    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R;

    /// Access state mutably without blocking.
    ///
    /// Returns `None` if the state is currently held by another context.
    /// Receive contexts use this so a slow tick can never stall the bus.
    fn try_with_mut<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R;
}

// ============================================================================
// Embassy Implementation
// ============================================================================

#[cfg(feature = "embassy")]
use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

/// Embassy-based synchronized state using critical-section Mutex.
///
/// Interrupt-safe: the critical section makes access atomic with respect to
/// both async tasks and interrupt handlers.
#[cfg(feature = "embassy")]
pub struct EmbassyState<T> {
    inner: Mutex<CriticalSectionRawMutex, core::cell::RefCell<T>>,
}

#[cfg(feature = "embassy")]
impl<T> EmbassyState<T> {
    /// Creates a new `EmbassyState` wrapping the given value.
    ///
    /// This is a const fn, allowing static initialization.
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(core::cell::RefCell::new(value)),
        }
    }
}

#[cfg(feature = "embassy")]
impl<T> SharedState<T> for EmbassyState<T> {
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.inner.lock(|cell| f(&cell.borrow()))
    }

    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    fn try_with_mut<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        // The blocking mutex cannot be contended inside its critical section,
        // so a try-lock degenerates to a plain lock here.
        Some(self.with_mut(f))
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Mock synchronized state using RefCell for single-threaded testing.
///
/// # Panics
///
/// `with`/`with_mut` panic if borrowing rules are violated; use
/// `try_with_mut` to model a contended mutex in tests.
pub struct MockState<T> {
    inner: core::cell::RefCell<T>,
}

impl<T> MockState<T> {
    /// Creates a new `MockState` wrapping the given value.
    pub fn new(value: T) -> Self {
        Self {
            inner: core::cell::RefCell::new(value),
        }
    }
}

impl<T> SharedState<T> for MockState<T> {
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.inner.borrow())
    }

    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        f(&mut self.inner.borrow_mut())
    }

    fn try_with_mut<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        match self.inner.try_borrow_mut() {
            Ok(mut inner) => Some(f(&mut inner)),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_state_read_modify_read() {
        let state = MockState::new(0u32);

        assert_eq!(state.with(|v| *v), 0);
        state.with_mut(|v| *v += 10);
        assert_eq!(state.with(|v| *v), 10);
    }

    #[test]
    fn mock_state_closure_return_value() {
        let state = MockState::new([1u32, 2, 3]);
        let sum: u32 = state.with(|v| v.iter().sum());
        assert_eq!(sum, 6);
    }

    #[test]
    fn mock_state_try_with_mut_free() {
        let state = MockState::new(5u32);
        let result = state.try_with_mut(|v| {
            *v = 6;
            *v
        });
        assert_eq!(result, Some(6));
    }

    #[test]
    fn mock_state_try_with_mut_contended() {
        let state = MockState::new(5u32);
        let result = state.with(|_| state.try_with_mut(|v| *v));
        assert_eq!(result, None);
    }
}
