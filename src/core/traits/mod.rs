//! Platform-agnostic core traits

pub mod sync;
pub mod time;

pub use sync::{MockState, SharedState};
pub use time::{Clock, MockClock};

#[cfg(feature = "embassy")]
pub use sync::EmbassyState;
#[cfg(feature = "embassy")]
pub use time::EmbassyClock;
