//! Shared adapter building blocks.

mod listeners;
mod system_clock;

pub use listeners::ListenerRegistry;
pub use system_clock::{FixedClock, SystemClock};
