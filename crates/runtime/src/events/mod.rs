//! Topic-based event bus for raid events.
//!
//! Events are published to specific topics after the transition that caused
//! them has committed; consumers subscribe only to the topics they need.

mod bus;
mod types;

pub use bus::{EventBus, Topic};
pub use types::{RaidEvent, RaidSummary};
