//! Background tasks owned by the runtime.
//!
//! The scheduler drives execution of due raids; the notifier delivers
//! committed events to players. Both stop when the shutdown signal flips.

mod notifier;
mod scheduler;

pub use notifier::NotificationWorker;
pub use scheduler::{SchedulerWorker, TickReport, run_due_raids};
