//! Raid services.
//!
//! [`RaidCoordinator`] owns the lifecycle and is the only entry point that
//! writes. The other services are stateless helpers it calls inside its
//! transactions; each takes the store view it needs as a generic parameter.

mod contribution;
mod coordinator;
mod damage;
mod power;
mod target;

pub use contribution::ContributionDispatcher;
pub use coordinator::{Execution, ExternalRaid, PlanRaid, RaidCoordinator, SeedPolicy};
pub use damage::DamageApplicator;
pub use power::PowerCalculator;
pub use target::TargetResolver;
