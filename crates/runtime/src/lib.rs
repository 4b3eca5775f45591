//! Runtime for the raid engine.
//!
//! This crate wires the pure rules of `raid-core` to the outside world: the
//! collaborator store ports and their unit of work, the services that resolve
//! raids, the event bus, and the background workers. Embedders build a
//! [`RaidRuntime`] and drive commands through its [`RaidCoordinator`].
//!
//! Modules are organized by responsibility:
//! - [`services`] hosts the lifecycle coordinator and its helpers
//! - [`repository`] defines the store ports and the in-memory store
//! - [`events`] provides the topic-based event bus
//! - [`runtime`] hosts the builder and env configuration
//! - [`clock`] and [`notification`] are the remaining ports
pub mod clock;
pub mod error;
pub mod events;
pub mod notification;
pub mod report;
pub mod repository;
pub mod runtime;
pub mod services;

mod workers;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{NotFoundKind, RaidError, Result};
pub use events::{EventBus, RaidEvent, RaidSummary, Topic};
pub use notification::{
    LogTransport, Notification, NotificationError, NotificationKind, NotificationTransport,
};
pub use report::{RaidReport, ReportError, parse_result};
pub use repository::{
    CharacterRecord, CharacterStore, ConflictLedger, ConflictRecord, ContributionEntry,
    FactionRecord, FactionStore, InMemoryRaidStore, MemoryWorld, ProductionJob, ProductionLine,
    PropertyRecord, PropertyStore, RaidHistoryEntry, RaidRepository, RaidStore, StorageLoss,
    StorageStack, StoreError, TerritoryStore, WorldView, ZoneRecord,
};
pub use runtime::{RaidRuntime, RaidRuntimeBuilder, RuntimeConfig};
pub use services::{
    ContributionDispatcher, DamageApplicator, Execution, ExternalRaid, PlanRaid, PowerCalculator,
    RaidCoordinator, SeedPolicy, TargetResolver,
};
pub use workers::{NotificationWorker, SchedulerWorker, TickReport, run_due_raids};
