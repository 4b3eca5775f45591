//! Collaborator store contracts and their in-memory implementation.
//!
//! Services never talk to a backend directly: they receive a view implementing
//! the store traits from a [`RaidStore`], which owns atomicity.

mod error;
pub mod memory;
pub mod records;
mod traits;

pub use error::{Result, StoreError};
pub use memory::{InMemoryRaidStore, MemoryWorld};
pub use records::{
    CharacterRecord, ConflictRecord, ContributionEntry, FactionRecord, ProductionJob,
    ProductionLine, PropertyRecord, RaidHistoryEntry, StorageLoss, StorageStack, ZoneRecord,
};
pub use traits::{
    CharacterStore, ConflictLedger, FactionStore, PropertyStore, RaidRepository, RaidStore,
    TerritoryStore, WorldView,
};
