//! Store contracts consumed by the raid services.
//!
//! Each collaborator (properties, factions, territory, characters, conflicts)
//! gets a narrow trait; the raid records themselves live behind
//! [`RaidRepository`]. A [`RaidStore`] hands out a view implementing all of
//! them at once, either read-only or inside an atomic transaction.

use chrono::Duration;
use raid_core::{
    AssetId, CharacterId, CombatStats, ConflictId, FactionId, RaidAttempt, RaidId, TargetRef,
    Timestamp, ZoneId,
};

use super::error::Result;
use super::records::{
    CharacterRecord, ContributionEntry, FactionRecord, PropertyRecord, RaidHistoryEntry,
    StorageLoss, ZoneRecord,
};

/// Properties and production facilities.
pub trait PropertyStore {
    fn property(&self, id: AssetId) -> Result<Option<PropertyRecord>>;

    fn defense_level(&self, id: AssetId) -> Result<u64>;

    /// Workers currently staffing the facility; zero for plain properties.
    fn active_workers(&self, id: AssetId) -> Result<u32>;

    /// Removes `fraction` of every stored stack.
    fn apply_storage_loss(&mut self, id: AssetId, fraction: f64) -> Result<StorageLoss>;

    /// Lowers condition, floored at zero. Returns the damage actually applied.
    fn apply_condition_damage(&mut self, id: AssetId, amount: u32) -> Result<u32>;

    fn set_immunity_until(&mut self, id: AssetId, until: Timestamp) -> Result<()>;

    fn append_raid_history(&mut self, id: AssetId, entry: RaidHistoryEntry) -> Result<()>;

    /// Pushes back every in-flight production run. Returns the number delayed.
    fn delay_production(&mut self, id: AssetId, delay: Duration) -> Result<usize>;
}

/// Factions, membership and treasuries.
pub trait FactionStore {
    fn faction(&self, id: FactionId) -> Result<Option<FactionRecord>>;

    fn treasury_balance(&self, id: FactionId) -> Result<u64>;

    /// Fails with [`StoreError::InsufficientBalance`](super::StoreError::InsufficientBalance)
    /// instead of going negative.
    fn debit_treasury(&mut self, id: FactionId, amount: u64) -> Result<()>;

    fn credit_treasury(&mut self, id: FactionId, amount: u64) -> Result<()>;

    fn is_member(&self, faction: FactionId, character: CharacterId) -> Result<bool>;

    fn faction_of(&self, character: CharacterId) -> Result<Option<FactionId>>;

    fn level(&self, id: FactionId) -> Result<u32>;

    fn member_count(&self, id: FactionId) -> Result<u32>;
}

/// Zone control and per-faction influence.
pub trait TerritoryStore {
    fn zone(&self, id: ZoneId) -> Result<Option<ZoneRecord>>;

    fn influence(&self, zone: ZoneId, faction: FactionId) -> Result<u32>;

    /// Lowers influence, floored at zero. Returns the amount actually removed.
    fn reduce_influence(&mut self, zone: ZoneId, faction: FactionId, amount: u32) -> Result<u32>;
}

pub trait CharacterStore {
    fn character(&self, id: CharacterId) -> Result<Option<CharacterRecord>>;

    fn combat_stats(&self, id: CharacterId) -> Result<CombatStats>;
}

/// Declared conflicts and their scoring ledger.
pub trait ConflictLedger {
    fn active_war(&self, a: FactionId, b: FactionId) -> Result<Option<ConflictId>>;

    fn is_active_war(&self, a: FactionId, b: FactionId) -> Result<bool> {
        Ok(self.active_war(a, b)?.is_some())
    }

    fn record_contribution(&mut self, entry: ContributionEntry) -> Result<()>;
}

/// Raid attempts and per-faction cooldowns.
pub trait RaidRepository {
    fn next_raid_id(&mut self) -> Result<RaidId>;

    fn raid(&self, id: RaidId) -> Result<Option<RaidAttempt>>;

    fn save_raid(&mut self, raid: &RaidAttempt) -> Result<()>;

    /// Active attempt by `attacker` against `target`, if any.
    fn active_raid(&self, attacker: FactionId, target: TargetRef) -> Result<Option<RaidId>>;

    fn cooldown_until(&self, attacker: FactionId, target: TargetRef) -> Result<Option<Timestamp>>;

    fn set_cooldown(&mut self, attacker: FactionId, target: TargetRef, until: Timestamp) -> Result<()>;

    /// Scheduled attempts whose execution time is at or before `now`, oldest first.
    fn due_raids(&self, now: Timestamp) -> Result<Vec<RaidId>>;

    /// Attempts where the faction is attacker or defender.
    fn raids_for_faction(&self, faction: FactionId) -> Result<Vec<RaidAttempt>>;

    fn raids_for_target(&self, target: TargetRef) -> Result<Vec<RaidAttempt>>;
}

/// Everything a raid transition touches.
pub trait WorldView:
    PropertyStore + FactionStore + TerritoryStore + CharacterStore + ConflictLedger + RaidRepository
{
}

impl<T> WorldView for T where
    T: PropertyStore + FactionStore + TerritoryStore + CharacterStore + ConflictLedger + RaidRepository
{
}

/// Unit of work over the whole world.
///
/// `transaction` runs the closure against an isolated view. Nothing written is
/// visible to others until the closure returns `Ok` and the commit succeeds;
/// an `Err` discards every write.
pub trait RaidStore: Send + Sync + 'static {
    type View: WorldView;

    fn read<R>(&self, f: impl FnOnce(&Self::View) -> R) -> Result<R>;

    fn transaction<R, E>(&self, f: impl FnOnce(&mut Self::View) -> std::result::Result<R, E>) -> std::result::Result<R, E>
    where
        E: From<super::StoreError>;
}
