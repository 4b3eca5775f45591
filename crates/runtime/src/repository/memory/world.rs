//! In-memory world backing every store trait.

use std::collections::{BTreeMap, HashMap};

use chrono::Duration;
use raid_core::combat::units_lost;
use raid_core::{
    AssetId, CharacterId, CombatStats, ConflictId, FactionId, RaidAttempt, RaidId, RaidStatus,
    TargetRef, Timestamp, ZoneId,
};

use crate::repository::records::{
    CharacterRecord, ConflictRecord, ContributionEntry, FactionRecord, PropertyRecord,
    RaidHistoryEntry, StorageLoss, ZoneRecord,
};
use crate::repository::{
    CharacterStore, ConflictLedger, FactionStore, PropertyStore, RaidRepository, Result,
    StoreError, TerritoryStore,
};

/// Plain-data world used by [`InMemoryRaidStore`](super::InMemoryRaidStore).
///
/// Cloning the world is how a transaction gets its isolated snapshot.
#[derive(Clone, Debug, Default)]
pub struct MemoryWorld {
    properties: HashMap<AssetId, PropertyRecord>,
    factions: HashMap<FactionId, FactionRecord>,
    zones: HashMap<ZoneId, ZoneRecord>,
    characters: HashMap<CharacterId, CharacterRecord>,
    conflicts: Vec<ConflictRecord>,
    contributions: Vec<ContributionEntry>,
    raids: BTreeMap<RaidId, RaidAttempt>,
    cooldowns: HashMap<(FactionId, TargetRef), Timestamp>,
    last_raid_id: u64,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_property(&mut self, property: PropertyRecord) {
        self.properties.insert(property.id, property);
    }

    pub fn insert_faction(&mut self, faction: FactionRecord) {
        self.factions.insert(faction.id, faction);
    }

    pub fn insert_zone(&mut self, zone: ZoneRecord) {
        self.zones.insert(zone.id, zone);
    }

    pub fn insert_character(&mut self, character: CharacterRecord) {
        self.characters.insert(character.id, character);
    }

    pub fn insert_conflict(&mut self, conflict: ConflictRecord) {
        self.conflicts.push(conflict);
    }

    /// Every contribution recorded on any conflict ledger, in order.
    pub fn contributions(&self) -> &[ContributionEntry] {
        &self.contributions
    }

    fn property_mut(&mut self, id: AssetId) -> Result<&mut PropertyRecord> {
        self.properties
            .get_mut(&id)
            .ok_or_else(|| StoreError::missing("property", id.0))
    }

    fn faction_ref(&self, id: FactionId) -> Result<&FactionRecord> {
        self.factions
            .get(&id)
            .ok_or_else(|| StoreError::missing("faction", id.0))
    }

    fn faction_mut(&mut self, id: FactionId) -> Result<&mut FactionRecord> {
        self.factions
            .get_mut(&id)
            .ok_or_else(|| StoreError::missing("faction", id.0))
    }
}

impl PropertyStore for MemoryWorld {
    fn property(&self, id: AssetId) -> Result<Option<PropertyRecord>> {
        Ok(self.properties.get(&id).cloned())
    }

    fn defense_level(&self, id: AssetId) -> Result<u64> {
        self.properties
            .get(&id)
            .map(PropertyRecord::defense_level)
            .ok_or_else(|| StoreError::missing("property", id.0))
    }

    fn active_workers(&self, id: AssetId) -> Result<u32> {
        let property = self
            .properties
            .get(&id)
            .ok_or_else(|| StoreError::missing("property", id.0))?;
        Ok(property
            .production
            .as_ref()
            .map_or(0, |line| line.active_workers))
    }

    fn apply_storage_loss(&mut self, id: AssetId, fraction: f64) -> Result<StorageLoss> {
        let property = self.property_mut(id)?;
        let mut loss = StorageLoss::default();
        for stack in &mut property.storage {
            let removed = units_lost(stack.quantity, fraction);
            stack.quantity -= removed;
            loss.units_removed += removed;
            loss.value_removed = loss
                .value_removed
                .saturating_add(removed.saturating_mul(stack.unit_value));
        }
        property.storage.retain(|stack| stack.quantity > 0);
        Ok(loss)
    }

    fn apply_condition_damage(&mut self, id: AssetId, amount: u32) -> Result<u32> {
        let property = self.property_mut(id)?;
        let applied = amount.min(property.condition);
        property.condition -= applied;
        Ok(applied)
    }

    fn set_immunity_until(&mut self, id: AssetId, until: Timestamp) -> Result<()> {
        self.property_mut(id)?.immune_until = Some(until);
        Ok(())
    }

    fn append_raid_history(&mut self, id: AssetId, entry: RaidHistoryEntry) -> Result<()> {
        self.property_mut(id)?.raid_history.push(entry);
        Ok(())
    }

    fn delay_production(&mut self, id: AssetId, delay: Duration) -> Result<usize> {
        let property = self.property_mut(id)?;
        let Some(line) = property.production.as_mut() else {
            return Ok(0);
        };
        for job in &mut line.jobs {
            job.completes_at += delay;
        }
        Ok(line.jobs.len())
    }
}

impl FactionStore for MemoryWorld {
    fn faction(&self, id: FactionId) -> Result<Option<FactionRecord>> {
        Ok(self.factions.get(&id).cloned())
    }

    fn treasury_balance(&self, id: FactionId) -> Result<u64> {
        Ok(self.faction_ref(id)?.treasury)
    }

    fn debit_treasury(&mut self, id: FactionId, amount: u64) -> Result<()> {
        let faction = self.faction_mut(id)?;
        if faction.treasury < amount {
            return Err(StoreError::InsufficientBalance {
                faction: id,
                requested: amount,
                available: faction.treasury,
            });
        }
        faction.treasury -= amount;
        Ok(())
    }

    fn credit_treasury(&mut self, id: FactionId, amount: u64) -> Result<()> {
        let faction = self.faction_mut(id)?;
        faction.treasury = faction.treasury.saturating_add(amount);
        Ok(())
    }

    fn is_member(&self, faction: FactionId, character: CharacterId) -> Result<bool> {
        Ok(self.faction_ref(faction)?.members.contains(&character))
    }

    fn faction_of(&self, character: CharacterId) -> Result<Option<FactionId>> {
        Ok(self
            .factions
            .values()
            .find(|faction| faction.members.contains(&character))
            .map(|faction| faction.id))
    }

    fn level(&self, id: FactionId) -> Result<u32> {
        Ok(self.faction_ref(id)?.level)
    }

    fn member_count(&self, id: FactionId) -> Result<u32> {
        Ok(self.faction_ref(id)?.member_count())
    }
}

impl TerritoryStore for MemoryWorld {
    fn zone(&self, id: ZoneId) -> Result<Option<ZoneRecord>> {
        Ok(self.zones.get(&id).cloned())
    }

    fn influence(&self, zone: ZoneId, faction: FactionId) -> Result<u32> {
        let zone = self
            .zones
            .get(&zone)
            .ok_or_else(|| StoreError::missing("zone", zone.0))?;
        Ok(zone.influence.get(&faction).copied().unwrap_or(0))
    }

    fn reduce_influence(&mut self, zone: ZoneId, faction: FactionId, amount: u32) -> Result<u32> {
        let zone = self
            .zones
            .get_mut(&zone)
            .ok_or_else(|| StoreError::missing("zone", zone.0))?;
        let current = zone.influence.entry(faction).or_insert(0);
        let removed = amount.min(*current);
        *current -= removed;
        Ok(removed)
    }
}

impl CharacterStore for MemoryWorld {
    fn character(&self, id: CharacterId) -> Result<Option<CharacterRecord>> {
        Ok(self.characters.get(&id).cloned())
    }

    fn combat_stats(&self, id: CharacterId) -> Result<CombatStats> {
        self.characters
            .get(&id)
            .map(|character| character.stats)
            .ok_or_else(|| StoreError::missing("character", id.0))
    }
}

impl ConflictLedger for MemoryWorld {
    fn active_war(&self, a: FactionId, b: FactionId) -> Result<Option<ConflictId>> {
        Ok(self
            .conflicts
            .iter()
            .find(|conflict| conflict.active && conflict.involves(a, b))
            .map(|conflict| conflict.id))
    }

    fn record_contribution(&mut self, entry: ContributionEntry) -> Result<()> {
        self.contributions.push(entry);
        Ok(())
    }
}

impl RaidRepository for MemoryWorld {
    fn next_raid_id(&mut self) -> Result<RaidId> {
        self.last_raid_id += 1;
        Ok(RaidId(self.last_raid_id))
    }

    fn raid(&self, id: RaidId) -> Result<Option<RaidAttempt>> {
        Ok(self.raids.get(&id).cloned())
    }

    fn save_raid(&mut self, raid: &RaidAttempt) -> Result<()> {
        self.raids.insert(raid.id(), raid.clone());
        Ok(())
    }

    fn active_raid(&self, attacker: FactionId, target: TargetRef) -> Result<Option<RaidId>> {
        Ok(self
            .raids
            .values()
            .find(|raid| {
                raid.status().is_active()
                    && raid.attacker().id == attacker
                    && raid.target().target == target
            })
            .map(RaidAttempt::id))
    }

    fn cooldown_until(&self, attacker: FactionId, target: TargetRef) -> Result<Option<Timestamp>> {
        Ok(self.cooldowns.get(&(attacker, target)).copied())
    }

    fn set_cooldown(&mut self, attacker: FactionId, target: TargetRef, until: Timestamp) -> Result<()> {
        self.cooldowns.insert((attacker, target), until);
        Ok(())
    }

    fn due_raids(&self, now: Timestamp) -> Result<Vec<RaidId>> {
        let mut due: Vec<_> = self
            .raids
            .values()
            .filter(|raid| raid.status() == RaidStatus::Scheduled)
            .filter_map(|raid| {
                raid.timeline()
                    .scheduled_for
                    .filter(|at| *at <= now)
                    .map(|at| (at, raid.id()))
            })
            .collect();
        due.sort_unstable();
        Ok(due.into_iter().map(|(_, id)| id).collect())
    }

    fn raids_for_faction(&self, faction: FactionId) -> Result<Vec<RaidAttempt>> {
        Ok(self
            .raids
            .values()
            .filter(|raid| {
                raid.attacker().id == faction || raid.defender().is_some_and(|d| d.id == faction)
            })
            .cloned()
            .collect())
    }

    fn raids_for_target(&self, target: TargetRef) -> Result<Vec<RaidAttempt>> {
        Ok(self
            .raids
            .values()
            .filter(|raid| raid.target().target == target)
            .cloned()
            .collect())
    }
}
