//! Records owned by the collaborator stores.
//!
//! These mirror what the surrounding game backend keeps about properties,
//! factions, zones and characters. The raid engine only reads and mutates them
//! through the store traits.

use std::collections::{BTreeSet, HashMap};

use raid_core::{
    AssetId, CharacterId, CombatStats, ConflictId, ContributionKind, FactionId, OutcomeTier,
    RaidId, Timestamp, ZoneId,
};

/// A stack of stored goods.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageStack {
    pub item: String,
    pub quantity: u64,
    /// Estimated currency value of one unit.
    pub unit_value: u64,
}

impl StorageStack {
    pub fn new(item: impl Into<String>, quantity: u64, unit_value: u64) -> Self {
        Self {
            item: item.into(),
            quantity,
            unit_value,
        }
    }
}

/// Goods removed by a storage loss.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StorageLoss {
    pub units_removed: u64,
    pub value_removed: u64,
}

/// In-flight production run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductionJob {
    pub item: String,
    pub completes_at: Timestamp,
}

/// Production line of a facility.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductionLine {
    pub active_workers: u32,
    pub jobs: Vec<ProductionJob>,
}

/// Raid entry appended to an asset's history.
#[derive(Clone, Debug, PartialEq)]
pub struct RaidHistoryEntry {
    pub raid: RaidId,
    pub attacker: FactionId,
    pub outcome: OutcomeTier,
    pub condition_damage: u32,
    pub storage_value_lost: u64,
    pub at: Timestamp,
}

/// Owned property or production facility.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyRecord {
    pub id: AssetId,
    pub name: String,
    pub zone: ZoneId,
    pub owner: CharacterId,
    /// 0 to [`PropertyRecord::MAX_CONDITION`].
    pub condition: u32,
    pub guards: u32,
    pub security_level: u32,
    pub storage: Vec<StorageStack>,
    /// Present only for production facilities.
    pub production: Option<ProductionLine>,
    pub immune_until: Option<Timestamp>,
    /// Insurance coverage end, if the property is insured.
    pub insured_until: Option<Timestamp>,
    pub raid_history: Vec<RaidHistoryEntry>,
}

impl PropertyRecord {
    pub const MAX_CONDITION: u32 = 100;
    const GUARD_DEFENSE: u64 = 8;
    const SECURITY_DEFENSE: u64 = 15;

    pub fn new(id: AssetId, name: impl Into<String>, zone: ZoneId, owner: CharacterId) -> Self {
        Self {
            id,
            name: name.into(),
            zone,
            owner,
            condition: Self::MAX_CONDITION,
            guards: 0,
            security_level: 0,
            storage: Vec::new(),
            production: None,
            immune_until: None,
            insured_until: None,
            raid_history: Vec::new(),
        }
    }

    /// Defense derived from hired guards and security upgrades.
    pub fn defense_level(&self) -> u64 {
        u64::from(self.guards) * Self::GUARD_DEFENSE
            + u64::from(self.security_level) * Self::SECURITY_DEFENSE
    }

    pub fn is_production(&self) -> bool {
        self.production.is_some()
    }

    pub fn is_insured(&self, now: Timestamp) -> bool {
        self.insured_until.is_some_and(|until| until > now)
    }

    pub fn storage_value(&self) -> u64 {
        self.storage
            .iter()
            .map(|stack| stack.quantity.saturating_mul(stack.unit_value))
            .sum()
    }
}

/// Player faction (gang).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FactionRecord {
    pub id: FactionId,
    pub name: String,
    pub leader: CharacterId,
    pub members: BTreeSet<CharacterId>,
    pub level: u32,
    pub treasury: u64,
    /// Zone reported for treasury targets.
    pub home_zone: ZoneId,
}

impl FactionRecord {
    /// Creates a faction whose only member is its leader.
    pub fn new(id: FactionId, name: impl Into<String>, leader: CharacterId, home_zone: ZoneId) -> Self {
        Self {
            id,
            name: name.into(),
            leader,
            members: BTreeSet::from([leader]),
            level: 1,
            treasury: 0,
            home_zone,
        }
    }

    pub fn member_count(&self) -> u32 {
        u32::try_from(self.members.len()).unwrap_or(u32::MAX)
    }
}

/// Contested zone and the influence each faction holds there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneRecord {
    pub id: ZoneId,
    pub name: String,
    pub controller: Option<FactionId>,
    pub influence: HashMap<FactionId, u32>,
}

impl ZoneRecord {
    pub fn new(id: ZoneId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            controller: None,
            influence: HashMap::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterRecord {
    pub id: CharacterId,
    pub name: String,
    pub stats: CombatStats,
}

impl CharacterRecord {
    pub fn new(id: CharacterId, name: impl Into<String>, stats: CombatStats) -> Self {
        Self {
            id,
            name: name.into(),
            stats,
        }
    }
}

/// Declared conflict between two factions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConflictRecord {
    pub id: ConflictId,
    pub factions: (FactionId, FactionId),
    pub active: bool,
}

impl ConflictRecord {
    pub fn involves(&self, a: FactionId, b: FactionId) -> bool {
        self.factions == (a, b) || self.factions == (b, a)
    }
}

/// Score entry on a conflict ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContributionEntry {
    pub conflict: ConflictId,
    pub raid: RaidId,
    pub faction: FactionId,
    pub character: CharacterId,
    pub kind: ContributionKind,
    pub points: u32,
}
