//! Seed world for the scripted campaign.

use chrono::Duration;
use raid_core::{AssetId, CharacterId, CombatStats, FactionId, Timestamp, ZoneId};
use raid_runtime::{
    CharacterRecord, FactionRecord, MemoryWorld, ProductionJob, ProductionLine, PropertyRecord,
    StorageStack, ZoneRecord,
};

pub const HARBOR: ZoneId = ZoneId(1);
pub const MARKET: ZoneId = ZoneId(2);

pub const CROWS: FactionId = FactionId(1);
pub const CROW_BOSS: CharacterId = CharacterId(1);
pub const CROW_MUSCLE: CharacterId = CharacterId(2);
pub const CROW_SCOUT: CharacterId = CharacterId(3);

pub const SAINTS: FactionId = FactionId(2);
pub const SAINT_BOSS: CharacterId = CharacterId(10);
pub const SAINT_COOK: CharacterId = CharacterId(11);

pub const STASH_HOUSE: AssetId = AssetId(100);
pub const KITCHEN: AssetId = AssetId(101);

/// Two gangs: the Crows at the harbor, the Saints holding the market.
pub fn seed(now: Timestamp) -> MemoryWorld {
    let mut world = MemoryWorld::new();

    world.insert_zone(ZoneRecord::new(HARBOR, "Harbor"));
    let mut market = ZoneRecord::new(MARKET, "Market");
    market.controller = Some(SAINTS);
    market.influence.insert(SAINTS, 70);
    market.influence.insert(CROWS, 20);
    world.insert_zone(market);

    for (id, name, stats) in [
        (CROW_BOSS, "Marlowe", CombatStats::new(55, 45, 18)),
        (CROW_MUSCLE, "Tank", CombatStats::new(70, 50, 12)),
        (CROW_SCOUT, "Pip", CombatStats::new(25, 20, 6)),
        (SAINT_BOSS, "Deacon", CombatStats::new(50, 60, 16)),
        (SAINT_COOK, "Sable", CombatStats::new(15, 20, 5)),
    ] {
        world.insert_character(CharacterRecord::new(id, name, stats));
    }

    let mut crows = FactionRecord::new(CROWS, "Crows", CROW_BOSS, HARBOR);
    crows.members.extend([CROW_MUSCLE, CROW_SCOUT]);
    crows.treasury = 40_000;
    world.insert_faction(crows);

    let mut saints = FactionRecord::new(SAINTS, "Saints", SAINT_BOSS, MARKET);
    saints.members.insert(SAINT_COOK);
    saints.level = 2;
    saints.treasury = 25_000;
    world.insert_faction(saints);

    let mut stash = PropertyRecord::new(STASH_HOUSE, "Saints Stash House", MARKET, SAINT_BOSS);
    stash.guards = 2;
    stash.security_level = 1;
    stash.storage = vec![
        StorageStack::new("cigarettes", 200, 15),
        StorageStack::new("electronics", 12, 400),
    ];
    world.insert_property(stash);

    let mut kitchen = PropertyRecord::new(KITCHEN, "Back Street Kitchen", MARKET, SAINT_COOK);
    kitchen.storage = vec![StorageStack::new("product", 30, 120)];
    kitchen.production = Some(ProductionLine {
        active_workers: 4,
        jobs: vec![ProductionJob {
            item: "product".into(),
            completes_at: now + Duration::hours(6),
        }],
    });
    world.insert_property(kitchen);

    world
}
