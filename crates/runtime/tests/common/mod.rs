//! Shared world fixture for the runtime integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use raid_core::{
    AssetId, CharacterId, CombatStats, ConflictId, FactionId, PcgRng, RaidAttempt, RaidConfig,
    RngOracle, Role, TargetRef, Timestamp, ZoneId,
};
use raid_runtime::{
    CharacterRecord, Clock, ConflictRecord, EventBus, FactionRecord, InMemoryRaidStore, ManualClock,
    MemoryWorld, PlanRaid, ProductionJob, ProductionLine, PropertyRecord, RaidCoordinator,
    RaidStore, SeedPolicy, StorageStack, ZoneRecord,
};

pub const DOCKS: ZoneId = ZoneId(1);
pub const UPTOWN: ZoneId = ZoneId(2);
pub const BADLANDS: ZoneId = ZoneId(3);

/// Attacking faction.
pub const WOLVES: FactionId = FactionId(1);
pub const ASH: CharacterId = CharacterId(1);
pub const BO: CharacterId = CharacterId(2);
pub const CY: CharacterId = CharacterId(3);

/// Defending faction.
pub const VIPERS: FactionId = FactionId(2);
pub const VEX: CharacterId = CharacterId(10);
pub const WREN: CharacterId = CharacterId(11);

/// Belongs to no faction.
pub const DRIFTER: CharacterId = CharacterId(20);

/// Owned by VEX.
pub const WAREHOUSE: AssetId = AssetId(100);
/// Owned by BO, a Wolves member.
pub const DEN: AssetId = AssetId(101);
/// Production facility owned by WREN.
pub const LAB: AssetId = AssetId(102);
/// Owned by DRIFTER, so no faction defends it.
pub const MILL: AssetId = AssetId(103);

pub const WOLVES_TREASURY: u64 = 50_000;
pub const VIPERS_TREASURY: u64 = 20_000;

pub fn start_time() -> Timestamp {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0)
        .single()
        .expect("valid start time")
}

/// Oracle returning the same value for every seed.
pub struct ConstantRng(pub u32);

impl RngOracle for ConstantRng {
    fn next_u32(&self, _seed: u64) -> u32 {
        self.0
    }
}

/// Every draw at its maximum: critical success, maximum damage.
pub fn high_rolls() -> Arc<dyn RngOracle> {
    Arc::new(ConstantRng(u32::MAX))
}

/// Every draw at its minimum: critical failure, counter-attack fires.
pub fn low_rolls() -> Arc<dyn RngOracle> {
    Arc::new(ConstantRng(0))
}

pub fn world() -> MemoryWorld {
    let mut world = MemoryWorld::new();

    world.insert_zone(ZoneRecord::new(DOCKS, "Docks"));
    let mut uptown = ZoneRecord::new(UPTOWN, "Uptown");
    uptown.controller = Some(VIPERS);
    uptown.influence.insert(VIPERS, 60);
    uptown.influence.insert(WOLVES, 15);
    world.insert_zone(uptown);
    world.insert_zone(ZoneRecord::new(BADLANDS, "Badlands"));

    for (id, name, stats) in [
        (ASH, "Ash", CombatStats::new(60, 60, 20)),
        (BO, "Bo", CombatStats::new(40, 40, 10)),
        (CY, "Cy", CombatStats::new(30, 30, 5)),
        (VEX, "Vex", CombatStats::new(10, 10, 2)),
        (WREN, "Wren", CombatStats::new(8, 8, 1)),
        (DRIFTER, "Drifter", CombatStats::new(20, 20, 4)),
    ] {
        world.insert_character(CharacterRecord::new(id, name, stats));
    }

    let mut wolves = FactionRecord::new(WOLVES, "Wolves", ASH, DOCKS);
    wolves.members.extend([BO, CY]);
    wolves.treasury = WOLVES_TREASURY;
    world.insert_faction(wolves);

    let mut vipers = FactionRecord::new(VIPERS, "Vipers", VEX, UPTOWN);
    vipers.members.insert(WREN);
    vipers.treasury = VIPERS_TREASURY;
    world.insert_faction(vipers);

    let mut warehouse = PropertyRecord::new(WAREHOUSE, "Viper Warehouse", UPTOWN, VEX);
    warehouse.guards = 1;
    warehouse.security_level = 1;
    warehouse.storage = vec![
        StorageStack::new("crates", 100, 50),
        StorageStack::new("ammo", 10, 200),
    ];
    world.insert_property(warehouse);

    world.insert_property(PropertyRecord::new(DEN, "Wolf Den", DOCKS, BO));

    let mut lab = PropertyRecord::new(LAB, "Viper Lab", UPTOWN, WREN);
    lab.storage = vec![StorageStack::new("product", 40, 100)];
    lab.production = Some(ProductionLine {
        active_workers: 3,
        jobs: vec![ProductionJob {
            item: "product".into(),
            completes_at: start_time() + Duration::hours(2),
        }],
    });
    world.insert_property(lab);

    world.insert_property(PropertyRecord::new(MILL, "Abandoned Mill", DOCKS, DRIFTER));

    world
}

/// Same world with the two factions at war.
pub fn world_at_war() -> MemoryWorld {
    let mut world = world();
    world.insert_conflict(ConflictRecord {
        id: ConflictId(7),
        factions: (WOLVES, VIPERS),
        active: true,
    });
    world
}

pub struct Fixture {
    pub store: Arc<InMemoryRaidStore>,
    pub clock: Arc<ManualClock>,
    pub events: EventBus,
    pub coordinator: RaidCoordinator<InMemoryRaidStore>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with(world(), Arc::new(PcgRng))
    }

    pub fn with_rng(rng: Arc<dyn RngOracle>) -> Self {
        Self::with(world(), rng)
    }

    pub fn with(world: MemoryWorld, rng: Arc<dyn RngOracle>) -> Self {
        Self::with_config(world, rng, RaidConfig::default())
    }

    pub fn with_config(world: MemoryWorld, rng: Arc<dyn RngOracle>, config: RaidConfig) -> Self {
        let store = Arc::new(InMemoryRaidStore::new(world));
        let clock = Arc::new(ManualClock::new(start_time()));
        let events = EventBus::with_capacity(64);
        let coordinator = RaidCoordinator::new(
            Arc::clone(&store),
            Arc::new(config),
            clock.clone(),
            rng,
            SeedPolicy::Fixed(42),
            events.clone(),
        );
        Self {
            store,
            clock,
            events,
            coordinator,
        }
    }

    pub fn world<R>(&self, f: impl FnOnce(&MemoryWorld) -> R) -> R {
        self.store.read(f).expect("store readable")
    }

    pub fn treasury(&self, faction: FactionId) -> u64 {
        self.world(|world| {
            use raid_runtime::FactionStore;
            world.treasury_balance(faction).expect("faction exists")
        })
    }

    pub fn property(&self, id: AssetId) -> PropertyRecord {
        self.world(|world| {
            use raid_runtime::PropertyStore;
            world.property(id).expect("store readable").expect("property exists")
        })
    }

    /// Wolves raid `target` with ASH leading.
    pub fn plan(&self, target: TargetRef) -> RaidAttempt {
        self.coordinator
            .plan_raid(PlanRaid {
                attacker: WOLVES,
                planned_by: ASH,
                leader: ASH,
                target,
            })
            .expect("raid should be planned")
    }

    /// Plans and schedules one hour out.
    pub fn schedule(&self, target: TargetRef) -> RaidAttempt {
        let attempt = self.plan(target);
        self.coordinator
            .schedule_raid(attempt.id(), ASH, self.clock.now() + Duration::hours(1))
            .expect("raid should be scheduled")
    }

    /// Plans, schedules, adds BO as attacker and moves the clock past execution time.
    pub fn ready(&self, target: TargetRef) -> RaidAttempt {
        let attempt = self.schedule(target);
        self.coordinator
            .join_raid(attempt.id(), BO, Role::Attacker)
            .expect("BO should join");
        self.clock.advance(Duration::minutes(61));
        attempt
    }
}
