//! Deterministic raid rules shared by the runtime and offline tools.
//!
//! `raid-core` defines the raid aggregate, its lifecycle state machine, and the
//! pure combat math (power, outcome, damage, contribution). It performs no I/O:
//! stores, clocks and notifications are the runtime's concern, and every random
//! draw goes through an injected [`RngOracle`].
pub mod combat;
pub mod config;
pub mod env;
pub mod error;
pub mod lifecycle;
pub mod state;

pub use combat::{
    CombatStats, ContributionKind, DamageRoll, DefenseProfile, OutcomeRoll, apply_war_context,
    attack_power, defense_power, participant_points, portion_of, resolve_outcome,
    roll_counter_attack, roll_damage, units_lost,
};
pub use config::{
    ConfigError, ContributionRules, DamageRules, LifecycleRules, OutcomeRules, PowerRules,
    RaidConfig, TierTable,
};
pub use env::{PcgRng, RaidDice, RngOracle, RollContext};
pub use error::{DomainError, ErrorSeverity};
pub use lifecycle::{LifecycleError, Rejection, TargetFacts, check_target};
pub use state::{
    AssetId, CharacterId, CombatRecord, ConflictId, CounterAttack, DamageDetail, FactionId,
    FactionRef, InfluenceDamage, OutcomeTier, Participant, ProductionDamage, PropertyDamage,
    RESULT_SCHEMA_VERSION, RaidAttempt, RaidId, RaidOrigin, RaidResult, RaidStatus, RaidTimeline,
    Role, TargetDescriptor, TargetKind, TargetRef, Timestamp, TreasuryDamage, ZoneId,
    terminal_status,
};
