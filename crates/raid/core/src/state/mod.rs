//! Raid state: identifiers, the [`RaidAttempt`] aggregate, and its result payload.
mod attempt;
mod common;
mod result;

pub use attempt::{
    CombatRecord, Participant, RaidAttempt, RaidOrigin, RaidStatus, RaidTimeline, Role,
    TargetDescriptor,
};
pub use common::{
    AssetId, CharacterId, ConflictId, FactionId, FactionRef, RaidId, TargetKind, TargetRef,
    Timestamp, ZoneId,
};
pub use result::{
    CounterAttack, DamageDetail, InfluenceDamage, OutcomeTier, PropertyDamage, ProductionDamage,
    RESULT_SCHEMA_VERSION, RaidResult, TreasuryDamage,
};

/// Terminal status implied by a result.
///
/// Any damage completes the raid. An effective tier that happened to deal no
/// damage (empty storage, pristine treasury already at zero) counts as
/// defended; failure tiers end as failed.
pub fn terminal_status(result: &RaidResult) -> RaidStatus {
    if result.total_damage > 0 {
        RaidStatus::Completed
    } else if result.outcome.is_effective() {
        RaidStatus::Defended
    } else {
        RaidStatus::Failed
    }
}
