//! Target eligibility for new raids.
//!
//! The runtime gathers [`TargetFacts`] from its stores; the ordering of the
//! checks below decides which rejection a caller sees when several apply.

use super::Rejection;
use crate::state::{FactionId, FactionRef, TargetKind, TargetRef, Timestamp};

/// Store-derived facts about a target at planning time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetFacts {
    /// Cooldown recorded for the attacking faction against this target.
    pub cooldown_until: Option<Timestamp>,
    pub immune_until: Option<Timestamp>,
    /// The owning character belongs to the attacking faction.
    pub owner_in_attacking_faction: bool,
    /// Owner or controller of the target.
    pub owner_faction: Option<FactionRef>,
    /// The attacking faction already has a planning, scheduled or in-progress raid on this target.
    pub active_attempt: bool,
}

/// Checks whether `attacker` may open a raid against `target`.
pub fn check_target(
    attacker: FactionId,
    target: TargetRef,
    facts: &TargetFacts,
    now: Timestamp,
) -> Result<(), Rejection> {
    if let Some(until) = facts.cooldown_until.filter(|until| *until > now) {
        return Err(Rejection::OnCooldown { until });
    }
    if let Some(until) = facts.immune_until.filter(|until| *until > now) {
        return Err(Rejection::TargetImmune { until });
    }
    if facts.owner_in_attacking_faction {
        return Err(Rejection::SelfOwnedTarget);
    }

    let owned_by_attacker = facts
        .owner_faction
        .as_ref()
        .is_some_and(|owner| owner.id == attacker);
    if owned_by_attacker {
        return Err(match target.kind {
            TargetKind::Treasury | TargetKind::TerritoryInfluence => Rejection::OwnTreasury,
            TargetKind::Property | TargetKind::Production => Rejection::SelfOwnedTarget,
        });
    }

    if facts.active_attempt {
        return Err(Rejection::ActiveAttemptExists);
    }
    // Assets may belong to characters outside any faction.
    let needs_defender = matches!(
        target.kind,
        TargetKind::Treasury | TargetKind::TerritoryInfluence
    );
    if needs_defender && facts.owner_faction.is_none() {
        return Err(Rejection::NoDefendingFaction);
    }
    Ok(())
}
