//! Participation credit after a raid resolves.

use raid_core::{
    ContributionKind, ContributionRules, OutcomeTier, RaidAttempt, RaidStatus, participant_points,
};
use tracing::debug;

use crate::error::Result;
use crate::repository::{ConflictLedger, ContributionEntry, FactionStore};

pub struct ContributionDispatcher<'a> {
    rules: &'a ContributionRules,
}

impl<'a> ContributionDispatcher<'a> {
    pub fn new(rules: &'a ContributionRules) -> Self {
        Self { rules }
    }

    /// Scores every participant and, for war raids, books the scores on the
    /// conflict ledger. A defended war raid also credits the defending leader.
    pub fn award<V: ConflictLedger + FactionStore + ?Sized>(
        &self,
        view: &mut V,
        attempt: &mut RaidAttempt,
        tier: OutcomeTier,
        status: RaidStatus,
    ) -> Result<()> {
        attempt.credit_participants(|participant| participant_points(participant.role, tier, self.rules));

        let Some(conflict) = attempt.war() else {
            return Ok(());
        };

        for participant in attempt.roster() {
            view.record_contribution(ContributionEntry {
                conflict,
                raid: attempt.id(),
                faction: attempt.attacker().id,
                character: participant.character,
                kind: ContributionKind::for_role(participant.role),
                points: participant.contribution,
            })?;
        }

        if status == RaidStatus::Defended
            && let Some(defender) = attempt.defender()
            && let Some(faction) = view.faction(defender.id)?
        {
            view.record_contribution(ContributionEntry {
                conflict,
                raid: attempt.id(),
                faction: faction.id,
                character: faction.leader,
                kind: ContributionKind::RaidDefended,
                points: self.rules.defended_points,
            })?;
        }

        debug!(raid = %attempt.id(), %conflict, "recorded war contributions");
        Ok(())
    }
}
