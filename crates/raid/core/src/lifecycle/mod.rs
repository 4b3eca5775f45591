//! Raid lifecycle state machine.
//!
//! ```text
//! planning ──schedule──▶ scheduled ──begin──▶ in_progress ──complete──▶ completed | failed | defended
//!     │                      │
//!     └──────cancel──────────┴──▶ cancelled
//! ```
//!
//! Guards that only need the attempt itself (status, roster, lead time,
//! actor identity) are enforced here. Guards that need store lookups
//! (membership, funds, cooldowns) live in [`eligibility`] and in the runtime.

pub mod eligibility;
mod error;

pub use eligibility::{TargetFacts, check_target};
pub use error::{LifecycleError, Rejection};

use crate::config::LifecycleRules;
use crate::state::{
    CharacterId, CombatRecord, Participant, RaidAttempt, RaidResult, RaidStatus, Role, Timestamp,
    terminal_status,
};

impl RaidStatus {
    /// Legal edges of the lifecycle graph.
    pub const fn can_transition_to(self, to: RaidStatus) -> bool {
        use RaidStatus::*;
        matches!(
            (self, to),
            (Planning, Scheduled)
                | (Planning, Cancelled)
                | (Scheduled, Cancelled)
                | (Scheduled, InProgress)
                | (InProgress, Completed)
                | (InProgress, Failed)
                | (InProgress, Defended)
        )
    }
}

impl RaidAttempt {
    fn transition(&mut self, to: RaidStatus) -> Result<(), LifecycleError> {
        if !self.status.can_transition_to(to) {
            return Err(LifecycleError {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    fn require_pre_execution(&self) -> Result<(), Rejection> {
        if !self.status.is_pre_execution() {
            return Err(Rejection::InvalidStatus {
                status: self.status,
            });
        }
        Ok(())
    }

    fn is_leader(&self, character: CharacterId) -> bool {
        self.leader().is_some_and(|leader| leader.character == character)
    }

    /// `planning -> scheduled`. Only the raid leader may schedule, and the
    /// execution time must fall strictly inside the configured lead window.
    pub fn schedule(
        &mut self,
        actor: CharacterId,
        execute_at: Timestamp,
        now: Timestamp,
        rules: &LifecycleRules,
    ) -> Result<(), Rejection> {
        if self.status != RaidStatus::Planning {
            return Err(Rejection::InvalidStatus {
                status: self.status,
            });
        }
        if !self.is_leader(actor) {
            return Err(Rejection::Unauthorized { actor });
        }

        let lead = execute_at - now;
        if lead <= rules.min_lead() || lead >= rules.max_lead() {
            return Err(Rejection::SchedulingWindow {
                min: rules.min_lead(),
                max: rules.max_lead(),
            });
        }

        self.status = RaidStatus::Scheduled;
        self.timeline.scheduled_for = Some(execute_at);
        Ok(())
    }

    /// Adds a participant before execution. The leader slot is fixed, so a
    /// joiner asking for it is enrolled as an attacker.
    pub fn join(&mut self, participant: Participant, max_roster: usize) -> Result<(), Rejection> {
        self.require_pre_execution()?;
        if self.is_on_roster(participant.character) {
            return Err(Rejection::AlreadyOnRoster {
                character: participant.character,
            });
        }
        if self.roster.len() >= max_roster {
            return Err(Rejection::RosterFull { max: max_roster });
        }

        let role = match participant.role {
            Role::Leader => Role::Attacker,
            other => other,
        };
        self.roster.push(Participant {
            role,
            contribution: 0,
            ..participant
        });
        Ok(())
    }

    /// Removes a non-leader participant before execution.
    pub fn leave(&mut self, character: CharacterId) -> Result<(), Rejection> {
        self.require_pre_execution()?;
        if self.is_leader(character) {
            return Err(Rejection::Unauthorized { actor: character });
        }
        let index = self
            .roster
            .iter()
            .position(|p| p.character == character)
            .ok_or(Rejection::NotOnRoster { character })?;
        self.roster.remove(index);
        Ok(())
    }

    /// `planning | scheduled -> cancelled`, by the raid leader or the
    /// attacking faction's leader.
    pub fn cancel(
        &mut self,
        actor: CharacterId,
        faction_leader: CharacterId,
        now: Timestamp,
    ) -> Result<(), Rejection> {
        self.require_pre_execution()?;
        if !self.is_leader(actor) && actor != faction_leader {
            return Err(Rejection::Unauthorized { actor });
        }
        self.status = RaidStatus::Cancelled;
        self.timeline.completed_at = Some(now);
        Ok(())
    }

    /// `scheduled -> in_progress`.
    pub fn begin(&mut self, now: Timestamp) -> Result<(), LifecycleError> {
        self.transition(RaidStatus::InProgress)?;
        self.timeline.started_at = Some(now);
        Ok(())
    }

    /// `in_progress -> completed | failed | defended`, chosen from the result.
    pub fn complete(
        &mut self,
        combat: CombatRecord,
        result: RaidResult,
        now: Timestamp,
    ) -> Result<RaidStatus, LifecycleError> {
        let status = terminal_status(&result);
        self.transition(status)?;
        self.combat = Some(combat);
        self.result = Some(result);
        self.timeline.completed_at = Some(now);
        Ok(status)
    }

    /// Sets each participant's contribution score.
    pub fn credit_participants(&mut self, mut points: impl FnMut(&Participant) -> u32) {
        for participant in &mut self.roster {
            participant.contribution = points(participant);
        }
    }
}
