//! Domain events published after each committed raid transition.

use raid_core::{
    CharacterId, FactionRef, OutcomeTier, RaidAttempt, RaidId, RaidResult, RaidStatus, Role,
    TargetDescriptor, Timestamp,
};
use serde::{Deserialize, Serialize};

/// Event emitted by the coordinator once its transaction has committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RaidEvent {
    Planned {
        raid: RaidId,
        attacker: FactionRef,
        target: TargetDescriptor,
        leader: CharacterId,
    },

    Joined {
        raid: RaidId,
        character: CharacterId,
        role: Role,
    },

    Left {
        raid: RaidId,
        character: CharacterId,
    },

    /// The defending faction should be warned.
    Scheduled {
        raid: RaidId,
        attacker: FactionRef,
        defender: Option<FactionRef>,
        target: TargetDescriptor,
        execute_at: Timestamp,
    },

    Cancelled {
        raid: RaidId,
        by: CharacterId,
        target: TargetDescriptor,
        roster: Vec<CharacterId>,
    },

    Resolved(Box<RaidSummary>),

    /// Non-player attack recorded without resolution.
    Recorded(Box<RaidSummary>),
}

/// Final state of a raid as both sides see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaidSummary {
    pub raid: RaidId,
    pub attacker: FactionRef,
    pub defender: Option<FactionRef>,
    pub target: TargetDescriptor,
    pub roster: Vec<CharacterId>,
    pub status: RaidStatus,
    pub result: RaidResult,
}

impl RaidSummary {
    /// Builds a summary from a terminal attempt. Returns `None` if it has no result.
    pub fn from_attempt(attempt: &RaidAttempt) -> Option<Self> {
        Some(Self {
            raid: attempt.id(),
            attacker: attempt.attacker().clone(),
            defender: attempt.defender().cloned(),
            target: attempt.target().clone(),
            roster: attempt.roster().iter().map(|p| p.character).collect(),
            status: attempt.status(),
            result: attempt.result()?.clone(),
        })
    }

    pub fn outcome(&self) -> OutcomeTier {
        self.result.outcome
    }
}

impl RaidEvent {
    pub fn raid(&self) -> RaidId {
        match self {
            Self::Planned { raid, .. }
            | Self::Joined { raid, .. }
            | Self::Left { raid, .. }
            | Self::Scheduled { raid, .. }
            | Self::Cancelled { raid, .. } => *raid,
            Self::Resolved(summary) | Self::Recorded(summary) => summary.raid,
        }
    }
}
