//! Contribution scoring.

use crate::config::ContributionRules;
use crate::state::{OutcomeTier, Role};

/// Category a contribution is filed under on a conflict ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ContributionKind {
    RaidLed,
    RaidParticipated,
    RaidDefended,
}

impl ContributionKind {
    pub const fn for_role(role: Role) -> Self {
        match role {
            Role::Leader => Self::RaidLed,
            Role::Attacker | Role::Scout => Self::RaidParticipated,
        }
    }
}

/// Points earned by one participant.
///
/// ```text
/// points = round(role_points * outcome_factor) (+ bonus on critical success)
/// ```
pub fn participant_points(role: Role, tier: OutcomeTier, rules: &ContributionRules) -> u32 {
    let base = f64::from(rules.role_points(role)) * rules.outcome_factor.get(tier);
    let mut points = base.round().max(0.0) as u32;
    if tier == OutcomeTier::CriticalSuccess {
        points += rules.critical_success_bonus;
    }
    points
}
