//! Errors raised by lifecycle transitions and eligibility checks.

use chrono::Duration;

use crate::error::{DomainError, ErrorSeverity};
use crate::state::{CharacterId, RaidStatus, Timestamp};

/// Reason a request was rejected before any state was written.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("target is on cooldown for this faction until {until}")]
    OnCooldown { until: Timestamp },

    #[error("target is immune to raids until {until}")]
    TargetImmune { until: Timestamp },

    #[error("target is owned by a member of the attacking faction")]
    SelfOwnedTarget,

    #[error("a faction cannot raid its own treasury or territory")]
    OwnTreasury,

    #[error("an active raid against this target already exists")]
    ActiveAttemptExists,

    #[error("target has no defending faction")]
    NoDefendingFaction,

    #[error("insufficient faction funds: need {required}, have {available}")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("{actor} is not authorized to perform this action")]
    Unauthorized { actor: CharacterId },

    #[error("{character} is not a member of the attacking faction")]
    NotFactionMember { character: CharacterId },

    #[error("execution time must be between {min} and {max} from now")]
    SchedulingWindow { min: Duration, max: Duration },

    #[error("roster is full ({max} participants)")]
    RosterFull { max: usize },

    #[error("{character} is already on the roster")]
    AlreadyOnRoster { character: CharacterId },

    #[error("{character} is not on the roster")]
    NotOnRoster { character: CharacterId },

    #[error("operation not allowed while raid is {status}")]
    InvalidStatus { status: RaidStatus },
}

impl DomainError for Rejection {
    fn severity(&self) -> ErrorSeverity {
        use Rejection::*;
        match self {
            OnCooldown { .. } | TargetImmune { .. } | ActiveAttemptExists => {
                ErrorSeverity::Recoverable
            }
            InsufficientFunds { .. } | RosterFull { .. } => ErrorSeverity::Recoverable,
            SelfOwnedTarget | OwnTreasury | NoDefendingFaction => ErrorSeverity::Validation,
            Unauthorized { .. } | NotFactionMember { .. } => ErrorSeverity::Validation,
            SchedulingWindow { .. } | AlreadyOnRoster { .. } | NotOnRoster { .. } => {
                ErrorSeverity::Validation
            }
            InvalidStatus { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use Rejection::*;
        match self {
            OnCooldown { .. } => "RAID_ON_COOLDOWN",
            TargetImmune { .. } => "RAID_TARGET_IMMUNE",
            SelfOwnedTarget => "RAID_SELF_OWNED_TARGET",
            OwnTreasury => "RAID_OWN_TREASURY",
            ActiveAttemptExists => "RAID_ACTIVE_ATTEMPT_EXISTS",
            NoDefendingFaction => "RAID_NO_DEFENDING_FACTION",
            InsufficientFunds { .. } => "RAID_INSUFFICIENT_FUNDS",
            Unauthorized { .. } => "RAID_UNAUTHORIZED",
            NotFactionMember { .. } => "RAID_NOT_FACTION_MEMBER",
            SchedulingWindow { .. } => "RAID_SCHEDULING_WINDOW",
            RosterFull { .. } => "RAID_ROSTER_FULL",
            AlreadyOnRoster { .. } => "RAID_ALREADY_ON_ROSTER",
            NotOnRoster { .. } => "RAID_NOT_ON_ROSTER",
            InvalidStatus { .. } => "RAID_INVALID_STATUS",
        }
    }
}

/// Illegal edge in the lifecycle graph.
///
/// Unlike [`Rejection`], this indicates a caller driving the state machine
/// out of order (e.g. completing an attempt that never started).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("illegal raid transition from {from} to {to}")]
pub struct LifecycleError {
    pub from: RaidStatus,
    pub to: RaidStatus,
}

impl DomainError for LifecycleError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        "RAID_ILLEGAL_TRANSITION"
    }
}
