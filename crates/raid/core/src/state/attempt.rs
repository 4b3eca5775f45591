use super::common::{CharacterId, ConflictId, FactionRef, RaidId, TargetRef, Timestamp, ZoneId};
use super::result::RaidResult;

/// Lifecycle status of a raid attempt.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RaidStatus {
    Planning,
    Scheduled,
    InProgress,
    Completed,
    Failed,
    Defended,
    Cancelled,
}

impl RaidStatus {
    /// Planning, scheduled and in-progress attempts block new attempts on the same target.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Planning | Self::Scheduled | Self::InProgress)
    }

    pub const fn is_terminal(self) -> bool {
        !self.is_active()
    }

    /// Roster changes and cancellation are only allowed before execution begins.
    pub const fn is_pre_execution(self) -> bool {
        matches!(self, Self::Planning | Self::Scheduled)
    }
}

/// Role of a participant on the roster.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Role {
    Leader,
    Attacker,
    Scout,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Participant {
    pub character: CharacterId,
    pub name: String,
    pub role: Role,
    pub contribution: u32,
    pub joined_at: Timestamp,
}

impl Participant {
    pub fn new(character: CharacterId, name: impl Into<String>, role: Role, at: Timestamp) -> Self {
        Self {
            character,
            name: name.into(),
            role,
            contribution: 0,
            joined_at: at,
        }
    }
}

/// Canonical metadata about a raid target, captured when the attempt is planned.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetDescriptor {
    pub target: TargetRef,
    pub name: String,
    pub zone: ZoneId,
    /// Faction that owns or controls the target, if any.
    pub owner_faction: Option<FactionRef>,
    /// Character owning a property-backed target, if any.
    pub owner_character: Option<CharacterId>,
}

/// Who started the attack.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RaidOrigin {
    Player,
    /// Recording-only attack resolved outside the raid engine (NPC gangs, events).
    NonPlayer { source: String },
}

/// Lifecycle timestamps.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RaidTimeline {
    pub planned_at: Timestamp,
    pub scheduled_for: Option<Timestamp>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

/// Combat figures recorded at execution.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatRecord {
    pub attack_power: u64,
    pub defense_power: u64,
    /// Raw uniform draw in `[0, 100]` before adjustment.
    pub success_roll: f64,
}

/// Aggregate root of the raid engine.
///
/// Identity and target fields are private and fixed at construction; only the
/// lifecycle, roster, combat and result fields change, and only through the
/// transitions in [`crate::lifecycle`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RaidAttempt {
    id: RaidId,
    attacker: FactionRef,
    target: TargetDescriptor,
    origin: RaidOrigin,
    /// Active conflict between the two factions, frozen at planning time.
    war: Option<ConflictId>,
    /// Per-attempt seed every random draw of this raid is derived from.
    seed: u64,
    pub(crate) status: RaidStatus,
    pub(crate) timeline: RaidTimeline,
    pub(crate) roster: Vec<Participant>,
    pub(crate) combat: Option<CombatRecord>,
    pub(crate) result: Option<RaidResult>,
}

impl RaidAttempt {
    /// Creates a player raid in `planning` with the leader as participant 0.
    pub fn plan(
        id: RaidId,
        attacker: FactionRef,
        target: TargetDescriptor,
        leader: Participant,
        war: Option<ConflictId>,
        seed: u64,
    ) -> Self {
        let planned_at = leader.joined_at;
        let leader = Participant {
            role: Role::Leader,
            ..leader
        };
        Self {
            id,
            attacker,
            target,
            origin: RaidOrigin::Player,
            war,
            seed,
            status: RaidStatus::Planning,
            timeline: RaidTimeline {
                planned_at,
                scheduled_for: None,
                started_at: None,
                completed_at: None,
            },
            roster: vec![leader],
            combat: None,
            result: None,
        }
    }

    /// Creates a terminal, roster-less record of an externally resolved attack.
    pub fn external(
        id: RaidId,
        attacker: FactionRef,
        target: TargetDescriptor,
        source: impl Into<String>,
        result: RaidResult,
        at: Timestamp,
    ) -> Self {
        let status = super::terminal_status(&result);
        Self {
            id,
            attacker,
            target,
            origin: RaidOrigin::NonPlayer {
                source: source.into(),
            },
            war: None,
            seed: 0,
            status,
            timeline: RaidTimeline {
                planned_at: at,
                scheduled_for: None,
                started_at: Some(at),
                completed_at: Some(at),
            },
            roster: Vec::new(),
            combat: None,
            result: Some(result),
        }
    }

    pub fn id(&self) -> RaidId {
        self.id
    }

    pub fn attacker(&self) -> &FactionRef {
        &self.attacker
    }

    pub fn defender(&self) -> Option<&FactionRef> {
        self.target.owner_faction.as_ref()
    }

    pub fn target(&self) -> &TargetDescriptor {
        &self.target
    }

    pub fn origin(&self) -> &RaidOrigin {
        &self.origin
    }

    pub fn war(&self) -> Option<ConflictId> {
        self.war
    }

    pub fn is_war_raid(&self) -> bool {
        self.war.is_some()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn status(&self) -> RaidStatus {
        self.status
    }

    pub fn timeline(&self) -> &RaidTimeline {
        &self.timeline
    }

    pub fn roster(&self) -> &[Participant] {
        &self.roster
    }

    /// Participant 0, fixed for the attempt's life. `None` only for non-player records.
    pub fn leader(&self) -> Option<&Participant> {
        self.roster.first()
    }

    pub fn is_on_roster(&self, character: CharacterId) -> bool {
        self.roster.iter().any(|p| p.character == character)
    }

    pub fn combat(&self) -> Option<&CombatRecord> {
        self.combat.as_ref()
    }

    pub fn result(&self) -> Option<&RaidResult> {
        self.result.as_ref()
    }
}
