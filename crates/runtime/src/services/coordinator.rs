//! Raid lifecycle coordinator.
//!
//! Every operation validates and mutates inside one store transaction and
//! publishes its event only after the commit. A failed operation leaves the
//! store exactly as it was.

use std::cmp::Reverse;
use std::sync::Arc;

use raid_core::{
    CharacterId, CombatRecord, DamageDetail, DomainError, FactionId, FactionRef, OutcomeTier, Participant,
    RaidAttempt, RaidConfig, RaidDice, RaidId, RaidResult, RaidStatus, Rejection, RngOracle, Role,
    TargetDescriptor, TargetRef, Timestamp, resolve_outcome,
};
use tracing::{debug, error, info, warn};

use super::{ContributionDispatcher, DamageApplicator, PowerCalculator, TargetResolver};
use crate::clock::Clock;
use crate::error::{NotFoundKind, RaidError, Result};
use crate::events::{EventBus, RaidEvent, RaidSummary};
use crate::repository::{
    CharacterStore, ConflictLedger, FactionStore, PropertyStore, RaidRepository, RaidStore, WorldView,
};

/// Where per-attempt seeds come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SeedPolicy {
    /// Fresh entropy for every attempt.
    #[default]
    Random,
    /// Seeds derived from a base value and the raid id, for replays.
    Fixed(u64),
}

impl SeedPolicy {
    pub fn seed_for(self, raid: RaidId) -> u64 {
        match self {
            SeedPolicy::Random => rand::random(),
            SeedPolicy::Fixed(base) => base ^ raid.0.wrapping_mul(0x9e37_79b9_7f4a_7c15),
        }
    }
}

/// Scheduled and past its execution time.
fn is_due(attempt: &RaidAttempt, now: Timestamp) -> bool {
    attempt.status() == RaidStatus::Scheduled
        && attempt
            .timeline()
            .scheduled_for
            .is_some_and(|at| at <= now)
}

/// Request to open a raid.
#[derive(Debug, Clone)]
pub struct PlanRaid {
    pub attacker: FactionId,
    /// Must be the attacking faction's leader; pays the planning cost.
    pub planned_by: CharacterId,
    /// Raid leader, participant 0 for the attempt's life.
    pub leader: CharacterId,
    pub target: TargetRef,
}

/// Attack resolved outside the engine, recorded for history only.
#[derive(Debug, Clone)]
pub struct ExternalRaid {
    pub attacker: FactionRef,
    pub target: TargetRef,
    pub source: String,
    pub outcome: OutcomeTier,
    pub damage: DamageDetail,
    pub experience_awarded: u32,
    pub currency_awarded: u64,
}

/// What an execution request did.
#[derive(Debug, Clone)]
pub enum Execution {
    Resolved(RaidAttempt),
    /// The attempt was not `scheduled`; nothing changed.
    Skipped(RaidStatus),
}

pub struct RaidCoordinator<S: RaidStore> {
    store: Arc<S>,
    config: Arc<RaidConfig>,
    clock: Arc<dyn Clock>,
    rng: Arc<dyn RngOracle>,
    seeds: SeedPolicy,
    events: EventBus,
}

impl<S: RaidStore> RaidCoordinator<S> {
    pub fn new(
        store: Arc<S>,
        config: Arc<RaidConfig>,
        clock: Arc<dyn Clock>,
        rng: Arc<dyn RngOracle>,
        seeds: SeedPolicy,
        events: EventBus,
    ) -> Self {
        Self {
            store,
            config,
            clock,
            rng,
            seeds,
            events,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &RaidConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    fn load<V: RaidRepository + ?Sized>(view: &V, raid: RaidId) -> Result<RaidAttempt> {
        view.raid(raid)?
            .ok_or(RaidError::NotFound(NotFoundKind::Raid))
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Checks whether `attacker` may raid `target` right now. No side effects.
    pub fn validate_target(&self, attacker: FactionId, target: TargetRef) -> Result<TargetDescriptor> {
        let now = self.clock.now();
        self.store
            .read(|view| TargetResolver::validate(view, attacker, target, now))?
    }

    /// Creates an attempt in `planning` and charges the planning cost.
    pub fn plan_raid(&self, request: PlanRaid) -> Result<RaidAttempt> {
        let now = self.clock.now();
        let rules = &self.config.lifecycle;

        let attempt = self.store.transaction(|view| -> Result<RaidAttempt> {
            let faction = view
                .faction(request.attacker)?
                .ok_or(RaidError::NotFound(NotFoundKind::Faction))?;
            if request.planned_by != faction.leader {
                return Err(Rejection::Unauthorized {
                    actor: request.planned_by,
                }
                .into());
            }
            if !faction.members.contains(&request.leader) {
                return Err(Rejection::NotFactionMember {
                    character: request.leader,
                }
                .into());
            }
            let leader = view
                .character(request.leader)?
                .ok_or(RaidError::NotFound(NotFoundKind::Character))?;

            let target = TargetResolver::validate(&*view, faction.id, request.target, now)?;

            let available = view.treasury_balance(faction.id)?;
            if available < rules.planning_cost {
                return Err(Rejection::InsufficientFunds {
                    required: rules.planning_cost,
                    available,
                }
                .into());
            }
            view.debit_treasury(faction.id, rules.planning_cost)?;

            let war = match &target.owner_faction {
                Some(defender) => view.active_war(faction.id, defender.id)?,
                None => None,
            };
            let id = view.next_raid_id()?;
            let attempt = RaidAttempt::plan(
                id,
                FactionRef::new(faction.id, faction.name),
                target,
                Participant::new(leader.id, leader.name, Role::Leader, now),
                war,
                self.seeds.seed_for(id),
            );
            view.save_raid(&attempt)?;
            Ok(attempt)
        })?;

        info!(
            raid = %attempt.id(),
            attacker = %attempt.attacker().id,
            target = %attempt.target().target,
            war = attempt.is_war_raid(),
            "raid planned"
        );
        self.events.publish(RaidEvent::Planned {
            raid: attempt.id(),
            attacker: attempt.attacker().clone(),
            target: attempt.target().clone(),
            leader: request.leader,
        });
        Ok(attempt)
    }

    /// `planning -> scheduled`.
    pub fn schedule_raid(
        &self,
        raid: RaidId,
        actor: CharacterId,
        execute_at: Timestamp,
    ) -> Result<RaidAttempt> {
        let now = self.clock.now();
        let attempt = self.store.transaction(|view| -> Result<RaidAttempt> {
            let mut attempt = Self::load(&*view, raid)?;
            attempt.schedule(actor, execute_at, now, &self.config.lifecycle)?;
            view.save_raid(&attempt)?;
            Ok(attempt)
        })?;

        info!(raid = %raid, %execute_at, "raid scheduled");
        self.events.publish(RaidEvent::Scheduled {
            raid,
            attacker: attempt.attacker().clone(),
            defender: attempt.defender().cloned(),
            target: attempt.target().clone(),
            execute_at,
        });
        Ok(attempt)
    }

    /// Adds an attacking-faction member to the roster before execution.
    pub fn join_raid(&self, raid: RaidId, character: CharacterId, role: Role) -> Result<RaidAttempt> {
        let now = self.clock.now();
        let max_roster = self.config.lifecycle.max_roster;

        let attempt = self.store.transaction(|view| -> Result<RaidAttempt> {
            let mut attempt = Self::load(&*view, raid)?;
            if !attempt.status().is_pre_execution() {
                return Err(Rejection::InvalidStatus {
                    status: attempt.status(),
                }
                .into());
            }
            if !view.is_member(attempt.attacker().id, character)? {
                return Err(Rejection::NotFactionMember { character }.into());
            }
            let record = view
                .character(character)?
                .ok_or(RaidError::NotFound(NotFoundKind::Character))?;
            attempt.join(Participant::new(character, record.name, role, now), max_roster)?;
            view.save_raid(&attempt)?;
            Ok(attempt)
        })?;

        let role = attempt
            .roster()
            .iter()
            .find(|p| p.character == character)
            .map_or(role, |p| p.role);
        info!(raid = %raid, %character, %role, "participant joined");
        self.events.publish(RaidEvent::Joined {
            raid,
            character,
            role,
        });
        Ok(attempt)
    }

    /// Removes a non-leader participant before execution.
    pub fn leave_raid(&self, raid: RaidId, character: CharacterId) -> Result<RaidAttempt> {
        let attempt = self.store.transaction(|view| -> Result<RaidAttempt> {
            let mut attempt = Self::load(&*view, raid)?;
            attempt.leave(character)?;
            view.save_raid(&attempt)?;
            Ok(attempt)
        })?;

        info!(raid = %raid, %character, "participant left");
        self.events.publish(RaidEvent::Left { raid, character });
        Ok(attempt)
    }

    /// `planning | scheduled -> cancelled`, by the raid or faction leader.
    pub fn cancel_raid(&self, raid: RaidId, actor: CharacterId) -> Result<RaidAttempt> {
        let now = self.clock.now();
        let attempt = self.store.transaction(|view| -> Result<RaidAttempt> {
            let mut attempt = Self::load(&*view, raid)?;
            let faction_leader = view
                .faction(attempt.attacker().id)?
                .ok_or(RaidError::NotFound(NotFoundKind::Faction))?
                .leader;
            attempt.cancel(actor, faction_leader, now)?;
            view.save_raid(&attempt)?;
            Ok(attempt)
        })?;

        info!(raid = %raid, by = %actor, "raid cancelled");
        self.events.publish(RaidEvent::Cancelled {
            raid,
            by: actor,
            target: attempt.target().clone(),
            roster: attempt.roster().iter().map(|p| p.character).collect(),
        });
        Ok(attempt)
    }

    /// Resolves a scheduled raid: powers, outcome, damage, contribution,
    /// immunity and cooldown, all in one transaction.
    ///
    /// Calling it on an attempt that is not `scheduled`, or whose execution
    /// time has not arrived, is a no-op. On any error nothing is written and
    /// the attempt stays `scheduled`.
    pub fn execute_raid(&self, raid: RaidId) -> Result<Execution> {
        let now = self.clock.now();
        let attempt = self.store.read(|view| Self::load(view, raid))??;
        if !is_due(&attempt, now) {
            debug!(raid = %raid, status = %attempt.status(), "raid not due; skipped");
            return Ok(Execution::Skipped(attempt.status()));
        }

        let outcome = self
            .store
            .transaction(|view| -> Result<Execution> { self.resolve(view, raid, now) });

        match outcome {
            Ok(Execution::Resolved(attempt)) => {
                if let (Some(result), Some(combat)) = (attempt.result(), attempt.combat()) {
                    info!(
                        raid = %raid,
                        status = %attempt.status(),
                        outcome = %result.outcome,
                        attack = combat.attack_power,
                        defense = combat.defense_power,
                        total_damage = result.total_damage,
                        "raid resolved"
                    );
                }
                if let Some(summary) = RaidSummary::from_attempt(&attempt) {
                    self.events.publish(RaidEvent::Resolved(Box::new(summary)));
                }
                Ok(Execution::Resolved(attempt))
            }
            Ok(skipped) => Ok(skipped),
            Err(err) => {
                let severity = err.severity();
                if severity.is_internal() {
                    error!(
                        raid = %raid,
                        error = %err,
                        code = err.error_code(),
                        severity = severity.as_str(),
                        "raid execution aborted; attempt stays scheduled"
                    );
                } else {
                    warn!(
                        raid = %raid,
                        error = %err,
                        code = err.error_code(),
                        severity = severity.as_str(),
                        "raid execution not committed; attempt stays scheduled"
                    );
                }
                Err(err)
            }
        }
    }

    fn resolve(&self, view: &mut S::View, raid: RaidId, now: Timestamp) -> Result<Execution> {
        let mut attempt = Self::load(&*view, raid)?;
        if !is_due(&attempt, now) {
            return Ok(Execution::Skipped(attempt.status()));
        }
        Self::recheck_target(&*view, &attempt, now)?;

        let config = &*self.config;
        attempt.begin(now)?;

        let (attack, defense) = PowerCalculator::new(&config.power).combat_powers(&*view, &attempt)?;
        let dice = RaidDice::new(self.rng.as_ref(), attempt.seed(), attempt.id().0);
        let roll = resolve_outcome(
            attack,
            defense,
            attempt.target().target.kind,
            &dice,
            &config.outcome,
        );

        let result = DamageApplicator::new(&config.damage, &config.experience).apply(
            &mut *view,
            &attempt,
            roll.tier,
            &dice,
            now,
        )?;
        let combat = CombatRecord {
            attack_power: attack,
            defense_power: defense,
            success_roll: roll.raw_roll,
        };
        let status = attempt.complete(combat, result, now)?;

        ContributionDispatcher::new(&config.contribution).award(
            &mut *view,
            &mut attempt,
            roll.tier,
            status,
        )?;

        let target = attempt.target().target;
        if let Some(asset) = target.asset() {
            view.set_immunity_until(asset, now + config.lifecycle.immunity())?;
        }
        view.set_cooldown(attempt.attacker().id, target, now + config.lifecycle.cooldown())?;
        view.save_raid(&attempt)?;
        Ok(Execution::Resolved(attempt))
    }

    /// Conditions that may have changed since planning, re-checked right
    /// before mutating.
    fn recheck_target<V: WorldView + ?Sized>(view: &V, attempt: &RaidAttempt, now: Timestamp) -> Result<()> {
        let Some(asset) = attempt.target().target.asset() else {
            return Ok(());
        };
        let property = view
            .property(asset)?
            .ok_or(RaidError::NotFound(NotFoundKind::Target))?;
        if let Some(until) = property.immune_until.filter(|until| *until > now) {
            return Err(Rejection::TargetImmune { until }.into());
        }
        Ok(())
    }

    /// Stores a terminal attempt for an attack resolved elsewhere. The target
    /// is not mutated and no immunity is written.
    pub fn record_external_raid(&self, request: ExternalRaid) -> Result<RaidAttempt> {
        let now = self.clock.now();
        let attempt = self.store.transaction(|view| -> Result<RaidAttempt> {
            let target = TargetResolver::resolve(&*view, request.target)?;
            if request.damage.target_kind() != target.target.kind {
                return Err(RaidError::Execution(format!(
                    "{} damage recorded against {}",
                    request.damage.target_kind(),
                    target.target
                )));
            }
            let id = view.next_raid_id()?;
            let result = RaidResult::new(
                request.outcome,
                request.damage,
                request.experience_awarded,
                request.currency_awarded,
            );
            let attempt = RaidAttempt::external(id, request.attacker, target, request.source, result, now);
            view.save_raid(&attempt)?;
            Ok(attempt)
        })?;

        info!(raid = %attempt.id(), status = %attempt.status(), "external raid recorded");
        if let Some(summary) = RaidSummary::from_attempt(&attempt) {
            self.events.publish(RaidEvent::Recorded(Box::new(summary)));
        }
        Ok(attempt)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn get_raid(&self, raid: RaidId) -> Result<RaidAttempt> {
        self.store.read(|view| Self::load(view, raid))?
    }

    /// Active attempts where the faction attacks or defends.
    pub fn active_raids_for_faction(&self, faction: FactionId) -> Result<Vec<RaidAttempt>> {
        let mut raids = self.store.read(|view| view.raids_for_faction(faction))??;
        raids.retain(|raid| raid.status().is_active());
        Ok(raids)
    }

    /// Terminal attempts against a target, newest first.
    pub fn raid_history_for_target(&self, target: TargetRef) -> Result<Vec<RaidAttempt>> {
        let mut raids = self.store.read(|view| view.raids_for_target(target))??;
        raids.retain(|raid| raid.status().is_terminal());
        raids.sort_by_key(|raid| Reverse(raid.id()));
        Ok(raids)
    }

    /// Scheduled attempts whose execution time has arrived.
    pub fn due_raids(&self) -> Result<Vec<RaidId>> {
        let now = self.clock.now();
        Ok(self.store.read(|view| view.due_raids(now))??)
    }
}
