//! Attack and defense power from store state.

use raid_core::{
    CombatStats, DefenseProfile, Participant, PowerRules, RaidAttempt, TargetDescriptor,
    TargetKind, apply_war_context, attack_power, defense_power,
};
use tracing::debug;

use super::target::{asset_of, defender_of};
use crate::error::Result;
use crate::repository::{CharacterStore, FactionStore, PropertyStore, WorldView};

pub struct PowerCalculator<'a> {
    rules: &'a PowerRules,
}

impl<'a> PowerCalculator<'a> {
    pub fn new(rules: &'a PowerRules) -> Self {
        Self { rules }
    }

    /// Roster attack power from current character stats.
    pub fn attack_power<V: CharacterStore + ?Sized>(
        &self,
        view: &V,
        roster: &[Participant],
    ) -> Result<u64> {
        let stats = roster
            .iter()
            .map(|participant| Ok((participant.role, view.combat_stats(participant.character)?)))
            .collect::<Result<Vec<(_, CombatStats)>>>()?;
        Ok(attack_power(
            stats.iter().map(|(role, stats)| (*role, stats)),
            self.rules,
        ))
    }

    /// Defense power of the target's current state.
    pub fn defense_power<V: PropertyStore + FactionStore + ?Sized>(
        &self,
        view: &V,
        target: &TargetDescriptor,
    ) -> Result<u64> {
        let profile = match target.target.kind {
            TargetKind::Property => DefenseProfile::Asset {
                defense_level: view.defense_level(asset_of(target)?)?,
                active_workers: None,
            },
            TargetKind::Production => {
                let id = asset_of(target)?;
                DefenseProfile::Asset {
                    defense_level: view.defense_level(id)?,
                    active_workers: Some(view.active_workers(id)?),
                }
            }
            TargetKind::Treasury | TargetKind::TerritoryInfluence => {
                let defender = defender_of(target)?.id;
                DefenseProfile::Faction {
                    level: view.level(defender)?,
                    member_count: view.member_count(defender)?,
                }
            }
        };
        Ok(defense_power(profile, self.rules))
    }

    /// `(attack, defense)` for an attempt, with the war context applied.
    pub fn combat_powers<V: WorldView + ?Sized>(
        &self,
        view: &V,
        attempt: &RaidAttempt,
    ) -> Result<(u64, u64)> {
        let attack = self.attack_power(view, attempt.roster())?;
        let defense = self.defense_power(view, attempt.target())?;
        let (attack, defense) = apply_war_context(attack, defense, attempt.is_war_raid(), self.rules);
        debug!(
            raid = %attempt.id(),
            attack,
            defense,
            war = attempt.is_war_raid(),
            "computed combat powers"
        );
        Ok((attack, defense))
    }
}
