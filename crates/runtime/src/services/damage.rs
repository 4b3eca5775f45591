//! Applies drawn damage to the target and builds the result payload.
//!
//! Runs inside the execution transaction: every write here commits together
//! with the lifecycle transition or not at all.

use chrono::Duration;
use raid_core::{
    CounterAttack, DamageDetail, DamageRoll, DamageRules, FactionId, InfluenceDamage, OutcomeTier,
    ProductionDamage, PropertyDamage, RaidAttempt, RaidDice, RaidResult, TargetKind, TierTable,
    Timestamp, TreasuryDamage, portion_of, roll_counter_attack, roll_damage,
};
use tracing::{debug, warn};

use super::target::{asset_of, defender_of};
use crate::error::{RaidError, Result};
use crate::repository::{
    FactionStore, PropertyStore, RaidHistoryEntry, TerritoryStore, WorldView,
};

pub struct DamageApplicator<'a> {
    rules: &'a DamageRules,
    experience: &'a TierTable<u32>,
}

impl<'a> DamageApplicator<'a> {
    pub fn new(rules: &'a DamageRules, experience: &'a TierTable<u32>) -> Self {
        Self { rules, experience }
    }

    /// Mutates the target for `tier` and returns the result summary.
    ///
    /// Failure tiers leave the target untouched; a critical failure may still
    /// cost the attacker through a counter-attack.
    pub fn apply<V: WorldView + ?Sized>(
        &self,
        view: &mut V,
        attempt: &RaidAttempt,
        tier: OutcomeTier,
        dice: &RaidDice<'_>,
        now: Timestamp,
    ) -> Result<RaidResult> {
        let target = attempt.target();
        let kind = target.target.kind;
        let roll = roll_damage(kind, tier, dice, self.rules);

        let (detail, currency_awarded) = if roll.is_none() {
            (DamageDetail::none(kind, target.zone), 0)
        } else {
            match kind {
                TargetKind::Property | TargetKind::Production => {
                    self.damage_asset(view, attempt, tier, roll, now)?
                }
                TargetKind::Treasury => self.steal_treasury(view, attempt, roll)?,
                TargetKind::TerritoryInfluence => self.reduce_influence(view, attempt, roll)?,
            }
        };

        let mut result = RaidResult::new(tier, detail, self.experience.get(tier), currency_awarded);
        if let Some(counter) = self.counter_attack(view, attempt.attacker().id, tier, dice) {
            result = result.with_counter_attack(counter);
        }

        debug!(
            raid = %attempt.id(),
            outcome = %tier,
            total_damage = result.total_damage,
            currency_awarded = result.currency_awarded,
            "applied raid damage"
        );
        Ok(result)
    }

    fn damage_asset<V: WorldView + ?Sized>(
        &self,
        view: &mut V,
        attempt: &RaidAttempt,
        tier: OutcomeTier,
        roll: DamageRoll,
        now: Timestamp,
    ) -> Result<(DamageDetail, u64)> {
        let DamageRoll::Asset {
            storage_loss_fraction,
            condition_loss,
            production_delay_minutes,
        } = roll
        else {
            return Err(mismatch(attempt, roll));
        };

        let id = asset_of(attempt.target())?;
        let insured = view
            .property(id)?
            .is_some_and(|property| property.is_insured(now));

        let storage = view.apply_storage_loss(id, storage_loss_fraction)?;
        let condition_damage = view.apply_condition_damage(id, condition_loss)?;
        view.append_raid_history(
            id,
            RaidHistoryEntry {
                raid: attempt.id(),
                attacker: attempt.attacker().id,
                outcome: tier,
                condition_damage,
                storage_value_lost: storage.value_removed,
                at: now,
            },
        )?;

        let loot = portion_of(storage.value_removed, self.rules.loot_share);
        if loot > 0 {
            view.credit_treasury(attempt.attacker().id, loot)?;
        }

        let property = PropertyDamage {
            storage_loss_fraction,
            storage_value_lost: storage.value_removed,
            condition_damage,
            insurance_recovery: insured.then(|| {
                portion_of(storage.value_removed, self.rules.insurance_recovery_fraction)
            }),
        };

        let detail = if attempt.target().target.kind == TargetKind::Production {
            let delayed = view.delay_production(
                id,
                Duration::minutes(i64::from(production_delay_minutes)),
            )?;
            debug!(raid = %attempt.id(), delayed, production_delay_minutes, "delayed production");
            // An idle facility loses no production time.
            let production_halt_minutes = if delayed > 0 { production_delay_minutes } else { 0 };
            DamageDetail::Production(ProductionDamage {
                property,
                production_halt_minutes,
            })
        } else {
            DamageDetail::Property(property)
        };
        Ok((detail, loot))
    }

    fn steal_treasury<V: WorldView + ?Sized>(
        &self,
        view: &mut V,
        attempt: &RaidAttempt,
        roll: DamageRoll,
    ) -> Result<(DamageDetail, u64)> {
        let DamageRoll::Treasury { theft_fraction } = roll else {
            return Err(mismatch(attempt, roll));
        };

        let defender = defender_of(attempt.target())?.id;
        let stolen = portion_of(view.treasury_balance(defender)?, theft_fraction);
        if stolen > 0 {
            view.debit_treasury(defender, stolen)?;
            view.credit_treasury(attempt.attacker().id, stolen)?;
        }

        let detail = DamageDetail::Treasury(TreasuryDamage {
            theft_fraction,
            currency_stolen: stolen,
        });
        Ok((detail, stolen))
    }

    fn reduce_influence<V: WorldView + ?Sized>(
        &self,
        view: &mut V,
        attempt: &RaidAttempt,
        roll: DamageRoll,
    ) -> Result<(DamageDetail, u64)> {
        let DamageRoll::Influence { amount } = roll else {
            return Err(mismatch(attempt, roll));
        };

        let defender = defender_of(attempt.target())?.id;
        let zone = attempt.target().zone;
        let influence_lost = view.reduce_influence(zone, defender, amount)?;

        let detail = DamageDetail::TerritoryInfluence(InfluenceDamage {
            zone,
            influence_lost,
        });
        Ok((detail, 0))
    }

    /// Best effort: a failed ambush debit is logged and dropped.
    fn counter_attack<V: FactionStore + ?Sized>(
        &self,
        view: &mut V,
        attacker: FactionId,
        tier: OutcomeTier,
        dice: &RaidDice<'_>,
    ) -> Option<CounterAttack> {
        let fraction = roll_counter_attack(tier, dice, self.rules)?;
        let applied = view.treasury_balance(attacker).and_then(|balance| {
            let lost = portion_of(balance, fraction);
            view.debit_treasury(attacker, lost).map(|()| lost)
        });

        match applied {
            Ok(currency_lost) => Some(CounterAttack {
                fraction,
                currency_lost,
            }),
            Err(error) => {
                warn!(%attacker, %error, "counter-attack could not be applied");
                None
            }
        }
    }
}

fn mismatch(attempt: &RaidAttempt, roll: DamageRoll) -> RaidError {
    RaidError::Execution(format!(
        "damage roll {roll:?} does not fit target {}",
        attempt.target().target
    ))
}
