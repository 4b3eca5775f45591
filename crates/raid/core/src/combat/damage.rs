//! Damage rolls.
//!
//! These functions decide *how much* a raid takes; applying it to the stores
//! is the runtime's job. Keeping the draws here means a replay with the same
//! dice reproduces the same figures regardless of store contents.

use crate::config::{AssetDamageRange, DamageRules};
use crate::env::{RaidDice, RollContext};
use crate::state::{OutcomeTier, TargetKind};

/// Drawn damage figures for one execution, already scaled by the tier multiplier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DamageRoll {
    /// Failure tiers: the target is left untouched.
    None,
    Asset {
        storage_loss_fraction: f64,
        condition_loss: u32,
        /// Zero for plain properties.
        production_delay_minutes: u32,
    },
    Treasury {
        theft_fraction: f64,
    },
    Influence {
        amount: u32,
    },
}

impl DamageRoll {
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

fn scaled_fraction(dice: &RaidDice<'_>, context: RollContext, min: f64, max: f64, multiplier: f64) -> f64 {
    (dice.range(context, min, max) * multiplier).clamp(0.0, 1.0)
}

fn scaled_amount(dice: &RaidDice<'_>, context: RollContext, min: f64, max: f64, multiplier: f64) -> u32 {
    (dice.range(context, min, max) * multiplier).round().max(0.0) as u32
}

fn roll_asset(dice: &RaidDice<'_>, range: &AssetDamageRange, multiplier: f64, production: bool) -> DamageRoll {
    let production_delay_minutes = if production {
        scaled_amount(
            dice,
            RollContext::ProductionDelay,
            range.production_delay_minutes.min,
            range.production_delay_minutes.max,
            multiplier,
        )
    } else {
        0
    };

    DamageRoll::Asset {
        storage_loss_fraction: scaled_fraction(
            dice,
            RollContext::StorageLoss,
            range.storage_loss.min,
            range.storage_loss.max,
            multiplier,
        ),
        condition_loss: scaled_amount(
            dice,
            RollContext::ConditionLoss,
            range.condition_loss.min,
            range.condition_loss.max,
            multiplier,
        ),
        production_delay_minutes,
    }
}

/// Draws the damage a tier inflicts on a target kind.
pub fn roll_damage(kind: TargetKind, tier: OutcomeTier, dice: &RaidDice<'_>, rules: &DamageRules) -> DamageRoll {
    let multiplier = rules.tier_multipliers.get(tier);
    if !tier.is_effective() || multiplier <= 0.0 {
        return DamageRoll::None;
    }

    match kind {
        TargetKind::Property => roll_asset(dice, &rules.property, multiplier, false),
        TargetKind::Production => roll_asset(dice, &rules.production, multiplier, true),
        TargetKind::Treasury => DamageRoll::Treasury {
            theft_fraction: scaled_fraction(
                dice,
                RollContext::TreasuryTheft,
                rules.treasury_theft.min,
                rules.treasury_theft.max,
                multiplier,
            ),
        },
        TargetKind::TerritoryInfluence => DamageRoll::Influence {
            amount: scaled_amount(
                dice,
                RollContext::InfluenceLoss,
                rules.influence_loss.min,
                rules.influence_loss.max,
                multiplier,
            ),
        },
    }
}

/// Fraction of the attacking treasury lost to an ambush, if one happens.
///
/// Only a critical failure can trigger a counter-attack.
pub fn roll_counter_attack(tier: OutcomeTier, dice: &RaidDice<'_>, rules: &DamageRules) -> Option<f64> {
    if tier != OutcomeTier::CriticalFailure {
        return None;
    }
    let counter = &rules.counter_attack;
    if !dice.chance(RollContext::CounterAttackChance, counter.chance) {
        return None;
    }
    Some(scaled_fraction(
        dice,
        RollContext::CounterAttackFraction,
        counter.treasury_fraction.min,
        counter.treasury_fraction.max,
        1.0,
    ))
}

/// Units removed from a stack of `quantity` for a loss fraction.
pub fn units_lost(quantity: u64, fraction: f64) -> u64 {
    ((quantity as f64 * fraction).floor() as u64).min(quantity)
}

/// Portion of a balance taken for a fraction, never more than the balance.
pub fn portion_of(balance: u64, fraction: f64) -> u64 {
    ((balance as f64 * fraction.clamp(0.0, 1.0)).floor() as u64).min(balance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{PcgRng, RngOracle};

    /// Oracle returning the same value for every seed.
    struct FixedRng(u32);

    impl RngOracle for FixedRng {
        fn next_u32(&self, _seed: u64) -> u32 {
            self.0
        }
    }

    #[test]
    fn failure_tiers_roll_nothing() {
        let rng = PcgRng;
        let dice = RaidDice::new(&rng, 1, 1);
        let rules = DamageRules::default();
        for kind in [TargetKind::Property, TargetKind::Treasury, TargetKind::TerritoryInfluence] {
            assert!(roll_damage(kind, OutcomeTier::Failure, &dice, &rules).is_none());
            assert!(roll_damage(kind, OutcomeTier::CriticalFailure, &dice, &rules).is_none());
        }
    }

    #[test]
    fn max_roll_critical_success_scales_by_multiplier() {
        let rng = FixedRng(u32::MAX);
        let dice = RaidDice::new(&rng, 1, 1);
        let rules = DamageRules::default();

        let roll = roll_damage(TargetKind::Property, OutcomeTier::CriticalSuccess, &dice, &rules);
        let DamageRoll::Asset {
            storage_loss_fraction,
            condition_loss,
            production_delay_minutes,
        } = roll
        else {
            panic!("expected asset damage, got {roll:?}");
        };
        assert!((storage_loss_fraction - 0.30).abs() < 1e-9);
        assert_eq!(condition_loss, 30);
        assert_eq!(production_delay_minutes, 0);
    }

    #[test]
    fn production_rolls_a_delay() {
        let rng = FixedRng(0);
        let dice = RaidDice::new(&rng, 1, 1);
        let roll = roll_damage(
            TargetKind::Production,
            OutcomeTier::Success,
            &dice,
            &DamageRules::default(),
        );
        assert!(matches!(
            roll,
            DamageRoll::Asset {
                production_delay_minutes: 30,
                ..
            }
        ));
    }

    #[test]
    fn counter_attack_only_on_critical_failure() {
        let rng = FixedRng(0);
        let dice = RaidDice::new(&rng, 1, 1);
        let rules = DamageRules::default();
        assert!(roll_counter_attack(OutcomeTier::Failure, &dice, &rules).is_none());
        let fraction = roll_counter_attack(OutcomeTier::CriticalFailure, &dice, &rules).unwrap();
        assert!((fraction - rules.counter_attack.treasury_fraction.min).abs() < 1e-9);
    }

    #[test]
    fn counter_attack_respects_chance() {
        let rng = FixedRng(u32::MAX);
        let dice = RaidDice::new(&rng, 1, 1);
        assert!(roll_counter_attack(OutcomeTier::CriticalFailure, &dice, &DamageRules::default()).is_none());
    }

    #[test]
    fn portions_never_exceed_balance() {
        assert_eq!(portion_of(100, 1.5), 100);
        assert_eq!(portion_of(0, 0.5), 0);
        assert_eq!(portion_of(999, 0.1), 99);
        assert_eq!(units_lost(7, 0.5), 3);
    }
}
