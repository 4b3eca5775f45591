//! Tunable raid parameters.
//!
//! Every balance figure the engine uses lives here: lead-time bounds, cooldown
//! and immunity windows, role coefficients, per-target outcome thresholds and
//! damage ranges. Values are opaque to the engine; `Default` mirrors the
//! bundled `raid.toml` shipped with `raid-content`.

use chrono::Duration;

use crate::state::{OutcomeTier, Role, TargetKind};

/// Errors found while validating a loaded configuration.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field}: range min {min} exceeds max {max}")]
    InvertedRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("{field}: value {value} must lie in [0, 1]")]
    NotAFraction { field: &'static str, value: f64 },

    #[error("{field}: outcome thresholds must strictly decrease from critical success to failure")]
    UnorderedThresholds { field: &'static str },

    #[error("minimum lead time must be shorter than maximum lead time")]
    LeadWindow,

    #[error("roster cap must allow at least the leader")]
    EmptyRoster,
}

/// Closed interval a random roll is drawn from.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollRange {
    pub min: f64,
    pub max: f64,
}

impl RollRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvertedRange {
                field,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    fn check_fraction(&self, field: &'static str) -> Result<(), ConfigError> {
        self.check(field)?;
        check_fraction(field, self.min)?;
        check_fraction(field, self.max)
    }
}

fn check_fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::NotAFraction { field, value });
    }
    Ok(())
}

/// One value per outcome tier.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TierTable<T> {
    pub critical_success: T,
    pub success: T,
    pub partial_success: T,
    pub failure: T,
    pub critical_failure: T,
}

impl<T: Copy> TierTable<T> {
    pub fn get(&self, tier: OutcomeTier) -> T {
        match tier {
            OutcomeTier::CriticalSuccess => self.critical_success,
            OutcomeTier::Success => self.success,
            OutcomeTier::PartialSuccess => self.partial_success,
            OutcomeTier::Failure => self.failure,
            OutcomeTier::CriticalFailure => self.critical_failure,
        }
    }
}

/// One value per target kind.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetTable<T> {
    pub property: T,
    pub production: T,
    pub treasury: T,
    pub territory_influence: T,
}

impl<T> TargetTable<T> {
    pub fn get(&self, kind: TargetKind) -> &T {
        match kind {
            TargetKind::Property => &self.property,
            TargetKind::Production => &self.production,
            TargetKind::Treasury => &self.treasury,
            TargetKind::TerritoryInfluence => &self.territory_influence,
        }
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LifecycleRules {
    /// Deducted from the attacking treasury when a raid is planned.
    pub planning_cost: u64,
    pub min_lead_minutes: i64,
    pub max_lead_minutes: i64,
    pub max_roster: usize,
    /// Blocks the same faction from re-targeting an asset after its raid ends.
    pub cooldown_minutes: i64,
    /// Written onto property-backed targets after any terminal raid.
    pub immunity_minutes: i64,
}

impl LifecycleRules {
    pub fn min_lead(&self) -> Duration {
        Duration::minutes(self.min_lead_minutes)
    }

    pub fn max_lead(&self) -> Duration {
        Duration::minutes(self.max_lead_minutes)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::minutes(self.cooldown_minutes)
    }

    pub fn immunity(&self) -> Duration {
        Duration::minutes(self.immunity_minutes)
    }
}

impl Default for LifecycleRules {
    fn default() -> Self {
        Self {
            planning_cost: 5_000,
            min_lead_minutes: 30,
            max_lead_minutes: 24 * 60,
            max_roster: 10,
            cooldown_minutes: 12 * 60,
            immunity_minutes: 6 * 60,
        }
    }
}

// ============================================================================
// Power
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PowerRules {
    pub leader_coefficient: f64,
    pub attacker_coefficient: f64,
    pub scout_coefficient: f64,
    /// Contribution of each character level to individual power.
    pub level_weight: f64,
    /// `k` in the roster bonus `1 + (size - 1) * k`.
    pub roster_bonus_per_member: f64,
    /// Defense never drops below this value.
    pub defense_floor: u64,
    pub production_worker_bonus: u64,
    pub faction_level_weight: u64,
    pub faction_member_weight: u64,
    pub war_attack_bonus: f64,
    pub war_defense_penalty: f64,
}

impl PowerRules {
    pub fn role_coefficient(&self, role: Role) -> f64 {
        match role {
            Role::Leader => self.leader_coefficient,
            Role::Attacker => self.attacker_coefficient,
            Role::Scout => self.scout_coefficient,
        }
    }
}

impl Default for PowerRules {
    fn default() -> Self {
        Self {
            leader_coefficient: 1.5,
            attacker_coefficient: 1.0,
            scout_coefficient: 0.6,
            level_weight: 2.0,
            roster_bonus_per_member: 0.1,
            defense_floor: 10,
            production_worker_bonus: 2,
            faction_level_weight: 10,
            faction_member_weight: 5,
            war_attack_bonus: 0.15,
            war_defense_penalty: 0.10,
        }
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// Base success rate and adjusted-roll thresholds for one target kind.
///
/// Thresholds are lower bounds checked from critical success downwards; an
/// adjusted roll below `failure` is a critical failure.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutcomeTable {
    pub base_success_rate: f64,
    pub critical_success: f64,
    pub success: f64,
    pub partial_success: f64,
    pub failure: f64,
}

impl OutcomeTable {
    pub const fn new(
        base_success_rate: f64,
        critical_success: f64,
        success: f64,
        partial_success: f64,
        failure: f64,
    ) -> Self {
        Self {
            base_success_rate,
            critical_success,
            success,
            partial_success,
            failure,
        }
    }

    fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        check_fraction(field, self.base_success_rate)?;
        let ordered = self.critical_success > self.success
            && self.success > self.partial_success
            && self.partial_success > self.failure
            && self.failure >= 0.0;
        if !ordered {
            return Err(ConfigError::UnorderedThresholds { field });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OutcomeRules {
    /// Weight of the power differential when shifting the base rate.
    pub differential_weight: f64,
    pub min_success_rate: f64,
    pub max_success_rate: f64,
    pub tables: TargetTable<OutcomeTable>,
}

impl Default for OutcomeRules {
    fn default() -> Self {
        Self {
            differential_weight: 0.2,
            min_success_rate: 0.10,
            max_success_rate: 0.95,
            tables: TargetTable {
                property: OutcomeTable::new(0.55, 80.0, 50.0, 30.0, 10.0),
                production: OutcomeTable::new(0.50, 80.0, 50.0, 30.0, 10.0),
                treasury: OutcomeTable::new(0.45, 85.0, 55.0, 35.0, 12.0),
                territory_influence: OutcomeTable::new(0.50, 80.0, 50.0, 30.0, 10.0),
            },
        }
    }
}

// ============================================================================
// Damage
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssetDamageRange {
    /// Fraction of each stored stack removed.
    pub storage_loss: RollRange,
    pub condition_loss: RollRange,
    /// Minutes in-flight production is pushed back (production targets only).
    pub production_delay_minutes: RollRange,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CounterAttackRules {
    pub chance: f64,
    pub treasury_fraction: RollRange,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DamageRules {
    /// Scales every drawn damage figure. Failure tiers never reach the target.
    pub tier_multipliers: TierTable<f64>,
    pub property: AssetDamageRange,
    pub production: AssetDamageRange,
    pub treasury_theft: RollRange,
    pub influence_loss: RollRange,
    pub counter_attack: CounterAttackRules,
    pub insurance_recovery_fraction: f64,
    /// Share of removed goods value credited to the attacking treasury.
    pub loot_share: f64,
}

impl Default for DamageRules {
    fn default() -> Self {
        Self {
            tier_multipliers: TierTable {
                critical_success: 1.5,
                success: 1.0,
                partial_success: 0.5,
                failure: 0.0,
                critical_failure: 0.0,
            },
            property: AssetDamageRange {
                storage_loss: RollRange::new(0.05, 0.20),
                condition_loss: RollRange::new(5.0, 20.0),
                production_delay_minutes: RollRange::new(0.0, 0.0),
            },
            production: AssetDamageRange {
                storage_loss: RollRange::new(0.05, 0.15),
                condition_loss: RollRange::new(5.0, 15.0),
                production_delay_minutes: RollRange::new(30.0, 180.0),
            },
            treasury_theft: RollRange::new(0.02, 0.10),
            influence_loss: RollRange::new(5.0, 25.0),
            counter_attack: CounterAttackRules {
                chance: 0.3,
                treasury_fraction: RollRange::new(0.01, 0.05),
            },
            insurance_recovery_fraction: 0.5,
            loot_share: 0.5,
        }
    }
}

// ============================================================================
// Rewards
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ContributionRules {
    pub leader_points: u32,
    pub attacker_points: u32,
    pub scout_points: u32,
    /// Multiplies role points by outcome.
    pub outcome_factor: TierTable<f64>,
    /// Added on top for a critical success.
    pub critical_success_bonus: u32,
    /// Credited to the defending leader when a raid ends `defended`.
    pub defended_points: u32,
}

impl ContributionRules {
    pub fn role_points(&self, role: Role) -> u32 {
        match role {
            Role::Leader => self.leader_points,
            Role::Attacker => self.attacker_points,
            Role::Scout => self.scout_points,
        }
    }
}

impl Default for ContributionRules {
    fn default() -> Self {
        Self {
            leader_points: 30,
            attacker_points: 20,
            scout_points: 10,
            outcome_factor: TierTable {
                critical_success: 1.0,
                success: 1.0,
                partial_success: 0.6,
                failure: 0.25,
                critical_failure: 0.1,
            },
            critical_success_bonus: 25,
            defended_points: 25,
        }
    }
}

/// Complete raid configuration.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RaidConfig {
    pub lifecycle: LifecycleRules,
    pub power: PowerRules,
    pub outcome: OutcomeRules,
    pub damage: DamageRules,
    pub contribution: ContributionRules,
    /// Experience granted to the attacking side per outcome tier.
    pub experience: TierTable<u32>,
}

impl Default for TierTable<u32> {
    fn default() -> Self {
        Self {
            critical_success: 200,
            success: 120,
            partial_success: 60,
            failure: 20,
            critical_failure: 5,
        }
    }
}

impl RaidConfig {
    /// Checks ranges and orderings the resolution algorithm relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lifecycle = &self.lifecycle;
        if lifecycle.min_lead_minutes >= lifecycle.max_lead_minutes {
            return Err(ConfigError::LeadWindow);
        }
        if lifecycle.max_roster == 0 {
            return Err(ConfigError::EmptyRoster);
        }

        let outcome = &self.outcome;
        RollRange::new(outcome.min_success_rate, outcome.max_success_rate)
            .check_fraction("outcome.success_rate")?;
        outcome.tables.property.check("outcome.tables.property")?;
        outcome.tables.production.check("outcome.tables.production")?;
        outcome.tables.treasury.check("outcome.tables.treasury")?;
        outcome
            .tables
            .territory_influence
            .check("outcome.tables.territory_influence")?;

        let damage = &self.damage;
        damage.property.storage_loss.check_fraction("damage.property.storage_loss")?;
        damage.property.condition_loss.check("damage.property.condition_loss")?;
        damage
            .production
            .storage_loss
            .check_fraction("damage.production.storage_loss")?;
        damage.production.condition_loss.check("damage.production.condition_loss")?;
        damage
            .production
            .production_delay_minutes
            .check("damage.production.production_delay_minutes")?;
        damage.treasury_theft.check_fraction("damage.treasury_theft")?;
        damage.influence_loss.check("damage.influence_loss")?;
        check_fraction("damage.counter_attack.chance", damage.counter_attack.chance)?;
        damage
            .counter_attack
            .treasury_fraction
            .check_fraction("damage.counter_attack.treasury_fraction")?;
        check_fraction(
            "damage.insurance_recovery_fraction",
            damage.insurance_recovery_fraction,
        )?;
        check_fraction("damage.loot_share", damage.loot_share)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        RaidConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_unordered_thresholds() {
        let mut config = RaidConfig::default();
        config.outcome.tables.treasury.success = 90.0;

        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnorderedThresholds {
                field: "outcome.tables.treasury"
            }
        );
    }

    #[test]
    fn rejects_inverted_lead_window() {
        let mut config = RaidConfig::default();
        config.lifecycle.min_lead_minutes = config.lifecycle.max_lead_minutes;

        assert_eq!(config.validate(), Err(ConfigError::LeadWindow));
    }

    #[test]
    fn tier_table_lookup_matches_fields() {
        let multipliers = RaidConfig::default().damage.tier_multipliers;
        assert_eq!(multipliers.get(OutcomeTier::CriticalSuccess), 1.5);
        assert_eq!(multipliers.get(OutcomeTier::Failure), 0.0);
    }
}
