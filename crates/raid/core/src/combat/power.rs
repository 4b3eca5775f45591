//! Attack and defense power.

use crate::config::PowerRules;
use crate::state::Role;

/// Combat-relevant character attributes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatStats {
    pub strength: u32,
    pub agility: u32,
    pub level: u32,
}

impl CombatStats {
    pub const fn new(strength: u32, agility: u32, level: u32) -> Self {
        Self {
            strength,
            agility,
            level,
        }
    }

    /// Unweighted individual power: both attributes plus the level term.
    pub fn base_power(&self, rules: &PowerRules) -> f64 {
        f64::from(self.strength) + f64::from(self.agility) + f64::from(self.level) * rules.level_weight
    }
}

/// Defensive state of a target, as reported by the owning store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefenseProfile {
    /// Property or production facility. `active_workers` is only set for production.
    Asset {
        defense_level: u64,
        active_workers: Option<u32>,
    },
    /// Treasury or territory, defended by the faction as a whole.
    Faction { level: u32, member_count: u32 },
}

/// Attack power of a roster.
///
/// # Formula
///
/// ```text
/// individual = (strength + agility + level * level_weight) * role_coefficient
/// attack     = floor(sum(individual) * (1 + (size - 1) * k))
/// ```
pub fn attack_power<'a>(
    roster: impl IntoIterator<Item = (Role, &'a CombatStats)>,
    rules: &PowerRules,
) -> u64 {
    let mut size = 0usize;
    let mut sum = 0.0;
    for (role, stats) in roster {
        size += 1;
        sum += stats.base_power(rules) * rules.role_coefficient(role);
    }
    if size == 0 {
        return 0;
    }

    let bonus = 1.0 + (size - 1) as f64 * rules.roster_bonus_per_member;
    (sum * bonus).floor() as u64
}

/// Defense power of a target, never below the configured floor.
pub fn defense_power(profile: DefenseProfile, rules: &PowerRules) -> u64 {
    let raw = match profile {
        DefenseProfile::Asset {
            defense_level,
            active_workers,
        } => {
            let workers = u64::from(active_workers.unwrap_or(0));
            defense_level + workers * rules.production_worker_bonus
        }
        DefenseProfile::Faction {
            level,
            member_count,
        } => {
            u64::from(level) * rules.faction_level_weight
                + u64::from(member_count) * rules.faction_member_weight
        }
    };
    raw.max(rules.defense_floor)
}

/// Applies the war-raid bonus to attack and penalty to defense.
///
/// Returns `(attack, defense)` unchanged when `war` is false.
pub fn apply_war_context(attack: u64, defense: u64, war: bool, rules: &PowerRules) -> (u64, u64) {
    if !war {
        return (attack, defense);
    }
    let attack = (attack as f64 * (1.0 + rules.war_attack_bonus)).floor() as u64;
    let defense = (defense as f64 * (1.0 - rules.war_defense_penalty)).floor() as u64;
    (attack, defense.max(rules.defense_floor))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> PowerRules {
        PowerRules::default()
    }

    #[test]
    fn solo_leader_power() {
        let stats = CombatStats::new(10, 10, 5);
        // (10 + 10 + 5 * 2) * 1.5 = 45
        assert_eq!(attack_power([(Role::Leader, &stats)], &rules()), 45);
    }

    #[test]
    fn roster_bonus_rewards_larger_raids() {
        let stats = CombatStats::new(10, 10, 5);
        let roster = [
            (Role::Leader, &stats),
            (Role::Attacker, &stats),
            (Role::Scout, &stats),
        ];
        // (45 + 30 + 18) * (1 + 2 * 0.1) = 111.6
        assert_eq!(attack_power(roster, &rules()), 111);
    }

    #[test]
    fn empty_roster_has_no_power() {
        assert_eq!(attack_power(std::iter::empty(), &rules()), 0);
    }

    #[test]
    fn role_coefficients_are_ordered() {
        let stats = CombatStats::new(20, 15, 10);
        let leader = attack_power([(Role::Leader, &stats)], &rules());
        let attacker = attack_power([(Role::Attacker, &stats)], &rules());
        let scout = attack_power([(Role::Scout, &stats)], &rules());
        assert!(leader > attacker && attacker > scout);
    }

    #[test]
    fn defense_floor_applies() {
        let profile = DefenseProfile::Asset {
            defense_level: 0,
            active_workers: None,
        };
        assert_eq!(defense_power(profile, &rules()), rules().defense_floor);
    }

    #[test]
    fn production_workers_add_defense() {
        let profile = DefenseProfile::Asset {
            defense_level: 40,
            active_workers: Some(5),
        };
        assert_eq!(defense_power(profile, &rules()), 50);
    }

    #[test]
    fn faction_defense_uses_level_and_members() {
        let profile = DefenseProfile::Faction {
            level: 3,
            member_count: 8,
        };
        assert_eq!(defense_power(profile, &rules()), 70);
    }

    #[test]
    fn war_context_favors_attacker() {
        let (attack, defense) = apply_war_context(100, 100, true, &rules());
        assert!((114..=115).contains(&attack));
        assert_eq!(defense, 90);
        assert_eq!(apply_war_context(100, 100, false, &rules()), (100, 100));
    }
}
