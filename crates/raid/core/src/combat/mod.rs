//! Raid combat resolution.
//!
//! Pure functions only: power, outcome, damage draws and contribution points
//! are computed from plain inputs and an injected [`RaidDice`](crate::env::RaidDice).
//!
//! - `attack_power` / `defense_power`: scalar powers with war adjustments
//! - `resolve_outcome`: power differential + uniform roll -> [`OutcomeTier`](crate::state::OutcomeTier)
//! - `roll_damage` / `roll_counter_attack`: tier-scaled damage figures
//! - `participant_points`: role and outcome dependent contribution

pub mod contribution;
pub mod damage;
pub mod outcome;
pub mod power;

pub use contribution::{ContributionKind, participant_points};
pub use damage::{DamageRoll, portion_of, roll_counter_attack, roll_damage, units_lost};
pub use outcome::{
    OutcomeRoll, classify, effective_success_rate, power_differential, resolve_outcome,
    resolve_with_roll,
};
pub use power::{CombatStats, DefenseProfile, apply_war_context, attack_power, defense_power};
