//! Result payload embedded in a resolved [`RaidAttempt`](super::RaidAttempt).
//!
//! Clients render raid outcomes directly from this shape, so it is versioned
//! through [`RESULT_SCHEMA_VERSION`]. The type-specific part is a closed variant
//! selected by the target kind instead of a bag of optional fields.

use super::common::{TargetKind, ZoneId};

/// Version of the serialized [`RaidResult`] layout.
pub const RESULT_SCHEMA_VERSION: u16 = 1;

/// Discrete resolution result, ordered from worst to best.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OutcomeTier {
    CriticalFailure,
    Failure,
    PartialSuccess,
    Success,
    CriticalSuccess,
}

impl OutcomeTier {
    /// Tiers that apply damage to the target.
    pub const fn is_effective(self) -> bool {
        matches!(
            self,
            Self::PartialSuccess | Self::Success | Self::CriticalSuccess
        )
    }

    /// Numeric rank used for statistics (0 = critical failure).
    pub const fn rank(self) -> u8 {
        self as u8
    }
}

/// Storage and condition losses on a property.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyDamage {
    /// Fraction of every stored stack removed, in `[0, 1]`.
    pub storage_loss_fraction: f64,
    /// Estimated currency value of the goods removed.
    pub storage_value_lost: u64,
    pub condition_damage: u32,
    /// Recovery owed by the insurer; settled outside the raid transaction.
    pub insurance_recovery: Option<u64>,
}

/// Property losses plus a push-back of in-flight production.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProductionDamage {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub property: PropertyDamage,
    pub production_halt_minutes: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreasuryDamage {
    pub theft_fraction: f64,
    pub currency_stolen: u64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InfluenceDamage {
    pub zone: ZoneId,
    pub influence_lost: u32,
}

/// Target-specific effects of a raid.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "target_type", rename_all = "snake_case")
)]
pub enum DamageDetail {
    Property(PropertyDamage),
    Production(ProductionDamage),
    Treasury(TreasuryDamage),
    TerritoryInfluence(InfluenceDamage),
}

impl DamageDetail {
    /// Zero-effect detail for the given target kind.
    pub fn none(kind: TargetKind, zone: ZoneId) -> Self {
        match kind {
            TargetKind::Property => Self::Property(PropertyDamage::default()),
            TargetKind::Production => Self::Production(ProductionDamage::default()),
            TargetKind::Treasury => Self::Treasury(TreasuryDamage::default()),
            TargetKind::TerritoryInfluence => Self::TerritoryInfluence(InfluenceDamage {
                zone,
                influence_lost: 0,
            }),
        }
    }

    pub const fn target_kind(&self) -> TargetKind {
        match self {
            Self::Property(_) => TargetKind::Property,
            Self::Production(_) => TargetKind::Production,
            Self::Treasury(_) => TargetKind::Treasury,
            Self::TerritoryInfluence(_) => TargetKind::TerritoryInfluence,
        }
    }

    /// Scalar damage figure used to decide the terminal status.
    pub fn total_damage(&self) -> u64 {
        fn property_total(damage: &PropertyDamage) -> u64 {
            damage.storage_value_lost + u64::from(damage.condition_damage)
        }

        match self {
            Self::Property(damage) => property_total(damage),
            Self::Production(damage) => {
                property_total(&damage.property) + u64::from(damage.production_halt_minutes)
            }
            Self::Treasury(damage) => damage.currency_stolen,
            Self::TerritoryInfluence(damage) => u64::from(damage.influence_lost),
        }
    }

    pub fn insurance_recovery(&self) -> Option<u64> {
        match self {
            Self::Property(damage) => damage.insurance_recovery,
            Self::Production(damage) => damage.property.insurance_recovery,
            Self::Treasury(_) | Self::TerritoryInfluence(_) => None,
        }
    }
}

/// Ambush that struck the attacking treasury after a critical failure.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CounterAttack {
    pub fraction: f64,
    pub currency_lost: u64,
}

/// Resolved outcome of a raid attempt.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RaidResult {
    pub schema_version: u16,
    pub outcome: OutcomeTier,
    pub total_damage: u64,
    pub experience_awarded: u32,
    pub currency_awarded: u64,
    pub damage: DamageDetail,
    pub counter_attack: Option<CounterAttack>,
}

impl RaidResult {
    /// Builds a result, deriving `total_damage` from the detail.
    pub fn new(
        outcome: OutcomeTier,
        damage: DamageDetail,
        experience_awarded: u32,
        currency_awarded: u64,
    ) -> Self {
        Self {
            schema_version: RESULT_SCHEMA_VERSION,
            outcome,
            total_damage: damage.total_damage(),
            experience_awarded,
            currency_awarded,
            damage,
            counter_attack: None,
        }
    }

    #[must_use]
    pub fn with_counter_attack(mut self, counter_attack: CounterAttack) -> Self {
        self.counter_attack = Some(counter_attack);
        self
    }
}
