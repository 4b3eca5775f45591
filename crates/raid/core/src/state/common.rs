use core::fmt;

use chrono::{DateTime, Utc};

/// Wall-clock instant used for every lifecycle timestamp.
pub type Timestamp = DateTime<Utc>;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident($inner:ty), $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }
    };
}

id_type!(
    /// Unique identifier of a raid attempt.
    RaidId(u64),
    "raid"
);
id_type!(
    /// Player faction (gang) identifier.
    FactionId(u64),
    "faction"
);
id_type!(
    /// Player character identifier.
    CharacterId(u64),
    "character"
);
id_type!(
    /// Owned property or production facility identifier.
    AssetId(u64),
    "asset"
);
id_type!(
    /// Geographic zone identifier.
    ZoneId(u32),
    "zone"
);
id_type!(
    /// Declared conflict (war) identifier.
    ConflictId(u64),
    "conflict"
);

/// Category of asset being attacked.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TargetKind {
    Property,
    Production,
    Treasury,
    TerritoryInfluence,
}

impl TargetKind {
    /// Property-backed targets carry condition, storage and an immunity window.
    pub const fn is_asset(self) -> bool {
        matches!(self, Self::Property | Self::Production)
    }
}

/// Raw target identifier, interpreted according to [`TargetKind`].
///
/// - `Property` / `Production`: an [`AssetId`]
/// - `Treasury`: the defending [`FactionId`]
/// - `TerritoryInfluence`: the [`ZoneId`] being contested
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetRef {
    pub kind: TargetKind,
    pub id: u64,
}

impl TargetRef {
    pub const fn new(kind: TargetKind, id: u64) -> Self {
        Self { kind, id }
    }

    pub const fn property(id: AssetId) -> Self {
        Self::new(TargetKind::Property, id.0)
    }

    pub const fn production(id: AssetId) -> Self {
        Self::new(TargetKind::Production, id.0)
    }

    pub const fn treasury(faction: FactionId) -> Self {
        Self::new(TargetKind::Treasury, faction.0)
    }

    pub const fn territory(zone: ZoneId) -> Self {
        Self::new(TargetKind::TerritoryInfluence, zone.0 as u64)
    }

    /// Returns the asset id for property-backed targets.
    pub const fn asset(&self) -> Option<AssetId> {
        if self.kind.is_asset() {
            Some(AssetId(self.id))
        } else {
            None
        }
    }

    pub const fn faction(&self) -> Option<FactionId> {
        match self.kind {
            TargetKind::Treasury => Some(FactionId(self.id)),
            _ => None,
        }
    }

    pub const fn zone(&self) -> Option<ZoneId> {
        match self.kind {
            TargetKind::TerritoryInfluence => Some(ZoneId(self.id as u32)),
            _ => None,
        }
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Faction id paired with its display name at the time it was captured.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FactionRef {
    pub id: FactionId,
    pub name: String,
}

impl FactionRef {
    pub fn new(id: FactionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
