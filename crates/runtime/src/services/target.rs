//! Target resolution and eligibility.

use raid_core::{
    AssetId, FactionId, FactionRef, TargetDescriptor, TargetFacts, TargetKind, TargetRef,
    Timestamp, check_target,
};

use crate::error::{NotFoundKind, RaidError, Result};
use crate::repository::{FactionStore, PropertyStore, RaidRepository, TerritoryStore, WorldView};

/// Looks up canonical target metadata and decides whether it may be raided.
pub struct TargetResolver;

impl TargetResolver {
    /// Fetches the descriptor of a target from the store matching its kind.
    pub fn resolve<V>(view: &V, target: TargetRef) -> Result<TargetDescriptor>
    where
        V: PropertyStore + FactionStore + TerritoryStore + ?Sized,
    {
        let not_found = || RaidError::NotFound(NotFoundKind::Target);

        match target.kind {
            TargetKind::Property | TargetKind::Production => {
                let id = AssetId(target.id);
                let property = view.property(id)?.ok_or_else(not_found)?;
                if target.kind == TargetKind::Production && !property.is_production() {
                    return Err(not_found());
                }
                let owner_faction = match view.faction_of(property.owner)? {
                    Some(faction) => Self::faction_ref(view, faction)?,
                    None => None,
                };
                Ok(TargetDescriptor {
                    target,
                    name: property.name,
                    zone: property.zone,
                    owner_faction,
                    owner_character: Some(property.owner),
                })
            }
            TargetKind::Treasury => {
                let faction = view.faction(FactionId(target.id))?.ok_or_else(not_found)?;
                Ok(TargetDescriptor {
                    target,
                    name: format!("{} treasury", faction.name),
                    zone: faction.home_zone,
                    owner_faction: Some(FactionRef::new(faction.id, faction.name)),
                    owner_character: None,
                })
            }
            TargetKind::TerritoryInfluence => {
                let zone_id = target.zone().ok_or_else(not_found)?;
                let zone = view.zone(zone_id)?.ok_or_else(not_found)?;
                let owner_faction = match zone.controller {
                    Some(faction) => Self::faction_ref(view, faction)?,
                    None => None,
                };
                Ok(TargetDescriptor {
                    target,
                    name: zone.name,
                    zone: zone.id,
                    owner_faction,
                    owner_character: None,
                })
            }
        }
    }

    /// Store-derived facts the eligibility rules run on.
    pub fn facts<V: WorldView + ?Sized>(
        view: &V,
        attacker: FactionId,
        descriptor: &TargetDescriptor,
    ) -> Result<TargetFacts> {
        let target = descriptor.target;
        let immune_until = match target.asset() {
            Some(id) => view.property(id)?.and_then(|property| property.immune_until),
            None => None,
        };
        let owner_in_attacking_faction = match descriptor.owner_character {
            Some(owner) if target.kind.is_asset() => view.is_member(attacker, owner)?,
            _ => false,
        };

        Ok(TargetFacts {
            cooldown_until: view.cooldown_until(attacker, target)?,
            immune_until,
            owner_in_attacking_faction,
            owner_faction: descriptor.owner_faction.clone(),
            active_attempt: view.active_raid(attacker, target)?.is_some(),
        })
    }

    /// Resolves the target and checks it. Performs no writes.
    pub fn validate<V: WorldView + ?Sized>(
        view: &V,
        attacker: FactionId,
        target: TargetRef,
        now: Timestamp,
    ) -> Result<TargetDescriptor> {
        let descriptor = Self::resolve(view, target)?;
        let facts = Self::facts(view, attacker, &descriptor)?;
        check_target(attacker, target, &facts, now)?;
        Ok(descriptor)
    }

    fn faction_ref<V: FactionStore + ?Sized>(view: &V, id: FactionId) -> Result<Option<FactionRef>> {
        Ok(view
            .faction(id)?
            .map(|faction| FactionRef::new(faction.id, faction.name)))
    }
}

/// Asset id of a property-backed target.
pub(crate) fn asset_of(target: &TargetDescriptor) -> Result<AssetId> {
    target.target.asset().ok_or_else(|| {
        RaidError::Execution(format!("{} is not a property-backed target", target.target))
    })
}

/// Defending faction of a target that must have one.
pub(crate) fn defender_of(target: &TargetDescriptor) -> Result<&FactionRef> {
    target
        .owner_faction
        .as_ref()
        .ok_or(RaidError::Rejected(raid_core::Rejection::NoDefendingFaction))
}
