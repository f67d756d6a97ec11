//! Installing fuel on an owning entity and querying it by entity.
//!
//! An owner carries exactly one of the two variants: a lone [`FuelTracker`]
//! or a [`FuelCoordinator`]. The first [`attach_fuel_tracker`] call creates
//! the coordinator; later calls register with it.

use bevy::prelude::*;

use crate::config::{FuelParams, REBALANCE_INTERVAL};
use crate::coordinator::FuelCoordinator;
use crate::error::FuelError;
use crate::source::{FuelSource, FuelSourceKind};
use crate::systems::FuelConsumer;
use crate::tracker::{FuelTracker, FuelTrackerProps, TrackerId};

/// Add a tracker to `entity`'s coordinator, creating the coordinator if this
/// is the first one. Returns the new tracker's id.
pub fn attach_fuel_tracker(
    world: &mut World,
    entity: Entity,
    props: &FuelTrackerProps,
) -> Result<TrackerId, FuelError> {
    let interval = world
        .get_resource::<FuelParams>()
        .map_or(REBALANCE_INTERVAL, |params| params.rebalance_interval);

    let mut owner = world
        .get_entity_mut(entity)
        .map_err(|_| FuelError::MissingOwner(entity))?;
    if owner.contains::<FuelTracker>() {
        return Err(FuelError::MixedVariants(entity));
    }

    if let Some(mut coordinator) = owner.get_mut::<FuelCoordinator>() {
        return coordinator.register(props);
    }

    let mut coordinator = FuelCoordinator::new().with_rebalance_interval(interval);
    let id = coordinator.register(props)?;
    owner.insert((coordinator, FuelConsumer));
    debug!("Created fuel coordinator on {entity}");
    Ok(id)
}

/// Give `entity` a single fuel supply with no coordinator.
pub fn attach_single_fuel(
    world: &mut World,
    entity: Entity,
    props: &FuelTrackerProps,
) -> Result<TrackerId, FuelError> {
    let mut owner = world
        .get_entity_mut(entity)
        .map_err(|_| FuelError::MissingOwner(entity))?;
    if owner.contains::<FuelCoordinator>() || owner.contains::<FuelTracker>() {
        return Err(FuelError::MixedVariants(entity));
    }

    let id = TrackerId(0);
    let tracker = FuelTracker::new(id, props)?;
    owner.insert((tracker, FuelConsumer));
    Ok(id)
}

/// Whether `entity` is a fuel consumer. True for both variants.
pub fn is_fuel_consumer(world: &World, entity: Entity) -> bool {
    world.get::<FuelConsumer>(entity).is_some()
}

pub fn fuel_source_kind(world: &World, entity: Entity) -> Option<FuelSourceKind> {
    if let Some(coordinator) = world.get::<FuelCoordinator>(entity) {
        return Some(coordinator.kind());
    }
    world.get::<FuelTracker>(entity).map(FuelSource::kind)
}

/// Inspection text for whichever variant `entity` carries.
pub fn fuel_inspection_text(world: &World, entity: Entity) -> Option<String> {
    if let Some(coordinator) = world.get::<FuelCoordinator>(entity) {
        return Some(coordinator.inspection_text());
    }
    world
        .get::<FuelTracker>(entity)
        .map(FuelTracker::inspection_text)
}
