use std::collections::HashMap;

use bevy::prelude::*;

use multifuel::{FuelCoordinator, FuelOwner, FuelRecord, FuelTracker, LoadError};

use crate::file_header::unwrap_header;
use crate::save_error::SaveError;
use crate::save_plugin::{FuelLoadFailedEvent, LoadFuelEvent, PendingLoadBytes};
use crate::save_types::{FuelSaveData, CURRENT_FUEL_SAVE_VERSION};

/// Outcome of applying a fuel save to the world.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Owners whose state was restored.
    pub restored: usize,
    /// Owner keys despawned because their record was inconsistent.
    pub despawned: Vec<u64>,
    /// Owner keys in the save with no matching entity.
    pub unmatched: Vec<u64>,
}

/// Validate `bytes` and restore every owner's fuel state onto the entities
/// already in `world`, matched by `FuelOwner` key.
///
/// An owner whose record does not fit its trackers is despawned immediately;
/// the remaining owners still load.
pub fn load_fuel_world(world: &mut World, bytes: &[u8]) -> Result<LoadReport, SaveError> {
    let (header, payload) = unwrap_header(bytes)?;
    debug!(
        "Fuel save header: format v{}, payload {} bytes, checksum {:#010X}",
        header.format_version, header.payload_size, header.checksum
    );

    let data = FuelSaveData::decode(payload)?;
    if data.version > CURRENT_FUEL_SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected_max: CURRENT_FUEL_SAVE_VERSION,
            found: data.version,
        });
    }

    let mut query = world.query::<(Entity, &FuelOwner)>();
    let entities: HashMap<u64, Entity> = query
        .iter(world)
        .map(|(entity, owner)| (owner.0, entity))
        .collect();

    let mut report = LoadReport::default();
    for saved in data.owners {
        let Some(&entity) = entities.get(&saved.owner) else {
            warn!(
                "Fuel save names owner {} but no such entity exists",
                saved.owner
            );
            report.unmatched.push(saved.owner);
            continue;
        };

        match apply_record(world, entity, &saved.record) {
            Ok(()) => report.restored += 1,
            Err(err) => {
                error!(
                    "Fuel state for owner {} is inconsistent ({err}); despawning {entity}",
                    saved.owner
                );
                world.despawn(entity);
                world.send_event(FuelLoadFailedEvent {
                    owner: saved.owner,
                    entity,
                    error: err,
                });
                report.despawned.push(saved.owner);
            }
        }
    }

    info!(
        "Loaded fuel state: {} restored, {} despawned, {} unmatched",
        report.restored,
        report.despawned.len(),
        report.unmatched.len()
    );
    Ok(report)
}

fn apply_record(world: &mut World, entity: Entity, record: &FuelRecord) -> Result<(), LoadError> {
    if let Some(mut coordinator) = world.get_mut::<FuelCoordinator>(entity) {
        return coordinator.load_state(record);
    }
    if let Some(mut single) = world.get_mut::<FuelTracker>(entity) {
        single.load_state(record);
    }
    Ok(())
}

/// Exclusive system: on `LoadFuelEvent`, apply the bytes held in
/// `PendingLoadBytes`. Entity despawns are immediate.
pub(crate) fn exclusive_load(world: &mut World) {
    if world
        .resource_mut::<Events<LoadFuelEvent>>()
        .drain()
        .count()
        == 0
    {
        return;
    }

    if let Err(e) = exclusive_load_inner(world) {
        error!("Fuel load failed: {e}");
    }
}

fn exclusive_load_inner(world: &mut World) -> Result<LoadReport, SaveError> {
    let bytes = world.resource_mut::<PendingLoadBytes>().0.take();
    let bytes = bytes.ok_or(SaveError::NoData)?;
    load_fuel_world(world, &bytes)
}
