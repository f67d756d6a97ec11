use bevy::prelude::*;

use multifuel::{FuelCoordinator, FuelOwner, FuelRecord, FuelTracker};

use crate::file_header::wrap_with_header;
use crate::save_error::SaveError;
use crate::save_plugin::{LastSavedBytes, SaveFuelEvent};
use crate::save_types::{FuelSaveData, OwnerRecord, CURRENT_FUEL_SAVE_VERSION};

/// Collect one record per `FuelOwner` entity that carries fuel, sorted by
/// owner key.
pub fn collect_fuel_records(world: &mut World) -> Result<FuelSaveData, SaveError> {
    let mut owners = Vec::new();
    let mut query = world.query::<(&FuelOwner, Option<&FuelCoordinator>, Option<&FuelTracker>)>();
    for (owner, coordinator, single) in query.iter(world) {
        let mut record = FuelRecord::new();
        if let Some(coordinator) = coordinator {
            coordinator.save_state(&mut record);
        } else if let Some(single) = single {
            single.save_state(&mut record);
        } else {
            continue;
        }
        owners.push(OwnerRecord {
            owner: owner.0,
            record,
        });
    }

    owners.sort_by_key(|o| o.owner);
    if let Some(pair) = owners
        .windows(2)
        .find(|pair| pair[0].owner == pair[1].owner)
    {
        return Err(SaveError::Encode(format!(
            "owner key {} is used by more than one entity",
            pair[0].owner
        )));
    }

    Ok(FuelSaveData {
        version: CURRENT_FUEL_SAVE_VERSION,
        owners,
    })
}

/// Serialize every owner's fuel state into a checksummed container.
pub fn save_fuel_world(world: &mut World) -> Result<Vec<u8>, SaveError> {
    let data = collect_fuel_records(world)?;
    let bytes = wrap_with_header(&data.encode());
    info!(
        "Saved fuel state for {} owners ({} bytes)",
        data.owners.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Exclusive system: on `SaveFuelEvent`, store a fresh container in
/// `LastSavedBytes`. Several events in one frame produce one save.
pub(crate) fn exclusive_save(world: &mut World) {
    if world
        .resource_mut::<Events<SaveFuelEvent>>()
        .drain()
        .count()
        == 0
    {
        return;
    }

    match save_fuel_world(world) {
        Ok(bytes) => world.resource_mut::<LastSavedBytes>().0 = Some(bytes),
        Err(e) => error!("Fuel save failed: {e}"),
    }
}
