use bevy::prelude::*;

use multifuel::LoadError;

// ---------------------------------------------------------------------------
// Buffer resources
// ---------------------------------------------------------------------------

/// Bytes the host has read from storage, consumed by the next `LoadFuelEvent`.
#[derive(Resource, Default)]
pub struct PendingLoadBytes(pub Option<Vec<u8>>);

/// The container produced by the most recent `SaveFuelEvent`, for the host
/// to write out.
#[derive(Resource, Default)]
pub struct LastSavedBytes(pub Option<Vec<u8>>);

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Event)]
pub struct SaveFuelEvent;

#[derive(Event)]
pub struct LoadFuelEvent;

/// An owner's saved fuel state did not match its trackers; the owner has
/// been despawned.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct FuelLoadFailedEvent {
    pub owner: u64,
    pub entity: Entity,
    pub error: LoadError,
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct FuelSavePlugin;

impl Plugin for FuelSavePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SaveFuelEvent>()
            .add_event::<LoadFuelEvent>()
            .add_event::<FuelLoadFailedEvent>()
            .init_resource::<PendingLoadBytes>()
            .init_resource::<LastSavedBytes>();

        // A frame carrying both events saves the pre-load state.
        app.add_systems(
            Update,
            (
                crate::exclusive_save::exclusive_save,
                crate::exclusive_load::exclusive_load,
            )
                .chain(),
        );
    }
}
