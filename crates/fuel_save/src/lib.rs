//! World-level save and load of every owner's fuel state.
//!
//! Physical I/O stays with the host: saving fills [`LastSavedBytes`], loading
//! consumes [`PendingLoadBytes`].

pub mod exclusive_load;
pub mod exclusive_save;
pub mod file_header;
pub mod save_error;
pub mod save_plugin;
pub mod save_types;


pub use exclusive_load::{load_fuel_world, LoadReport};
pub use exclusive_save::{collect_fuel_records, save_fuel_world};
pub use save_error::SaveError;
pub use save_plugin::{
    FuelLoadFailedEvent, FuelSavePlugin, LastSavedBytes, LoadFuelEvent, PendingLoadBytes,
    SaveFuelEvent,
};
pub use save_types::{FuelSaveData, OwnerRecord, CURRENT_FUEL_SAVE_VERSION};
