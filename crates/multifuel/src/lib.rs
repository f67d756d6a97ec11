//! Composite fuel for hosts that understand one fuel supply per entity.
//!
//! Several independent [`FuelTracker`]s on one owner are coordinated by a
//! [`FuelCoordinator`] so that, through the [`FuelSource`] trait, they look
//! like a single supply: available only when every tracker has fuel, ticking
//! all-or-nothing, and ordered so the neediest tracker is presented first.

pub mod attach;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod links;
pub mod persistence;
pub mod source;
pub mod systems;
pub mod tracker;

#[cfg(test)]
pub mod test_harness;

pub use attach::{
    attach_fuel_tracker, attach_single_fuel, fuel_inspection_text, fuel_source_kind,
    is_fuel_consumer,
};
pub use config::FuelParams;
pub use coordinator::{BatchGuard, FuelCoordinator, RebalanceOutcome};
pub use error::{FuelError, LoadError};
pub use persistence::{FuelRecord, PersistStore, PersistValue};
pub use source::{FuelSource, FuelSourceKind, RefuelPayload};
pub use systems::{
    FuelConsumer, FuelOwner, FuelRefueledEvent, FuelSet, FuelTickCounter, FuelUsedEvent,
    MultiFuelPlugin, RefillReserved, RefuelEvent,
};
pub use tracker::{
    ConsumptionPolicy, FuelFilter, FuelItem, FuelTracker, FuelTrackerProps, TrackerId,
};
