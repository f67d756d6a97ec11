// ---------------------------------------------------------------------------
// FuelError / LoadError: typed errors for registration and restore
// ---------------------------------------------------------------------------

use std::fmt;

use bevy::prelude::Entity;

use crate::tracker::TrackerId;

/// Configuration errors, surfaced when a tracker is registered or attached.
#[derive(Debug, Clone, PartialEq)]
pub enum FuelError {
    /// A lone fuel tracker and a composite coordinator were mixed on one owner.
    MixedVariants(Entity),
    /// Capacity must be finite and strictly positive.
    InvalidCapacity(f32),
    /// Consumption rates must be finite and non-negative.
    InvalidConsumption(f32),
    /// Two reconstructed trackers claim the same id.
    DuplicateTrackerId(TrackerId),
    /// The owning entity does not exist.
    MissingOwner(Entity),
}

impl fmt::Display for FuelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuelError::MixedVariants(entity) => write!(
                f,
                "Entity {entity} mixes a single fuel tracker with a multi-fuel coordinator"
            ),
            FuelError::InvalidCapacity(capacity) => {
                write!(f, "Invalid fuel capacity: {capacity}")
            }
            FuelError::InvalidConsumption(rate) => {
                write!(f, "Invalid fuel consumption rate: {rate}")
            }
            FuelError::DuplicateTrackerId(id) => write!(f, "Duplicate fuel tracker id {id}"),
            FuelError::MissingOwner(entity) => write!(f, "Owning entity {entity} does not exist"),
        }
    }
}

impl std::error::Error for FuelError {}

/// Inconsistent persisted state. Fatal for the owning entity: the caller must
/// discard the owner rather than attempt a partial repair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The saved order names an id with no reconstructed tracker.
    UnknownTrackerId(TrackerId),
    /// The saved order contains a token that is not a tracker id.
    MalformedOrder(String),
    /// The saved order names the same id more than once.
    DuplicateOrderEntry(TrackerId),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::UnknownTrackerId(id) => {
                write!(f, "Saved fuel order references unknown tracker id {id}")
            }
            LoadError::MalformedOrder(token) => {
                write!(f, "Saved fuel order contains malformed id '{token}'")
            }
            LoadError::DuplicateOrderEntry(id) => {
                write!(f, "Saved fuel order lists tracker id {id} more than once")
            }
        }
    }
}

impl std::error::Error for LoadError {}
