//! Fuel coordination constants and the runtime-tunable [`FuelParams`] resource.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Default number of simulated ticks between periodic rebalances.
/// Must stay coarse: a rebalance is a full sort of the owner's trackers.
pub const REBALANCE_INTERVAL: u64 = 2000;

/// Persisted key holding the colon-delimited tracker order.
pub const ORDER_KEY: &str = "order";

/// Prefix of the per-tracker persisted amount key (`amount_<id>`).
pub const AMOUNT_KEY_PREFIX: &str = "amount_";

/// Separator between ids in the persisted order string.
pub const ORDER_SEPARATOR: char = ':';

/// Label used when a tracker has neither an explicit label nor a filter.
pub const DEFAULT_FUEL_LABEL: &str = "fuel";

/// Default fraction of the target level below which a tracker asks for a refuel.
pub const DEFAULT_AUTO_REFUEL_FRACTION: f32 = 0.3;

/// Amounts at or below this are treated as empty when printing.
pub const AMOUNT_EPSILON: f32 = 1e-4;

/// Tunables read by the fuel systems. Inserted by `MultiFuelPlugin`; hosts may
/// overwrite it before the first tick.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelParams {
    /// Ticks between periodic rebalances for newly created coordinators.
    pub rebalance_interval: u64,
}

impl Default for FuelParams {
    fn default() -> Self {
        Self {
            rebalance_interval: REBALANCE_INTERVAL,
        }
    }
}
