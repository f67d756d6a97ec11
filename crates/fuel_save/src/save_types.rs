// ---------------------------------------------------------------------------
// Save structs and version constants
// ---------------------------------------------------------------------------

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use multifuel::FuelRecord;

/// Current fuel payload version.
/// v1 = per-owner `order` + `amount_<id>` records keyed by `FuelOwner`
pub const CURRENT_FUEL_SAVE_VERSION: u32 = 1;

/// One owner's persisted fuel state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct OwnerRecord {
    /// The owner's `FuelOwner` key.
    pub owner: u64,
    pub record: FuelRecord,
}

/// Everything written into a fuel save container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct FuelSaveData {
    pub version: u32,
    /// Sorted by owner key.
    pub owners: Vec<OwnerRecord>,
}

impl Default for FuelSaveData {
    fn default() -> Self {
        Self {
            version: CURRENT_FUEL_SAVE_VERSION,
            owners: Vec::new(),
        }
    }
}

impl FuelSaveData {
    pub fn encode(&self) -> Vec<u8> {
        bitcode::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, bitcode::Error> {
        bitcode::decode(bytes)
    }
}
