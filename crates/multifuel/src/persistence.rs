//! Persisted fuel state: the tracker order and each tracker's amount.
//!
//! Layout per owning entity, written through any [`PersistStore`]:
//!
//! - `order`: colon-delimited tracker ids, most urgent first (`"2:0:1"`)
//! - `amount_<id>`: the tracker's stored amount
//!
//! Ids are never reassigned by a load. A saved order naming an id with no
//! matching tracker is a [`LoadError`] and nothing is mutated.

use std::collections::BTreeMap;

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::config::{AMOUNT_KEY_PREFIX, ORDER_KEY, ORDER_SEPARATOR};
use crate::coordinator::FuelCoordinator;
use crate::error::LoadError;
use crate::tracker::{FuelTracker, TrackerId};

// =============================================================================
// Store abstraction
// =============================================================================

/// Key/value sink and source for persisted fuel state.
pub trait PersistStore {
    fn write_text(&mut self, key: &str, value: String);
    fn write_float(&mut self, key: &str, value: f32);
    fn read_text(&self, key: &str) -> Option<String>;
    fn read_float(&self, key: &str) -> Option<f32>;
}

/// One persisted value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[serde(untagged)]
pub enum PersistValue {
    Text(String),
    Float(f32),
}

/// In-memory [`PersistStore`] holding one owner's fuel state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[serde(transparent)]
pub struct FuelRecord {
    fields: BTreeMap<String, PersistValue>,
}

impl FuelRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&PersistValue> {
        self.fields.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<PersistValue> {
        self.fields.remove(key)
    }
}

impl PersistStore for FuelRecord {
    fn write_text(&mut self, key: &str, value: String) {
        self.fields
            .insert(key.to_string(), PersistValue::Text(value));
    }

    fn write_float(&mut self, key: &str, value: f32) {
        self.fields
            .insert(key.to_string(), PersistValue::Float(value));
    }

    fn read_text(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            PersistValue::Text(text) => Some(text.clone()),
            PersistValue::Float(_) => None,
        }
    }

    fn read_float(&self, key: &str) -> Option<f32> {
        match self.fields.get(key)? {
            PersistValue::Float(value) => Some(*value),
            PersistValue::Text(_) => None,
        }
    }
}

// =============================================================================
// Key and order encoding
// =============================================================================

/// Key holding the amount of tracker `id`.
pub fn amount_key(id: TrackerId) -> String {
    format!("{AMOUNT_KEY_PREFIX}{id}")
}

/// Join ids most-urgent-first, e.g. `"2:0:1"`.
pub fn encode_order(ids: &[TrackerId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(&ORDER_SEPARATOR.to_string())
}

/// Parse a saved order string. An empty string is an empty order.
pub fn decode_order(text: &str) -> Result<Vec<TrackerId>, LoadError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    text.split(ORDER_SEPARATOR)
        .map(|token| {
            token
                .trim()
                .parse::<u32>()
                .map(TrackerId)
                .map_err(|_| LoadError::MalformedOrder(token.to_string()))
        })
        .collect()
}

// =============================================================================
// Tracker
// =============================================================================

impl FuelTracker {
    /// Write `amount_<id>`.
    pub fn save_state<S: PersistStore + ?Sized>(&self, store: &mut S) {
        store.write_float(&amount_key(self.id()), self.amount());
    }

    /// Restore the amount if `amount_<id>` is present; otherwise keep it.
    pub fn load_state<S: PersistStore + ?Sized>(&mut self, store: &S) {
        if let Some(amount) = store.read_float(&amount_key(self.id())) {
            self.set_amount(amount);
        }
    }
}

// =============================================================================
// Coordinator
// =============================================================================

impl FuelCoordinator {
    /// Write the current order and every tracker's amount.
    pub fn save_state<S: PersistStore + ?Sized>(&self, store: &mut S) {
        store.write_text(ORDER_KEY, encode_order(&self.order_ids()));
        for tracker in self.iter_ordered() {
            tracker.save_state(store);
        }
    }

    /// Restore order and amounts onto already reconstructed trackers.
    ///
    /// The new order is computed in full before anything is touched, so an
    /// error leaves the coordinator exactly as it was. Trackers missing from
    /// the saved order are appended in id order; a missing `order` key keeps
    /// the current order.
    pub fn load_state<S: PersistStore + ?Sized>(&mut self, store: &S) -> Result<(), LoadError> {
        let order = match store.read_text(ORDER_KEY) {
            Some(text) => Some(self.resolve_saved_order(&decode_order(&text)?)?),
            None => None,
        };

        if let Some(order) = order {
            self.apply_order(order);
        }
        for tracker in self.trackers_by_slot_mut() {
            tracker.load_state(store);
        }
        Ok(())
    }

    /// Map saved ids to storage slots.
    fn resolve_saved_order(&self, ids: &[TrackerId]) -> Result<Vec<usize>, LoadError> {
        let mut placed = vec![false; self.len()];
        let mut order = Vec::with_capacity(self.len());

        for &id in ids {
            let slot = self.slot_of(id).ok_or(LoadError::UnknownTrackerId(id))?;
            if placed[slot] {
                return Err(LoadError::DuplicateOrderEntry(id));
            }
            placed[slot] = true;
            order.push(slot);
        }

        // Storage slots are in ascending id order.
        for (slot, &was_placed) in placed.iter().enumerate() {
            if was_placed {
                continue;
            }
            if let Some(tracker) = self.tracker_at(slot) {
                warn!(
                    "Fuel tracker {} ({}) missing from saved order, appending",
                    tracker.id(),
                    tracker.label()
                );
            }
            order.push(slot);
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FuelError;
    use crate::tracker::{ConsumptionPolicy, FuelTrackerProps};

    fn props(fill: f32) -> FuelTrackerProps {
        FuelTrackerProps::new(100.0, ConsumptionPolicy::Continuous { per_tick: 1.0 })
            .with_initial_fill(fill)
    }

    fn rebalanced_three() -> FuelCoordinator {
        // A=0.8, B=0.2, C=0.5 -> order 1:2:0
        let mut c = FuelCoordinator::new();
        for fill in [0.8, 0.2, 0.5] {
            c.register(&props(fill)).unwrap();
        }
        c.periodic_rebalance(false);
        c
    }

    fn fresh(count: usize) -> FuelCoordinator {
        let mut c = FuelCoordinator::new();
        for _ in 0..count {
            c.register(&props(0.0)).unwrap();
        }
        c
    }

    #[test]
    fn test_encode_decode_order() {
        let ids = vec![TrackerId(2), TrackerId(0), TrackerId(1)];
        assert_eq!(encode_order(&ids), "2:0:1");
        assert_eq!(decode_order("2:0:1"), Ok(ids));
        assert_eq!(decode_order(""), Ok(Vec::new()));
    }

    #[test]
    fn test_decode_order_rejects_garbage() {
        assert_eq!(
            decode_order("2:x:1"),
            Err(LoadError::MalformedOrder("x".to_string()))
        );
        assert!(decode_order("1::2").is_err());
    }

    #[test]
    fn test_save_writes_order_and_amounts() {
        let c = rebalanced_three();
        let mut record = FuelRecord::new();
        c.save_state(&mut record);

        assert_eq!(record.read_text(ORDER_KEY).as_deref(), Some("1:2:0"));
        assert_eq!(record.read_float("amount_0"), Some(80.0));
        assert_eq!(record.read_float("amount_1"), Some(20.0));
        assert_eq!(record.read_float("amount_2"), Some(50.0));
        assert_eq!(record.len(), 4);
    }

    #[test]
    fn test_round_trip_restores_order_links_and_amounts() {
        let original = rebalanced_three();
        let mut record = FuelRecord::new();
        original.save_state(&mut record);

        let mut restored = fresh(3);
        restored.load_state(&record).unwrap();

        assert_eq!(restored.order_ids(), original.order_ids());
        for (a, b) in restored.iter_ordered().zip(original.iter_ordered()) {
            assert_eq!(a.id(), b.id());
            assert!((a.amount() - b.amount()).abs() < 1e-4);
        }
        assert_eq!(restored.primary().map(FuelTracker::id), Some(TrackerId(1)));
    }

    #[test]
    fn test_load_matches_trackers_supplied_in_any_storage_order() {
        let mut record = FuelRecord::new();
        record.write_text(ORDER_KEY, "2:0:1".to_string());
        record.write_float("amount_2", 7.0);

        let trackers: Vec<FuelTracker> = [1, 2, 0]
            .into_iter()
            .map(|id| FuelTracker::new(TrackerId(id), &props(0.0)).unwrap())
            .collect();
        let mut c = FuelCoordinator::from_trackers(trackers).unwrap();
        c.load_state(&record).unwrap();

        assert_eq!(
            c.order_ids(),
            vec![TrackerId(2), TrackerId(0), TrackerId(1)]
        );
        assert_eq!(c.tracker(TrackerId(2)).unwrap().amount(), 7.0);
        assert_eq!(c.tracker(TrackerId(0)).unwrap().amount(), 0.0);
    }

    #[test]
    fn test_unknown_id_is_fatal_and_leaves_state_untouched() {
        let mut record = FuelRecord::new();
        record.write_text(ORDER_KEY, "0:5".to_string());
        record.write_float("amount_0", 40.0);

        let mut c = fresh(2);
        let before = c.order_ids();
        assert_eq!(
            c.load_state(&record),
            Err(LoadError::UnknownTrackerId(TrackerId(5)))
        );
        assert_eq!(c.order_ids(), before);
        assert_eq!(c.tracker(TrackerId(0)).unwrap().amount(), 0.0);
    }

    #[test]
    fn test_duplicate_id_is_fatal() {
        let mut record = FuelRecord::new();
        record.write_text(ORDER_KEY, "1:1".to_string());
        let mut c = fresh(2);
        assert_eq!(
            c.load_state(&record),
            Err(LoadError::DuplicateOrderEntry(TrackerId(1)))
        );
    }

    #[test]
    fn test_tracker_missing_from_saved_order_is_appended() {
        let mut record = FuelRecord::new();
        record.write_text(ORDER_KEY, "2:0".to_string());
        let mut c = fresh(4);
        c.load_state(&record).unwrap();
        assert_eq!(
            c.order_ids(),
            vec![TrackerId(2), TrackerId(0), TrackerId(1), TrackerId(3)]
        );
    }

    #[test]
    fn test_missing_keys_keep_current_state() {
        let mut c = rebalanced_three();
        let before = c.order_ids();
        c.load_state(&FuelRecord::new()).unwrap();
        assert_eq!(c.order_ids(), before);
        assert_eq!(c.tracker(TrackerId(0)).unwrap().amount(), 80.0);
    }

    #[test]
    fn test_lone_tracker_persists_amount() {
        let tracker = FuelTracker::new(TrackerId(0), &props(0.25)).unwrap();
        let mut record = FuelRecord::new();
        tracker.save_state(&mut record);
        assert_eq!(record.read_text(ORDER_KEY), None);

        let mut loaded = FuelTracker::new(TrackerId(0), &props(0.0)).unwrap();
        loaded.load_state(&record);
        assert_eq!(loaded.amount(), 25.0);
    }

    #[test]
    fn test_record_type_mismatch_reads_as_missing() {
        let mut record = FuelRecord::new();
        record.write_float(ORDER_KEY, 1.0);
        record.write_text("amount_0", "lots".to_string());
        assert_eq!(record.read_text(ORDER_KEY), None);
        assert_eq!(record.read_float("amount_0"), None);
    }

    #[test]
    fn test_record_json_shape_is_flat() {
        let mut c = fresh(2);
        c.tracker_mut(TrackerId(0)).unwrap().set_amount(50.0);
        c.periodic_rebalance(false);
        let mut record = FuelRecord::new();
        c.save_state(&mut record);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "order": "1:0", "amount_0": 50.0, "amount_1": 0.0 })
        );
        let back: FuelRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_record_bitcode_round_trip() {
        let c = rebalanced_three();
        let mut record = FuelRecord::new();
        c.save_state(&mut record);
        let bytes = bitcode::encode(&record);
        let decoded: FuelRecord = bitcode::decode(&bytes).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_duplicate_reconstructed_ids_surface_as_fuel_error() {
        let t = FuelTracker::new(TrackerId(4), &props(0.0)).unwrap();
        assert_eq!(
            FuelCoordinator::from_trackers(vec![t.clone(), t]).err(),
            Some(FuelError::DuplicateTrackerId(TrackerId(4)))
        );
    }
}
