//! Composite fuel: several trackers on one owner presented as a single supply.
//!
//! [`FuelCoordinator`] owns the trackers and an authoritative `order` of their
//! storage slots. Position 0 is the *primary*, the tracker the host's
//! single-fuel logic sees. Traversal goes through [`OrderLinks`], which is
//! rebuilt whenever `order` changes and never edited on its own.

mod batch;
mod ordering;


pub use batch::BatchGuard;
pub use ordering::RebalanceOutcome;

use std::collections::HashSet;

use bevy::prelude::*;

use crate::config::REBALANCE_INTERVAL;
use crate::error::FuelError;
use crate::links::OrderLinks;
use crate::tracker::{FuelTracker, FuelTrackerProps, TrackerId};

/// Ordering and propagation engine for one owning entity's fuel trackers.
#[derive(Component, Debug, Clone)]
pub struct FuelCoordinator {
    /// Storage slots, in registration order. Never reordered.
    trackers: Vec<FuelTracker>,
    /// Slots, most urgent first. Each slot appears exactly once.
    order: Vec<usize>,
    /// Derived mirror of `order`.
    links: OrderLinks,
    next_id: u32,
    rebalance_interval: u64,
    /// Set while a multi-tracker refuel batch is stepping through trackers.
    in_progress: bool,
    /// A rebalance was requested during a batch and runs when it ends.
    rebalance_pending: bool,
    rebalance_count: u64,
}

impl Default for FuelCoordinator {
    fn default() -> Self {
        Self {
            trackers: Vec::new(),
            order: Vec::new(),
            links: OrderLinks::default(),
            next_id: 0,
            rebalance_interval: REBALANCE_INTERVAL,
            in_progress: false,
            rebalance_pending: false,
            rebalance_count: 0,
        }
    }
}

impl FuelCoordinator {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// An empty coordinator with the default rebalance cadence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of ticks between periodic rebalances (minimum 1).
    pub fn with_rebalance_interval(mut self, interval: u64) -> Self {
        self.rebalance_interval = interval.max(1);
        self
    }

    /// Build a coordinator around trackers reconstructed elsewhere, in any
    /// storage order. The canonical order is ascending id, i.e. registration
    /// order; a saved order can then be applied with `load_state`.
    pub fn from_trackers(mut trackers: Vec<FuelTracker>) -> Result<Self, FuelError> {
        let mut seen = HashSet::with_capacity(trackers.len());
        for tracker in &trackers {
            if !seen.insert(tracker.id()) {
                return Err(FuelError::DuplicateTrackerId(tracker.id()));
            }
        }
        trackers.sort_by_key(FuelTracker::id);

        let next_id = trackers.last().map_or(0, |t| t.id().0 + 1);
        let mut coordinator = Self {
            trackers,
            next_id,
            ..Self::default()
        };
        coordinator.apply_order((0..coordinator.trackers.len()).collect());
        Ok(coordinator)
    }

    /// Create a tracker from `props`, assign it the next id and append it to
    /// the end of the order.
    pub fn register(&mut self, props: &FuelTrackerProps) -> Result<TrackerId, FuelError> {
        let id = TrackerId(self.next_id);
        let tracker = FuelTracker::new(id, props)?;
        self.next_id += 1;

        self.trackers.push(tracker);
        let mut order = std::mem::take(&mut self.order);
        order.push(self.trackers.len() - 1);
        self.apply_order(order);
        Ok(id)
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    pub fn rebalance_interval(&self) -> u64 {
        self.rebalance_interval
    }

    /// Whether a refuel batch currently holds the ordering guard.
    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    /// Number of sorts performed so far.
    pub fn rebalance_count(&self) -> u64 {
        self.rebalance_count
    }

    /// The tracker presented to single-fuel logic.
    pub fn primary(&self) -> Option<&FuelTracker> {
        self.links.head().map(|slot| &self.trackers[slot])
    }

    pub fn tracker(&self, id: TrackerId) -> Option<&FuelTracker> {
        self.trackers.iter().find(|t| t.id() == id)
    }

    /// Mutable access to one tracker. Does not reorder.
    pub fn tracker_mut(&mut self, id: TrackerId) -> Option<&mut FuelTracker> {
        self.trackers.iter_mut().find(|t| t.id() == id)
    }

    /// Trackers in traversal order, primary first.
    pub fn iter_ordered(&self) -> impl Iterator<Item = &FuelTracker> + '_ {
        self.links.walk().map(move |slot| &self.trackers[slot])
    }

    /// Tracker ids in traversal order, primary first.
    pub fn order_ids(&self) -> Vec<TrackerId> {
        self.iter_ordered().map(FuelTracker::id).collect()
    }

    // -------------------------------------------------------------------------
    // Composite operations
    // -------------------------------------------------------------------------

    /// True iff every tracker has supply. Walks the links from the primary.
    pub fn composite_has_supply(&self) -> bool {
        self.links
            .walk()
            .all(|slot| self.trackers[slot].has_supply())
    }

    /// Tick every tracker in link order, or none of them if any is dry.
    /// Returns whether the trackers advanced.
    pub fn composite_tick(&mut self) -> bool {
        if !self.composite_has_supply() {
            return false;
        }
        let mut cursor = self.links.head();
        while let Some(slot) = cursor {
            self.trackers[slot].tick();
            cursor = self.links.next(slot);
        }
        true
    }

    /// Report one use of the owner. Marks the primary and each following
    /// tracker in link order, stopping after the first tracker without supply.
    pub fn notify_used(&mut self) {
        let mut cursor = self.links.head();
        while let Some(slot) = cursor {
            let tracker = &mut self.trackers[slot];
            tracker.notify_used();
            if !tracker.has_supply() {
                break;
            }
            cursor = self.links.next(slot);
        }
    }

    /// Refill the primary by `amount`, then re-evaluate the ordering unless
    /// the refill target is reserved.
    pub fn refuel_amount(&mut self, amount: f32, refill_target_reserved: bool) {
        let Some(slot) = self.links.head() else {
            return;
        };
        self.trackers[slot].refill(amount);
        self.notify_refueled(refill_target_reserved);
    }

    /// Every tracker's inspection line in order, newline-joined.
    pub fn inspection_text(&self) -> String {
        self.iter_ordered()
            .map(FuelTracker::inspection_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    // -------------------------------------------------------------------------
    // Internal helpers shared with ordering / persistence
    // -------------------------------------------------------------------------

    /// Storage slot holding the tracker with `id`.
    pub(crate) fn slot_of(&self, id: TrackerId) -> Option<usize> {
        self.trackers.iter().position(|t| t.id() == id)
    }

    /// Trackers in storage order, which is always ascending id.
    pub(crate) fn trackers_by_slot_mut(&mut self) -> std::slice::IterMut<'_, FuelTracker> {
        self.trackers.iter_mut()
    }

    /// Tracker stored in `slot`.
    pub(crate) fn tracker_at(&self, slot: usize) -> Option<&FuelTracker> {
        self.trackers.get(slot)
    }

    /// Replace the order and rebuild the links from it.
    pub(crate) fn apply_order(&mut self, order: Vec<usize>) {
        debug_assert_eq!(order.len(), self.trackers.len());
        self.order = order;
        self.links = OrderLinks::from_order(&self.order, self.trackers.len());
        debug_assert!(self.links.mirrors(&self.order));
    }
}
