use std::ops::{Deref, DerefMut};

use super::FuelCoordinator;
use crate::tracker::FuelItem;

/// Holds a coordinator's refuel guard for the duration of a multi-tracker
/// batch. While held, rebalance requests are deferred; the outermost guard
/// clears the flag on drop (every exit path, including early returns and
/// unwinding) and runs at most one deferred rebalance.
pub struct BatchGuard<'a> {
    coordinator: &'a mut FuelCoordinator,
    outermost: bool,
}

impl Deref for BatchGuard<'_> {
    type Target = FuelCoordinator;

    fn deref(&self) -> &FuelCoordinator {
        self.coordinator
    }
}

impl DerefMut for BatchGuard<'_> {
    fn deref_mut(&mut self) -> &mut FuelCoordinator {
        self.coordinator
    }
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        if !self.outermost {
            return;
        }
        self.coordinator.in_progress = false;
        if self.coordinator.rebalance_pending {
            self.coordinator.rebalance_now();
        }
    }
}

impl FuelCoordinator {
    /// Start a refuel batch. Nested batches share the outer guard.
    pub fn begin_batch(&mut self) -> BatchGuard<'_> {
        let outermost = !self.in_progress;
        self.in_progress = true;
        BatchGuard {
            coordinator: self,
            outermost,
        }
    }

    /// Refuel every tracker that accepts the offered items, stepping through
    /// the trackers in link order with the ordering guard held. Stacks are
    /// decremented in place; returns the item units consumed.
    pub fn refuel_items(&mut self, items: &mut [FuelItem], refill_target_reserved: bool) -> u32 {
        let mut batch = self.begin_batch();
        let coordinator: &mut FuelCoordinator = &mut batch;

        let mut consumed = 0;
        let mut cursor = coordinator.links.head();
        while let Some(slot) = cursor {
            consumed += coordinator.trackers[slot].refuel_from_items(items);
            cursor = coordinator.links.next(slot);
        }

        coordinator.notify_refueled(refill_target_reserved);
        consumed
    }
}
