use bevy::prelude::*;

use super::FuelCoordinator;

/// What a rebalance request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebalanceOutcome {
    /// Sorted and the order changed.
    Reordered,
    /// Sorted; the order was already correct.
    Unchanged,
    /// Fewer than two trackers; nothing to sort.
    Trivial,
    /// The refill target is reserved by an in-flight delivery.
    SkippedReserved,
    /// A refuel batch holds the guard; the rebalance runs when it ends.
    Deferred,
    /// Called off-cadence.
    NotDue,
}

impl FuelCoordinator {
    /// Host hook, called every simulated tick. Rebalances only on ticks that
    /// are a multiple of the coordinator's interval.
    pub fn rebalance_tick(
        &mut self,
        current_tick: u64,
        refill_target_reserved: bool,
    ) -> RebalanceOutcome {
        if !current_tick.is_multiple_of(self.rebalance_interval) {
            return RebalanceOutcome::NotDue;
        }
        self.periodic_rebalance(refill_target_reserved)
    }

    /// Re-sort trackers by urgency unless the refill target is reserved or a
    /// refuel batch is in progress.
    pub fn periodic_rebalance(&mut self, refill_target_reserved: bool) -> RebalanceOutcome {
        if refill_target_reserved {
            return RebalanceOutcome::SkippedReserved;
        }
        if self.in_progress {
            self.rebalance_pending = true;
            return RebalanceOutcome::Deferred;
        }
        self.rebalance_now()
    }

    /// Called after any refill completes. Skips the cadence but not the
    /// reservation: a reserved refill target keeps its order, otherwise the
    /// rebalance runs now or at the end of the current batch.
    pub fn notify_refueled(&mut self, refill_target_reserved: bool) -> RebalanceOutcome {
        self.periodic_rebalance(refill_target_reserved)
    }

    /// Stable ascending sort by fill fraction: the emptiest tracker becomes
    /// primary, equal fractions keep their previous relative order.
    pub(super) fn rebalance_now(&mut self) -> RebalanceOutcome {
        self.rebalance_pending = false;
        if self.order.len() < 2 {
            return RebalanceOutcome::Trivial;
        }

        let previous_primary = self.order[0];
        let mut order = self.order.clone();
        let trackers = &self.trackers;
        order.sort_by(|&a, &b| {
            trackers[a]
                .percent_of_max()
                .total_cmp(&trackers[b].percent_of_max())
        });
        self.rebalance_count += 1;

        if order == self.order {
            return RebalanceOutcome::Unchanged;
        }
        self.apply_order(order);

        if self.order[0] != previous_primary {
            let primary = &self.trackers[self.order[0]];
            debug!(
                "Fuel rebalance: tracker {} ({}) is now primary at {:.0}%",
                primary.id(),
                primary.label(),
                primary.percent_of_max() * 100.0
            );
        }
        RebalanceOutcome::Reordered
    }
}
