//! The single-fuel surface a host consumes.
//!
//! Host logic written against "one fuel supply per entity" depends on
//! [`FuelSource`]. A lone [`FuelTracker`] implements it directly; a
//! [`FuelCoordinator`] implements it by delegating to its composite
//! operations, so the two are interchangeable from the host's side.

use serde::{Deserialize, Serialize};

use crate::coordinator::{FuelCoordinator, RebalanceOutcome};
use crate::tracker::{FuelItem, FuelTracker};

/// Which variant answers for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuelSourceKind {
    Single,
    Composite,
}

/// What a refuel delivers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RefuelPayload {
    /// Raw fuel added to the primary.
    Amount(f32),
    /// Item stacks offered to every tracker that accepts them.
    Items(Vec<FuelItem>),
}

pub trait FuelSource {
    fn kind(&self) -> FuelSourceKind;

    /// Availability as the host sees it.
    fn has_supply(&self) -> bool;

    /// One simulated tick. Returns whether fuel was burned.
    fn tick(&mut self) -> bool;

    fn notify_used(&mut self);

    /// `refill_target_reserved` suppresses the refuel-triggered rebalance
    /// while another delivery still targets the owner.
    fn refuel_amount(&mut self, amount: f32, refill_target_reserved: bool);

    /// Returns the item units consumed.
    fn refuel_items(&mut self, items: &mut [FuelItem], refill_target_reserved: bool) -> u32;

    fn inspection_text(&self) -> String;

    /// The tracker single-fuel logic reads from.
    fn primary(&self) -> Option<&FuelTracker>;

    /// Per-tick ordering hook. Only composites have an order to maintain.
    fn rebalance_tick(&mut self, _current_tick: u64, _reserved: bool) -> RebalanceOutcome {
        RebalanceOutcome::Trivial
    }

    /// Apply a refuel payload; returns item units consumed (0 for amounts).
    fn refuel(&mut self, payload: &mut RefuelPayload, refill_target_reserved: bool) -> u32 {
        match payload {
            RefuelPayload::Amount(amount) => {
                self.refuel_amount(*amount, refill_target_reserved);
                0
            }
            RefuelPayload::Items(items) => self.refuel_items(items, refill_target_reserved),
        }
    }
}

impl FuelSource for FuelTracker {
    fn kind(&self) -> FuelSourceKind {
        FuelSourceKind::Single
    }

    fn has_supply(&self) -> bool {
        FuelTracker::has_supply(self)
    }

    fn tick(&mut self) -> bool {
        if !FuelTracker::has_supply(self) {
            return false;
        }
        FuelTracker::tick(self);
        true
    }

    fn notify_used(&mut self) {
        FuelTracker::notify_used(self);
    }

    fn refuel_amount(&mut self, amount: f32, _refill_target_reserved: bool) {
        self.refill(amount);
    }

    fn refuel_items(&mut self, items: &mut [FuelItem], _refill_target_reserved: bool) -> u32 {
        self.refuel_from_items(items)
    }

    fn inspection_text(&self) -> String {
        FuelTracker::inspection_text(self)
    }

    fn primary(&self) -> Option<&FuelTracker> {
        Some(self)
    }
}

impl FuelSource for FuelCoordinator {
    fn kind(&self) -> FuelSourceKind {
        FuelSourceKind::Composite
    }

    fn has_supply(&self) -> bool {
        self.composite_has_supply()
    }

    fn tick(&mut self) -> bool {
        self.composite_tick()
    }

    fn notify_used(&mut self) {
        FuelCoordinator::notify_used(self);
    }

    fn refuel_amount(&mut self, amount: f32, refill_target_reserved: bool) {
        FuelCoordinator::refuel_amount(self, amount, refill_target_reserved);
    }

    fn refuel_items(&mut self, items: &mut [FuelItem], refill_target_reserved: bool) -> u32 {
        FuelCoordinator::refuel_items(self, items, refill_target_reserved)
    }

    fn inspection_text(&self) -> String {
        FuelCoordinator::inspection_text(self)
    }

    fn primary(&self) -> Option<&FuelTracker> {
        FuelCoordinator::primary(self)
    }

    fn rebalance_tick(&mut self, current_tick: u64, reserved: bool) -> RebalanceOutcome {
        FuelCoordinator::rebalance_tick(self, current_tick, reserved)
    }
}
