//! A single depletable fuel supply.
//!
//! A [`FuelTracker`] knows nothing about its siblings. When several trackers
//! share an owner they are stored and ordered by a
//! [`FuelCoordinator`](crate::coordinator::FuelCoordinator); an owner with
//! exactly one supply may carry a tracker directly as a component.

use std::fmt;

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::config::{AMOUNT_EPSILON, DEFAULT_AUTO_REFUEL_FRACTION, DEFAULT_FUEL_LABEL};
use crate::error::FuelError;

// =============================================================================
// Identity
// =============================================================================

/// Stable identity of a tracker within one owner. Assigned once, sequentially
/// from 0, and used only to match persisted state back to its tracker.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
pub struct TrackerId(pub u32);

impl fmt::Display for TrackerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Definition types
// =============================================================================

/// How a tracker burns fuel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConsumptionPolicy {
    /// Burns `per_tick` on every tick the owner runs.
    Continuous { per_tick: f32 },
    /// Burns `per_use` each time the owner reports a use; ticking is free.
    WhenUsed { per_use: f32 },
}

impl ConsumptionPolicy {
    fn rate(self) -> f32 {
        match self {
            ConsumptionPolicy::Continuous { per_tick } => per_tick,
            ConsumptionPolicy::WhenUsed { per_use } => per_use,
        }
    }
}

/// Item kinds a tracker accepts as fuel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelFilter {
    allowed: Vec<String>,
}

impl FuelFilter {
    /// Build a filter accepting the given item kinds.
    pub fn new<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: kinds.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether items of `kind` are accepted.
    pub fn allows(&self, kind: &str) -> bool {
        self.allowed.iter().any(|k| k == kind)
    }

    /// Human-readable description, e.g. `"wood, chemfuel"`.
    pub fn summary(&self) -> String {
        if self.allowed.is_empty() {
            DEFAULT_FUEL_LABEL.to_string()
        } else {
            self.allowed.join(", ")
        }
    }
}

/// A stack of consumable fuel items offered for refuelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelItem {
    /// Item kind, matched against [`FuelFilter`].
    pub kind: String,
    /// Units left in the stack.
    pub count: u32,
}

impl FuelItem {
    pub fn new(kind: impl Into<String>, count: u32) -> Self {
        Self {
            kind: kind.into(),
            count,
        }
    }
}

/// Definition a tracker is created from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelTrackerProps {
    /// Maximum amount held.
    pub capacity: f32,
    /// Burn policy.
    pub consumption: ConsumptionPolicy,
    /// Accepted item kinds.
    pub filter: FuelFilter,
    /// Display label; derived from `filter` when `None`.
    pub label: Option<String>,
    /// Starting amount as a fraction of capacity (0.0 to 1.0).
    pub initial_fill: f32,
    /// Level refuels aim for; capacity when `None`.
    pub target_level: Option<f32>,
    /// Fraction of the target level below which a refuel is requested.
    pub auto_refuel_fraction: f32,
    /// Fuel gained per consumed item unit.
    pub fuel_per_item: f32,
}

impl FuelTrackerProps {
    /// An empty tracker with the given capacity and burn policy.
    pub fn new(capacity: f32, consumption: ConsumptionPolicy) -> Self {
        Self {
            capacity,
            consumption,
            filter: FuelFilter::default(),
            label: None,
            initial_fill: 0.0,
            target_level: None,
            auto_refuel_fraction: DEFAULT_AUTO_REFUEL_FRACTION,
            fuel_per_item: 1.0,
        }
    }

    pub fn with_filter(mut self, filter: FuelFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_initial_fill(mut self, fraction: f32) -> Self {
        self.initial_fill = fraction;
        self
    }

    pub fn with_target_level(mut self, level: f32) -> Self {
        self.target_level = Some(level);
        self
    }

    pub fn with_auto_refuel_fraction(mut self, fraction: f32) -> Self {
        self.auto_refuel_fraction = fraction;
        self
    }

    pub fn with_fuel_per_item(mut self, fuel: f32) -> Self {
        self.fuel_per_item = fuel;
        self
    }
}

// =============================================================================
// FuelTracker
// =============================================================================

/// `value` clamped to `[0, max]`, with NaN read as empty.
fn clamp_or_zero(value: f32, max: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max)
    }
}

/// One independent, depletable fuel supply.
///
/// All arithmetic clamps to `[0, capacity]`; nothing here fails once the
/// tracker is constructed.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct FuelTracker {
    id: TrackerId,
    amount: f32,
    capacity: f32,
    target_level: f32,
    consumption: ConsumptionPolicy,
    filter: FuelFilter,
    label: String,
    auto_refuel_fraction: f32,
    fuel_per_item: f32,
    uses: u64,
}

impl FuelTracker {
    /// Create a tracker with a fixed id from its definition.
    pub fn new(id: TrackerId, props: &FuelTrackerProps) -> Result<Self, FuelError> {
        if !props.capacity.is_finite() || props.capacity <= 0.0 {
            return Err(FuelError::InvalidCapacity(props.capacity));
        }
        let rate = props.consumption.rate();
        if !rate.is_finite() || rate < 0.0 {
            return Err(FuelError::InvalidConsumption(rate));
        }

        let label = props
            .label
            .clone()
            .unwrap_or_else(|| props.filter.summary());
        let target_level = match props.target_level {
            Some(level) if !level.is_nan() => level.clamp(0.0, props.capacity),
            _ => props.capacity,
        };
        let fuel_per_item = if props.fuel_per_item.is_finite() && props.fuel_per_item > 0.0 {
            props.fuel_per_item
        } else {
            1.0
        };

        Ok(Self {
            id,
            amount: props.capacity * clamp_or_zero(props.initial_fill, 1.0),
            capacity: props.capacity,
            target_level,
            consumption: props.consumption,
            filter: props.filter.clone(),
            label,
            auto_refuel_fraction: clamp_or_zero(props.auto_refuel_fraction, 1.0),
            fuel_per_item,
            uses: 0,
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn id(&self) -> TrackerId {
        self.id
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }

    pub fn capacity(&self) -> f32 {
        self.capacity
    }

    pub fn target_level(&self) -> f32 {
        self.target_level
    }

    pub fn consumption(&self) -> ConsumptionPolicy {
        self.consumption
    }

    pub fn filter(&self) -> &FuelFilter {
        &self.filter
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of times the owner reported a use against this tracker.
    pub fn uses(&self) -> u64 {
        self.uses
    }

    /// Overwrite the stored amount (used when restoring saved state). Clamped.
    pub fn set_amount(&mut self, amount: f32) {
        self.amount = clamp_or_zero(amount, self.capacity);
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn has_supply(&self) -> bool {
        self.amount > 0.0
    }

    /// Fill fraction, used as the urgency sort key.
    pub fn percent_of_max(&self) -> f32 {
        self.amount / self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.amount >= self.target_level
    }

    /// Fill fraction relative to the target level.
    pub fn fuel_percent_of_target(&self) -> f32 {
        if self.target_level <= 0.0 {
            return 1.0;
        }
        self.amount / self.target_level
    }

    /// Whether the tracker has dropped below its auto-refuel threshold.
    pub fn should_auto_refuel(&self) -> bool {
        self.fuel_percent_of_target() < self.auto_refuel_fraction
    }

    /// Item units needed to reach the target level; at least 1.
    pub fn fuel_count_to_fully_refuel(&self) -> u32 {
        let missing = (self.target_level - self.amount).max(0.0);
        ((missing / self.fuel_per_item).ceil() as u32).max(1)
    }

    pub fn accepts(&self, item: &FuelItem) -> bool {
        self.filter.allows(&item.kind)
    }

    /// Ticks until a continuously burning tracker runs dry.
    pub fn ticks_until_empty(&self) -> Option<u64> {
        match self.consumption {
            ConsumptionPolicy::Continuous { per_tick } if per_tick > 0.0 => {
                Some((self.amount / per_tick).ceil() as u64)
            }
            _ => None,
        }
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Advance one tick of the burn policy.
    pub fn tick(&mut self) {
        if let ConsumptionPolicy::Continuous { per_tick } = self.consumption {
            self.consume(per_tick);
        }
    }

    /// Remove `delta` fuel, clamping at empty.
    pub fn consume(&mut self, delta: f32) {
        self.amount = (self.amount - delta.max(0.0)).max(0.0);
    }

    /// Add `delta` fuel, clamping at capacity.
    pub fn refill(&mut self, delta: f32) {
        self.amount = (self.amount + delta.max(0.0)).min(self.capacity);
    }

    /// Record one use by the owner, burning fuel for use-driven trackers.
    pub fn notify_used(&mut self) {
        self.uses += 1;
        if let ConsumptionPolicy::WhenUsed { per_use } = self.consumption {
            self.consume(per_use);
        }
    }

    /// Take accepted items from `items` until the target level is reached.
    /// Stacks are decremented in place; returns the item units consumed.
    pub fn refuel_from_items(&mut self, items: &mut [FuelItem]) -> u32 {
        let mut consumed = 0;
        for item in items.iter_mut() {
            if self.is_full() {
                break;
            }
            if item.count == 0 || !self.accepts(item) {
                continue;
            }
            let take = self.fuel_count_to_fully_refuel().min(item.count);
            item.count -= take;
            consumed += take;
            self.refill(take as f32 * self.fuel_per_item);
        }
        consumed
    }

    /// One line of inspection text, e.g. `"wood: 12.0 / 50.0 (240 ticks left)"`.
    pub fn inspection_text(&self) -> String {
        let mut text = format!("{}: {:.1} / {:.1}", self.label, self.amount, self.capacity);
        if self.amount <= AMOUNT_EPSILON {
            text.push_str(" (empty)");
        } else if let Some(ticks) = self.ticks_until_empty() {
            text.push_str(&format!(" ({ticks} ticks left)"));
        }
        text
    }
}

// =============================================================================
// Unit tests
// =============================================================================
