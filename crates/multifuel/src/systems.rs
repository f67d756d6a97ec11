//! ECS wiring: the per-tick host calls expressed as `FixedUpdate` systems.
//!
//! ```text
//! Counter  →  Events  →  Consume  →  Rebalance
//! ```
//!
//! * **Counter** – advances [`FuelTickCounter`].
//! * **Events** – applies [`FuelUsedEvent`] and [`RefuelEvent`] to their
//!   owners.
//! * **Consume** – one tick of every fuel source.
//! * **Rebalance** – cadence-gated reordering of composite owners, skipped
//!   for owners carrying [`RefillReserved`].
//!
//! The event and consume systems are generic over [`FuelSource`] and
//! registered once for the lone [`FuelTracker`] and once for the composite
//! [`FuelCoordinator`]. Only coordinators have an order to rebalance.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::FuelParams;
use crate::coordinator::{FuelCoordinator, RebalanceOutcome};
use crate::source::{FuelSource, RefuelPayload};
use crate::tracker::FuelTracker;

// =============================================================================
// Components
// =============================================================================

/// Marks an entity whose fuel is tracked, by either variant.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FuelConsumer;

/// Present while a delivery has claimed the owner's refill location.
/// Rebalancing, periodic or refuel-triggered, is skipped for the owner until
/// it is removed.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefillReserved;

/// Stable key identifying an owner across save/load.
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FuelOwner(pub u64);

// =============================================================================
// Resources
// =============================================================================

/// Simulated ticks seen by the fuel systems.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FuelTickCounter(pub u64);

// =============================================================================
// Events
// =============================================================================

/// The owner performed one use this cycle.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuelUsedEvent {
    pub entity: Entity,
}

/// Fuel delivered to an owner.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct RefuelEvent {
    pub entity: Entity,
    pub payload: RefuelPayload,
}

/// A [`RefuelEvent`] was applied. `consumed` counts item units taken.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuelRefueledEvent {
    pub entity: Entity,
    pub consumed: u32,
}

// =============================================================================
// Sets
// =============================================================================

/// Ordered phases of the fuel systems in `FixedUpdate`, configured as a chain.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FuelSet {
    Counter,
    Events,
    Consume,
    Rebalance,
}

// =============================================================================
// Systems
// =============================================================================

pub fn advance_fuel_tick(mut tick: ResMut<FuelTickCounter>) {
    tick.0 = tick.0.wrapping_add(1);
}

pub fn apply_fuel_used<T: FuelSource + Component>(
    mut events: EventReader<FuelUsedEvent>,
    mut sources: Query<&mut T>,
) {
    for event in events.read() {
        if let Ok(mut source) = sources.get_mut(event.entity) {
            source.notify_used();
        }
    }
}

pub fn apply_refuel<T: FuelSource + Component>(
    mut events: EventReader<RefuelEvent>,
    mut sources: Query<(&mut T, Has<RefillReserved>)>,
    mut refueled: EventWriter<FuelRefueledEvent>,
) {
    for event in events.read() {
        let Ok((mut source, reserved)) = sources.get_mut(event.entity) else {
            continue;
        };
        let mut payload = event.payload.clone();
        let consumed = source.refuel(&mut payload, reserved);
        refueled.send(FuelRefueledEvent {
            entity: event.entity,
            consumed,
        });
    }
}

pub fn consume_fuel<T: FuelSource + Component>(mut sources: Query<&mut T>) {
    for mut source in &mut sources {
        source.tick();
    }
}

pub fn rebalance_fuel_coordinators(
    tick: Res<FuelTickCounter>,
    mut coordinators: Query<(Entity, &mut FuelCoordinator, Has<RefillReserved>)>,
) {
    for (entity, mut coordinator, reserved) in &mut coordinators {
        if coordinator.rebalance_tick(tick.0, reserved) == RebalanceOutcome::SkippedReserved {
            debug!("Fuel rebalance for {entity} skipped: refill target reserved");
        }
    }
}

// =============================================================================
// Plugin
// =============================================================================

pub struct MultiFuelPlugin;

impl Plugin for MultiFuelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FuelParams>()
            .init_resource::<FuelTickCounter>()
            .add_event::<FuelUsedEvent>()
            .add_event::<RefuelEvent>()
            .add_event::<FuelRefueledEvent>()
            .configure_sets(
                FixedUpdate,
                (
                    FuelSet::Counter,
                    FuelSet::Events,
                    FuelSet::Consume,
                    FuelSet::Rebalance,
                )
                    .chain(),
            )
            .add_systems(FixedUpdate, advance_fuel_tick.in_set(FuelSet::Counter))
            .add_systems(
                FixedUpdate,
                (
                    apply_fuel_used::<FuelTracker>,
                    apply_fuel_used::<FuelCoordinator>,
                    apply_refuel::<FuelTracker>,
                    apply_refuel::<FuelCoordinator>,
                )
                    .in_set(FuelSet::Events),
            )
            .add_systems(
                FixedUpdate,
                (consume_fuel::<FuelTracker>, consume_fuel::<FuelCoordinator>)
                    .in_set(FuelSet::Consume),
            )
            .add_systems(FixedUpdate, rebalance_fuel_coordinators.in_set(FuelSet::Rebalance));
    }
}
