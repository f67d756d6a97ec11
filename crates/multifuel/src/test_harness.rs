//! # TestFuelWorld: headless harness for fuel integration tests
//!
//! Wraps `bevy::app::App` + `MinimalPlugins` + [`MultiFuelPlugin`] and drives
//! the `FixedUpdate` schedule directly, the way a host simulation would.

use bevy::app::App;
use bevy::prelude::*;

use crate::attach::{attach_fuel_tracker, attach_single_fuel};
use crate::config::FuelParams;
use crate::coordinator::FuelCoordinator;
use crate::error::FuelError;
use crate::source::RefuelPayload;
use crate::systems::{
    FuelOwner, FuelRefueledEvent, FuelTickCounter, FuelUsedEvent, MultiFuelPlugin, RefillReserved,
    RefuelEvent,
};
use crate::tracker::{ConsumptionPolicy, FuelTracker, FuelTrackerProps, TrackerId};

pub struct TestFuelWorld {
    app: App,
}

impl Default for TestFuelWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFuelWorld {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(MultiFuelPlugin);
        app.update();
        Self { app }
    }

    /// Override the rebalance cadence for coordinators created afterwards.
    pub fn with_rebalance_interval(mut self, interval: u64) -> Self {
        self.app.world_mut().insert_resource(FuelParams {
            rebalance_interval: interval,
        });
        self
    }

    // -----------------------------------------------------------------------
    // Spawning
    // -----------------------------------------------------------------------

    /// Spawn an owner with a stable save key and no fuel yet.
    pub fn spawn_owner(&mut self, key: u64) -> Entity {
        self.app.world_mut().spawn(FuelOwner(key)).id()
    }

    pub fn attach(
        &mut self,
        entity: Entity,
        props: &FuelTrackerProps,
    ) -> Result<TrackerId, FuelError> {
        attach_fuel_tracker(self.app.world_mut(), entity, props)
    }

    pub fn attach_single(
        &mut self,
        entity: Entity,
        props: &FuelTrackerProps,
    ) -> Result<TrackerId, FuelError> {
        attach_single_fuel(self.app.world_mut(), entity, props)
    }

    /// Spawn an owner with one continuous tracker (capacity 100, 1 per tick)
    /// per fill fraction, registered in the given order.
    pub fn spawn_composite(&mut self, key: u64, fills: &[f32]) -> Entity {
        let entity = self.spawn_owner(key);
        for &fill in fills {
            self.attach(entity, &burner(fill))
                .expect("test tracker props are valid");
        }
        entity
    }

    // -----------------------------------------------------------------------
    // Host actions
    // -----------------------------------------------------------------------

    /// Run N fixed-update ticks.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.world_mut().run_schedule(FixedUpdate);
        }
    }

    pub fn report_used(&mut self, entity: Entity) {
        self.app.world_mut().send_event(FuelUsedEvent { entity });
    }

    pub fn refuel(&mut self, entity: Entity, payload: RefuelPayload) {
        self.app
            .world_mut()
            .send_event(RefuelEvent { entity, payload });
    }

    pub fn reserve_refill(&mut self, entity: Entity) {
        self.app
            .world_mut()
            .entity_mut(entity)
            .insert(RefillReserved);
    }

    pub fn release_refill(&mut self, entity: Entity) {
        self.app
            .world_mut()
            .entity_mut(entity)
            .remove::<RefillReserved>();
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn current_tick(&self) -> u64 {
        self.app.world().resource::<FuelTickCounter>().0
    }

    pub fn coordinator(&self, entity: Entity) -> &FuelCoordinator {
        self.app
            .world()
            .get::<FuelCoordinator>(entity)
            .expect("entity should carry a FuelCoordinator")
    }

    pub fn coordinator_mut(&mut self, entity: Entity) -> Mut<'_, FuelCoordinator> {
        self.app
            .world_mut()
            .get_mut::<FuelCoordinator>(entity)
            .expect("entity should carry a FuelCoordinator")
    }

    pub fn single(&self, entity: Entity) -> &FuelTracker {
        self.app
            .world()
            .get::<FuelTracker>(entity)
            .expect("entity should carry a FuelTracker")
    }

    pub fn exists(&self, entity: Entity) -> bool {
        self.app.world().get_entity(entity).is_ok()
    }

    /// Every `FuelRefueledEvent` still buffered.
    pub fn refueled_events(&self) -> Vec<FuelRefueledEvent> {
        let events = self.app.world().resource::<Events<FuelRefueledEvent>>();
        let mut reader = events.get_cursor();
        reader.read(events).copied().collect()
    }
}

/// Continuous tracker, capacity 100, burning 1 per tick.
pub fn burner(fill: f32) -> FuelTrackerProps {
    FuelTrackerProps::new(100.0, ConsumptionPolicy::Continuous { per_tick: 1.0 })
        .with_initial_fill(fill)
}
