//! Cadence-gated rebalancing and the refill reservation.

use crate::config::REBALANCE_INTERVAL;
use crate::test_harness::TestFuelWorld;
use crate::tracker::TrackerId;

fn ids(raw: &[u32]) -> Vec<TrackerId> {
    raw.iter().copied().map(TrackerId).collect()
}

#[test]
fn test_rebalance_waits_for_interval() {
    let mut world = TestFuelWorld::new().with_rebalance_interval(10);
    let owner = world.spawn_composite(1, &[0.8, 0.2, 0.5]);

    world.tick(9);
    assert_eq!(world.coordinator(owner).order_ids(), ids(&[0, 1, 2]));

    world.tick(1);
    assert_eq!(world.coordinator(owner).order_ids(), ids(&[1, 2, 0]));
    assert_eq!(world.coordinator(owner).rebalance_count(), 1);
}

#[test]
fn test_default_cadence_is_two_thousand_ticks() {
    let mut world = TestFuelWorld::new();
    // Large capacity so nothing runs dry before the first rebalance.
    let owner = world.spawn_owner(1);
    for fill in [0.9, 0.6] {
        world
            .attach(
                owner,
                &crate::tracker::FuelTrackerProps::new(
                    10_000.0,
                    crate::tracker::ConsumptionPolicy::Continuous { per_tick: 1.0 },
                )
                .with_initial_fill(fill),
            )
            .unwrap();
    }

    world.tick(REBALANCE_INTERVAL as u32 - 1);
    assert_eq!(world.coordinator(owner).rebalance_count(), 0);

    world.tick(1);
    assert_eq!(world.coordinator(owner).rebalance_count(), 1);
    assert_eq!(world.coordinator(owner).order_ids(), ids(&[1, 0]));
}

#[test]
fn test_reserved_refill_target_blocks_rebalance() {
    let mut world = TestFuelWorld::new().with_rebalance_interval(10);
    let owner = world.spawn_composite(1, &[0.8, 0.2]);

    world.reserve_refill(owner);
    world.tick(30);
    assert_eq!(world.coordinator(owner).order_ids(), ids(&[0, 1]));
    assert_eq!(world.coordinator(owner).rebalance_count(), 0);

    world.release_refill(owner);
    world.tick(10);
    assert_eq!(world.coordinator(owner).order_ids(), ids(&[1, 0]));
}

#[test]
fn test_owners_rebalance_independently() {
    let mut world = TestFuelWorld::new().with_rebalance_interval(5);
    let reserved = world.spawn_composite(1, &[0.9, 0.1]);
    let free = world.spawn_composite(2, &[0.9, 0.1]);
    world.reserve_refill(reserved);

    world.tick(5);

    assert_eq!(world.coordinator(reserved).order_ids(), ids(&[0, 1]));
    assert_eq!(world.coordinator(free).order_ids(), ids(&[1, 0]));
}

#[test]
fn test_links_mirror_order_after_plugin_rebalance() {
    let mut world = TestFuelWorld::new().with_rebalance_interval(3);
    let owner = world.spawn_composite(1, &[0.7, 0.3, 0.5, 0.1]);
    world.tick(3);

    let coordinator = world.coordinator(owner);
    let walked: Vec<TrackerId> = coordinator.iter_ordered().map(|t| t.id()).collect();
    assert_eq!(walked, ids(&[3, 1, 2, 0]));
    assert_eq!(coordinator.primary().map(|t| t.id()), Some(TrackerId(3)));
}
