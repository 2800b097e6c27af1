// Copyright 2025 Cowboy AI, LLC.

//! End-to-end ride lifecycle coverage through the dispatch coordinator

use pretty_assertions::assert_eq;
use ride_dispatch::testing::{fixed_pricing_engine, FixedGeoResolver};
use ride_dispatch::{
    BroadcastHub, Coordinate, DispatchCoordinator, DispatchError, EventPublisher,
    InMemoryRideRegistry, RideStatus, UserId,
};
use std::sync::Arc;

fn harness() -> (DispatchCoordinator, BroadcastHub) {
    let hub = BroadcastHub::new(64);
    let resolver = FixedGeoResolver::default()
        .with_place("Mumbai", 19.076, 72.8777)
        .with_place("Delhi", 28.7041, 77.1025);
    let coordinator = DispatchCoordinator::new(
        Arc::new(InMemoryRideRegistry::new()),
        Arc::new(hub.clone()),
        fixed_pricing_engine(resolver),
    );
    (coordinator, hub)
}

#[tokio::test]
async fn full_lifecycle_pending_accepted_completed() {
    let (coordinator, hub) = harness();
    let mut events = hub.subscribe();
    let rider = UserId::new();
    let driver = UserId::new();

    let ride = coordinator
        .request_ride(rider, "Mumbai", "Delhi")
        .await
        .unwrap();
    assert_eq!(ride.status, RideStatus::Pending);
    assert!(ride.driver.is_none());

    coordinator.accept_ride(ride.id, driver, None).unwrap();
    coordinator
        .update_driver_location(ride.id, driver, Coordinate::new(19.2, 72.9).unwrap())
        .unwrap();
    let completed = coordinator.complete_ride(ride.id, driver).unwrap();

    assert_eq!(completed.status, RideStatus::Completed);
    assert_eq!(completed.driver, Some(driver));
    assert_eq!(completed.location_history.len(), 1);

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event.event_type());
    }
    assert_eq!(
        seen,
        vec![
            "ride.requested",
            "ride.accepted",
            "ride.locationUpdated",
            "ride.completed"
        ]
    );
}

#[tokio::test]
async fn rider_cancels_pending_ride() {
    let (coordinator, hub) = harness();
    let mut events = hub.subscribe();
    let rider = UserId::new();

    let ride = coordinator
        .request_ride(rider, "Mumbai", "Delhi")
        .await
        .unwrap();
    let canceled = coordinator
        .cancel_ride(ride.id, rider, Some("changed plans".to_string()))
        .unwrap();

    assert_eq!(canceled.status, RideStatus::Canceled);
    let cancellation = canceled.cancellation.expect("cancellation record");
    assert_eq!(cancellation.reason.as_deref(), Some("changed plans"));

    // ride.requested then ride.canceled
    assert_eq!(events.try_recv().unwrap().event_type(), "ride.requested");
    assert_eq!(events.try_recv().unwrap().event_type(), "ride.canceled");

    // A canceled ride is terminal: completion must conflict
    let err = coordinator
        .complete_ride(ride.id, UserId::new())
        .unwrap_err();
    assert!(matches!(err, DispatchError::Conflict(_)));
}

#[tokio::test]
async fn terminal_states_are_sticky() {
    let (coordinator, _hub) = harness();
    let rider = UserId::new();
    let driver = UserId::new();

    let ride = coordinator
        .request_ride(rider, "Mumbai", "Delhi")
        .await
        .unwrap();
    coordinator.accept_ride(ride.id, driver, None).unwrap();
    coordinator.complete_ride(ride.id, driver).unwrap();

    let err = coordinator.cancel_ride(ride.id, rider, None).unwrap_err();
    assert!(matches!(err, DispatchError::Conflict(_)));

    let err = coordinator.accept_ride(ride.id, driver, None).unwrap_err();
    assert!(matches!(err, DispatchError::Conflict(_)));

    let err = coordinator
        .update_driver_location(ride.id, driver, Coordinate::new(19.2, 72.9).unwrap())
        .unwrap_err();
    assert!(matches!(err, DispatchError::Conflict(_)));
}

#[tokio::test]
async fn price_is_frozen_across_the_lifecycle() {
    let (coordinator, _hub) = harness();
    let rider = UserId::new();
    let driver = UserId::new();

    let quote = coordinator.quote("Mumbai", "Delhi").await.unwrap();
    let ride = coordinator.create_ride(rider, quote.clone()).unwrap();
    assert_eq!(ride.price, quote.price);
    assert_eq!(ride.distance_km, quote.distance_km);

    coordinator.accept_ride(ride.id, driver, None).unwrap();
    let completed = coordinator.complete_ride(ride.id, driver).unwrap();
    assert_eq!(completed.price, quote.price);
    assert_eq!(completed.pricing_factors, quote.factors);
}

#[tokio::test]
async fn history_retains_terminal_rides() {
    let (coordinator, _hub) = harness();
    let rider = UserId::new();
    let driver = UserId::new();

    let done = coordinator
        .request_ride(rider, "Mumbai", "Delhi")
        .await
        .unwrap();
    coordinator.accept_ride(done.id, driver, None).unwrap();
    coordinator.complete_ride(done.id, driver).unwrap();

    let dropped = coordinator
        .request_ride(rider, "Mumbai", "Delhi")
        .await
        .unwrap();
    coordinator.cancel_ride(dropped.id, rider, None).unwrap();

    let history = coordinator.list_ride_history_for_rider(rider).unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().any(|r| r.status == RideStatus::Completed));
    assert!(history.iter().any(|r| r.status == RideStatus::Canceled));

    // Neither terminal ride shows up as dispatchable work
    assert!(coordinator.list_pending_rides().unwrap().is_empty());
    assert!(coordinator
        .list_accepted_rides_for_driver(driver)
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn route_polyline_passthrough() {
    let (coordinator, _hub) = harness();
    let pickup = Coordinate::new(19.076, 72.8777).unwrap();
    let dropoff = Coordinate::new(28.7041, 77.1025).unwrap();

    let route = coordinator.route_polyline(pickup, dropoff).await.unwrap();
    assert!(!route.0.is_empty());
}

#[tokio::test]
async fn unknown_place_fails_ride_request() {
    let (coordinator, hub) = harness();
    let mut events = hub.subscribe();

    let err = coordinator
        .request_ride(UserId::new(), "Mumbai", "Atlantis")
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Geocoding { .. }));

    // Nothing was persisted or published
    assert!(coordinator.list_pending_rides().unwrap().is_empty());
    assert!(events.try_recv().is_err());
}

#[test]
fn hub_publish_never_blocks_without_subscribers() {
    let hub = BroadcastHub::default();
    hub.publish(ride_dispatch::RideEvent::Completed(
        ride_dispatch::RideCompleted {
            ride_id: ride_dispatch::RideId::new(),
        },
    ));
}
