// Copyright 2025 Cowboy AI, LLC.

//! Concurrent acceptance: exactly one driver wins a pending ride

use ride_dispatch::testing::{fixed_pricing_engine, FixedGeoResolver};
use ride_dispatch::{
    BroadcastHub, DispatchCoordinator, DispatchError, InMemoryRideRegistry, RideStatus, UserId,
};
use std::sync::Arc;

fn harness() -> (Arc<DispatchCoordinator>, BroadcastHub) {
    let hub = BroadcastHub::new(256);
    let resolver = FixedGeoResolver::default()
        .with_place("Mumbai", 19.076, 72.8777)
        .with_place("Delhi", 28.7041, 77.1025);
    let coordinator = DispatchCoordinator::new(
        Arc::new(InMemoryRideRegistry::new()),
        Arc::new(hub.clone()),
        fixed_pricing_engine(resolver),
    );
    (Arc::new(coordinator), hub)
}

#[tokio::test]
async fn two_drivers_race_one_wins() {
    let (coordinator, _hub) = harness();
    let ride = coordinator
        .request_ride(UserId::new(), "Mumbai", "Delhi")
        .await
        .unwrap();

    let driver_a = UserId::new();
    let driver_b = UserId::new();

    let a = {
        let coordinator = Arc::clone(&coordinator);
        std::thread::spawn(move || coordinator.accept_ride(ride.id, driver_a, None))
    };
    let b = {
        let coordinator = Arc::clone(&coordinator);
        std::thread::spawn(move || coordinator.accept_ride(ride.id, driver_b, None))
    };

    let results = [a.join().unwrap(), b.join().unwrap()];
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one accept must succeed");

    let loss = results
        .iter()
        .find(|r| r.is_err())
        .unwrap()
        .as_ref()
        .unwrap_err();
    assert!(matches!(loss, DispatchError::Conflict(_)));

    // The stored ride carries exactly the winner's identity
    let stored = coordinator.get_ride(ride.id).unwrap();
    assert_eq!(stored.status, RideStatus::Accepted);
    let winner = results
        .iter()
        .find_map(|r| r.as_ref().ok())
        .unwrap()
        .driver
        .unwrap();
    assert_eq!(stored.driver, Some(winner));
    assert!(winner == driver_a || winner == driver_b);
}

#[tokio::test]
async fn many_drivers_race_one_wins() {
    let (coordinator, hub) = harness();
    let mut events = hub.subscribe();
    let ride = coordinator
        .request_ride(UserId::new(), "Mumbai", "Delhi")
        .await
        .unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let coordinator = Arc::clone(&coordinator);
            let driver = UserId::new();
            std::thread::spawn(move || coordinator.accept_ride(ride.id, driver, None))
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter(|r| r.is_err())
        .all(|r| matches!(r.as_ref().unwrap_err(), DispatchError::Conflict(_))));

    // Exactly one ride.accepted was broadcast
    let mut accepted = 0;
    events.try_recv().unwrap(); // ride.requested
    while let Ok(event) = events.try_recv() {
        if event.event_type() == "ride.accepted" {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 1);
}

#[tokio::test]
async fn losers_conflict_does_not_disturb_winner_state() {
    let (coordinator, _hub) = harness();
    let ride = coordinator
        .request_ride(UserId::new(), "Mumbai", "Delhi")
        .await
        .unwrap();

    let winner = UserId::new();
    coordinator.accept_ride(ride.id, winner, None).unwrap();

    for _ in 0..4 {
        let err = coordinator
            .accept_ride(ride.id, UserId::new(), None)
            .unwrap_err();
        assert!(matches!(err, DispatchError::Conflict(_)));
        assert!(err.to_string().contains("already accepted"));
    }

    let stored = coordinator.get_ride(ride.id).unwrap();
    assert_eq!(stored.driver, Some(winner));
    assert_eq!(stored.status, RideStatus::Accepted);
}

#[tokio::test]
async fn concurrent_cancel_and_accept_agree_on_one_outcome() {
    let (coordinator, _hub) = harness();
    let rider = UserId::new();
    let ride = coordinator
        .request_ride(rider, "Mumbai", "Delhi")
        .await
        .unwrap();
    let driver = UserId::new();

    let accept = {
        let coordinator = Arc::clone(&coordinator);
        std::thread::spawn(move || coordinator.accept_ride(ride.id, driver, None))
    };
    let cancel = {
        let coordinator = Arc::clone(&coordinator);
        std::thread::spawn(move || coordinator.cancel_ride(ride.id, rider, None))
    };

    let accept_result = accept.join().unwrap();
    let cancel_result = cancel.join().unwrap();
    let stored = coordinator.get_ride(ride.id).unwrap();

    match (accept_result.is_ok(), cancel_result.is_ok()) {
        // Cancel first: ride is canceled, accept lost
        (false, true) => assert_eq!(stored.status, RideStatus::Canceled),
        // Accept first: rider may still cancel an accepted ride
        (true, true) => assert_eq!(stored.status, RideStatus::Canceled),
        // Accept first, cancel raced the transition and lost its expectation
        (true, false) => assert_eq!(stored.status, RideStatus::Accepted),
        (false, false) => panic!("at least one operation must succeed"),
    }
}
