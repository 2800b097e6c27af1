// Copyright 2025 Cowboy AI, LLC.

//! Ride registry: the authoritative store of rides
//!
//! The registry owns every mutation of a ride. State transitions go through
//! a compare-and-swap that re-checks the expected status under the write
//! guard, so two racing accepts on the same ride can never both succeed.
//! Rides are never deleted; terminal rides stay for history.

use crate::errors::{DispatchError, DispatchResult};
use crate::identifiers::{RideId, UserId};
use crate::ride::{Cancellation, LocationPing, Ride};
use crate::state_machine::{RideStatus, State};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// The mutation applied together with a status transition
///
/// Bundling the field change with the transition keeps the ride invariants
/// atomic: a driver is assigned in the same guarded write that moves the
/// ride to accepted, and a cancellation record lands with the move to
/// canceled.
#[derive(Debug, Clone)]
pub enum StatusChange {
    /// Assign a driver and move `pending -> accepted`
    Assign {
        /// The accepting driver
        driver: UserId,
    },
    /// Move `accepted -> completed`
    Complete,
    /// Record the cancellation and move to `canceled`
    Cancel {
        /// Cancellation timestamp and optional reason
        cancellation: Cancellation,
    },
}

impl StatusChange {
    /// The status this change transitions into
    pub fn target(&self) -> RideStatus {
        match self {
            StatusChange::Assign { .. } => RideStatus::Accepted,
            StatusChange::Complete => RideStatus::Completed,
            StatusChange::Cancel { .. } => RideStatus::Canceled,
        }
    }
}

/// Repository trait for loading and mutating rides
///
/// Implementations own all atomicity concerns; callers never hold a ride
/// across a mutation.
pub trait RideRepository: Send + Sync {
    /// Store a newly created ride
    fn insert(&self, ride: Ride) -> DispatchResult<()>;

    /// Load a ride by id
    fn get(&self, id: RideId) -> DispatchResult<Ride>;

    /// Atomically transition a ride's status
    ///
    /// Fails with a conflict when the ride is no longer in `expected`;
    /// exactly one of two concurrent calls with the same expectation wins.
    fn compare_and_swap_status(
        &self,
        id: RideId,
        expected: RideStatus,
        change: StatusChange,
    ) -> DispatchResult<Ride>;

    /// Append a driver position report to an accepted ride
    fn append_location(&self, id: RideId, ping: LocationPing) -> DispatchResult<Ride>;

    /// All rides currently pending, oldest first
    fn list_pending(&self) -> DispatchResult<Vec<Ride>>;

    /// Accepted rides assigned to the given driver, oldest first
    fn list_accepted_for_driver(&self, driver: UserId) -> DispatchResult<Vec<Ride>>;

    /// Every ride the given rider ever requested, oldest first
    fn list_for_rider(&self, rider: UserId) -> DispatchResult<Vec<Ride>>;
}

/// In-memory ride registry
///
/// A `HashMap` behind one `RwLock`; the write guard is the per-ride
/// atomicity boundary required by the state machine.
#[derive(Clone, Default)]
pub struct InMemoryRideRegistry {
    rides: Arc<RwLock<HashMap<RideId, Ride>>>,
}

impl InMemoryRideRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rides stored, any status
    pub fn len(&self) -> usize {
        self.rides.read().unwrap().len()
    }

    /// Whether the registry holds no rides
    pub fn is_empty(&self) -> bool {
        self.rides.read().unwrap().is_empty()
    }

    fn sorted(mut rides: Vec<Ride>) -> Vec<Ride> {
        rides.sort_by_key(|ride| ride.requested_at);
        rides
    }
}

impl RideRepository for InMemoryRideRegistry {
    fn insert(&self, ride: Ride) -> DispatchResult<()> {
        let mut rides = self.rides.write().unwrap();
        if rides.contains_key(&ride.id) {
            return Err(DispatchError::Conflict(format!(
                "ride {} already exists",
                ride.id
            )));
        }
        rides.insert(ride.id, ride);
        Ok(())
    }

    fn get(&self, id: RideId) -> DispatchResult<Ride> {
        self.rides
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(DispatchError::NotFound(id))
    }

    fn compare_and_swap_status(
        &self,
        id: RideId,
        expected: RideStatus,
        change: StatusChange,
    ) -> DispatchResult<Ride> {
        let target = change.target();
        let mut rides = self.rides.write().unwrap();
        let ride = rides.get_mut(&id).ok_or(DispatchError::NotFound(id))?;

        if ride.status != expected {
            // Lost race or stale caller; report what the ride actually is
            return Err(if ride.status == target {
                DispatchError::Conflict(format!("ride {id} already {}", target.name()))
            } else {
                DispatchError::Conflict(format!(
                    "ride {id} is {}, expected {}",
                    ride.status.name(),
                    expected.name()
                ))
            });
        }
        ride.status.ensure_transition_to(&target)?;

        match change {
            StatusChange::Assign { driver } => {
                ride.driver = Some(driver);
            }
            StatusChange::Complete => {}
            StatusChange::Cancel { cancellation } => {
                ride.cancellation = Some(cancellation);
            }
        }
        ride.status = target;
        Ok(ride.clone())
    }

    fn append_location(&self, id: RideId, ping: LocationPing) -> DispatchResult<Ride> {
        let mut rides = self.rides.write().unwrap();
        let ride = rides.get_mut(&id).ok_or(DispatchError::NotFound(id))?;

        if ride.status != RideStatus::Accepted {
            return Err(DispatchError::Conflict(format!(
                "location updates require an accepted ride, ride {id} is {}",
                ride.status.name()
            )));
        }
        ride.location_history.push(ping);
        Ok(ride.clone())
    }

    fn list_pending(&self) -> DispatchResult<Vec<Ride>> {
        let rides = self.rides.read().unwrap();
        Ok(Self::sorted(
            rides
                .values()
                .filter(|ride| ride.status == RideStatus::Pending)
                .cloned()
                .collect(),
        ))
    }

    fn list_accepted_for_driver(&self, driver: UserId) -> DispatchResult<Vec<Ride>> {
        let rides = self.rides.read().unwrap();
        Ok(Self::sorted(
            rides
                .values()
                .filter(|ride| {
                    ride.status == RideStatus::Accepted && ride.driver == Some(driver)
                })
                .cloned()
                .collect(),
        ))
    }

    fn list_for_rider(&self, rider: UserId) -> DispatchResult<Vec<Ride>> {
        let rides = self.rides.read().unwrap();
        Ok(Self::sorted(
            rides
                .values()
                .filter(|ride| ride.rider == rider)
                .cloned()
                .collect(),
        ))
    }
}
