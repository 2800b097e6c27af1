// Copyright 2025 Cowboy AI, LLC.

//! Dispatch coordinator
//!
//! Orchestrates the ride lifecycle: quote, create, accept, locate, complete,
//! cancel. The coordinator validates input and authorization, the registry
//! applies the state transition atomically, and the corresponding event is
//! published after the mutation commits. Every mutating operation either
//! fully succeeds or fails with no state change.
//!
//! Authorization re-checks are safe outside the registry lock because the
//! fields they read are immutable once set: the rider never changes and the
//! driver is assigned exactly once. Status races are caught by the
//! registry's compare-and-swap.

use crate::broadcast::EventPublisher;
use crate::errors::{DispatchError, DispatchResult};
use crate::events::{
    AcceptedRideDetails, DriverLocationUpdated, RideAccepted, RideCanceled, RideCompleted,
    RideEvent, RideRequested,
};
use crate::geo::{Coordinate, RoutePolyline};
use crate::identifiers::{RideId, UserId};
use crate::pricing::{PricingEngine, Quote};
use crate::registry::{RideRepository, StatusChange};
use crate::ride::{Cancellation, LocationPing, Ride};
use crate::state_machine::{RideStatus, State};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Coordinates ride lifecycle operations over the registry, the pricing
/// engine, and the broadcast hub
pub struct DispatchCoordinator {
    registry: Arc<dyn RideRepository>,
    publisher: Arc<dyn EventPublisher>,
    pricing: PricingEngine,
}

impl DispatchCoordinator {
    /// Create a coordinator over a registry, a publisher, and a pricing
    /// engine
    pub fn new(
        registry: Arc<dyn RideRepository>,
        publisher: Arc<dyn EventPublisher>,
        pricing: PricingEngine,
    ) -> Self {
        Self {
            registry,
            publisher,
            pricing,
        }
    }

    /// Produce an ephemeral quote; nothing is persisted
    pub async fn quote(&self, pickup_place: &str, dropoff_place: &str) -> DispatchResult<Quote> {
        self.pricing.quote(pickup_place, dropoff_place).await
    }

    /// Fetch the encoded route polyline between two resolved coordinates
    pub async fn route_polyline(
        &self,
        pickup: Coordinate,
        dropoff: Coordinate,
    ) -> DispatchResult<RoutePolyline> {
        self.pricing.route_polyline(pickup, dropoff).await
    }

    /// Create a pending ride from a quote, freezing the quoted price
    pub fn create_ride(&self, rider: UserId, quote: Quote) -> DispatchResult<Ride> {
        quote.validate()?;
        let ride = Ride::from_quote(rider, &quote);
        self.registry.insert(ride.clone())?;

        info!(ride_id = %ride.id, rider = %rider, price = ride.price, "ride requested");
        self.publisher.publish(RideEvent::Requested(RideRequested {
            ride_id: ride.id,
            pickup: ride.pickup.clone(),
            dropoff: ride.dropoff.clone(),
            price: ride.price,
        }));
        Ok(ride)
    }

    /// Quote and immediately create a ride in one call
    pub async fn request_ride(
        &self,
        rider: UserId,
        pickup_place: &str,
        dropoff_place: &str,
    ) -> DispatchResult<Ride> {
        let quote = self.quote(pickup_place, dropoff_place).await?;
        self.create_ride(rider, quote)
    }

    /// Accept a pending ride on behalf of a driver
    ///
    /// Exactly one of any number of concurrent accepts succeeds; the rest
    /// fail with a conflict. `driver_location` is the driver's current
    /// position when the client knows it, echoed to the rider.
    pub fn accept_ride(
        &self,
        ride_id: RideId,
        driver: UserId,
        driver_location: Option<Coordinate>,
    ) -> DispatchResult<Ride> {
        let ride = self.registry.compare_and_swap_status(
            ride_id,
            RideStatus::Pending,
            StatusChange::Assign { driver },
        )?;

        info!(ride_id = %ride.id, driver = %driver, "ride accepted");
        self.publisher.publish(RideEvent::Accepted(RideAccepted {
            ride_id: ride.id,
            driver,
            driver_location,
            details: AcceptedRideDetails {
                pickup: ride.pickup.clone(),
                dropoff: ride.dropoff.clone(),
                price: ride.price,
                rider: ride.rider,
            },
        }));
        Ok(ride)
    }

    /// Append a position report from the assigned driver
    pub fn update_driver_location(
        &self,
        ride_id: RideId,
        driver: UserId,
        coordinate: Coordinate,
    ) -> DispatchResult<Ride> {
        let current = self.registry.get(ride_id)?;
        if let Some(assigned) = current.driver {
            if assigned != driver {
                return Err(DispatchError::authorization(format!(
                    "driver {driver} is not assigned to ride {ride_id}"
                )));
            }
        }
        // No assigned driver means the ride is still pending; the registry
        // rejects the append as a status conflict
        let ride = self.registry.append_location(
            ride_id,
            LocationPing {
                at: Utc::now(),
                coordinate,
            },
        )?;

        self.publisher
            .publish(RideEvent::LocationUpdated(DriverLocationUpdated {
                ride_id,
                driver_location: coordinate,
            }));
        Ok(ride)
    }

    /// Complete an accepted ride; assigned driver only
    pub fn complete_ride(&self, ride_id: RideId, driver: UserId) -> DispatchResult<Ride> {
        let current = self.registry.get(ride_id)?;
        if let Some(assigned) = current.driver {
            if assigned != driver {
                return Err(DispatchError::authorization(format!(
                    "only the assigned driver may complete ride {ride_id}"
                )));
            }
        }
        let ride = self.registry.compare_and_swap_status(
            ride_id,
            RideStatus::Accepted,
            StatusChange::Complete,
        )?;

        info!(ride_id = %ride.id, driver = %driver, "ride completed");
        self.publisher
            .publish(RideEvent::Completed(RideCompleted { ride_id }));
        Ok(ride)
    }

    /// Cancel a pending or accepted ride; rider or assigned driver only
    pub fn cancel_ride(
        &self,
        ride_id: RideId,
        actor: UserId,
        reason: Option<String>,
    ) -> DispatchResult<Ride> {
        let current = self.registry.get(ride_id)?;
        if current.status.is_terminal() {
            return Err(DispatchError::invalid_transition(
                current.status.name(),
                RideStatus::Canceled.name(),
            ));
        }
        if !current.is_party(&actor) {
            return Err(DispatchError::authorization(format!(
                "user {actor} is neither the rider nor the assigned driver of ride {ride_id}"
            )));
        }

        let ride = self.registry.compare_and_swap_status(
            ride_id,
            current.status,
            StatusChange::Cancel {
                cancellation: Cancellation {
                    at: Utc::now(),
                    reason,
                },
            },
        )?;

        info!(ride_id = %ride.id, actor = %actor, "ride canceled");
        self.publisher
            .publish(RideEvent::Canceled(RideCanceled { ride_id }));
        Ok(ride)
    }

    /// Load one ride by id
    pub fn get_ride(&self, ride_id: RideId) -> DispatchResult<Ride> {
        self.registry.get(ride_id)
    }

    /// All pending rides, for drivers browsing open requests
    pub fn list_pending_rides(&self) -> DispatchResult<Vec<Ride>> {
        self.registry.list_pending()
    }

    /// Accepted rides assigned to the given driver
    pub fn list_accepted_rides_for_driver(&self, driver: UserId) -> DispatchResult<Vec<Ride>> {
        self.registry.list_accepted_for_driver(driver)
    }

    /// Full ride history for the given rider, terminal rides included
    pub fn list_ride_history_for_rider(&self, rider: UserId) -> DispatchResult<Vec<Ride>> {
        self.registry.list_for_rider(rider)
    }
}
