// Copyright 2025 Cowboy AI, LLC.

//! Ride lifecycle events
//!
//! Events are facts: they are published after the registry mutation commits
//! and carry everything a connected client needs, because delivery is
//! broadcast (every subscriber sees every event and filters client-side).

use crate::geo::{Coordinate, Place};
use crate::identifiers::{RideId, UserId};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A new ride was requested and is visible to drivers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RideRequested {
    /// The new ride
    pub ride_id: RideId,
    /// Resolved pickup place
    pub pickup: Place,
    /// Resolved dropoff place
    pub dropoff: Place,
    /// Frozen price the rider agreed to
    pub price: f64,
}

/// Ride details echoed to the rider when a driver accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AcceptedRideDetails {
    /// Resolved pickup place
    pub pickup: Place,
    /// Resolved dropoff place
    pub dropoff: Place,
    /// Frozen price
    pub price: f64,
    /// The requesting rider
    pub rider: UserId,
}

/// A driver accepted a pending ride
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RideAccepted {
    /// The accepted ride
    pub ride_id: RideId,
    /// The driver now assigned to the ride
    pub driver: UserId,
    /// The driver's current position, when known at accept time
    pub driver_location: Option<Coordinate>,
    /// Ride details for the rider's client
    pub details: AcceptedRideDetails,
}

/// The assigned driver reported a new position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DriverLocationUpdated {
    /// The ride the driver is serving
    pub ride_id: RideId,
    /// The reported position
    pub driver_location: Coordinate,
}

/// The assigned driver completed the ride
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RideCompleted {
    /// The completed ride
    pub ride_id: RideId,
}

/// The rider or assigned driver canceled the ride
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RideCanceled {
    /// The canceled ride
    pub ride_id: RideId,
}

/// Enum wrapper for all ride lifecycle events
///
/// The wire names (`ride.requested` and friends) are stable; clients filter
/// on them plus the ride id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "event", content = "payload")]
pub enum RideEvent {
    /// A new ride was requested
    #[serde(rename = "ride.requested")]
    Requested(RideRequested),
    /// A driver accepted a ride
    #[serde(rename = "ride.accepted")]
    Accepted(RideAccepted),
    /// The assigned driver reported a new position
    #[serde(rename = "ride.locationUpdated")]
    LocationUpdated(DriverLocationUpdated),
    /// The assigned driver completed the ride
    #[serde(rename = "ride.completed")]
    Completed(RideCompleted),
    /// The ride was canceled
    #[serde(rename = "ride.canceled")]
    Canceled(RideCanceled),
}

impl RideEvent {
    /// Stable wire name of this event
    pub fn event_type(&self) -> &'static str {
        match self {
            RideEvent::Requested(_) => "ride.requested",
            RideEvent::Accepted(_) => "ride.accepted",
            RideEvent::LocationUpdated(_) => "ride.locationUpdated",
            RideEvent::Completed(_) => "ride.completed",
            RideEvent::Canceled(_) => "ride.canceled",
        }
    }

    /// The ride this event relates to
    pub fn ride_id(&self) -> RideId {
        match self {
            RideEvent::Requested(e) => e.ride_id,
            RideEvent::Accepted(e) => e.ride_id,
            RideEvent::LocationUpdated(e) => e.ride_id,
            RideEvent::Completed(e) => e.ride_id,
            RideEvent::Canceled(e) => e.ride_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_matches_wire_name() {
        let ride_id = RideId::new();
        let event = RideEvent::Completed(RideCompleted { ride_id });
        assert_eq!(event.event_type(), "ride.completed");
        assert_eq!(event.ride_id(), ride_id);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "ride.completed");
        assert_eq!(
            json["payload"]["ride_id"],
            serde_json::to_value(ride_id).unwrap()
        );
    }

    #[test]
    fn events_roundtrip_through_json() {
        let event = RideEvent::LocationUpdated(DriverLocationUpdated {
            ride_id: RideId::new(),
            driver_location: crate::geo::Coordinate::new(19.076, 72.8777).unwrap(),
        });
        let json = serde_json::to_string(&event).unwrap();
        let back: RideEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
