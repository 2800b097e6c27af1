// Copyright 2025 Cowboy AI, LLC.

//! The ride entity and its value objects
//!
//! `Ride` is plain data: all mutation and atomicity concerns live in the
//! registry, and every change goes through the dispatch coordinator. Price
//! and distance are frozen at creation from the quote; the pricing-factor
//! snapshot is retained for audit even though it never affects the ride
//! again.

use crate::geo::{Coordinate, Place};
use crate::identifiers::{RideId, UserId};
use crate::pricing::{PricingFactors, Quote};
use crate::state_machine::RideStatus;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One driver position report, appended to the ride's location history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LocationPing {
    /// When the position was reported
    pub at: DateTime<Utc>,
    /// Reported driver position
    pub coordinate: Coordinate,
}

/// Cancellation record, present iff the ride is canceled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Cancellation {
    /// When the ride was canceled
    pub at: DateTime<Utc>,
    /// Optional free-text reason
    pub reason: Option<String>,
}

/// One transportation request from creation through a terminal outcome
///
/// Invariants (enforced by the registry and coordinator, not by this type):
///
/// - `driver` is set iff `status` is accepted or completed
/// - `price` and `distance_km` never change after creation
/// - `location_history` is append-only, ordered by arrival
/// - `cancellation` is present iff `status` is canceled
/// - terminal rides are retained forever, never deleted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Ride {
    /// Unique ride identifier, assigned at creation
    pub id: RideId,
    /// The rider who requested the ride
    pub rider: UserId,
    /// The assigned driver, set exactly once on acceptance
    pub driver: Option<UserId>,
    /// Resolved pickup place
    pub pickup: Place,
    /// Resolved dropoff place
    pub dropoff: Place,
    /// Great-circle distance computed at quote time, in kilometers
    pub distance_km: f64,
    /// Price frozen from the quote; never recomputed
    pub price: f64,
    /// Snapshot of the surcharge inputs behind `price`, kept for audit
    pub pricing_factors: PricingFactors,
    /// Lifecycle status
    pub status: RideStatus,
    /// Cancellation record, only on transition to canceled
    pub cancellation: Option<Cancellation>,
    /// Driver position reports since acceptance, in arrival order
    pub location_history: Vec<LocationPing>,
    /// When the ride was created
    pub requested_at: DateTime<Utc>,
}

impl Ride {
    /// Create a pending ride from a validated quote
    pub fn from_quote(rider: UserId, quote: &Quote) -> Self {
        Self {
            id: RideId::new(),
            rider,
            driver: None,
            pickup: quote.pickup.clone(),
            dropoff: quote.dropoff.clone(),
            distance_km: quote.distance_km,
            price: quote.price,
            pricing_factors: quote.factors.clone(),
            status: RideStatus::Pending,
            cancellation: None,
            location_history: Vec::new(),
            requested_at: Utc::now(),
        }
    }

    /// Whether the given user is the assigned driver
    pub fn is_assigned_driver(&self, user: &UserId) -> bool {
        self.driver.as_ref() == Some(user)
    }

    /// Whether the given user is a party to the ride (rider or assigned driver)
    pub fn is_party(&self, user: &UserId) -> bool {
        self.rider == *user || self.is_assigned_driver(user)
    }

    /// Last reported driver position, if any
    pub fn last_known_driver_location(&self) -> Option<Coordinate> {
        self.location_history.last().map(|ping| ping.coordinate)
    }
}
