// Copyright 2025 Cowboy AI, LLC.

//! Typed request and response structs for the service boundary
//!
//! One pair per exposed operation, validated before the coordinator is
//! reached. The transport layer (not this crate) authenticates the caller
//! and supplies the resulting `UserId`; these types never carry
//! credentials.

use crate::errors::{DispatchError, DispatchResult};
use crate::geo::{Coordinate, RoutePolyline};
use crate::identifiers::RideId;
use crate::pricing::{PricingFactors, Quote};
use crate::ride::Ride;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn require_place(value: &str, field: &str) -> DispatchResult<()> {
    if value.trim().is_empty() {
        return Err(DispatchError::validation(format!(
            "{field} is required and must be a non-empty place name"
        )));
    }
    Ok(())
}

/// Request a price estimate for a place pair
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuoteRequest {
    /// Free-text pickup place name
    pub pickup_place: String,
    /// Free-text dropoff place name
    pub dropoff_place: String,
}

impl QuoteRequest {
    /// Validate the request fields
    pub fn validate(&self) -> DispatchResult<()> {
        require_place(&self.pickup_place, "pickup_place")?;
        require_place(&self.dropoff_place, "dropoff_place")
    }
}

/// Price estimate response
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuoteResponse {
    /// Great-circle distance in kilometers
    pub distance_km: f64,
    /// Total estimated price
    pub price: f64,
    /// Resolved pickup coordinate
    pub pickup: Coordinate,
    /// Resolved dropoff coordinate
    pub dropoff: Coordinate,
    /// The surcharge inputs behind the price
    pub factors: PricingFactors,
}

impl From<Quote> for QuoteResponse {
    fn from(quote: Quote) -> Self {
        Self {
            distance_km: quote.distance_km,
            price: quote.price,
            pickup: quote.pickup.coordinate,
            dropoff: quote.dropoff.coordinate,
            factors: quote.factors,
        }
    }
}

/// Request the route polyline between two resolved coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct RouteRequest {
    /// Pickup coordinate
    pub pickup: Coordinate,
    /// Dropoff coordinate
    pub dropoff: Coordinate,
}

impl RouteRequest {
    /// Validate the request fields
    pub fn validate(&self) -> DispatchResult<()> {
        Coordinate::new(self.pickup.lat, self.pickup.lng)?;
        Coordinate::new(self.dropoff.lat, self.dropoff.lng)?;
        Ok(())
    }
}

/// Route polyline response
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RouteResponse {
    /// Encoded route polyline
    pub route: RoutePolyline,
}

/// Create a ride for the authenticated rider
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateRideRequest {
    /// Free-text pickup place name
    pub pickup_place: String,
    /// Free-text dropoff place name
    pub dropoff_place: String,
}

impl CreateRideRequest {
    /// Validate the request fields
    pub fn validate(&self) -> DispatchResult<()> {
        require_place(&self.pickup_place, "pickup_place")?;
        require_place(&self.dropoff_place, "dropoff_place")
    }
}

/// Accept a pending ride as the authenticated driver
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct AcceptRideRequest {
    /// The ride to accept
    pub ride_id: RideId,
    /// The driver's current position, if the client knows it
    pub current_location: Option<Coordinate>,
}

impl AcceptRideRequest {
    /// Validate the request fields
    pub fn validate(&self) -> DispatchResult<()> {
        if let Some(location) = self.current_location {
            Coordinate::new(location.lat, location.lng)?;
        }
        Ok(())
    }
}

/// Report the assigned driver's position
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct UpdateLocationRequest {
    /// The ride being served
    pub ride_id: RideId,
    /// The driver's current position
    pub location: Coordinate,
}

impl UpdateLocationRequest {
    /// Validate the request fields
    pub fn validate(&self) -> DispatchResult<()> {
        Coordinate::new(self.location.lat, self.location.lng)?;
        Ok(())
    }
}

/// Complete an accepted ride as its assigned driver
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct CompleteRideRequest {
    /// The ride to complete
    pub ride_id: RideId,
}

/// Cancel a pending or accepted ride as rider or assigned driver
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CancelRideRequest {
    /// The ride to cancel
    pub ride_id: RideId,
    /// Optional free-text reason, recorded on the ride
    pub reason: Option<String>,
}

/// One ride as returned over the service boundary
///
/// Currently identical to the domain entity; kept as its own alias so the
/// wire shape can diverge without touching the core.
pub type RideResponse = Ride;
