// Copyright 2025 Cowboy AI, LLC.

//! # Ride Dispatch
//!
//! The dispatch core of a ride-hailing service: matches ride requests to
//! drivers, prices each ride from live conditions, and keeps both parties
//! synchronized on ride status and driver position.
//!
//! This crate provides:
//! - **Ride lifecycle state machine**: `pending -> accepted -> completed`,
//!   with cancellation from either non-terminal state
//! - **Dynamic pricing engine**: haversine distance times a base rate,
//!   stacked with time-of-day, weather, traffic, and fleet-state surcharges
//! - **Broadcast hub**: lossy, at-most-once fan-out of lifecycle and
//!   location events to every connected subscriber
//! - **Collaborator seams**: geocoding and condition providers as traits;
//!   real clients live in adapter crates
//!
//! ## Design Principles
//!
//! 1. **Atomic transitions**: every status change is a compare-and-swap;
//!    two racing accepts on one ride can never both succeed
//! 2. **Frozen prices**: the quoted price is written once at ride creation
//!    and never recomputed
//! 3. **Degraded, not down**: a failing condition provider costs its
//!    surcharge factor, never the quote; only geocoding is fatal
//! 4. **Fire-and-forget events**: publication never blocks or rolls back
//!    the mutation that triggered it

#![warn(missing_docs)]

mod api;
mod broadcast;
mod collaborators;
mod dispatch;
mod errors;
mod events;
mod geo;
mod identifiers;
mod pricing;
mod registry;
mod ride;
mod state_machine;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

// Re-export core types
pub use api::{
    AcceptRideRequest, CancelRideRequest, CompleteRideRequest, CreateRideRequest, QuoteRequest,
    QuoteResponse, RideResponse, RouteRequest, RouteResponse, UpdateLocationRequest,
};
pub use broadcast::{BroadcastHub, EventPublisher, MockEventPublisher, DEFAULT_HUB_CAPACITY};
pub use collaborators::{
    FleetTelemetry, GeoResolver, SimulatedFleetTelemetry, SystemTimeSource, TimeSource,
    TrafficProvider, UnconfiguredGeoResolver, WeatherProvider,
};
pub use dispatch::DispatchCoordinator;
pub use errors::{DispatchError, DispatchResult};
pub use events::{
    AcceptedRideDetails, DriverLocationUpdated, RideAccepted, RideCanceled, RideCompleted,
    RideEvent, RideRequested,
};
pub use geo::{Coordinate, Place, RoutePolyline, EARTH_RADIUS_KM};
pub use identifiers::{RideId, UserId};
pub use pricing::{PricingConfig, PricingEngine, PricingFactors, Quote};
pub use registry::{InMemoryRideRegistry, RideRepository, StatusChange};
pub use ride::{Cancellation, LocationPing, Ride};
pub use state_machine::{RideStatus, State};
