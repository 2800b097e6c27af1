// Copyright 2025 Cowboy AI, LLC.

//! Collaborator interfaces consumed by the dispatch core
//!
//! Geocoding, weather, traffic, and fleet telemetry are external services.
//! This crate only specifies the interface it consumes; real clients live in
//! adapter crates. Every call is a network round-trip from the caller's
//! point of view, so the pricing engine wraps each one in a timeout.

use crate::errors::{DispatchError, DispatchResult};
use crate::geo::{Coordinate, RoutePolyline};
use async_trait::async_trait;
use chrono::Timelike;
use rand::Rng;

/// Resolves place names and routes
///
/// Geocoding failure is fatal to quoting: a quote with only one resolved
/// endpoint is useless, so there is no partial result.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeoResolver: Send + Sync {
    /// Resolve a free-text place name to a coordinate
    async fn resolve_place(&self, place: &str) -> DispatchResult<Coordinate>;

    /// Fetch an encoded route polyline between two coordinates
    async fn route_polyline(
        &self,
        pickup: Coordinate,
        dropoff: Coordinate,
    ) -> DispatchResult<RoutePolyline>;
}

/// Weather conditions near a coordinate, expressed as a surcharge factor
///
/// The provider owns the mapping from conditions to factor (a typical
/// mapping: 0.3 for rain or storm, 0 otherwise).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Surcharge factor for current weather at the pickup point
    async fn surcharge_factor(&self, at: Coordinate) -> DispatchResult<f64>;
}

/// Traffic conditions along a route, expressed as a surcharge factor
///
/// A typical mapping: 0.4 when in-traffic duration exceeds 1.5x the
/// free-flow duration, 0 otherwise.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrafficProvider: Send + Sync {
    /// Surcharge factor for current traffic between pickup and dropoff
    async fn surcharge_factor(
        &self,
        pickup: Coordinate,
        dropoff: Coordinate,
    ) -> DispatchResult<f64>;
}

/// Fleet state counters feeding the threshold surcharges
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FleetTelemetry: Send + Sync {
    /// Number of drivers currently active near a coordinate
    async fn active_driver_count(&self, near: Coordinate) -> DispatchResult<u32>;

    /// Number of riders currently requesting near a coordinate
    async fn active_rider_count(&self, near: Coordinate) -> DispatchResult<u32>;

    /// Recent ride cancellation rate, 0.0 to 1.0
    async fn cancellation_rate(&self) -> DispatchResult<f64>;
}

/// Source of the local wall-clock hour for the time-of-day factor
///
/// A seam rather than a direct clock read so tests can pin peak and
/// off-peak hours.
pub trait TimeSource: Send + Sync {
    /// Current local hour, 0-23
    fn local_hour(&self) -> u32;
}

/// System clock time source
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn local_hour(&self) -> u32 {
        chrono::Local::now().hour()
    }
}

/// Randomized fleet telemetry stand-in
///
/// Placeholder only: real deployments wire a telemetry-backed implementation.
/// Reports 0-9 drivers, 0-14 riders, and a uniform cancellation rate; the
/// ranges are arbitrary and not a specification of real behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedFleetTelemetry;

#[async_trait]
impl FleetTelemetry for SimulatedFleetTelemetry {
    async fn active_driver_count(&self, _near: Coordinate) -> DispatchResult<u32> {
        Ok(rand::thread_rng().gen_range(0..10))
    }

    async fn active_rider_count(&self, _near: Coordinate) -> DispatchResult<u32> {
        Ok(rand::thread_rng().gen_range(0..15))
    }

    async fn cancellation_rate(&self) -> DispatchResult<f64> {
        Ok(rand::thread_rng().gen_range(0.0..1.0))
    }
}

/// Geo resolver stand-in that rejects every place name
///
/// Useful as a default in builders and as an explicit "no geocoder
/// configured" adapter; resolving through it surfaces a geocoding error
/// rather than a panic.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredGeoResolver;

#[async_trait]
impl GeoResolver for UnconfiguredGeoResolver {
    async fn resolve_place(&self, place: &str) -> DispatchResult<Coordinate> {
        Err(DispatchError::Geocoding {
            place: place.to_string(),
            message: "no geo resolver configured".to_string(),
        })
    }

    async fn route_polyline(
        &self,
        _pickup: Coordinate,
        _dropoff: Coordinate,
    ) -> DispatchResult<RoutePolyline> {
        Err(DispatchError::external(
            "geo",
            "no geo resolver configured",
        ))
    }
}
