// Copyright 2025 Cowboy AI, LLC.

//! Test support: fixed collaborators for exercising the dispatch core
//! without real provider clients
//!
//! Available to downstream crates via the default `test-helpers` feature.

use crate::collaborators::{
    FleetTelemetry, GeoResolver, TimeSource, TrafficProvider, UnconfiguredGeoResolver,
    WeatherProvider,
};
use crate::errors::{DispatchError, DispatchResult};
use crate::geo::{Coordinate, RoutePolyline};
use crate::pricing::{PricingConfig, PricingEngine};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Geo resolver answering from a fixed place table
#[derive(Debug, Clone, Default)]
pub struct FixedGeoResolver {
    places: HashMap<String, Coordinate>,
}

impl FixedGeoResolver {
    /// Register a place name and its coordinate
    pub fn with_place(mut self, name: &str, lat: f64, lng: f64) -> Self {
        self.places
            .insert(name.to_string(), Coordinate { lat, lng });
        self
    }
}

#[async_trait]
impl GeoResolver for FixedGeoResolver {
    async fn resolve_place(&self, place: &str) -> DispatchResult<Coordinate> {
        self.places
            .get(place)
            .copied()
            .ok_or_else(|| DispatchError::Geocoding {
                place: place.to_string(),
                message: "place not in fixture table".to_string(),
            })
    }

    async fn route_polyline(
        &self,
        pickup: Coordinate,
        dropoff: Coordinate,
    ) -> DispatchResult<RoutePolyline> {
        Ok(RoutePolyline(format!("{pickup}|{dropoff}")))
    }
}

/// Weather and traffic provider returning one fixed factor
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedFactor(pub f64);

#[async_trait]
impl WeatherProvider for FixedFactor {
    async fn surcharge_factor(&self, _at: Coordinate) -> DispatchResult<f64> {
        Ok(self.0)
    }
}

#[async_trait]
impl TrafficProvider for FixedFactor {
    async fn surcharge_factor(
        &self,
        _pickup: Coordinate,
        _dropoff: Coordinate,
    ) -> DispatchResult<f64> {
        Ok(self.0)
    }
}

/// Fleet telemetry returning fixed counters
#[derive(Debug, Clone, Copy)]
pub struct FixedFleet {
    /// Active driver count to report
    pub drivers: u32,
    /// Active rider count to report
    pub riders: u32,
    /// Cancellation rate to report
    pub rate: f64,
}

impl Default for FixedFleet {
    fn default() -> Self {
        // Quiet fleet: no threshold surcharge fires
        Self {
            drivers: 50,
            riders: 0,
            rate: 0.0,
        }
    }
}

#[async_trait]
impl FleetTelemetry for FixedFleet {
    async fn active_driver_count(&self, _near: Coordinate) -> DispatchResult<u32> {
        Ok(self.drivers)
    }

    async fn active_rider_count(&self, _near: Coordinate) -> DispatchResult<u32> {
        Ok(self.riders)
    }

    async fn cancellation_rate(&self) -> DispatchResult<f64> {
        Ok(self.rate)
    }
}

/// Time source pinned to one local hour
#[derive(Debug, Clone, Copy)]
pub struct FixedHour(pub u32);

impl TimeSource for FixedHour {
    fn local_hour(&self) -> u32 {
        self.0
    }
}

/// Pricing engine over a fixture resolver, all surcharges off
pub fn fixed_pricing_engine(resolver: FixedGeoResolver) -> PricingEngine {
    PricingEngine::new(
        Arc::new(resolver),
        Arc::new(FixedFactor(0.0)),
        Arc::new(FixedFactor(0.0)),
        Arc::new(FixedFleet::default()),
        Arc::new(FixedHour(12)),
        PricingConfig::default(),
    )
}

/// Pricing engine for tests that never quote (geocoding always fails)
pub fn stub_pricing_engine() -> PricingEngine {
    PricingEngine::new(
        Arc::new(UnconfiguredGeoResolver),
        Arc::new(FixedFactor(0.0)),
        Arc::new(FixedFactor(0.0)),
        Arc::new(FixedFleet::default()),
        Arc::new(FixedHour(12)),
        PricingConfig::default(),
    )
}
