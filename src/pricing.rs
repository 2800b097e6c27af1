// Copyright 2025 Cowboy AI, LLC.

//! Dynamic pricing engine
//!
//! A quote is a pure function of collaborator answers: resolve both places,
//! take the great-circle distance, then stack surcharge factors on a base
//! per-kilometer rate. Geocoding failure is fatal; every other collaborator
//! failure or timeout degrades that factor to zero so a flaky weather feed
//! cannot take quoting down with it.
//!
//! Quotes are ephemeral. Nothing is persisted until the rider confirms and
//! the coordinator freezes the quoted price into a ride.

use crate::collaborators::{
    FleetTelemetry, GeoResolver, TimeSource, TrafficProvider, WeatherProvider,
};
use crate::errors::{DispatchError, DispatchResult};
use crate::geo::{Coordinate, Place, RoutePolyline};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Snapshot of the surcharge inputs behind one price
///
/// Retained on the ride for audit. When a telemetry call degrades, the
/// snapshot holds the neutral fallback that was actually used (a value that
/// adds no surcharge), not a guess at the real condition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct PricingFactors {
    /// Peak-hour factor derived from the local hour
    pub time_of_day: f64,
    /// Weather surcharge factor as returned by the provider
    pub weather: f64,
    /// Traffic surcharge factor as returned by the provider
    pub traffic: f64,
    /// Active drivers near the pickup at quote time
    pub active_drivers: u32,
    /// Active riders near the pickup at quote time
    pub active_riders: u32,
    /// Recent cancellation rate, 0.0 to 1.0
    pub cancellation_rate: f64,
}

/// An ephemeral price estimate; input to ride creation, never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Quote {
    /// Great-circle distance between pickup and dropoff, in kilometers
    pub distance_km: f64,
    /// Total price for the ride
    pub price: f64,
    /// Resolved pickup place
    pub pickup: Place,
    /// Resolved dropoff place
    pub dropoff: Place,
    /// The surcharge inputs that produced `price`
    pub factors: PricingFactors,
}

impl Quote {
    /// Validate the quote fields before they are frozen into a ride
    pub fn validate(&self) -> DispatchResult<()> {
        if self.pickup.name.trim().is_empty() || self.dropoff.name.trim().is_empty() {
            return Err(DispatchError::validation(
                "pickup and dropoff place names are required",
            ));
        }
        if !self.distance_km.is_finite() || self.distance_km < 0.0 {
            return Err(DispatchError::validation(
                "quote distance must be a finite non-negative number",
            ));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(DispatchError::validation(
                "quote price must be a finite positive number",
            ));
        }
        Ok(())
    }
}

/// Pricing constants - configuration, not protocol
///
/// Defaults: 10 currency units per km, a 50% surcharge in the 07-09 and
/// 17-19 peak bands, and threshold bonuses for driver scarcity, rider
/// demand, and cancellation churn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PricingConfig {
    /// Base price per kilometer
    pub base_price_per_km: f64,
    /// Inclusive local-hour bands with a peak surcharge
    pub peak_bands: Vec<(u32, u32)>,
    /// Surcharge factor applied inside a peak band
    pub peak_surcharge: f64,
    /// Driver count below which the scarcity bonus applies
    pub driver_floor: u32,
    /// Bonus applied when drivers are scarce
    pub driver_scarcity_surcharge: f64,
    /// Rider count above which the demand bonus applies
    pub rider_ceiling: u32,
    /// Bonus applied when rider demand is high
    pub rider_demand_surcharge: f64,
    /// Cancellation rate above which the churn bonus applies
    pub cancellation_ceiling: f64,
    /// Bonus applied when the cancellation rate is high
    pub cancellation_surcharge: f64,
    /// Per-call budget for collaborator round-trips
    #[serde(with = "duration_millis")]
    #[schemars(with = "u64")]
    pub provider_timeout: Duration,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_price_per_km: 10.0,
            peak_bands: vec![(7, 9), (17, 19)],
            peak_surcharge: 0.5,
            driver_floor: 10,
            driver_scarcity_surcharge: 0.5,
            rider_ceiling: 5,
            rider_demand_surcharge: 0.3,
            cancellation_ceiling: 0.2,
            cancellation_surcharge: 0.2,
            provider_timeout: Duration::from_secs(3),
        }
    }
}

impl PricingConfig {
    /// Time-of-day factor for a local hour: peak surcharge inside a band,
    /// zero outside
    pub fn time_of_day_factor(&self, hour: u32) -> f64 {
        let in_peak = self
            .peak_bands
            .iter()
            .any(|(start, end)| hour >= *start && hour <= *end);
        if in_peak {
            self.peak_surcharge
        } else {
            0.0
        }
    }

    /// Total multiplier for a factor snapshot:
    /// `1 + continuous factors + threshold bonuses`
    pub fn multiplier(&self, factors: &PricingFactors) -> f64 {
        let mut multiplier = 1.0 + factors.time_of_day + factors.weather + factors.traffic;
        if factors.active_drivers < self.driver_floor {
            multiplier += self.driver_scarcity_surcharge;
        }
        if factors.active_riders > self.rider_ceiling {
            multiplier += self.rider_demand_surcharge;
        }
        if factors.cancellation_rate > self.cancellation_ceiling {
            multiplier += self.cancellation_surcharge;
        }
        multiplier
    }

    /// Price for a distance under a factor snapshot
    pub fn price(&self, distance_km: f64, factors: &PricingFactors) -> f64 {
        distance_km * self.base_price_per_km * self.multiplier(factors)
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        (d.as_millis() as u64).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

/// Combines geo resolution and condition providers into price quotes
pub struct PricingEngine {
    geo: Arc<dyn GeoResolver>,
    weather: Arc<dyn WeatherProvider>,
    traffic: Arc<dyn TrafficProvider>,
    fleet: Arc<dyn FleetTelemetry>,
    time: Arc<dyn TimeSource>,
    config: PricingConfig,
}

impl PricingEngine {
    /// Create an engine over the collaborator set
    pub fn new(
        geo: Arc<dyn GeoResolver>,
        weather: Arc<dyn WeatherProvider>,
        traffic: Arc<dyn TrafficProvider>,
        fleet: Arc<dyn FleetTelemetry>,
        time: Arc<dyn TimeSource>,
        config: PricingConfig,
    ) -> Self {
        Self {
            geo,
            weather,
            traffic,
            fleet,
            time,
            config,
        }
    }

    /// The pricing constants in effect
    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Produce a quote for a pickup/dropoff place pair
    ///
    /// Fails with a geocoding error when either place cannot be resolved
    /// (no partial result) and with a pricing error when the computed price
    /// is not a finite positive number. All other collaborator failures
    /// degrade to a zero surcharge.
    pub async fn quote(&self, pickup_place: &str, dropoff_place: &str) -> DispatchResult<Quote> {
        let (pickup_coord, dropoff_coord) = futures::future::try_join(
            self.resolve(pickup_place),
            self.resolve(dropoff_place),
        )
        .await?;

        let distance_km = pickup_coord.haversine_km(&dropoff_coord);
        let factors = self.gather_factors(pickup_coord, dropoff_coord).await;

        let price = self.config.price(distance_km, &factors);
        if !price.is_finite() || price <= 0.0 {
            return Err(DispatchError::Pricing(format!(
                "computed price {price} for {distance_km} km is not a finite positive number"
            )));
        }

        debug!(
            pickup = pickup_place,
            dropoff = dropoff_place,
            distance_km,
            price,
            multiplier = self.config.multiplier(&factors),
            "quote composed"
        );

        Ok(Quote {
            distance_km,
            price,
            pickup: Place::new(pickup_place, pickup_coord),
            dropoff: Place::new(dropoff_place, dropoff_coord),
            factors,
        })
    }

    /// Fetch the encoded route polyline between two resolved coordinates
    pub async fn route_polyline(
        &self,
        pickup: Coordinate,
        dropoff: Coordinate,
    ) -> DispatchResult<RoutePolyline> {
        match tokio::time::timeout(
            self.config.provider_timeout,
            self.geo.route_polyline(pickup, dropoff),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(DispatchError::external("geo", "route request timed out")),
        }
    }

    /// Resolve one place, mapping failure and timeout to a fatal geocoding
    /// error
    async fn resolve(&self, place: &str) -> DispatchResult<Coordinate> {
        match tokio::time::timeout(
            self.config.provider_timeout,
            self.geo.resolve_place(place),
        )
        .await
        {
            Ok(Ok(coord)) => Ok(coord),
            Ok(Err(err @ DispatchError::Geocoding { .. })) => Err(err),
            Ok(Err(err)) => Err(DispatchError::Geocoding {
                place: place.to_string(),
                message: err.to_string(),
            }),
            Err(_) => Err(DispatchError::Geocoding {
                place: place.to_string(),
                message: "geocoding timed out".to_string(),
            }),
        }
    }

    /// Query the condition providers, degrading each failure to a neutral
    /// value that adds no surcharge
    async fn gather_factors(&self, pickup: Coordinate, dropoff: Coordinate) -> PricingFactors {
        let time_of_day = self.config.time_of_day_factor(self.time.local_hour());

        let (weather, traffic, active_drivers, active_riders, cancellation_rate) = tokio::join!(
            self.degrade("weather", 0.0, self.weather.surcharge_factor(pickup)),
            self.degrade("traffic", 0.0, self.traffic.surcharge_factor(pickup, dropoff)),
            self.degrade(
                "fleet-telemetry",
                self.config.driver_floor,
                self.fleet.active_driver_count(pickup),
            ),
            self.degrade("fleet-telemetry", 0, self.fleet.active_rider_count(pickup)),
            self.degrade("fleet-telemetry", 0.0, self.fleet.cancellation_rate()),
        );

        PricingFactors {
            time_of_day,
            weather,
            traffic,
            active_drivers,
            active_riders,
            cancellation_rate,
        }
    }

    /// Run one provider call under the timeout budget; on failure log and
    /// substitute the neutral fallback
    async fn degrade<T>(
        &self,
        service: &'static str,
        fallback: T,
        call: impl Future<Output = DispatchResult<T>>,
    ) -> T {
        match tokio::time::timeout(self.config.provider_timeout, call).await {
            Ok(Ok(value)) => value,
            Ok(Err(err)) => {
                warn!(service, error = %err, "condition provider failed, factor degraded to zero surcharge");
                fallback
            }
            Err(_) => {
                warn!(service, "condition provider timed out, factor degraded to zero surcharge");
                fallback
            }
        }
    }
}
