// Vehicle domain models
use chrono::{DateTime, Utc};

/// One train's observed state, normalized from a feed entity.
#[derive(Debug, Clone, PartialEq)]
pub struct VehiclePosition {
    pub vehicle_id: String,
    /// Empty when the feed has no trip assignment for the vehicle.
    pub route_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_mps: f64,
}

impl VehiclePosition {
    pub fn new(
        vehicle_id: String,
        route_id: String,
        latitude: f64,
        longitude: f64,
        speed_mps: f64,
    ) -> Self {
        Self {
            vehicle_id,
            route_id,
            latitude,
            longitude,
            speed_mps,
        }
    }

    /// Speed in km/h rounded half away from zero to one decimal place.
    pub fn speed_kmh(&self) -> f64 {
        (self.speed_mps * 3.6 * 10.0).round() / 10.0
    }
}

pub fn is_valid_latitude(value: f64) -> bool {
    value.is_finite() && (-90.0..=90.0).contains(&value)
}

pub fn is_valid_longitude(value: f64) -> bool {
    value.is_finite() && (-180.0..=180.0).contains(&value)
}

/// The decoded vehicle positions of a single fetch, in feed order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    pub fetched_at_utc: DateTime<Utc>,
    /// Publisher-side timestamp from the feed header, if the feed carried one.
    pub feed_timestamp: Option<DateTime<Utc>>,
    pub vehicles: Vec<VehiclePosition>,
}

impl FeedSnapshot {
    pub fn new(
        fetched_at_utc: DateTime<Utc>,
        feed_timestamp: Option<DateTime<Utc>>,
        vehicles: Vec<VehiclePosition>,
    ) -> Self {
        Self {
            fetched_at_utc,
            feed_timestamp,
            vehicles,
        }
    }

    /// The moment the dashboard reports as "last updated".
    pub fn observed_at(&self) -> DateTime<Utc> {
        self.feed_timestamp.unwrap_or(self.fetched_at_utc)
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }
}
