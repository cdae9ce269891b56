// Decoder from GTFS-Realtime protobuf to domain snapshots
use crate::domain::error::DashboardError;
use crate::domain::vehicle::{is_valid_latitude, is_valid_longitude, FeedSnapshot, VehiclePosition};
use chrono::{DateTime, Utc};
use gtfs_realtime::{FeedEntity, FeedMessage};
use prost::Message;

/// Decode a vehicle-position feed into a snapshot.
///
/// Fails only when the envelope itself is unreadable. Entities that are not
/// usable vehicle positions are dropped; an envelope with no entities is a
/// valid, empty snapshot.
///
/// Truncation is only detected when the cut lands inside a field. Protobuf has
/// no end marker, so a buffer cut cleanly between two entities decodes as a
/// shorter, valid feed.
pub fn decode(raw: &[u8], fetched_at: DateTime<Utc>) -> Result<FeedSnapshot, DashboardError> {
    let feed = FeedMessage::decode(raw).map_err(|e| DashboardError::Decode(e.to_string()))?;

    // An empty or foreign buffer can decode to a default message
    if feed.header.gtfs_realtime_version.trim().is_empty() {
        return Err(DashboardError::Decode(
            "feed header is missing gtfs_realtime_version".to_string(),
        ));
    }

    let feed_timestamp = feed
        .header
        .timestamp
        .and_then(|ts| i64::try_from(ts).ok())
        .and_then(|ts| DateTime::from_timestamp(ts, 0));

    let total = feed.entity.len();
    let vehicles: Vec<VehiclePosition> = feed.entity.iter().filter_map(vehicle_from_entity).collect();

    tracing::debug!(
        "Decoded {} vehicles from {} entities (feed version {})",
        vehicles.len(),
        total,
        feed.header.gtfs_realtime_version
    );

    Ok(FeedSnapshot::new(fetched_at, feed_timestamp, vehicles))
}

fn vehicle_from_entity(entity: &FeedEntity) -> Option<VehiclePosition> {
    // Trip updates and alerts share the feed
    let vehicle = entity.vehicle.as_ref()?;

    let Some(vehicle_id) = vehicle
        .vehicle
        .as_ref()
        .and_then(|v| v.id.as_deref())
        .map(str::trim)
        .filter(|id| !id.is_empty())
    else {
        tracing::debug!(entity = %entity.id, "Skipping entity without vehicle id");
        return None;
    };

    let Some(position) = vehicle.position.as_ref() else {
        tracing::debug!(entity = %entity.id, "Skipping entity without position");
        return None;
    };

    let latitude = f64::from(position.latitude);
    let longitude = f64::from(position.longitude);
    if !is_valid_latitude(latitude) || !is_valid_longitude(longitude) {
        tracing::debug!(
            entity = %entity.id,
            "Skipping entity with out-of-range position {}, {}",
            latitude,
            longitude
        );
        return None;
    }

    let route_id = vehicle
        .trip
        .as_ref()
        .and_then(|trip| trip.route_id.clone())
        .unwrap_or_default();

    let speed_mps = position
        .speed
        .map(f64::from)
        .filter(|speed| speed.is_finite() && *speed >= 0.0)
        .unwrap_or(0.0);

    Some(VehiclePosition::new(
        vehicle_id.to_string(),
        route_id,
        latitude,
        longitude,
        speed_mps,
    ))
}
