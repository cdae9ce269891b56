// Dashboard domain model
use super::vehicle::FeedSnapshot;
use chrono_tz::Tz;
use std::fmt;
use std::fmt::Write as _;

pub const DEFAULT_TITLE: &str = "KTM Train Status Live Update";

/// Opaque identifier the store assigned to the dashboard record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId(String);

impl RecordId {
    /// Blank or missing input means the record has not been created yet.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let trimmed = raw?.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct DisplaySettings {
    pub title: String,
    pub timezone: Tz,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            timezone: chrono_tz::Asia::Kuala_Lumpur,
        }
    }
}

/// The content this process wants the external record to hold.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRecord {
    pub identifier: Option<RecordId>,
    pub rendered_body: String,
}

impl DashboardRecord {
    pub fn new(
        identifier: Option<RecordId>,
        snapshot: &FeedSnapshot,
        settings: &DisplaySettings,
    ) -> Self {
        Self {
            identifier,
            rendered_body: render_body(snapshot, settings),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    Created,
    Updated,
}

impl fmt::Display for ReconcileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::Updated => f.write_str("updated"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub identifier: RecordId,
    pub action: ReconcileAction,
}

impl ReconcileOutcome {
    pub fn new(identifier: RecordId, action: ReconcileAction) -> Self {
        Self { identifier, action }
    }
}

/// Render the markdown body for a snapshot.
///
/// The "Last updated" header shows the publisher's feed header timestamp when
/// the feed carries one, falling back to `fetched_at_utc`, converted to the
/// display timezone.
///
/// Output depends only on the arguments; the same snapshot always yields the
/// same bytes.
pub fn render_body(snapshot: &FeedSnapshot, settings: &DisplaySettings) -> String {
    let last_updated = snapshot
        .observed_at()
        .with_timezone(&settings.timezone)
        .format("%Y-%m-%d %H:%M:%S %Z");
    let total = snapshot.vehicle_count();

    let mut body = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(body, "🚆 **{}**\n", settings.title);
    let _ = writeln!(body, "*Last updated: {}*\n", last_updated);
    let _ = writeln!(body, "Total active trains: {}\n", total);

    if total == 0 {
        body.push_str("No active trains detected at the moment.\n");
        return body;
    }

    for vehicle in &snapshot.vehicles {
        let route = if vehicle.route_id.is_empty() {
            "Unknown"
        } else {
            vehicle.route_id.as_str()
        };
        let _ = writeln!(
            body,
            "  - **Train ID:** {} | **Route:** {}",
            vehicle.vehicle_id, route
        );
        let _ = writeln!(
            body,
            "    - **Location:** `{:.6}, {:.6}`",
            vehicle.latitude, vehicle.longitude
        );
        let _ = writeln!(body, "    - **Speed:** {:.1} km/h", vehicle.speed_kmh());
    }

    body
}
