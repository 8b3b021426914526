//! Incident records as supplied by the external report store
//!
//! Field names follow the store's JSON export loosely: both the snake_case
//! names used here and the store's original names (`Latitude`, `DateTime`,
//! `Barangay`, ...) are accepted on input.

use crate::coord::Coordinates;
use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Review state of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
}

impl From<String> for VerificationStatus {
    /// Anything that is not recognizably verified or rejected stays pending.
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "verified" => Self::Verified,
            "rejected" => Self::Rejected,
            _ => Self::Pending,
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Verified => write!(f, "verified"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// When an incident happened, in any of the shapes the store produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IncidentTime {
    /// Milliseconds since the Unix epoch
    EpochMillis(i64),
    /// Firestore-style timestamp object
    Firestore {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },
    /// RFC 3339, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD` (UTC assumed)
    Text(String),
}

impl IncidentTime {
    /// Resolve to a UTC instant, or `None` if the value cannot be interpreted
    pub fn resolve(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::EpochMillis(ms) => DateTime::from_timestamp_millis(*ms),
            Self::Firestore {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(*seconds, *nanoseconds),
            Self::Text(s) => parse_text_time(s.trim()),
        }
    }
}

impl From<DateTime<Utc>> for IncidentTime {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Text(dt.to_rfc3339())
    }
}

fn parse_text_time(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, pattern) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// A geotagged incident report
///
/// Immutable once handed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    #[serde(default, alias = "Id", alias = "reportId")]
    pub id: String,

    #[serde(default, alias = "Latitude")]
    pub latitude: Option<f64>,

    #[serde(default, alias = "Longitude")]
    pub longitude: Option<f64>,

    #[serde(default, alias = "IncidentType")]
    pub incident_type: String,

    #[serde(default, alias = "DateTime")]
    pub timestamp: Option<IncidentTime>,

    #[serde(default, alias = "Status")]
    pub status: VerificationStatus,

    #[serde(default, alias = "isSensitive")]
    pub sensitive: bool,

    /// Administrative area label (barangay, district, ...)
    #[serde(default, alias = "Barangay", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl Incident {
    /// Create a verified, non-sensitive incident at the given location
    pub fn new(
        id: impl Into<String>,
        location: Coordinates,
        incident_type: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            latitude: Some(location.lat),
            longitude: Some(location.lng),
            incident_type: incident_type.into(),
            timestamp: Some(timestamp.into()),
            status: VerificationStatus::Verified,
            sensitive: false,
            region: None,
        }
    }

    /// Set the region label
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the verification status
    pub fn with_status(mut self, status: VerificationStatus) -> Self {
        self.status = status;
        self
    }

    /// Mark as sensitive
    pub fn with_sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }

    /// Location, if both axes are present
    pub fn location(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
            _ => None,
        }
    }

    /// Resolved timestamp, if present and parsable
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_ref().and_then(IncidentTime::resolve)
    }
}

/// An incident snapshot parsed from JSON
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Records that deserialized cleanly
    pub incidents: Vec<Incident>,
    /// Array entries that were not valid incident objects
    pub rejected: usize,
}

/// Parse a JSON array of incident records
///
/// Entries that fail to deserialize are skipped and counted rather than
/// failing the whole snapshot. Only a non-array document is an error.
pub fn parse_snapshot(json: &str) -> Result<Snapshot> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)
        .map_err(|e| Error::Input(format!("Expected a JSON array of incidents: {}", e)))?;

    Ok(Snapshot::from_values(values))
}

impl Snapshot {
    /// Build a snapshot from already-parsed JSON records
    pub fn from_values(values: Vec<serde_json::Value>) -> Self {
        let mut snapshot = Self::default();
        for value in values {
            match serde_json::from_value::<Incident>(value) {
                Ok(incident) => snapshot.incidents.push(incident),
                Err(e) => {
                    tracing::debug!("Skipping malformed incident record: {}", e);
                    snapshot.rejected += 1;
                }
            }
        }
        snapshot
    }
}
