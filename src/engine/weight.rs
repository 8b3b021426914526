//! Incident weighting
//!
//! `weight = type_severity * recency_factor`, always within (0, 1].

use crate::constants::time::SECONDS_PER_DAY;
use crate::coord::Coordinates;
use crate::engine::filter::ScreenedIncident;
use crate::incident::Incident;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity for incident types missing from [`SEVERITY_TABLE`]
pub const DEFAULT_SEVERITY: f64 = 0.5;

/// Recency factor used when the timestamp cannot be resolved
pub const UNKNOWN_RECENCY_FACTOR: f64 = 0.7;

/// Incidents this recent keep their full weight
pub const FULL_WEIGHT_DAYS: f64 = 7.0;

/// Age in days at which the recency factor bottoms out
pub const DECAY_END_DAYS: f64 = 90.0;

/// Lowest recency factor
pub const RECENCY_FLOOR: f64 = 0.3;

/// Severity coefficient per incident type, most severe first
pub const SEVERITY_TABLE: &[(&str, f64)] = &[
    ("Robbery", 1.0),
    ("Assault", 0.95),
    ("Vehicle Theft", 0.9),
    ("Theft", 0.8),
    ("Burglary", 0.7),
    ("Breaking and Entering", 0.6),
    ("Vandalism", 0.4),
    ("Fraud", 0.3),
    ("Harassment", 0.2),
];

/// A severity table row, for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeverityInfo {
    pub incident_type: String,
    pub severity: f64,
}

/// List the severity table
pub fn severity_table() -> Vec<SeverityInfo> {
    SEVERITY_TABLE
        .iter()
        .map(|(name, severity)| SeverityInfo {
            incident_type: name.to_string(),
            severity: *severity,
        })
        .collect()
}

/// Severity coefficient of an incident type
///
/// Exact match first, then a case-insensitive match on the trimmed label.
pub fn type_severity(incident_type: &str) -> f64 {
    if let Some((_, severity)) = SEVERITY_TABLE.iter().find(|(name, _)| *name == incident_type) {
        return *severity;
    }

    let wanted = incident_type.trim();
    SEVERITY_TABLE
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
        .map(|(_, severity)| *severity)
        .unwrap_or(DEFAULT_SEVERITY)
}

/// Recency multiplier for an incident that happened at `occurred_at`
///
/// 1.0 up to a week old, then linear decay to 0.3 at 90 days. Future
/// timestamps count as brand new; unknown timestamps get 0.7.
pub fn recency_factor(occurred_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(occurred_at) = occurred_at else {
        return UNKNOWN_RECENCY_FACTOR;
    };

    let days = age_in_days(occurred_at, now);
    if days <= FULL_WEIGHT_DAYS {
        return 1.0;
    }

    let span = DECAY_END_DAYS - FULL_WEIGHT_DAYS;
    (1.0 - (days - FULL_WEIGHT_DAYS) / span * (1.0 - RECENCY_FLOOR)).max(RECENCY_FLOOR)
}

/// Fractional days between `occurred_at` and `now`
pub fn age_in_days(occurred_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - occurred_at).num_seconds() as f64 / SECONDS_PER_DAY
}

/// Weight of a single incident; total over any input
pub fn weight(incident: &Incident, now: DateTime<Utc>) -> f64 {
    type_severity(&incident.incident_type) * recency_factor(incident.occurred_at(), now)
}

/// An accepted incident with its weight attached
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedIncident {
    pub incident: Incident,
    pub location: Coordinates,
    pub occurred_at: DateTime<Utc>,
    pub weight: f64,
}

/// Attach weights to screened incidents, preserving order
pub fn weigh(screened: Vec<ScreenedIncident>, now: DateTime<Utc>) -> Vec<WeightedIncident> {
    screened
        .into_iter()
        .map(|s| {
            let weight =
                type_severity(&s.incident.incident_type) * recency_factor(Some(s.occurred_at), now);
            WeightedIncident {
                incident: s.incident,
                location: s.location,
                occurred_at: s.occurred_at,
                weight,
            }
        })
        .collect()
}
