//! Incident screening
//!
//! Decides which reports may contribute to hotspots. Rejections are never
//! errors; each one is counted under its reason in [`FilterStats`].

use crate::coord::Coordinates;
use crate::incident::{Incident, VerificationStatus};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Why incidents were kept or dropped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStats {
    pub considered: usize,
    pub accepted: usize,
    pub unverified: usize,
    pub missing_location: usize,
    pub sensitive: usize,
    pub invalid_timestamp: usize,
    pub out_of_window: usize,
    pub region_mismatch: usize,
}

impl FilterStats {
    /// Total number of dropped incidents
    pub fn dropped(&self) -> usize {
        self.considered - self.accepted
    }

    /// Incidents dropped because the record itself was unusable
    pub fn malformed(&self) -> usize {
        self.missing_location + self.invalid_timestamp
    }
}

/// An incident that passed screening, with its location and time resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenedIncident {
    pub incident: Incident,
    pub location: Coordinates,
    pub occurred_at: DateTime<Utc>,
}

/// Output of [`filter`]
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub incidents: Vec<ScreenedIncident>,
    pub stats: FilterStats,
}

enum Rejection {
    Unverified,
    MissingLocation,
    Sensitive,
    InvalidTimestamp,
    OutOfWindow,
    RegionMismatch,
}

/// A usable location: both axes present, in range, and neither exactly zero
///
/// The report store writes 0 for "no location", so a zero on either axis is
/// treated as missing.
fn usable_location(incident: &Incident) -> Option<Coordinates> {
    let location = incident.location()?;
    if location.lat == 0.0 || location.lng == 0.0 || location.validate().is_err() {
        return None;
    }
    Some(location)
}

fn screen(
    incident: &Incident,
    region: Option<&str>,
    window_start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<ScreenedIncident, Rejection> {
    if incident.status != VerificationStatus::Verified {
        return Err(Rejection::Unverified);
    }

    let location = usable_location(incident).ok_or(Rejection::MissingLocation)?;

    if incident.sensitive {
        return Err(Rejection::Sensitive);
    }

    let occurred_at = incident.occurred_at().ok_or(Rejection::InvalidTimestamp)?;
    if occurred_at < window_start || occurred_at > now {
        return Err(Rejection::OutOfWindow);
    }

    if let Some(target) = region {
        if incident.region.as_deref() != Some(target) {
            return Err(Rejection::RegionMismatch);
        }
    }

    Ok(ScreenedIncident {
        incident: incident.clone(),
        location,
        occurred_at,
    })
}

/// Start of the look-back window
///
/// Windows reaching past chrono's range start at the earliest representable
/// instant.
pub fn window_start(now: DateTime<Utc>, days_window: u32) -> DateTime<Utc> {
    Duration::try_days(i64::from(days_window))
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Keep the incidents eligible for hotspot calculation
///
/// # Arguments
/// * `incidents` - Raw snapshot, in caller order
/// * `region` - Exact, case-sensitive region label to keep (None keeps all)
/// * `days_window` - Look-back window ending at `now`
/// * `now` - Reference instant
pub fn filter(
    incidents: &[Incident],
    region: Option<&str>,
    days_window: u32,
    now: DateTime<Utc>,
) -> FilterOutcome {
    let start = window_start(now, days_window);
    let mut outcome = FilterOutcome::default();
    outcome.stats.considered = incidents.len();

    for incident in incidents {
        match screen(incident, region, start, now) {
            Ok(screened) => outcome.incidents.push(screened),
            Err(Rejection::Unverified) => outcome.stats.unverified += 1,
            Err(Rejection::MissingLocation) => outcome.stats.missing_location += 1,
            Err(Rejection::Sensitive) => outcome.stats.sensitive += 1,
            Err(Rejection::InvalidTimestamp) => outcome.stats.invalid_timestamp += 1,
            Err(Rejection::OutOfWindow) => outcome.stats.out_of_window += 1,
            Err(Rejection::RegionMismatch) => outcome.stats.region_mismatch += 1,
        }
    }

    outcome.stats.accepted = outcome.incidents.len();
    outcome
}
