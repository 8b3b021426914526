//! Output formatters
//!
//! Render a [`HotspotReport`] for the CLI. Formatters only serialize data;
//! they never draw.

pub mod geojson;
pub mod json;
pub mod text;
pub mod url;

use crate::config::Config;
use crate::engine::HotspotReport;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    pub name: String,
    pub description: String,
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Render a report
    ///
    /// # Arguments
    /// * `report` - The hotspot report to render
    /// * `config` - Application config (for url providers, etc.)
    fn format(&self, report: &HotspotReport, config: &Config) -> Result<String>;
}

fn all_formatters() -> Vec<Box<dyn OutputFormatter>> {
    vec![
        Box::new(json::JsonFormatter),
        Box::new(text::TextFormatter),
        Box::new(geojson::GeoJsonFormatter),
        Box::new(url::UrlFormatter),
    ]
}

/// Get a formatter by name (case-insensitive)
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    all_formatters()
        .into_iter()
        .find(|f| f.name().eq_ignore_ascii_case(name))
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    all_formatters()
        .iter()
        .map(|f| FormatInfo {
            name: f.name().to_string(),
            description: f.description().to_string(),
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn sample_report() -> HotspotReport {
    use crate::coord::Coordinates;
    use crate::engine::{HotspotEngine, HotspotQuery};
    use crate::incident::Incident;
    use chrono::{Duration, TimeZone, Utc};

    let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
    let at = |days: i64| now - Duration::days(days);

    let incidents = vec![
        Incident::new("a", Coordinates::new(14.8610, 120.8065), "Robbery", at(0)).with_region("Poblacion"),
        Incident::new("b", Coordinates::new(14.8611, 120.8066), "Robbery", at(1)).with_region("Poblacion"),
        Incident::new("c", Coordinates::new(14.8612, 120.8064), "Theft", at(2)).with_region("Poblacion"),
        Incident::new("d", Coordinates::new(14.8702, 120.8155), "Fraud", at(20)),
        Incident::new("e", Coordinates::new(14.8703, 120.8156), "Vandalism", at(25)),
        Incident::new("f", Coordinates::new(14.9000, 120.9000), "Theft", at(3)),
    ];

    HotspotEngine::new(Default::default())
        .unwrap()
        .report_at(&incidents, &HotspotQuery::new(), now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_formatter() {
        assert!(get_formatter("json").is_some());
        assert!(get_formatter("text").is_some());
        assert!(get_formatter("geojson").is_some());
        assert!(get_formatter("url").is_some());
        assert!(get_formatter("gpx").is_none());
    }

    #[test]
    fn test_get_formatter_case_insensitive() {
        assert!(get_formatter("JSON").is_some());
        assert!(get_formatter("GeoJSON").is_some());
    }

    #[test]
    fn test_available_formats() {
        let formats = available_formats();
        assert_eq!(formats.len(), 4);
        for name in ["json", "text", "geojson", "url"] {
            assert!(formats.iter().any(|f| f.name == name));
        }
    }

    #[test]
    fn test_sample_report_shape() {
        let report = sample_report();
        assert_eq!(report.hotspots.len(), 2);
        assert_eq!(report.hotspots[0].incident_count, 3);
        assert_eq!(report.filter_stats.accepted, 6);
    }
}
