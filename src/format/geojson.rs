//! GeoJSON output formatter
//!
//! One Point feature per hotspot at its centroid. Positions are
//! `[longitude, latitude]` as GeoJSON requires; member incidents are reduced
//! to their ids.

use crate::config::Config;
use crate::engine::{Hotspot, HotspotReport};
use crate::error::Result;
use crate::format::OutputFormatter;
use serde_json::{json, Value};

pub struct GeoJsonFormatter;

fn feature(rank: usize, hotspot: &Hotspot) -> Value {
    let incident_ids: Vec<&str> = hotspot.incidents.iter().map(|i| i.id.as_str()).collect();

    json!({
        "type": "Feature",
        "id": hotspot.id,
        "geometry": {
            "type": "Point",
            "coordinates": [hotspot.center.lng, hotspot.center.lat],
        },
        "properties": {
            "rank": rank,
            "incident_count": hotspot.incident_count,
            "total_weight": hotspot.total_weight,
            "avg_weight": hotspot.avg_weight,
            "normalized_weight": hotspot.normalized_weight,
            "risk_tier": hotspot.risk_tier,
            "strategy": hotspot.strategy,
            "radius": hotspot.radius,
            "opacity": hotspot.opacity,
            "color": hotspot.color,
            "is_hot": hotspot.is_hot,
            "recent_activity_ratio": hotspot.recent_activity_ratio,
            "recent_incident_count": hotspot.recent_incident_count,
            "region": hotspot.region,
            "label": hotspot.label,
            "incident_ids": incident_ids,
        },
    })
}

/// Build the FeatureCollection value
pub fn feature_collection(report: &HotspotReport) -> Value {
    let features: Vec<Value> = report
        .hotspots
        .iter()
        .enumerate()
        .map(|(i, h)| feature(i + 1, h))
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
        "properties": {
            "generated_at": report.generated_at,
            "region": report.region,
            "days_window": report.days_window,
        },
    })
}

impl OutputFormatter for GeoJsonFormatter {
    fn name(&self) -> &str {
        "geojson"
    }

    fn description(&self) -> &str {
        "GeoJSON FeatureCollection of hotspot points"
    }

    fn format(&self, report: &HotspotReport, _config: &Config) -> Result<String> {
        Ok(serde_json::to_string_pretty(&feature_collection(report))?)
    }
}
