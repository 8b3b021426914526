//! JSON output formatter

use crate::config::Config;
use crate::engine::HotspotReport;
use crate::error::Result;
use crate::format::OutputFormatter;

/// Pretty-printed report, including member incidents
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Full JSON report"
    }

    fn format(&self, report: &HotspotReport, _config: &Config) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::sample_report;

    #[test]
    fn test_json_format() {
        let output = JsonFormatter
            .format(&sample_report(), &Config::default())
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(parsed.get("generated_at").is_some());
        assert!(parsed.get("filter_stats").is_some());

        let first = &parsed["hotspots"][0];
        assert_eq!(first["incident_count"], 3);
        assert_eq!(first["risk_tier"], "medium");
        assert_eq!(first["strategy"], "small_cluster");
        assert_eq!(first["incidents"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn test_json_round_trips_report() {
        let report = sample_report();
        let output = JsonFormatter.format(&report, &Config::default()).unwrap();
        let parsed: HotspotReport = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.hotspots.len(), report.hotspots.len());
        assert_eq!(parsed.hotspots[0].id, report.hotspots[0].id);
    }
}
