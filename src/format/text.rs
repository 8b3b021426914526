//! Human-readable text output formatter

use crate::config::Config;
use crate::engine::{Hotspot, HotspotReport, RiskTier};
use crate::error::Result;
use crate::format::OutputFormatter;

/// Text formatter - outputs a ranked summary
pub struct TextFormatter;

fn tier_marker(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::Critical => "!!!",
        RiskTier::High => "!! ",
        RiskTier::Medium => "!  ",
        RiskTier::Low => "   ",
    }
}

/// One line per hotspot, e.g.
/// `#1 !  MEDIUM    3 incidents  (14.8611, 120.8065)  r=54m  hot  Poblacion`
fn hotspot_line(rank: usize, hotspot: &Hotspot) -> String {
    let place = hotspot
        .label
        .as_deref()
        .or(hotspot.region.as_deref())
        .unwrap_or("Unknown");

    format!(
        "#{:<3} {} {:<8} {:>4} incidents  ({:.4}, {:.4})  r={}m{}  {}",
        rank,
        tier_marker(hotspot.risk_tier),
        hotspot.risk_tier.to_string().to_uppercase(),
        hotspot.incident_count,
        hotspot.center.lat,
        hotspot.center.lng,
        hotspot.radius.round(),
        if hotspot.is_hot { "  hot" } else { "" },
        place
    )
}

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable ranked list"
    }

    fn format(&self, report: &HotspotReport, _config: &Config) -> Result<String> {
        let mut output = String::new();

        output.push_str(&format!(
            "Hotspot report ({})\n",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push_str(&format!(
            "Window: last {} days, region: {}\n",
            report.days_window,
            report.region.as_deref().unwrap_or("all")
        ));

        let fs = &report.filter_stats;
        output.push_str(&format!(
            "Incidents: {} considered, {} used, {} dropped\n",
            fs.considered,
            fs.accepted,
            fs.dropped()
        ));
        if fs.dropped() > 0 {
            output.push_str(&format!(
                "  unverified {}, no location {}, sensitive {}, bad time {}, out of window {}, other region {}\n",
                fs.unverified,
                fs.missing_location,
                fs.sensitive,
                fs.invalid_timestamp,
                fs.out_of_window,
                fs.region_mismatch
            ));
        }
        if report.unreadable > 0 {
            output.push_str(&format!("  unreadable records skipped: {}\n", report.unreadable));
        }
        output.push('\n');

        if report.hotspots.is_empty() {
            output.push_str("No hotspots.\n");
            return Ok(output);
        }

        output.push_str(&format!("Hotspots ({}):\n", report.hotspots.len()));
        for (i, hotspot) in report.hotspots.iter().enumerate() {
            output.push_str(&hotspot_line(i + 1, hotspot));
            output.push('\n');
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::sample_report;

    #[test]
    fn test_text_format() {
        let output = TextFormatter
            .format(&sample_report(), &Config::default())
            .unwrap();

        assert!(output.contains("Hotspot report (2025-06-15 12:00:00 UTC)"));
        assert!(output.contains("Window: last 30 days, region: all"));
        assert!(output.contains("6 considered, 6 used, 0 dropped"));
        assert!(output.contains("Hotspots (2):"));
        assert!(output.contains("MEDIUM"));
        assert!(output.contains("r=54m  hot  Poblacion"));
        assert!(output.contains("Poblacion"));
        assert!(output.contains("Unknown"));
        assert!(!output.contains("unreadable"));
    }

    #[test]
    fn test_unreadable_records_reported() {
        let mut report = sample_report();
        report.unreadable = 4;

        let output = TextFormatter.format(&report, &Config::default()).unwrap();
        assert!(output.contains("unreadable records skipped: 4"));
    }

    #[test]
    fn test_label_preferred_over_region() {
        let mut report = sample_report();
        report.hotspots[0].label = Some("Santo Rosario".to_string());

        let output = TextFormatter.format(&report, &Config::default()).unwrap();
        assert!(output.contains("Santo Rosario"));
        assert!(!output.contains("Poblacion"));
    }

    #[test]
    fn test_empty_report() {
        let mut report = sample_report();
        report.hotspots.clear();

        let output = TextFormatter.format(&report, &Config::default()).unwrap();
        assert!(output.contains("No hotspots."));
    }

    #[test]
    fn test_text_formatter_info() {
        assert_eq!(TextFormatter.name(), "text");
        assert!(!TextFormatter.description().is_empty());
    }
}
