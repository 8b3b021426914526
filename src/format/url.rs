//! URL output formatter

use crate::config::Config;
use crate::engine::stats::most_dangerous;
use crate::engine::HotspotReport;
use crate::error::{Error, Result};
use crate::format::OutputFormatter;

/// Map URL for the top-ranked hotspot
pub struct UrlFormatter;

impl UrlFormatter {
    /// Format URL with optional provider override
    pub fn format_with_provider(
        &self,
        report: &HotspotReport,
        config: &Config,
        provider: Option<&str>,
    ) -> Result<String> {
        let top = most_dangerous(&report.hotspots)
            .ok_or_else(|| Error::Input("No hotspots to link to".to_string()))?;
        config.format_url(provider, top.center.lat, top.center.lng)
    }
}

impl OutputFormatter for UrlFormatter {
    fn name(&self) -> &str {
        "url"
    }

    fn description(&self) -> &str {
        "Map URL for the most dangerous hotspot"
    }

    fn format(&self, report: &HotspotReport, config: &Config) -> Result<String> {
        self.format_with_provider(report, config, None)
    }
}
