//! Hotspots command handler
//!
//! Reads an incident snapshot, runs the engine and renders the report.

use crate::config::Config;
use crate::engine::weight::severity_table;
use crate::engine::{HotspotEngine, HotspotQuery, HotspotReport, HotspotStats, RiskTier};
use crate::error::{Error, Result};
use crate::format::url::UrlFormatter;
use crate::format::{available_formats, get_formatter};
use crate::geo::{default_namer, label_hotspots};
use crate::incident::parse_snapshot;
use clap::Args;
use std::io::Read;
use std::str::FromStr;
use tracing::{info, warn};

/// Hotspots command arguments
#[derive(Args)]
pub struct HotspotsArgs {
    /// Incident snapshot (JSON array); "-" reads stdin
    #[arg(long, short = 'i', required_unless_present_any = ["list_formats", "list_types"])]
    pub input: Option<String>,

    /// Only incidents from this region (exact match)
    #[arg(long, short = 'r')]
    pub region: Option<String>,

    /// Look-back window in days
    #[arg(long, short = 'd')]
    pub days: Option<u32>,

    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Map provider for the url format
    #[arg(long)]
    pub provider: Option<String>,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// Print summary statistics to stderr
    #[arg(long, short = 's')]
    pub stats: bool,

    /// Label hotspots with area names (reverse geocoding)
    #[arg(long, conflicts_with = "no_label")]
    pub label: bool,

    /// Skip labeling even if enabled in config
    #[arg(long)]
    pub no_label: bool,

    /// Only show hotspots of this risk tier
    #[arg(long, short = 't')]
    pub tier: Option<String>,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,

    /// List known incident types and their severity
    #[arg(short = 'T', long = "list-types")]
    pub list_types: bool,
}

/// Run the hotspots command
pub async fn run(args: HotspotsArgs) -> Result<()> {
    if args.list_formats {
        list_formats();
        return Ok(());
    }

    if args.list_types {
        list_types();
        return Ok(());
    }

    let config = Config::load()?;

    let input = args
        .input
        .as_deref()
        .ok_or_else(|| Error::Input("No input given; use --input <file> or --input -".to_string()))?;
    let snapshot = parse_snapshot(&read_input(input)?)?;
    if snapshot.rejected > 0 {
        warn!(rejected = snapshot.rejected, "Skipped unreadable incident records");
    }

    let tier = args
        .tier
        .as_deref()
        .map(RiskTier::from_str)
        .transpose()
        .map_err(Error::Input)?;

    let query = build_query(args.region, args.days)?;
    let engine = HotspotEngine::new(config.engine.clone())?;
    let mut report = engine.report_snapshot(&snapshot, &query);

    if let Some(tier) = tier {
        report.retain_tier(tier);
    }

    let label = (args.label || config.defaults.label) && !args.no_label;
    if label && !report.hotspots.is_empty() {
        let namer = default_namer()?;
        let labeled = label_hotspots(&mut report.hotspots, &namer).await;
        info!(labeled, total = report.hotspots.len(), "Labeled hotspots");
    }

    let format = args.format.unwrap_or_else(|| config.defaults.format.clone());
    let output = render(&report, &format, args.provider.as_deref(), &config)?;

    if let Some(path) = args.output {
        std::fs::write(&path, &output)?;
        eprintln!("Output written to {}", path);
    } else {
        println!("{}", output);
    }

    if args.stats {
        print_stats(&report.stats());
    }

    Ok(())
}

/// Query from CLI flags; a zero-day window is rejected
fn build_query(region: Option<String>, days: Option<u32>) -> Result<HotspotQuery> {
    if days == Some(0) {
        return Err(Error::Input("--days must be at least 1".to_string()));
    }
    Ok(HotspotQuery {
        region,
        days_window: days,
    })
}

/// Read the snapshot from a file, or stdin for "-"
fn read_input(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(source)
            .map_err(|e| Error::Input(format!("Cannot read {}: {}", source, e)))
    }
}

fn render(
    report: &HotspotReport,
    format: &str,
    provider: Option<&str>,
    config: &Config,
) -> Result<String> {
    if format.eq_ignore_ascii_case("url") && provider.is_some() {
        return UrlFormatter.format_with_provider(report, config, provider);
    }

    let formatter =
        get_formatter(format).ok_or_else(|| Error::Config(format!("Unknown format: {}", format)))?;
    formatter.format(report, config)
}

fn print_stats(stats: &HotspotStats) {
    eprintln!("Hotspots: {} ({} hot)", stats.total, stats.hot);
    eprintln!(
        "  critical {}, high {}, medium {}, low {}",
        stats.critical, stats.high, stats.medium, stats.low
    );
    eprintln!(
        "  {} incidents, {:.1} per hotspot",
        stats.total_incidents, stats.average_incidents_per_hotspot
    );
}

/// Print available output formats
fn list_formats() {
    println!("Available output formats:");
    for format in available_formats() {
        println!("  {:8} - {}", format.name, format.description);
    }
}

/// Print the severity table
fn list_types() {
    println!("Known incident types (others weigh 0.5):");
    for info in severity_table() {
        println!("  {:22} {:.2}", info.incident_type, info.severity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_build_query() {
        let query = build_query(Some("Poblacion".to_string()), Some(14)).unwrap();
        assert_eq!(query.region.as_deref(), Some("Poblacion"));
        assert_eq!(query.days_window, Some(14));

        assert!(build_query(None, Some(0)).is_err());
        assert_eq!(build_query(None, None).unwrap(), HotspotQuery::default());
    }

    #[test]
    fn test_read_input_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();

        let path = file.path().to_string_lossy().to_string();
        assert_eq!(read_input(&path).unwrap(), "[]");
        assert!(read_input("/definitely/not/here.json").is_err());
    }

    #[test]
    fn test_render_formats() {
        let report = crate::format::sample_report();
        let config = Config::default();

        assert!(render(&report, "text", None, &config).unwrap().contains("Hotspots (2):"));
        assert!(render(&report, "url", Some("apple"), &config)
            .unwrap()
            .contains("maps.apple.com"));
        assert!(render(&report, "yaml", None, &config).is_err());
    }
}
