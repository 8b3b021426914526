//! Hotspot calculation pipeline
//!
//! filter -> weight -> grid index -> merge -> size cut -> classify -> sort.
//! Every stage is synchronous and pure; the caller supplies the snapshot
//! and the clock.

pub mod classify;
pub mod filter;
pub mod grid;
pub mod merge;
pub mod stats;
pub mod weight;

pub use classify::{Hotspot, RiskTier, Strategy};
pub use filter::FilterStats;
pub use stats::HotspotStats;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::incident::{Incident, Snapshot};
use chrono::{DateTime, Utc};
use classify::ClassifyContext;
use grid::GridIndex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Per-call options
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HotspotQuery {
    /// Only incidents whose region equals this exactly
    #[serde(default)]
    pub region: Option<String>,
    /// Look-back window; the engine default when absent
    #[serde(default)]
    pub days_window: Option<u32>,
}

impl HotspotQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_days_window(mut self, days: u32) -> Self {
        self.days_window = Some(days);
        self
    }

    /// Region filter, with blank strings treated as "no filter"
    pub fn region_filter(&self) -> Option<&str> {
        self.region.as_deref().filter(|r| !r.trim().is_empty())
    }
}

/// Hotspots plus the side statistics of the run that produced them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotReport {
    pub generated_at: DateTime<Utc>,
    pub region: Option<String>,
    pub days_window: u32,
    pub filter_stats: FilterStats,
    /// Snapshot records that could not be read as incidents
    #[serde(default)]
    pub unreadable: usize,
    /// Occupied grid cells
    pub cell_count: usize,
    /// Clusters before the minimum-size cut
    pub cluster_count: usize,
    pub hotspots: Vec<Hotspot>,
}

impl HotspotReport {
    pub fn stats(&self) -> HotspotStats {
        HotspotStats::from_hotspots(&self.hotspots)
    }

    /// Keep only hotspots of `tier`
    pub fn retain_tier(&mut self, tier: RiskTier) {
        self.hotspots.retain(|h| h.risk_tier == tier);
    }
}

/// Validated engine, reusable across queries
#[derive(Debug, Clone)]
pub struct HotspotEngine {
    config: EngineConfig,
    grid_size_degrees: f64,
}

impl HotspotEngine {
    /// Build an engine, failing on invalid configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            grid_size_degrees: grid::grid_size_degrees(config.grid_size_meters),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Hotspots as of the wall clock
    pub fn calculate_hotspots(&self, incidents: &[Incident], query: &HotspotQuery) -> Vec<Hotspot> {
        self.calculate_hotspots_at(incidents, query, Utc::now())
    }

    /// Hotspots as of `now`
    pub fn calculate_hotspots_at(
        &self,
        incidents: &[Incident],
        query: &HotspotQuery,
        now: DateTime<Utc>,
    ) -> Vec<Hotspot> {
        self.report_at(incidents, query, now).hotspots
    }

    /// Full report for a parsed snapshot, counting its unreadable records
    pub fn report_snapshot(&self, snapshot: &Snapshot, query: &HotspotQuery) -> HotspotReport {
        let mut report = self.report(&snapshot.incidents, query);
        report.unreadable = snapshot.rejected;
        report
    }

    /// Full report as of the wall clock
    pub fn report(&self, incidents: &[Incident], query: &HotspotQuery) -> HotspotReport {
        self.report_at(incidents, query, Utc::now())
    }

    /// Full report as of `now`
    ///
    /// # Arguments
    /// * `incidents` - Snapshot of incident reports
    /// * `query` - Region filter and look-back window
    /// * `now` - Reference instant for the window and recency
    pub fn report_at(
        &self,
        incidents: &[Incident],
        query: &HotspotQuery,
        now: DateTime<Utc>,
    ) -> HotspotReport {
        let days_window = query.days_window.unwrap_or(self.config.days_window);
        let region = query.region_filter();

        let outcome = filter::filter(incidents, region, days_window, now);
        debug!(
            considered = outcome.stats.considered,
            accepted = outcome.stats.accepted,
            dropped = outcome.stats.dropped(),
            "Filtered incidents"
        );

        let weighted = weight::weigh(outcome.incidents, now);
        let grid = GridIndex::build(weighted, self.grid_size_degrees);
        debug!(cells = grid.len(), "Indexed incidents into grid cells");

        let clusters = merge::merge(&grid, &self.config.merge_radii);
        let cluster_count = clusters.len();

        let kept: Vec<merge::Cluster> = clusters
            .into_iter()
            .filter(|c| c.len() >= self.config.min_cluster_size)
            .collect();

        let (min_weight, max_weight) = kept.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), c| (lo.min(c.total_weight), hi.max(c.total_weight)),
        );

        let ctx = ClassifyContext {
            now,
            recency_window_days: self.config.recency_window_days,
            min_weight,
            max_weight,
            radius_bounds: self.config.radius_bounds,
            risk_thresholds: self.config.risk_thresholds,
        };

        let mut hotspots: Vec<Hotspot> = kept
            .into_iter()
            .map(|c| classify::classify(c, &ctx))
            .collect();
        hotspots.sort_by(compare_hotspots);

        let summary = HotspotStats::from_hotspots(&hotspots);
        info!(
            hotspots = summary.total,
            critical = summary.critical,
            high = summary.high,
            medium = summary.medium,
            low = summary.low,
            hot = summary.hot,
            "Calculated hotspots"
        );

        HotspotReport {
            generated_at: now,
            region: region.map(str::to_string),
            days_window,
            filter_stats: outcome.stats,
            unreadable: 0,
            cell_count: grid.len(),
            cluster_count,
            hotspots,
        }
    }
}

/// Output order: count desc, total weight desc, then position and id
fn compare_hotspots(a: &Hotspot, b: &Hotspot) -> Ordering {
    b.incident_count
        .cmp(&a.incident_count)
        .then_with(|| b.total_weight.total_cmp(&a.total_weight))
        .then_with(|| a.center.lat.total_cmp(&b.center.lat))
        .then_with(|| a.center.lng.total_cmp(&b.center.lng))
        .then_with(|| a.id.cmp(&b.id))
}

/// One-shot calculation with default settings
pub fn calculate_hotspots(incidents: &[Incident], query: &HotspotQuery) -> Result<Vec<Hotspot>> {
    Ok(HotspotEngine::new(EngineConfig::default())?.calculate_hotspots(incidents, query))
}
