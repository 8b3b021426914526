//! Engine tuning parameters
//!
//! Validated once when a [`crate::engine::HotspotEngine`] is built; the
//! pipeline itself never re-checks them.

use crate::config::defaults::*;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Clustering and classification settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Grid cell edge in meters
    #[serde(default = "default_grid_size_meters")]
    pub grid_size_meters: f64,

    /// Minimum incidents per reported hotspot
    #[serde(default = "default_min_cluster_size")]
    pub min_cluster_size: usize,

    /// Default look-back window in days
    #[serde(default = "default_days_window")]
    pub days_window: u32,

    /// Window in days that counts as "recent" for the hot flag
    #[serde(default = "default_recency_window_days")]
    pub recency_window_days: u32,

    /// Display radius envelope
    #[serde(default)]
    pub radius_bounds: RadiusBounds,

    /// Incident-count bands for the visual strategy
    #[serde(default)]
    pub risk_thresholds: RiskThresholds,

    /// Adaptive merge distances
    #[serde(default)]
    pub merge_radii: MergeRadii,
}

/// Minimum and maximum display radius in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusBounds {
    #[serde(default = "default_min_radius")]
    pub min: f64,
    #[serde(default = "default_max_radius")]
    pub max: f64,
}

/// Lower incident-count bound of each strategy band above "individual"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskThresholds {
    #[serde(default = "default_small_cluster_min")]
    pub small_cluster: usize,
    #[serde(default = "default_medium_hotspot_min")]
    pub medium_hotspot: usize,
    #[serde(default = "default_large_hotspot_min")]
    pub large_hotspot: usize,
    #[serde(default = "default_major_area_min")]
    pub major_area: usize,
}

/// Merge distances in meters, chosen by seed size and severity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergeRadii {
    /// Seed with a single incident
    #[serde(default = "default_merge_single")]
    pub single: f64,
    /// Seed with two or three incidents
    #[serde(default = "default_merge_small")]
    pub small: f64,
    /// Multi-incident seed whose average weight exceeds `severe_avg_weight`
    #[serde(default = "default_merge_severe")]
    pub severe: f64,
    /// Any larger seed
    #[serde(default = "default_merge_dense")]
    pub dense: f64,
    #[serde(default = "default_severe_avg_weight")]
    pub severe_avg_weight: f64,
}

fn default_grid_size_meters() -> f64 {
    DEFAULT_GRID_SIZE_METERS
}
fn default_min_cluster_size() -> usize {
    DEFAULT_MIN_CLUSTER_SIZE
}
fn default_days_window() -> u32 {
    DEFAULT_DAYS_WINDOW
}
fn default_recency_window_days() -> u32 {
    DEFAULT_RECENCY_WINDOW_DAYS
}
fn default_min_radius() -> f64 {
    DEFAULT_MIN_RADIUS
}
fn default_max_radius() -> f64 {
    DEFAULT_MAX_RADIUS
}
fn default_small_cluster_min() -> usize {
    DEFAULT_SMALL_CLUSTER_MIN
}
fn default_medium_hotspot_min() -> usize {
    DEFAULT_MEDIUM_HOTSPOT_MIN
}
fn default_large_hotspot_min() -> usize {
    DEFAULT_LARGE_HOTSPOT_MIN
}
fn default_major_area_min() -> usize {
    DEFAULT_MAJOR_AREA_MIN
}
fn default_merge_single() -> f64 {
    DEFAULT_MERGE_SINGLE
}
fn default_merge_small() -> f64 {
    DEFAULT_MERGE_SMALL
}
fn default_merge_severe() -> f64 {
    DEFAULT_MERGE_SEVERE
}
fn default_merge_dense() -> f64 {
    DEFAULT_MERGE_DENSE
}
fn default_severe_avg_weight() -> f64 {
    DEFAULT_SEVERE_AVG_WEIGHT
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid_size_meters: default_grid_size_meters(),
            min_cluster_size: default_min_cluster_size(),
            days_window: default_days_window(),
            recency_window_days: default_recency_window_days(),
            radius_bounds: RadiusBounds::default(),
            risk_thresholds: RiskThresholds::default(),
            merge_radii: MergeRadii::default(),
        }
    }
}

impl Default for RadiusBounds {
    fn default() -> Self {
        Self {
            min: default_min_radius(),
            max: default_max_radius(),
        }
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            small_cluster: default_small_cluster_min(),
            medium_hotspot: default_medium_hotspot_min(),
            large_hotspot: default_large_hotspot_min(),
            major_area: default_major_area_min(),
        }
    }
}

impl Default for MergeRadii {
    fn default() -> Self {
        Self {
            single: default_merge_single(),
            small: default_merge_small(),
            severe: default_merge_severe(),
            dense: default_merge_dense(),
            severe_avg_weight: default_severe_avg_weight(),
        }
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::Config(format!("{} must be a positive number, got {}", name, value)))
    }
}

impl EngineConfig {
    /// Check every parameter, failing on the first invalid one
    pub fn validate(&self) -> Result<()> {
        positive("engine.grid_size_meters", self.grid_size_meters)?;

        if self.min_cluster_size == 0 {
            return Err(Error::Config(
                "engine.min_cluster_size must be at least 1".to_string(),
            ));
        }
        if self.days_window == 0 {
            return Err(Error::Config("engine.days_window must be at least 1".to_string()));
        }
        if self.recency_window_days == 0 {
            return Err(Error::Config(
                "engine.recency_window_days must be at least 1".to_string(),
            ));
        }

        self.radius_bounds.validate()?;
        self.risk_thresholds.validate()?;
        self.merge_radii.validate()
    }
}

impl RadiusBounds {
    pub fn validate(&self) -> Result<()> {
        positive("engine.radius_bounds.min", self.min)?;
        positive("engine.radius_bounds.max", self.max)?;
        if self.min > self.max {
            return Err(Error::Config(format!(
                "engine.radius_bounds.min ({}) exceeds max ({})",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Clamp a radius into the envelope
    pub fn clamp(&self, radius: f64) -> f64 {
        radius.clamp(self.min, self.max)
    }
}

impl RiskThresholds {
    pub fn validate(&self) -> Result<()> {
        let bands = [
            self.small_cluster,
            self.medium_hotspot,
            self.large_hotspot,
            self.major_area,
        ];
        if self.small_cluster < 2 || bands.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::Config(format!(
                "engine.risk_thresholds must be strictly increasing starting at 2 or more, got {:?}",
                bands
            )));
        }
        Ok(())
    }
}

impl MergeRadii {
    pub fn validate(&self) -> Result<()> {
        positive("engine.merge_radii.single", self.single)?;
        positive("engine.merge_radii.small", self.small)?;
        positive("engine.merge_radii.severe", self.severe)?;
        positive("engine.merge_radii.dense", self.dense)?;
        if !(0.0..=1.0).contains(&self.severe_avg_weight) {
            return Err(Error::Config(format!(
                "engine.merge_radii.severe_avg_weight must be within [0, 1], got {}",
                self.severe_avg_weight
            )));
        }
        Ok(())
    }

    /// Merge radius for a seed with `count` incidents of average weight `avg_weight`
    ///
    /// Rules are checked in order; the severe rule wins over the size rules.
    pub fn radius_for(&self, count: usize, avg_weight: f64) -> f64 {
        if count >= 2 && avg_weight > self.severe_avg_weight {
            self.severe
        } else if count <= 1 {
            self.single
        } else if count <= 3 {
            self.small
        } else {
            self.dense
        }
    }

    /// Smallest radius any seed can get
    pub fn smallest(&self) -> f64 {
        self.single.min(self.small).min(self.severe).min(self.dense)
    }
}
