//! Risk classification and visual mapping
//!
//! Turns a merged [`Cluster`] into a [`Hotspot`]. Tier and radius come from
//! two ordered tables so each rule can be read (and tested) on its own.

use crate::config::{RadiusBounds, RiskThresholds};
use crate::coord::Coordinates;
use crate::engine::merge::Cluster;
use crate::engine::weight::age_in_days;
use crate::incident::Incident;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Risk tier, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    /// All tiers, least severe first
    pub const ALL: [RiskTier; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for RiskTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(format!("Unknown risk tier: {}", s)),
        }
    }
}

/// Visual strategy, chosen by incident count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Individual,
    SmallCluster,
    MediumHotspot,
    LargeHotspot,
    MajorArea,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Self::Individual,
        Self::SmallCluster,
        Self::MediumHotspot,
        Self::LargeHotspot,
        Self::MajorArea,
    ];
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Individual => write!(f, "individual"),
            Self::SmallCluster => write!(f, "small_cluster"),
            Self::MediumHotspot => write!(f, "medium_hotspot"),
            Self::LargeHotspot => write!(f, "large_hotspot"),
            Self::MajorArea => write!(f, "major_area"),
        }
    }
}

/// Condition attached to a tier rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RiskCondition {
    Always,
    AvgWeightAbove(f64),
    Hot,
    HotOrAvgWeightAbove(f64),
}

impl RiskCondition {
    fn holds(&self, avg_weight: f64, is_hot: bool) -> bool {
        match *self {
            Self::Always => true,
            Self::AvgWeightAbove(threshold) => avg_weight > threshold,
            Self::Hot => is_hot,
            Self::HotOrAvgWeightAbove(threshold) => is_hot || avg_weight > threshold,
        }
    }
}

/// Tier rules; the first rule matching the strategy and condition wins
pub const RISK_RULES: &[(Strategy, RiskCondition, RiskTier)] = &[
    (Strategy::Individual, RiskCondition::AvgWeightAbove(0.7), RiskTier::Medium),
    (Strategy::Individual, RiskCondition::Always, RiskTier::Low),
    (Strategy::SmallCluster, RiskCondition::HotOrAvgWeightAbove(0.6), RiskTier::Medium),
    (Strategy::SmallCluster, RiskCondition::Always, RiskTier::Low),
    (Strategy::MediumHotspot, RiskCondition::Hot, RiskTier::High),
    (Strategy::MediumHotspot, RiskCondition::Always, RiskTier::Medium),
    (Strategy::LargeHotspot, RiskCondition::Always, RiskTier::High),
    (Strategy::MajorArea, RiskCondition::Always, RiskTier::Critical),
];

/// `base + per_incident * count`, in meters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusFormula {
    pub base: f64,
    pub per_incident: f64,
}

impl RadiusFormula {
    const fn new(base: f64, per_incident: f64) -> Self {
        Self { base, per_incident }
    }

    pub fn radius(&self, count: usize) -> f64 {
        self.base + self.per_incident * count as f64
    }
}

/// Radius formulas per strategy as `(strategy, calm, hot)`
pub const RADIUS_TABLE: &[(Strategy, RadiusFormula, RadiusFormula)] = &[
    (Strategy::Individual, RadiusFormula::new(12.0, 0.0), RadiusFormula::new(15.0, 0.0)),
    (Strategy::SmallCluster, RadiusFormula::new(20.0, 6.0), RadiusFormula::new(30.0, 8.0)),
    (Strategy::MediumHotspot, RadiusFormula::new(50.0, 8.0), RadiusFormula::new(70.0, 12.0)),
    (Strategy::LargeHotspot, RadiusFormula::new(120.0, 6.0), RadiusFormula::new(150.0, 10.0)),
    (Strategy::MajorArea, RadiusFormula::new(280.0, 0.0), RadiusFormula::new(280.0, 0.0)),
];

const BASE_OPACITY: f64 = 0.4;
const MAX_OPACITY: f64 = 0.85;
const HOT_RATIO: f64 = 0.5;
const HOT_MIN_COUNT: usize = 3;

/// Strategy band for an incident count
pub fn strategy_for(count: usize, thresholds: &RiskThresholds) -> Strategy {
    if count >= thresholds.major_area {
        Strategy::MajorArea
    } else if count >= thresholds.large_hotspot {
        Strategy::LargeHotspot
    } else if count >= thresholds.medium_hotspot {
        Strategy::MediumHotspot
    } else if count >= thresholds.small_cluster {
        Strategy::SmallCluster
    } else {
        Strategy::Individual
    }
}

/// Risk tier from the first matching row of [`RISK_RULES`]
pub fn risk_tier(strategy: Strategy, avg_weight: f64, is_hot: bool) -> RiskTier {
    RISK_RULES
        .iter()
        .find(|(s, condition, _)| *s == strategy && condition.holds(avg_weight, is_hot))
        .map(|(_, _, tier)| *tier)
        .unwrap_or(RiskTier::Low)
}

/// Display radius in meters, clamped into `bounds`
pub fn display_radius(strategy: Strategy, count: usize, is_hot: bool, bounds: &RadiusBounds) -> f64 {
    let raw = RADIUS_TABLE
        .iter()
        .find(|(s, _, _)| *s == strategy)
        .map(|(_, calm, hot)| if is_hot { hot.radius(count) } else { calm.radius(count) })
        .unwrap_or(bounds.min);
    bounds.clamp(raw)
}

/// Fill opacity, capped at 0.85
pub fn opacity(normalized_weight: f64, recent_ratio: f64, is_hot: bool) -> f64 {
    let hot_bonus = if is_hot { 0.1 } else { 0.0 };
    (BASE_OPACITY + normalized_weight * 0.3 + recent_ratio * 0.2 + hot_bonus).min(MAX_OPACITY)
}

/// Hex fill color for a tier
pub fn color(tier: RiskTier, is_hot: bool) -> &'static str {
    match (tier, is_hot) {
        (RiskTier::Critical, _) => "#dc2626",
        (RiskTier::High, true) => "#ef4444",
        (RiskTier::High, false) => "#f97316",
        (RiskTier::Medium, true) => "#f59e0b",
        (RiskTier::Medium, false) => "#eab308",
        (RiskTier::Low, _) => "#3b82f6",
    }
}

/// Hot flag: mostly recent activity in a cluster of at least three
pub fn is_hot(recent_ratio: f64, count: usize) -> bool {
    recent_ratio > HOT_RATIO && count >= HOT_MIN_COUNT
}

/// Inputs shared by every cluster of one computation
#[derive(Debug, Clone)]
pub struct ClassifyContext {
    pub now: DateTime<Utc>,
    pub recency_window_days: u32,
    /// Smallest cluster total weight in the result set
    pub min_weight: f64,
    /// Largest cluster total weight in the result set
    pub max_weight: f64,
    pub radius_bounds: RadiusBounds,
    pub risk_thresholds: RiskThresholds,
}

impl ClassifyContext {
    /// Scale a total weight into [0, 1]; 0 when every weight is equal
    pub fn normalize(&self, total_weight: f64) -> f64 {
        let range = self.max_weight - self.min_weight;
        if range > 0.0 {
            (total_weight - self.min_weight) / range
        } else {
            0.0
        }
    }
}

/// A classified hotspot, ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    /// Key of the originating grid cell
    pub id: String,
    pub center: Coordinates,
    pub incident_count: usize,
    pub total_weight: f64,
    pub avg_weight: f64,
    pub normalized_weight: f64,
    pub risk_tier: RiskTier,
    pub strategy: Strategy,
    /// Display radius in meters
    pub radius: f64,
    pub opacity: f64,
    pub color: String,
    pub is_hot: bool,
    pub recent_activity_ratio: f64,
    pub recent_incident_count: usize,
    /// Region of the first member incident
    pub region: Option<String>,
    /// Human-readable area name, filled in by an area namer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub incidents: Vec<Incident>,
}

/// Classify one merged cluster
pub fn classify(cluster: Cluster, ctx: &ClassifyContext) -> Hotspot {
    let count = cluster.len();
    let avg_weight = cluster.avg_weight();

    let window = f64::from(ctx.recency_window_days);
    let recent_incident_count = cluster
        .incidents
        .iter()
        .filter(|i| age_in_days(i.occurred_at, ctx.now) <= window)
        .count();
    let recent_activity_ratio = if count == 0 {
        0.0
    } else {
        recent_incident_count as f64 / count as f64
    };

    let hot = is_hot(recent_activity_ratio, count);
    let strategy = strategy_for(count, &ctx.risk_thresholds);
    let tier = risk_tier(strategy, avg_weight, hot);
    let normalized_weight = ctx.normalize(cluster.total_weight);

    let region = cluster
        .incidents
        .first()
        .and_then(|i| i.incident.region.clone());

    Hotspot {
        id: cluster.grid_key,
        center: cluster.centroid,
        incident_count: count,
        total_weight: cluster.total_weight,
        avg_weight,
        normalized_weight,
        risk_tier: tier,
        strategy,
        radius: display_radius(strategy, count, hot, &ctx.radius_bounds),
        opacity: opacity(normalized_weight, recent_activity_ratio, hot),
        color: color(tier, hot).to_string(),
        is_hot: hot,
        recent_activity_ratio,
        recent_incident_count,
        region,
        label: None,
        incidents: cluster.incidents.into_iter().map(|i| i.incident).collect(),
    }
}
