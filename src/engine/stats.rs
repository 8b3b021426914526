//! Summary statistics over a hotspot list

use crate::engine::classify::{Hotspot, RiskTier, Strategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts and averages for a set of hotspots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotspotStats {
    pub total: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
    pub hot: usize,
    pub total_incidents: usize,
    /// Mean incidents per hotspot, rounded to one decimal
    pub average_incidents_per_hotspot: f64,
}

impl HotspotStats {
    pub fn from_hotspots(hotspots: &[Hotspot]) -> Self {
        if hotspots.is_empty() {
            return Self::default();
        }

        let count_tier = |tier: RiskTier| hotspots.iter().filter(|h| h.risk_tier == tier).count();
        let total_incidents: usize = hotspots.iter().map(|h| h.incident_count).sum();
        let average = total_incidents as f64 / hotspots.len() as f64;

        Self {
            total: hotspots.len(),
            low: count_tier(RiskTier::Low),
            medium: count_tier(RiskTier::Medium),
            high: count_tier(RiskTier::High),
            critical: count_tier(RiskTier::Critical),
            hot: hotspots.iter().filter(|h| h.is_hot).count(),
            total_incidents,
            average_incidents_per_hotspot: (average * 10.0).round() / 10.0,
        }
    }

    /// Count for a single tier
    pub fn tier_count(&self, tier: RiskTier) -> usize {
        match tier {
            RiskTier::Low => self.low,
            RiskTier::Medium => self.medium,
            RiskTier::High => self.high,
            RiskTier::Critical => self.critical,
        }
    }
}

/// The top hotspot of an already sorted list
pub fn most_dangerous(hotspots: &[Hotspot]) -> Option<&Hotspot> {
    hotspots.first()
}

/// Hotspots of exactly `tier`, order preserved
pub fn filter_by_tier(hotspots: &[Hotspot], tier: RiskTier) -> Vec<&Hotspot> {
    hotspots.iter().filter(|h| h.risk_tier == tier).collect()
}

/// Number of hotspots per visual strategy
pub fn strategy_breakdown(hotspots: &[Hotspot]) -> BTreeMap<Strategy, usize> {
    let mut breakdown = BTreeMap::new();
    for hotspot in hotspots {
        *breakdown.entry(hotspot.strategy).or_insert(0) += 1;
    }
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinates;

    fn hotspot(id: &str, count: usize, tier: RiskTier, strategy: Strategy, hot: bool) -> Hotspot {
        Hotspot {
            id: id.to_string(),
            center: Coordinates::new(14.86, 120.80),
            incident_count: count,
            total_weight: count as f64 * 0.5,
            avg_weight: 0.5,
            normalized_weight: 0.0,
            risk_tier: tier,
            strategy,
            radius: 50.0,
            opacity: 0.5,
            color: "#3b82f6".to_string(),
            is_hot: hot,
            recent_activity_ratio: 0.0,
            recent_incident_count: 0,
            region: None,
            label: None,
            incidents: Vec::new(),
        }
    }

    fn sample() -> Vec<Hotspot> {
        vec![
            hotspot("a", 16, RiskTier::Critical, Strategy::MajorArea, true),
            hotspot("b", 5, RiskTier::High, Strategy::MediumHotspot, true),
            hotspot("c", 3, RiskTier::Medium, Strategy::SmallCluster, false),
            hotspot("d", 2, RiskTier::Low, Strategy::SmallCluster, false),
        ]
    }

    #[test]
    fn test_stats() {
        let stats = HotspotStats::from_hotspots(&sample());

        assert_eq!(stats.total, 4);
        assert_eq!(stats.critical, 1);
        assert_eq!(stats.high, 1);
        assert_eq!(stats.medium, 1);
        assert_eq!(stats.low, 1);
        assert_eq!(stats.hot, 2);
        assert_eq!(stats.total_incidents, 26);
        assert_eq!(stats.average_incidents_per_hotspot, 6.5);
        assert_eq!(stats.tier_count(RiskTier::Critical), 1);
    }

    #[test]
    fn test_stats_rounding() {
        let hotspots = vec![
            hotspot("a", 2, RiskTier::Low, Strategy::SmallCluster, false),
            hotspot("b", 2, RiskTier::Low, Strategy::SmallCluster, false),
            hotspot("c", 3, RiskTier::Low, Strategy::SmallCluster, false),
        ];
        assert_eq!(HotspotStats::from_hotspots(&hotspots).average_incidents_per_hotspot, 2.3);
    }

    #[test]
    fn test_stats_empty() {
        assert_eq!(HotspotStats::from_hotspots(&[]), HotspotStats::default());
    }

    #[test]
    fn test_most_dangerous() {
        let hotspots = sample();
        assert_eq!(most_dangerous(&hotspots).map(|h| h.id.as_str()), Some("a"));
        assert!(most_dangerous(&[]).is_none());
    }

    #[test]
    fn test_filter_by_tier() {
        let hotspots = sample();
        let high = filter_by_tier(&hotspots, RiskTier::High);
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].id, "b");
        assert!(filter_by_tier(&hotspots[2..], RiskTier::Critical).is_empty());
    }

    #[test]
    fn test_strategy_breakdown() {
        let breakdown = strategy_breakdown(&sample());
        assert_eq!(breakdown.get(&Strategy::SmallCluster), Some(&2));
        assert_eq!(breakdown.get(&Strategy::MajorArea), Some(&1));
        assert_eq!(breakdown.get(&Strategy::Individual), None);
    }
}
