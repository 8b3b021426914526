//! Memoized hotspot reports
//!
//! Reports are keyed by query and a SHA-256 fingerprint of the incident
//! snapshot, so a repeated request over unchanged data skips the pipeline.

use crate::engine::{HotspotQuery, HotspotReport};
use crate::error::Result;
use crate::incident::Incident;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// Hex SHA-256 of the snapshot's canonical JSON
pub fn fingerprint(incidents: &[Incident]) -> Result<String> {
    let canonical = serde_json::to_vec(incidents)?;
    Ok(hex::encode(Sha256::digest(&canonical)))
}

/// Identity of a computation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub region: Option<String>,
    pub days_window: u32,
    pub fingerprint: String,
}

impl CacheKey {
    /// Key for `query` over `incidents`, resolving the window against `default_days`
    pub fn new(query: &HotspotQuery, default_days: u32, incidents: &[Incident]) -> Result<Self> {
        Ok(Self {
            region: query.region_filter().map(str::to_string),
            days_window: query.days_window.unwrap_or(default_days),
            fingerprint: fingerprint(incidents)?,
        })
    }
}

struct Entry {
    report: HotspotReport,
    stored_at: Instant,
}

/// Bounded, time-limited report cache
///
/// Entries older than `ttl` are never returned; a zero `ttl` disables hits.
/// Beyond `capacity` the oldest entry is evicted first.
pub struct HotspotCache {
    ttl: Duration,
    capacity: usize,
    entries: HashMap<CacheKey, Entry>,
    order: VecDeque<CacheKey>,
}

impl HotspotCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Fresh report for `key`, if any
    pub fn get(&self, key: &CacheKey) -> Option<&HotspotReport> {
        self.entries
            .get(key)
            .filter(|e| e.stored_at.elapsed() < self.ttl)
            .map(|e| &e.report)
    }

    /// Store a report, replacing any previous one for the same key
    pub fn insert(&mut self, key: CacheKey, report: HotspotReport) {
        self.purge_expired();

        if self.entries.remove(&key).is_some() {
            self.order.retain(|k| k != &key);
        }
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            tracing::debug!(fingerprint = %oldest.fingerprint, "Evicted cached report");
        }

        self.order.push_back(key.clone());
        self.entries.insert(
            key,
            Entry {
                report,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop every entry past its TTL
    pub fn purge_expired(&mut self) {
        let ttl = self.ttl;
        self.entries.retain(|_, e| e.stored_at.elapsed() < ttl);
        let entries = &self.entries;
        self.order.retain(|k| entries.contains_key(k));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinates;
    use crate::engine::FilterStats;
    use chrono::{TimeZone, Utc};

    fn incidents() -> Vec<Incident> {
        let at = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        vec![
            Incident::new("a", Coordinates::new(14.8610, 120.8065), "Robbery", at),
            Incident::new("b", Coordinates::new(14.8611, 120.8066), "Theft", at),
        ]
    }

    fn report(days_window: u32) -> HotspotReport {
        HotspotReport {
            generated_at: Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap(),
            region: None,
            days_window,
            filter_stats: FilterStats::default(),
            unreadable: 0,
            cell_count: 0,
            cluster_count: 0,
            hotspots: Vec::new(),
        }
    }

    fn key(days: u32) -> CacheKey {
        CacheKey {
            region: None,
            days_window: days,
            fingerprint: "abc".to_string(),
        }
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = fingerprint(&incidents()).unwrap();
        let b = fingerprint(&incidents()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        let mut changed = incidents();
        changed[1].incident_type = "Fraud".to_string();
        assert_ne!(a, fingerprint(&changed).unwrap());
    }

    #[test]
    fn test_key_resolves_default_window() {
        let query = HotspotQuery::new().with_region("Poblacion");
        let key = CacheKey::new(&query, 30, &incidents()).unwrap();
        assert_eq!(key.days_window, 30);
        assert_eq!(key.region.as_deref(), Some("Poblacion"));

        let explicit = CacheKey::new(&HotspotQuery::new().with_days_window(30), 30, &incidents()).unwrap();
        assert_eq!(explicit.days_window, key.days_window);
        assert_ne!(explicit, key);
    }

    #[test]
    fn test_hit_and_miss() {
        let mut cache = HotspotCache::new(Duration::from_secs(300), 4);
        assert!(cache.get(&key(30)).is_none());

        cache.insert(key(30), report(30));
        assert_eq!(cache.get(&key(30)).map(|r| r.days_window), Some(30));
        assert!(cache.get(&key(7)).is_none());
    }

    #[test]
    fn test_zero_ttl_never_hits() {
        let mut cache = HotspotCache::new(Duration::ZERO, 4);
        cache.insert(key(30), report(30));
        assert!(cache.get(&key(30)).is_none());
    }

    #[test]
    fn test_evicts_oldest() {
        let mut cache = HotspotCache::new(Duration::from_secs(300), 2);
        cache.insert(key(1), report(1));
        cache.insert(key(2), report(2));
        cache.insert(key(3), report(3));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key(1)).is_none());
        assert!(cache.get(&key(2)).is_some());
        assert!(cache.get(&key(3)).is_some());
    }

    #[test]
    fn test_reinsert_refreshes_position() {
        let mut cache = HotspotCache::new(Duration::from_secs(300), 2);
        cache.insert(key(1), report(1));
        cache.insert(key(2), report(2));
        cache.insert(key(1), report(1));
        assert_eq!(cache.len(), 2);
        cache.insert(key(3), report(3));

        assert!(cache.get(&key(1)).is_some());
        assert!(cache.get(&key(2)).is_none());

        cache.clear();
        assert!(cache.is_empty());
    }
}
