//! Server shared state
//!
//! Holds configuration, the validated engine and the report cache.

use crate::cache::HotspotCache;
use crate::config::Config;
use crate::constants::cache::MAX_CACHED_REPORTS;
use crate::engine::HotspotEngine;
use crate::error::Result;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Shared state for the HTTP server
pub struct AppState {
    pub config: Config,

    engine: HotspotEngine,

    /// Memoized reports, keyed by query and snapshot fingerprint
    pub cache: RwLock<HotspotCache>,

    started_at: Instant,
}

impl AppState {
    /// Create application state, validating the engine settings
    pub fn new(config: Config) -> Result<Self> {
        let engine = HotspotEngine::new(config.engine.clone())?;
        let cache = HotspotCache::new(
            Duration::from_secs(config.server.cache_ttl_secs),
            MAX_CACHED_REPORTS,
        );

        Ok(Self {
            config,
            engine,
            cache: RwLock::new(cache),
            started_at: Instant::now(),
        })
    }

    pub fn engine(&self) -> &HotspotEngine {
        &self.engine
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
