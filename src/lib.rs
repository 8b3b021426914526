//! hotspot-engine: Incident hotspot and density clustering
//!
//! A library and CLI tool that turns a snapshot of geotagged incident reports
//! into ranked, risk-classified hotspots for map display.
//!
//! ## Features
//!
//! - Verification, location, sensitivity, time-window and region screening
//! - Severity and recency weighting
//! - Grid bucketing with adaptive, non-chaining neighbor merging
//! - Risk tiers, display radius, opacity and color per hotspot
//! - JSON, GeoJSON, text and map-link output
//! - HTTP API with memoized reports + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use hotspot_engine::{Coordinates, HotspotEngine, HotspotQuery, Incident};
//! use chrono::{Duration, Utc};
//!
//! let now = Utc::now();
//! let incidents = vec![
//!     Incident::new("a", Coordinates::new(14.8610, 120.8065), "Robbery", now - Duration::hours(2)),
//!     Incident::new("b", Coordinates::new(14.8611, 120.8066), "Robbery", now - Duration::days(3)),
//! ];
//!
//! let engine = HotspotEngine::new(Default::default()).unwrap();
//! let hotspots = engine.calculate_hotspots_at(&incidents, &HotspotQuery::new(), now);
//!
//! assert_eq!(hotspots.len(), 1);
//! assert_eq!(hotspots[0].incident_count, 2);
//! println!("{} at {:?}", hotspots[0].risk_tier, hotspots[0].center);
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod engine;
pub mod error;
pub mod format;
pub mod geo;
pub mod incident;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use coord::Coordinates;
pub use engine::{Hotspot, HotspotEngine, HotspotQuery, HotspotReport, RiskTier};
pub use error::{Error, Result};
pub use incident::Incident;
