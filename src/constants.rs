//! Centralized constants for the hotspot-engine crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in meters (spherical approximation)
    pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

    /// Meters per degree of latitude (approximate, varies slightly with latitude)
    pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;
}

/// Time constants
pub mod time {
    /// Seconds in one day
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
}

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// Minimum spacing between Nominatim requests, in milliseconds
    pub const NOMINATIM_MIN_INTERVAL_MS: u64 = 1000;
}

/// Cache settings
pub mod cache {
    /// Decimal places kept when keying area labels by coordinates (~110 m)
    pub const LABEL_COORD_PRECISION: i32 = 3;

    /// Maximum memoized hotspot reports kept by the server
    pub const MAX_CACHED_REPORTS: usize = 64;
}
