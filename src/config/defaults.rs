//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Grid cell edge in meters (0.001 degree of latitude)
pub const DEFAULT_GRID_SIZE_METERS: f64 = 111.32;

/// Minimum incidents for a cluster to be reported as a hotspot
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 2;

/// Default look-back window in days
pub const DEFAULT_DAYS_WINDOW: u32 = 30;

/// Window in days for the recent-activity ("hot") ratio
pub const DEFAULT_RECENCY_WINDOW_DAYS: u32 = 7;

/// Display radius envelope in meters
pub const DEFAULT_MIN_RADIUS: f64 = 12.0;
pub const DEFAULT_MAX_RADIUS: f64 = 280.0;

/// Lower incident-count bound of each strategy band
pub const DEFAULT_SMALL_CLUSTER_MIN: usize = 2;
pub const DEFAULT_MEDIUM_HOTSPOT_MIN: usize = 4;
pub const DEFAULT_LARGE_HOTSPOT_MIN: usize = 9;
pub const DEFAULT_MAJOR_AREA_MIN: usize = 16;

/// Merge radii in meters
pub const DEFAULT_MERGE_SINGLE: f64 = 100.0;
pub const DEFAULT_MERGE_SMALL: f64 = 200.0;
pub const DEFAULT_MERGE_SEVERE: f64 = 400.0;
pub const DEFAULT_MERGE_DENSE: f64 = 350.0;

/// Average weight above which a multi-incident seed uses the severe radius
pub const DEFAULT_SEVERE_AVG_WEIGHT: f64 = 0.8;

/// Default output format
pub const DEFAULT_FORMAT: &str = "json";

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7878;

/// Seconds a memoized hotspot report stays valid on the server
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Default URL provider
pub const DEFAULT_URL_PROVIDER: &str = "google";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "hotspot-engine";
