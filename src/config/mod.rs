//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/hotspot-engine/config.toml

pub mod defaults;
pub mod engine;

use crate::error::{Error, Result};
use defaults::*;
pub use engine::{EngineConfig, MergeRadii, RadiusBounds, RiskThresholds};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Clustering and classification parameters
    #[serde(default)]
    pub engine: EngineConfig,

    /// Default values for the CLI
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// URL generation settings
    #[serde(default)]
    pub url: UrlConfig,
}

/// Default values for the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default output format
    #[serde(default = "default_format")]
    pub format: String,

    /// Label hotspots through reverse geocoding by default
    #[serde(default)]
    pub label: bool,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// How long a memoized report is served before recomputing
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

/// URL generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlConfig {
    /// Default URL provider
    #[serde(default = "default_url_provider")]
    pub default: String,

    /// URL provider templates
    #[serde(default = "default_url_providers")]
    pub providers: HashMap<String, String>,
}

// Default value functions for serde
fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_cache_ttl() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}
fn default_url_provider() -> String {
    DEFAULT_URL_PROVIDER.to_string()
}
fn default_url_providers() -> HashMap<String, String> {
    let mut providers = HashMap::new();
    providers.insert(
        "google".to_string(),
        "https://www.google.com/maps/@{lat},{lng},17z".to_string(),
    );
    providers.insert(
        "openstreetmap".to_string(),
        "https://www.openstreetmap.org/#map=18/{lat}/{lng}".to_string(),
    );
    providers.insert(
        "apple".to_string(),
        "https://maps.apple.com/?ll={lat},{lng}".to_string(),
    );
    providers
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            defaults: DefaultsConfig::default(),
            server: ServerConfig::default(),
            url: UrlConfig::default(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            label: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            default: default_url_provider(),
            providers: default_url_providers(),
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific path, creating it if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

            toml::from_str::<Config>(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?
        } else {
            let config = Config::default();
            config.save_to(path)?;
            config
        };

        config.engine.validate()?;
        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key" (or "engine.group.key" for nested tables)
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();
        let engine = &self.engine;

        match parts.as_slice() {
            ["engine", "grid_size_meters"] => Some(engine.grid_size_meters.to_string()),
            ["engine", "min_cluster_size"] => Some(engine.min_cluster_size.to_string()),
            ["engine", "days_window"] => Some(engine.days_window.to_string()),
            ["engine", "recency_window_days"] => Some(engine.recency_window_days.to_string()),
            ["engine", "radius_bounds", "min"] => Some(engine.radius_bounds.min.to_string()),
            ["engine", "radius_bounds", "max"] => Some(engine.radius_bounds.max.to_string()),
            ["engine", "risk_thresholds", "small_cluster"] => {
                Some(engine.risk_thresholds.small_cluster.to_string())
            }
            ["engine", "risk_thresholds", "medium_hotspot"] => {
                Some(engine.risk_thresholds.medium_hotspot.to_string())
            }
            ["engine", "risk_thresholds", "large_hotspot"] => {
                Some(engine.risk_thresholds.large_hotspot.to_string())
            }
            ["engine", "risk_thresholds", "major_area"] => {
                Some(engine.risk_thresholds.major_area.to_string())
            }
            ["engine", "merge_radii", "single"] => Some(engine.merge_radii.single.to_string()),
            ["engine", "merge_radii", "small"] => Some(engine.merge_radii.small.to_string()),
            ["engine", "merge_radii", "severe"] => Some(engine.merge_radii.severe.to_string()),
            ["engine", "merge_radii", "dense"] => Some(engine.merge_radii.dense.to_string()),
            ["engine", "merge_radii", "severe_avg_weight"] => {
                Some(engine.merge_radii.severe_avg_weight.to_string())
            }

            ["defaults", "format"] => Some(self.defaults.format.clone()),
            ["defaults", "label"] => Some(self.defaults.label.to_string()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),
            ["server", "cache_ttl_secs"] => Some(self.server.cache_ttl_secs.to_string()),

            ["url", "default"] => Some(self.url.default.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Engine values are validated after the change; an invalid engine
    /// setting leaves the config untouched.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();
        let mut engine = self.engine.clone();

        match parts.as_slice() {
            ["engine", "grid_size_meters"] => engine.grid_size_meters = parse_value(key, value)?,
            ["engine", "min_cluster_size"] => engine.min_cluster_size = parse_value(key, value)?,
            ["engine", "days_window"] => engine.days_window = parse_value(key, value)?,
            ["engine", "recency_window_days"] => {
                engine.recency_window_days = parse_value(key, value)?
            }
            ["engine", "radius_bounds", "min"] => engine.radius_bounds.min = parse_value(key, value)?,
            ["engine", "radius_bounds", "max"] => engine.radius_bounds.max = parse_value(key, value)?,
            ["engine", "risk_thresholds", "small_cluster"] => {
                engine.risk_thresholds.small_cluster = parse_value(key, value)?
            }
            ["engine", "risk_thresholds", "medium_hotspot"] => {
                engine.risk_thresholds.medium_hotspot = parse_value(key, value)?
            }
            ["engine", "risk_thresholds", "large_hotspot"] => {
                engine.risk_thresholds.large_hotspot = parse_value(key, value)?
            }
            ["engine", "risk_thresholds", "major_area"] => {
                engine.risk_thresholds.major_area = parse_value(key, value)?
            }
            ["engine", "merge_radii", "single"] => engine.merge_radii.single = parse_value(key, value)?,
            ["engine", "merge_radii", "small"] => engine.merge_radii.small = parse_value(key, value)?,
            ["engine", "merge_radii", "severe"] => engine.merge_radii.severe = parse_value(key, value)?,
            ["engine", "merge_radii", "dense"] => engine.merge_radii.dense = parse_value(key, value)?,
            ["engine", "merge_radii", "severe_avg_weight"] => {
                engine.merge_radii.severe_avg_weight = parse_value(key, value)?
            }

            ["defaults", "format"] => {
                self.defaults.format = value.to_string();
                return Ok(());
            }
            ["defaults", "label"] => {
                self.defaults.label = parse_value(key, value)?;
                return Ok(());
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
                return Ok(());
            }
            ["server", "port"] => {
                self.server.port = parse_value(key, value)?;
                return Ok(());
            }
            ["server", "cache_ttl_secs"] => {
                self.server.cache_ttl_secs = parse_value(key, value)?;
                return Ok(());
            }

            ["url", "default"] => {
                self.url.default = value.to_string();
                return Ok(());
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        engine.validate()?;
        self.engine = engine;
        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "engine.grid_size_meters",
            "engine.min_cluster_size",
            "engine.days_window",
            "engine.recency_window_days",
            "engine.radius_bounds.min",
            "engine.radius_bounds.max",
            "engine.risk_thresholds.small_cluster",
            "engine.risk_thresholds.medium_hotspot",
            "engine.risk_thresholds.large_hotspot",
            "engine.risk_thresholds.major_area",
            "engine.merge_radii.single",
            "engine.merge_radii.small",
            "engine.merge_radii.severe",
            "engine.merge_radii.dense",
            "engine.merge_radii.severe_avg_weight",
            "defaults.format",
            "defaults.label",
            "server.host",
            "server.port",
            "server.cache_ttl_secs",
            "url.default",
        ]
    }

    /// Format a URL using the specified provider
    ///
    /// Replaces {lat} and {lng} placeholders with actual values
    pub fn format_url(&self, provider: Option<&str>, lat: f64, lng: f64) -> Result<String> {
        let provider_name = provider.unwrap_or(&self.url.default);

        let template = self.url.providers.get(provider_name).ok_or_else(|| {
            Error::Config(format!("Unknown URL provider: {}", provider_name))
        })?;

        Ok(template
            .replace("{lat}", &lat.to_string())
            .replace("{lng}", &lng.to_string()))
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
