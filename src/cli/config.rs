//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::Result;
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "engine.min_cluster_size")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    // Show path
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    // Reset config
    if args.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        // No arguments: show all config
        (None, None) => {
            show_all_config(&config);
        }

        // Key only: show that value
        (Some(key), None) => {
            if let Some(value) = config.get(key) {
                println!("{}", value);
            } else {
                eprintln!("Unknown config key: {}", key);
                eprintln!("\nAvailable keys:");
                for k in Config::available_keys() {
                    eprintln!("  {}", k);
                }
                std::process::exit(1);
            }
        }

        // Key and value: set the value
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        // Value without key: not valid
        (None, Some(_)) => {
            eprintln!("Error: Must specify a key to set a value");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Display all configuration values
fn show_all_config(config: &Config) {
    let engine = &config.engine;
    println!("[engine]");
    println!("grid_size_meters = {}", engine.grid_size_meters);
    println!("min_cluster_size = {}", engine.min_cluster_size);
    println!("days_window = {}", engine.days_window);
    println!("recency_window_days = {}", engine.recency_window_days);
    println!();

    println!("[engine.radius_bounds]");
    println!("min = {}", engine.radius_bounds.min);
    println!("max = {}", engine.radius_bounds.max);
    println!();

    let thresholds = &engine.risk_thresholds;
    println!("[engine.risk_thresholds]");
    println!("small_cluster = {}", thresholds.small_cluster);
    println!("medium_hotspot = {}", thresholds.medium_hotspot);
    println!("large_hotspot = {}", thresholds.large_hotspot);
    println!("major_area = {}", thresholds.major_area);
    println!();

    let radii = &engine.merge_radii;
    println!("[engine.merge_radii]");
    println!("single = {}", radii.single);
    println!("small = {}", radii.small);
    println!("severe = {}", radii.severe);
    println!("dense = {}", radii.dense);
    println!("severe_avg_weight = {}", radii.severe_avg_weight);
    println!();

    println!("[defaults]");
    println!("format = \"{}\"", config.defaults.format);
    println!("label = {}", config.defaults.label);
    println!();

    println!("[server]");
    println!("host = \"{}\"", config.server.host);
    println!("port = {}", config.server.port);
    println!("cache_ttl_secs = {}", config.server.cache_ttl_secs);
    println!();

    println!("[url]");
    println!("default = \"{}\"", config.url.default);
    println!();

    println!("[url.providers]");
    let mut providers: Vec<_> = config.url.providers.iter().collect();
    providers.sort();
    for (name, template) in providers {
        println!("{} = \"{}\"", name, template);
    }
}
