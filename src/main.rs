//! hotspot-engine CLI entry point
//!
//! Incident hotspot detection - CLI + HTTP API

use hotspot_engine::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
