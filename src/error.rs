//! Error types for hotspot-engine

use thiserror::Error;

/// Main error type for hotspot-engine operations
///
/// Per-incident data problems are never reported through this type; the
/// filter counts them instead (see [`crate::engine::filter::FilterStats`]).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Geo error: {0}")]
    Geo(String),
}

/// Result type alias for hotspot-engine operations
pub type Result<T> = std::result::Result<T, Error>;
