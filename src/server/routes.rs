//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::cache::CacheKey;
use crate::config::EngineConfig;
use crate::engine::weight::{severity_table, SeverityInfo, DEFAULT_SEVERITY};
use crate::engine::{HotspotQuery, HotspotReport, RiskTier};
use crate::error::Error;
use crate::format::{available_formats, FormatInfo};
use crate::incident::Snapshot;
use crate::server::state::AppState;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/hotspots", post(hotspots_handler))
        .route("/api/status", get(status_handler))
        .route("/api/incident-types", get(incident_types_handler))
        .route("/api/formats", get(formats_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Hotspot request body
#[derive(Debug, Deserialize)]
pub struct HotspotsRequest {
    /// Raw incident records; unreadable entries are skipped
    pub incidents: Vec<serde_json::Value>,
    /// Exact region filter
    #[serde(default)]
    pub region: Option<String>,
    /// Look-back window in days (engine default when absent)
    #[serde(default)]
    pub days_window: Option<u32>,
    /// Only return hotspots of this tier
    #[serde(default)]
    pub tier: Option<String>,
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn new(code: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::Input(_) => "INVALID_INPUT",
            Error::Json(_) => "INVALID_JSON",
            Error::Config(_) => "CONFIG_ERROR",
            _ => "INTERNAL_ERROR",
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new("INVALID_JSON", rejection.body_text())
    }
}

/// Compute hotspots
///
/// POST /api/hotspots
async fn hotspots_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<HotspotsRequest>, JsonRejection>,
) -> Result<Json<HotspotReport>, ApiError> {
    let Json(req) = body?;

    if req.days_window == Some(0) {
        return Err(ApiError::new("INVALID_INPUT", "days_window must be at least 1"));
    }
    let tier = req
        .tier
        .as_deref()
        .map(RiskTier::from_str)
        .transpose()
        .map_err(|e| ApiError::new("INVALID_INPUT", e))?;

    let snapshot = Snapshot::from_values(req.incidents);
    let query = HotspotQuery {
        region: req.region,
        days_window: req.days_window,
    };

    let engine = state.engine();
    let key = CacheKey::new(&query, engine.config().days_window, &snapshot.incidents)?;

    let cached = state.cache.read().await.get(&key).cloned();
    let mut report = match cached {
        Some(report) => {
            debug!(fingerprint = %key.fingerprint, "Serving cached hotspot report");
            report
        }
        None => {
            let report = engine.report(&snapshot.incidents, &query);
            state.cache.write().await.insert(key, report.clone());
            report
        }
    };
    report.unreadable = snapshot.rejected;

    if let Some(tier) = tier {
        report.retain_tier(tier);
    }

    Ok(Json(report))
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    pub version: String,
    /// Active engine settings
    pub engine: EngineConfig,
    pub cached_reports: usize,
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: state.engine().config().clone(),
        cached_reports: state.cache.read().await.len(),
        uptime_secs: state.uptime_secs(),
    })
}

/// Incident types response
#[derive(Debug, Serialize, Deserialize)]
pub struct IncidentTypesResponse {
    pub types: Vec<SeverityInfo>,
    /// Severity of any type not listed
    pub default_severity: f64,
}

/// List known incident types and their severity
///
/// GET /api/incident-types
async fn incident_types_handler() -> Json<IncidentTypesResponse> {
    Json(IncidentTypesResponse {
        types: severity_table(),
        default_severity: DEFAULT_SEVERITY,
    })
}

/// Formats list response
#[derive(Debug, Serialize, Deserialize)]
pub struct FormatsResponse {
    pub formats: Vec<FormatInfo>,
}

/// List available output formats
///
/// GET /api/formats
async fn formats_handler() -> Json<FormatsResponse> {
    Json(FormatsResponse {
        formats: available_formats(),
    })
}
