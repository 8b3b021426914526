//! Nominatim reverse geocoding (OpenStreetMap)
//!
//! Nominatim's usage policy asks for an identifying User-Agent and at most
//! one request per second. The backend spaces its own requests; wrap it in a
//! cache so repeat lookups never reach the network.

use crate::constants::api::{NOMINATIM_MIN_INTERVAL_MS, NOMINATIM_URL};
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::{AreaNamer, GeoLocation};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const USER_AGENT: &str = concat!("hotspot-engine/", env!("CARGO_PKG_VERSION"));

/// Zoom level of reverse lookups (16 = major streets and neighborhoods)
const REVERSE_ZOOM: u8 = 16;

/// Nominatim geocoding backend
#[derive(Debug, Clone)]
pub struct NominatimBackend {
    client: reqwest::Client,
    base_url: String,
    min_interval: Duration,
    /// When the previous request was sent; shared by clones
    last_request: Arc<Mutex<Option<Instant>>>,
}

#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default)]
    address: NominatimAddress,
}

/// Address parts, most local first
#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    neighbourhood: Option<String>,
    quarter: Option<String>,
    suburb: Option<String>,
    village: Option<String>,
    city_district: Option<String>,
    town: Option<String>,
    city: Option<String>,
}

impl NominatimAddress {
    fn area(self) -> Option<String> {
        self.neighbourhood
            .or(self.quarter)
            .or(self.suburb)
            .or(self.village)
            .or(self.city_district)
            .or(self.town)
            .or(self.city)
    }
}

impl NominatimBackend {
    /// Create a backend for the public Nominatim instance
    pub fn new() -> Result<Self> {
        Self::with_base_url(NOMINATIM_URL)
    }

    /// Create a backend for a self-hosted Nominatim instance
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            min_interval: Duration::from_millis(NOMINATIM_MIN_INTERVAL_MS),
            last_request: Arc::new(Mutex::new(None)),
        })
    }

    /// Override the spacing between requests
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Wait until `min_interval` has passed since the previous request
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            tokio::time::sleep_until(prev + self.min_interval).await;
        }
        *last = Some(Instant::now());
    }

    fn parse_coords(lat: &str, lng: &str) -> Result<(f64, f64)> {
        let lat: f64 = lat
            .parse()
            .map_err(|_| Error::Geo(format!("Invalid latitude: {}", lat)))?;
        let lng: f64 = lng
            .parse()
            .map_err(|_| Error::Geo(format!("Invalid longitude: {}", lng)))?;
        Ok((lat, lng))
    }

    fn reverse_url(&self, lat: f64, lng: f64) -> String {
        format!(
            "{}/reverse?lat={}&lon={}&zoom={}&addressdetails=1&format=json",
            self.base_url, lat, lng, REVERSE_ZOOM
        )
    }

    /// Reverse geocode a point
    pub async fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<Option<GeoLocation>> {
        self.throttle().await;

        let response = self
            .client
            .get(self.reverse_url(lat, lng))
            .send()
            .await
            .map_err(|e| Error::Geo(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Ok(None);
            }
            return Err(Error::Geo(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Geo(format!("Failed to parse Nominatim response: {}", e)))?;

        Self::parse_reverse(body)
    }

    /// Nominatim answers unknown points with `{"error": ...}` and status 200
    fn parse_reverse(body: serde_json::Value) -> Result<Option<GeoLocation>> {
        if body.get("error").is_some() {
            return Ok(None);
        }

        let result: NominatimResult = serde_json::from_value(body)
            .map_err(|e| Error::Geo(format!("Failed to parse Nominatim response: {}", e)))?;
        let (lat, lng) = Self::parse_coords(&result.lat, &result.lon)?;

        Ok(Some(GeoLocation {
            lat,
            lng,
            display_name: result.display_name,
            area: result.address.area(),
        }))
    }
}

impl AreaNamer for NominatimBackend {
    async fn area_name(&self, center: Coordinates) -> Result<Option<String>> {
        Ok(self
            .reverse_geocode(center.lat, center.lng)
            .await?
            .and_then(|loc| loc.short_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_coords() {
        let (lat, lng) = NominatimBackend::parse_coords("14.8615", "120.8065").unwrap();
        assert!((lat - 14.8615).abs() < 0.0001);
        assert!((lng - 120.8065).abs() < 0.0001);
    }

    #[test]
    fn test_parse_coords_invalid() {
        assert!(NominatimBackend::parse_coords("invalid", "0").is_err());
        assert!(NominatimBackend::parse_coords("0", "invalid").is_err());
    }

    #[test]
    fn test_parse_reverse_picks_local_area() {
        let body = json!({
            "lat": "14.8615",
            "lon": "120.8065",
            "display_name": "Rizal Street, Santo Rosario, Malolos, Bulacan",
            "address": { "suburb": "Santo Rosario", "city": "Malolos" }
        });

        let loc = NominatimBackend::parse_reverse(body).unwrap().unwrap();
        assert_eq!(loc.area.as_deref(), Some("Santo Rosario"));
        assert_eq!(loc.short_name().as_deref(), Some("Santo Rosario"));
    }

    #[test]
    fn test_parse_reverse_unable_to_geocode() {
        let body = json!({ "error": "Unable to geocode" });
        assert!(NominatimBackend::parse_reverse(body).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_requests_are_spaced() {
        let backend = NominatimBackend::with_base_url("http://localhost:8080")
            .unwrap()
            .with_min_interval(Duration::from_millis(40));

        let start = Instant::now();
        backend.throttle().await;
        assert!(start.elapsed() < Duration::from_millis(40));

        backend.clone().throttle().await;
        backend.throttle().await;
        assert!(start.elapsed() >= Duration::from_millis(80));
    }

    #[test]
    fn test_reverse_url() {
        let backend = NominatimBackend::with_base_url("http://localhost:8080/").unwrap();
        assert_eq!(
            backend.reverse_url(14.8615, 120.8065),
            "http://localhost:8080/reverse?lat=14.8615&lon=120.8065&zoom=16&addressdetails=1&format=json"
        );
    }
}
