//! Area naming for hotspots
//!
//! The engine never names places. Callers that want human-readable labels
//! pass finished hotspots through [`labels::label_hotspots`] with an
//! [`AreaNamer`], usually a [`labels::CachedAreaNamer`] around Nominatim.

pub mod labels;
pub mod nominatim;

pub use labels::{label_hotspots, CachedAreaNamer};

use crate::coord::Coordinates;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A reverse-geocoded place
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lng: f64,
    /// Full address as returned by the geocoder
    pub display_name: String,
    /// Neighborhood-level name, when the geocoder knows one
    #[serde(default)]
    pub area: Option<String>,
}

impl GeoLocation {
    /// Best short label: the area, else the first part of the address
    pub fn short_name(&self) -> Option<String> {
        self.area.clone().or_else(|| {
            self.display_name
                .split(',')
                .map(str::trim)
                .find(|part| !part.is_empty())
                .map(str::to_string)
        })
    }
}

/// Anything that can name the area around a point
pub trait AreaNamer: Send + Sync {
    /// Name for the area at `center`, or None if the point is unnamed
    fn area_name(
        &self,
        center: Coordinates,
    ) -> impl std::future::Future<Output = Result<Option<String>>> + Send;
}

/// Default labeler: Nominatim behind a coordinate-keyed cache
pub fn default_namer() -> Result<CachedAreaNamer<nominatim::NominatimBackend>> {
    Ok(CachedAreaNamer::new(nominatim::NominatimBackend::new()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(display_name: &str, area: Option<&str>) -> GeoLocation {
        GeoLocation {
            lat: 14.8615,
            lng: 120.8065,
            display_name: display_name.to_string(),
            area: area.map(str::to_string),
        }
    }

    #[test]
    fn test_short_name_prefers_area() {
        let loc = location("Rizal Street, Poblacion, Malolos, Bulacan", Some("Poblacion"));
        assert_eq!(loc.short_name().as_deref(), Some("Poblacion"));
    }

    #[test]
    fn test_short_name_falls_back_to_address() {
        let loc = location("Rizal Street, Poblacion, Malolos", None);
        assert_eq!(loc.short_name().as_deref(), Some("Rizal Street"));
        assert!(location("", None).short_name().is_none());
    }

    #[test]
    fn test_geo_location_serialization() {
        let json = serde_json::to_string(&location("Malolos", None)).unwrap();
        let parsed: GeoLocation = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.lat, 14.8615);
        assert_eq!(parsed.display_name, "Malolos");
    }
}
