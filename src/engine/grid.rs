//! Grid-based spatial bucketing
//!
//! Buckets weighted incidents into fixed-size lat/lng cells and keeps an
//! integer-coordinate index so neighbors can be found by offset instead of
//! scanning every pair.

use crate::constants::geo::METERS_PER_DEGREE_LAT;
use crate::coord::distance::meters_per_degree_lng;
use crate::coord::Coordinates;
use crate::engine::weight::WeightedIncident;
use std::collections::HashMap;

/// Integer grid coordinates of a cell (`x` along longitude, `y` along latitude)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoord {
    pub x: i64,
    pub y: i64,
}

impl GridCoord {
    /// Cell containing a point for the given cell size in degrees
    pub fn of(point: Coordinates, grid_size_degrees: f64) -> Self {
        Self {
            x: (point.lng / grid_size_degrees).floor() as i64,
            y: (point.lat / grid_size_degrees).floor() as i64,
        }
    }

    /// Coordinate shifted by whole cells
    pub fn offset(&self, dx: i64, dy: i64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// A bucket of incidents sharing one grid cell
#[derive(Debug, Clone)]
pub struct GridCell {
    /// Integer grid coordinates
    pub coord: GridCoord,
    /// Stable key: cell origin as "lat_lng" with 6 decimals
    pub key: String,
    /// Midpoint of the cell
    pub center: Coordinates,
    /// Member incidents in first-seen order
    pub incidents: Vec<WeightedIncident>,
    /// Sum of member weights
    pub total_weight: f64,
}

impl GridCell {
    fn new(coord: GridCoord, grid_size_degrees: f64) -> Self {
        let origin_lat = coord.y as f64 * grid_size_degrees;
        let origin_lng = coord.x as f64 * grid_size_degrees;

        Self {
            coord,
            key: cell_key(origin_lat, origin_lng),
            center: Coordinates::new(
                origin_lat + grid_size_degrees / 2.0,
                origin_lng + grid_size_degrees / 2.0,
            ),
            incidents: Vec::new(),
            total_weight: 0.0,
        }
    }

    /// Number of incidents in this cell
    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    /// Mean incident weight (0 for an empty cell)
    pub fn avg_weight(&self) -> f64 {
        if self.incidents.is_empty() {
            0.0
        } else {
            self.total_weight / self.incidents.len() as f64
        }
    }
}

/// Format a cell origin as its key
pub fn cell_key(origin_lat: f64, origin_lng: f64) -> String {
    format!("{:.6}_{:.6}", origin_lat, origin_lng)
}

/// Convert a cell edge from meters to degrees of latitude
pub fn grid_size_degrees(grid_size_meters: f64) -> f64 {
    grid_size_meters / METERS_PER_DEGREE_LAT
}

/// Cells in insertion order plus the coordinate index
#[derive(Debug, Clone)]
pub struct GridIndex {
    grid_size_degrees: f64,
    cells: Vec<GridCell>,
    index: HashMap<GridCoord, usize>,
}

impl GridIndex {
    /// Bucket incidents into cells of `grid_size_degrees`
    ///
    /// Each incident lands in exactly one cell. Cells keep the order in which
    /// their first incident was seen.
    pub fn build(incidents: Vec<WeightedIncident>, grid_size_degrees: f64) -> Self {
        let mut grid = Self {
            grid_size_degrees,
            cells: Vec::new(),
            index: HashMap::new(),
        };

        for incident in incidents {
            let coord = GridCoord::of(incident.location, grid_size_degrees);
            let idx = match grid.index.get(&coord) {
                Some(&idx) => idx,
                None => {
                    grid.cells.push(GridCell::new(coord, grid_size_degrees));
                    grid.index.insert(coord, grid.cells.len() - 1);
                    grid.cells.len() - 1
                }
            };

            let cell = &mut grid.cells[idx];
            cell.total_weight += incident.weight;
            cell.incidents.push(incident);
        }

        grid
    }

    /// Cell edge in degrees
    pub fn grid_size_degrees(&self) -> f64 {
        self.grid_size_degrees
    }

    /// Cell height in meters
    pub fn cell_height_meters(&self) -> f64 {
        self.grid_size_degrees * METERS_PER_DEGREE_LAT
    }

    /// Cell width in meters at the given latitude
    pub fn cell_width_meters(&self, lat: f64) -> f64 {
        self.grid_size_degrees * meters_per_degree_lng(lat)
    }

    /// All cells in insertion order
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Position of the cell at `coord`, if occupied
    pub fn position(&self, coord: GridCoord) -> Option<usize> {
        self.index.get(&coord).copied()
    }

    /// Cell at `coord`, if occupied
    pub fn get(&self, coord: GridCoord) -> Option<&GridCell> {
        self.position(coord).map(|idx| &self.cells[idx])
    }

    /// Number of occupied cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Total incidents across all cells
    pub fn incident_count(&self) -> usize {
        self.cells.iter().map(GridCell::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incident::Incident;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    const G: f64 = 0.001;

    fn weighted(id: &str, lat: f64, lng: f64, weight: f64) -> WeightedIncident {
        let at = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let location = Coordinates::new(lat, lng);
        WeightedIncident {
            incident: Incident::new(id, location, "Theft", at),
            location,
            occurred_at: at,
            weight,
        }
    }

    #[test]
    fn test_grid_size_degrees() {
        assert_relative_eq!(grid_size_degrees(111.32), 0.001, epsilon = 1e-12);
    }

    #[test]
    fn test_same_cell() {
        let grid = GridIndex::build(
            vec![
                weighted("a", 14.8612, 120.8065, 1.0),
                weighted("b", 14.8618, 120.8069, 0.5),
            ],
            G,
        );

        assert_eq!(grid.len(), 1);
        let cell = &grid.cells()[0];
        assert_eq!(cell.len(), 2);
        assert_relative_eq!(cell.total_weight, 1.5);
        assert_relative_eq!(cell.avg_weight(), 0.75);
    }

    #[test]
    fn test_cell_key_and_center() {
        let grid = GridIndex::build(vec![weighted("a", 14.8612, 120.8065, 1.0)], G);
        let cell = &grid.cells()[0];

        assert_eq!(cell.key, "14.861000_120.806000");
        assert_relative_eq!(cell.center.lat, 14.8615, epsilon = 1e-9);
        assert_relative_eq!(cell.center.lng, 120.8065, epsilon = 1e-9);
    }

    #[test]
    fn test_negative_coordinates_floor() {
        let grid = GridIndex::build(vec![weighted("a", -33.8688, -151.2093, 1.0)], G);
        let cell = &grid.cells()[0];

        assert_eq!(cell.coord, GridCoord { x: -151210, y: -33869 });
        assert!(cell.center.lat < -33.8688 + G);
        assert!(cell.center.lat > -33.8688 - G);
    }

    #[test]
    fn test_every_incident_in_one_cell() {
        let incidents: Vec<WeightedIncident> = (0..50)
            .map(|i| {
                let f = i as f64;
                weighted(&i.to_string(), 14.86 + f * 0.00037, 120.80 + f * 0.00053, 0.5)
            })
            .collect();

        let grid = GridIndex::build(incidents, G);
        assert_eq!(grid.incident_count(), 50);

        let mut ids: Vec<&str> = grid
            .cells()
            .iter()
            .flat_map(|c| c.incidents.iter().map(|i| i.incident.id.as_str()))
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_insertion_order_and_lookup() {
        let grid = GridIndex::build(
            vec![
                weighted("a", 14.8653, 120.8065, 1.0),
                weighted("b", 14.8612, 120.8065, 1.0),
                weighted("c", 14.8654, 120.8066, 1.0),
            ],
            G,
        );

        assert_eq!(grid.len(), 2);
        assert_eq!(grid.cells()[0].incidents[0].incident.id, "a");
        assert_eq!(grid.cells()[1].incidents[0].incident.id, "b");

        let first = grid.cells()[0].coord;
        assert_eq!(grid.position(first), Some(0));
        assert!(grid.get(first.offset(0, -4)).is_some());
        assert!(grid.get(first.offset(7, 7)).is_none());
    }

    #[test]
    fn test_cell_dimensions() {
        let grid = GridIndex::build(Vec::new(), G);

        assert!(grid.is_empty());
        assert_relative_eq!(grid.cell_height_meters(), 111.32, epsilon = 1e-9);
        assert!(grid.cell_width_meters(60.0) < 56.0);
    }
}
