//! Adaptive cluster merging
//!
//! Walks the grid cells in insertion order. Each unvisited cell seeds a
//! cluster and absorbs unvisited neighbor cells whose incident centroids lie
//! within a merge radius picked from the seed's size and severity. Only one
//! ring of cells around the seed is searched.
//!
//! A consolidation pass then folds together any two clusters whose centroids
//! ended up within the smaller of their applicable radii, so no two final
//! centroids sit inside each other's threshold.

use crate::config::MergeRadii;
use crate::coord::distance::haversine_distance;
use crate::coord::Coordinates;
use crate::engine::grid::GridIndex;
use crate::engine::weight::WeightedIncident;

/// A merged group of incidents
#[derive(Debug, Clone)]
pub struct Cluster {
    pub incidents: Vec<WeightedIncident>,
    pub total_weight: f64,
    /// Weight-weighted mean of member incident coordinates
    pub centroid: Coordinates,
    /// Key of the seed cell
    pub grid_key: String,
    /// Center of the seed cell
    pub seed_center: Coordinates,
    /// Radius used when this cluster absorbed its neighbors
    pub merge_radius: f64,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    pub fn avg_weight(&self) -> f64 {
        if self.incidents.is_empty() {
            0.0
        } else {
            self.total_weight / self.incidents.len() as f64
        }
    }

    /// Merge radius for the cluster's current size and severity
    pub fn applicable_radius(&self, radii: &MergeRadii) -> f64 {
        radii.radius_for(self.len(), self.avg_weight())
    }

    /// Take over another cluster's incidents and recompute the centroid
    fn absorb(&mut self, other: Cluster) {
        self.incidents.extend(other.incidents);
        self.total_weight += other.total_weight;
        if let Some(centroid) = weighted_centroid(&self.incidents) {
            self.centroid = centroid;
        }
    }
}

/// Weight-weighted mean of incident locations
///
/// Returns `None` for an empty set or a zero total weight.
pub fn weighted_centroid(incidents: &[WeightedIncident]) -> Option<Coordinates> {
    let (lat, lng, total) = incidents.iter().fold((0.0, 0.0, 0.0), |(lat, lng, total), i| {
        (
            lat + i.location.lat * i.weight,
            lng + i.location.lng * i.weight,
            total + i.weight,
        )
    });

    if total > 0.0 {
        Some(Coordinates::new(lat / total, lng / total))
    } else {
        None
    }
}

/// Merge grid cells into clusters
pub fn merge(grid: &GridIndex, radii: &MergeRadii) -> Vec<Cluster> {
    let mut clusters = absorb_rings(grid, radii);
    let seeded = clusters.len();
    consolidate(&mut clusters, radii);

    tracing::debug!(
        cells = grid.len(),
        seeded,
        clusters = clusters.len(),
        "Merged grid cells into clusters"
    );

    clusters
}

/// One ring scan per unvisited seed cell
///
/// Distances run from the seed cell's incident centroid to each neighbor
/// cell's incident centroid, so points on either side of a cell boundary can
/// merge even when the radius is shorter than a cell.
fn absorb_rings(grid: &GridIndex, radii: &MergeRadii) -> Vec<Cluster> {
    let cells = grid.cells();
    let centroids: Vec<Coordinates> = cells
        .iter()
        .map(|c| weighted_centroid(&c.incidents).unwrap_or(c.center))
        .collect();
    let mut visited = vec![false; cells.len()];
    let mut clusters = Vec::new();

    for (seed_idx, seed) in cells.iter().enumerate() {
        if visited[seed_idx] {
            continue;
        }
        visited[seed_idx] = true;

        let origin = centroids[seed_idx];
        let radius = radii.radius_for(seed.len(), seed.avg_weight());
        let ring_y = (radius / grid.cell_height_meters()).ceil() as i64;
        let ring_x = (radius / grid.cell_width_meters(seed.center.lat)).ceil() as i64;

        let mut incidents = seed.incidents.clone();
        let mut total_weight = seed.total_weight;

        for dy in -ring_y..=ring_y {
            for dx in -ring_x..=ring_x {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let Some(idx) = grid.position(seed.coord.offset(dx, dy)) else {
                    continue;
                };
                if visited[idx] {
                    continue;
                }

                if haversine_distance(origin, centroids[idx]) <= radius {
                    let neighbor = &cells[idx];
                    incidents.extend(neighbor.incidents.iter().cloned());
                    total_weight += neighbor.total_weight;
                    visited[idx] = true;
                }
            }
        }

        let centroid = weighted_centroid(&incidents).unwrap_or(origin);
        clusters.push(Cluster {
            incidents,
            total_weight,
            centroid,
            grid_key: seed.key.clone(),
            seed_center: seed.center,
            merge_radius: radius,
        });
    }

    clusters
}

/// Fold clusters whose centroids are within the smaller applicable radius
///
/// Earlier clusters absorb later ones, so the outcome depends only on seed
/// order. Repeats until a full pass makes no change.
fn consolidate(clusters: &mut Vec<Cluster>, radii: &MergeRadii) {
    loop {
        let mut changed = false;
        let mut i = 0;

        while i < clusters.len() {
            let mut j = i + 1;
            while j < clusters.len() {
                let reach = clusters[i]
                    .applicable_radius(radii)
                    .min(clusters[j].applicable_radius(radii));

                if haversine_distance(clusters[i].centroid, clusters[j].centroid) <= reach {
                    let other = clusters.remove(j);
                    clusters[i].absorb(other);
                    changed = true;
                    j = i + 1;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }

        if !changed {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::grid::GridIndex;
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

    fn run(incidents: Vec<WeightedIncident>) -> Vec<Cluster> {
        merge(&GridIndex::build(incidents, G), &MergeRadii::default())
    }

    #[test]
    fn test_empty() {
        assert!(run(Vec::new()).is_empty());
    }

    #[test]
    fn test_radius_follows_seed_size() {
        // Neighboring cells along latitude, centers ~111 m apart: beyond the
        // 100 m single-incident radius
        let clusters = run(vec![
            weighted("a", 14.8612, 120.8065, 0.5),
            weighted("b", 14.8622, 120.8065, 0.5),
        ]);
        assert_eq!(clusters.len(), 2);

        // Two incidents in the seed cell widen the radius to 200 m
        let clusters = run(vec![
            weighted("a", 14.8612, 120.8065, 0.5),
            weighted("b", 14.8613, 120.8065, 0.5),
            weighted("c", 14.8622, 120.8065, 0.5),
        ]);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 3);
        assert_eq!(clusters[0].merge_radius, 200.0);
    }

    #[test]
    fn test_severe_seed_reaches_further() {
        // Three cells (~334 m) north of a severe two-incident seed
        let severe = run(vec![
            weighted("a", 14.8612, 120.8065, 1.0),
            weighted("b", 14.8613, 120.8065, 0.9),
            weighted("c", 14.8642, 120.8065, 0.5),
        ]);
        assert_eq!(severe.len(), 1);
        assert_eq!(severe[0].merge_radius, 400.0);

        let mild = run(vec![
            weighted("a", 14.8612, 120.8065, 0.5),
            weighted("b", 14.8613, 120.8065, 0.5),
            weighted("c", 14.8642, 120.8065, 0.5),
        ]);
        assert_eq!(mild.len(), 2);
    }

    #[test]
    fn test_centroid_is_weighted_by_incident() {
        let clusters = run(vec![
            weighted("a", 14.8612, 120.8062, 1.0),
            weighted("b", 14.8614, 120.8068, 0.5),
            weighted("c", 14.8623, 120.8065, 0.5),
        ]);
        assert_eq!(clusters.len(), 1);

        let centroid = clusters[0].centroid;
        assert_relative_eq!(centroid.lat, (14.8612 * 1.0 + 14.8614 * 0.5 + 14.8623 * 0.5) / 2.0, epsilon = 1e-9);
        assert_relative_eq!(centroid.lng, (120.8062 * 1.0 + 120.8068 * 0.5 + 120.8065 * 0.5) / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_no_chain_growth() {
        // Single-incident seeds two cells apart stay separate
        let clusters = run(vec![
            weighted("a", 14.8612, 120.8065, 0.5),
            weighted("b", 14.8632, 120.8065, 0.5),
            weighted("c", 14.8652, 120.8065, 0.5),
        ]);
        assert_eq!(clusters.len(), 3);
    }

    #[test]
    fn test_weighted_centroid_empty() {
        assert!(weighted_centroid(&[]).is_none());
    }

    /// Deterministic scatter of incidents over a few hundred meters
    fn scatter(n: usize) -> Vec<WeightedIncident> {
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % 10_000) as f64 / 10_000.0
        };

        (0..n)
            .map(|i| {
                let lat = 14.86 + next() * 0.01;
                let lng = 120.80 + next() * 0.01;
                let weight = 0.1 + next() * 0.9;
                weighted(&format!("i{}", i), lat, lng, weight)
            })
            .collect()
    }

    #[test]
    fn test_no_double_counting() {
        let incidents = scatter(300);
        let clusters = run(incidents);

        let mut ids: Vec<String> = clusters
            .iter()
            .flat_map(|c| c.incidents.iter().map(|i| i.incident.id.clone()))
            .collect();
        assert_eq!(ids.len(), 300);
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 300);

        for cluster in &clusters {
            let sum: f64 = cluster.incidents.iter().map(|i| i.weight).sum();
            assert_relative_eq!(cluster.total_weight, sum, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_pair_across_cell_boundary_merges() {
        // ~4.5 m apart on either side of the 14.861 row boundary
        let clusters = run(vec![
            weighted("a", 14.86098, 120.8065, 1.0),
            weighted("b", 14.86102, 120.8065, 1.0),
        ]);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 2);
        assert_relative_eq!(clusters[0].centroid.lat, 14.861, epsilon = 1e-9);
    }

    #[test]
    fn test_pairs_two_rows_apart_merge() {
        // Centroids ~114 m apart, inside the 200 m small-cluster radius
        let clusters = run(vec![
            weighted("a", 14.86198, 120.8065, 0.4),
            weighted("b", 14.86199, 120.8065, 0.4),
            weighted("c", 14.86301, 120.8065, 0.4),
            weighted("d", 14.86302, 120.8065, 0.4),
        ]);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 4);
    }

    #[test]
    fn test_consolidation_folds_shifted_centroids() {
        // The seed pair absorbs the row above and its centroid moves north,
        // to ~189 m from the third pair, which the ring scan saw at ~245 m
        let incidents = vec![
            weighted("a", 14.86050, 120.8065, 0.4),
            weighted("b", 14.86051, 120.8065, 0.4),
            weighted("c", 14.86150, 120.8065, 0.4),
            weighted("d", 14.86151, 120.8065, 0.4),
            weighted("e", 14.86270, 120.8065, 0.4),
            weighted("f", 14.86271, 120.8065, 0.4),
        ];
        let grid = GridIndex::build(incidents, G);
        let radii = MergeRadii::default();

        let ringed = absorb_rings(&grid, &radii);
        assert_eq!(ringed.len(), 2);
        assert_eq!(ringed[0].len(), 4);

        let clusters = merge(&grid, &radii);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 6);
        assert_eq!(clusters[0].grid_key, ringed[0].grid_key);
    }

    #[test]
    fn test_centroids_are_separated_by_their_radius() {
        let radii = MergeRadii::default();

        for clusters in [run(scatter(300)), run(scatter(40))] {
            for (i, earlier) in clusters.iter().enumerate() {
                for later in &clusters[i + 1..] {
                    let d = haversine_distance(earlier.centroid, later.centroid);
                    let reach = earlier
                        .applicable_radius(&radii)
                        .min(later.applicable_radius(&radii));
                    assert!(d > reach, "{} <= {}", d, reach);
                    assert!(d > radii.smallest());
                }
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let a = run(scatter(200));
        let b = run(scatter(200));

        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.grid_key, y.grid_key);
            assert_eq!(x.len(), y.len());
            assert_eq!(x.centroid, y.centroid);
        }
    }
}
