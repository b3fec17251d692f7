//! Nearest-neighbor lookup from a station location to a grid cell.
//!
//! Grid-cell centers are indexed in an R-tree; a query walks the tree's
//! nearest-neighbor iterator for a bounded candidate set and re-ranks the
//! candidates under the configured distance metric. Ties keep the first
//! candidate encountered in iteration order.

pub mod error;

use crate::types::wind_field::WindField;
use error::JoinError;
use haversine::{distance, Location, Units};
use ordered_float::OrderedFloat;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// How candidate distances are measured when picking the nearest cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMetric {
    /// Squared Euclidean distance in coordinate (degree) space. Cheap, and
    /// adequate at the sub-degree separations of a regional grid.
    #[default]
    Euclidean,
    /// Great-circle (haversine) distance in kilometers.
    GreatCircle,
}

/// One grid cell: its array indices and its center coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    /// Row index into the latitude axis.
    pub lat_idx: usize,
    /// Column index into the longitude axis.
    pub lon_idx: usize,
    /// Cell-center latitude, degrees north.
    pub lat: f64,
    /// Cell-center longitude, degrees east.
    pub lon: f64,
}

impl RTreeObject for GridCell {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lat, self.lon])
    }
}

impl PointDistance for GridCell {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.lat - point[0];
        let dlon = self.lon - point[1];
        dlat * dlat + dlon * dlon
    }
}

// Candidates taken from the tree before metric re-ranking. The tree orders by
// Euclidean degree distance; a small surplus absorbs the difference between
// that ordering and great-circle distance.
const CANDIDATE_LIMIT: usize = 20;

/// Spatial index over the cell centers of a wind field (or any lat/lon box).
#[derive(Debug, Clone)]
pub struct GridCellIndex {
    rtree: RTree<GridCell>,
}

impl GridCellIndex {
    /// Builds the index from explicit latitude/longitude axes.
    pub fn from_axes(lats: &[f64], lons: &[f64]) -> Result<GridCellIndex, JoinError> {
        if lats.is_empty() || lons.is_empty() {
            return Err(JoinError::EmptyIndex);
        }
        let mut cells = Vec::with_capacity(lats.len() * lons.len());
        for (lat_idx, &lat) in lats.iter().enumerate() {
            for (lon_idx, &lon) in lons.iter().enumerate() {
                cells.push(GridCell {
                    lat_idx,
                    lon_idx,
                    lat,
                    lon,
                });
            }
        }
        Ok(GridCellIndex {
            rtree: RTree::bulk_load(cells),
        })
    }

    /// Builds the index over a wind field's cell centers.
    pub fn for_field(field: &WindField) -> Result<GridCellIndex, JoinError> {
        Self::from_axes(field.lats(), field.lons())
    }

    /// The cell whose center is nearest to `(lon, lat)` under `metric`.
    pub fn nearest(&self, lon: f64, lat: f64, metric: DistanceMetric) -> Result<GridCell, JoinError> {
        let query = [lat, lon];
        self.rtree
            .nearest_neighbor_iter(&query)
            .take(CANDIDATE_LIMIT)
            .min_by_key(|cell| OrderedFloat(Self::measure(cell, lon, lat, metric)))
            .copied()
            .ok_or(JoinError::EmptyIndex)
    }

    fn measure(cell: &GridCell, lon: f64, lat: f64, metric: DistanceMetric) -> f64 {
        match metric {
            DistanceMetric::Euclidean => cell.distance_2(&[lat, lon]),
            DistanceMetric::GreatCircle => distance(
                Location {
                    latitude: lat,
                    longitude: lon,
                },
                Location {
                    latitude: cell.lat,
                    longitude: cell.lon,
                },
                Units::Kilometers,
            ),
        }
    }
}
