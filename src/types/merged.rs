//! Per-station, per-bucket merged records and the derived angle samples.

use crate::merge::angle::signed_angle_deg;
use crate::types::station::Station;
use crate::types::time::{Cadence, TimeBucket};
use crate::types::wind_field::{components_from, WindVector};

/// One merged station/grid aggregate for a single time bucket.
///
/// Station fields are bucket means of the observations (coordinates are
/// representative values, never averaged); `era_*` fields are bucket means of
/// the geostrophic field at the station's attributed grid cell. Records are
/// immutable once produced. Any field may be NaN where the bucket had no
/// usable data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedStationRecord {
    /// The aggregation bucket.
    pub time_bucket: TimeBucket,
    /// Station longitude, degrees east.
    pub station_lon: f64,
    /// Station latitude, degrees north.
    pub station_lat: f64,
    /// Mean observed 10 m wind speed, m/s.
    pub station_wind_speed: f64,
    /// Mean observed wind direction, "from" degrees.
    pub station_wind_dir: f64,
    /// Mean geostrophic u-component, m/s.
    pub era_ug: f64,
    /// Mean geostrophic v-component, m/s.
    pub era_vg: f64,
    /// Mean geostrophic wind speed, m/s.
    pub era_wind_speed: f64,
    /// Mean geostrophic wind direction, "from" degrees.
    pub era_wind_dir: f64,
}

impl MergedStationRecord {
    /// The observed 10 m wind vector reconstructed from the bucket's mean
    /// speed and direction.
    pub fn station_vector(&self) -> WindVector {
        components_from(self.station_wind_speed, self.station_wind_dir)
    }

    /// The geostrophic wind vector for the bucket.
    pub fn geostrophic_vector(&self) -> WindVector {
        WindVector::new(self.era_ug, self.era_vg)
    }

    /// Signed ageostrophic angle for this record, degrees in (-180, 180].
    pub fn alpha(&self) -> f64 {
        signed_angle_deg(self.geostrophic_vector(), self.station_vector())
    }
}

/// The ageostrophic angle of one station in one bucket; derived purely from
/// the corresponding [`MergedStationRecord`] and recomputed on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleSample {
    /// Station the angle belongs to.
    pub station_id: String,
    /// The aggregation bucket.
    pub time_bucket: TimeBucket,
    /// Signed angle, degrees in (-180, 180]; NaN when either wind is missing.
    pub alpha: f64,
}

/// All merged records of one station at one cadence, with the grid cell the
/// station was attributed to.
#[derive(Debug, Clone)]
pub struct MergedStationSeries {
    /// Station identity.
    pub station: Station,
    /// Aggregation cadence of `records`.
    pub cadence: Cadence,
    /// Latitude of the grid cell the ERA variables were taken from (the
    /// station's final recorded location decides the cell).
    pub grid_lat: f64,
    /// Longitude of the attributed grid cell.
    pub grid_lon: f64,
    /// Bucket records in chronological order.
    pub records: Vec<MergedStationRecord>,
}

impl MergedStationSeries {
    /// Derives the angle series from the records.
    pub fn angles(&self) -> Vec<AngleSample> {
        self.records
            .iter()
            .map(|record| AngleSample {
                station_id: self.station.id.clone(),
                time_bucket: record.time_bucket,
                alpha: record.alpha(),
            })
            .collect()
    }

    /// Index of the first record whose coordinates differ from the first
    /// record's, or `None` when the station never moved.
    pub fn relocation_index(&self) -> Option<usize> {
        let first = self.records.first()?;
        self.records.iter().position(|record| {
            !same_coordinate(record.station_lon, first.station_lon)
                || !same_coordinate(record.station_lat, first.station_lat)
        })
    }

    /// Records up to (excluding) the first coordinate change; the whole
    /// series when the station never moved.
    pub fn before_relocation(&self) -> &[MergedStationRecord] {
        match self.relocation_index() {
            Some(index) => &self.records[..index],
            None => &self.records,
        }
    }

    /// Records from the first coordinate change on; empty when the station
    /// never moved.
    pub fn after_relocation(&self) -> &[MergedStationRecord] {
        match self.relocation_index() {
            Some(index) => &self.records[index..],
            None => &[],
        }
    }
}

// Coordinate comparison where NaN equals NaN, so buckets without any location
// report do not read as a move.
fn same_coordinate(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}
