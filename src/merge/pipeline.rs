//! Per-station merge: nearest-cell join, cadence resampling and bucket-wise
//! alignment of station observations with the geostrophic field.

use crate::join::{DistanceMetric, GridCell, GridCellIndex};
use crate::merge::error::MergeError;
use crate::merge::resample::{resample_mean, resample_representative, Resampled};
use crate::types::merged::{MergedStationRecord, MergedStationSeries};
use crate::types::series::StationSeries;
use crate::types::station::Station;
use crate::types::time::{Cadence, TimeWindow};
use crate::types::wind_field::WindField;
use log::warn;

/// Knobs for one merge pass.
#[derive(Debug, Clone, Copy)]
pub struct MergeSettings {
    /// Aggregation cadence of the output records.
    pub cadence: Cadence,
    /// Distance metric for the nearest-cell join.
    pub metric: DistanceMetric,
    /// Optional inclusive observation window; `None` merges the full series.
    pub window: Option<TimeWindow>,
}

impl MergeSettings {
    /// Monthly cadence, Euclidean metric, no window.
    pub fn monthly() -> MergeSettings {
        MergeSettings {
            cadence: Cadence::Monthly,
            metric: DistanceMetric::Euclidean,
            window: None,
        }
    }

    /// Yearly cadence, Euclidean metric, no window.
    pub fn yearly() -> MergeSettings {
        MergeSettings {
            cadence: Cadence::Yearly,
            metric: DistanceMetric::Euclidean,
            window: None,
        }
    }
}

/// Raised (as a value, not an error) when a station's first and last recorded
/// locations resolve to different grid cells. The merge proceeds with the
/// final location; splicing two cells' series together silently would corrupt
/// the per-station ERA record.
#[derive(Debug, Clone, PartialEq)]
pub struct RelocationNotice {
    /// Station that moved.
    pub station_id: String,
    /// Cell of the first recorded location.
    pub first_cell: GridCell,
    /// Cell of the last recorded location; the one the merge uses.
    pub last_cell: GridCell,
}

/// Merges one station at a time against a shared wind field and cell index.
#[derive(Debug, Clone, Copy)]
pub struct StationMerger<'a> {
    wind: &'a WindField,
    index: &'a GridCellIndex,
}

impl<'a> StationMerger<'a> {
    /// Borrows the shared read-only grid data.
    pub fn new(wind: &'a WindField, index: &'a GridCellIndex) -> StationMerger<'a> {
        StationMerger { wind, index }
    }

    /// Runs the full merge for one station.
    ///
    /// Steps: clip to the window, fill sparse location reports, resolve the
    /// nearest grid cell for the first and last location (surfacing a
    /// [`RelocationNotice`] when they differ), resample station and grid
    /// series to the cadence, and assemble bucket-aligned records.
    pub fn merge(
        &self,
        station: &Station,
        series: &StationSeries,
        settings: &MergeSettings,
    ) -> Result<(MergedStationSeries, Option<RelocationNotice>), MergeError> {
        let mut series = match settings.window {
            Some(window) => series.clipped_to(window),
            None => series.clone(),
        };
        if !series.has_wind_data() {
            return Err(MergeError::MissingStationData {
                station: station.id.clone(),
            });
        }
        if !series.fill_locations() {
            return Err(MergeError::MissingLocation {
                station: station.id.clone(),
            });
        }

        // fill_locations succeeded, so every sample now carries a location.
        let (first_lon, first_lat) = series
            .first_location()
            .expect("locations filled for a non-empty series");
        let (last_lon, last_lat) = series
            .last_location()
            .expect("locations filled for a non-empty series");

        let first_cell = self.index.nearest(first_lon, first_lat, settings.metric)?;
        let last_cell = self.index.nearest(last_lon, last_lat, settings.metric)?;
        let relocation = if (first_cell.lat_idx, first_cell.lon_idx)
            != (last_cell.lat_idx, last_cell.lon_idx)
        {
            warn!(
                "station {} moved between grid cells ({}, {}) and ({}, {}); \
                 merging against the final location",
                station.id, first_cell.lat, first_cell.lon, last_cell.lat, last_cell.lon
            );
            Some(RelocationNotice {
                station_id: station.id.clone(),
                first_cell,
                last_cell,
            })
        } else {
            None
        };
        let cell = last_cell;

        // Station aggregates: means for winds, representative coordinates.
        let samples = series.samples();
        let times: Vec<_> = samples.iter().map(|s| s.time).collect();
        let speeds: Vec<f64> = samples.iter().map(|s| s.wind_speed).collect();
        let dirs: Vec<f64> = samples.iter().map(|s| s.wind_dir).collect();
        let lons: Vec<f64> = samples.iter().map(|s| s.lon).collect();
        let lats: Vec<f64> = samples.iter().map(|s| s.lat).collect();

        let st_speed = resample_mean(&times, &speeds, settings.cadence)?;
        let st_dir = resample_mean(&times, &dirs, settings.cadence)?;
        let st_lon = resample_representative(&times, &lons, settings.cadence)?;
        let st_lat = resample_representative(&times, &lats, settings.cadence)?;

        // Grid aggregates at the attributed cell, over the grid's own times.
        let grid_times = self.wind.times();
        let era_ug = resample_mean(
            grid_times,
            &self.wind.ug().series_at(cell.lat_idx, cell.lon_idx),
            settings.cadence,
        )?;
        let era_vg = resample_mean(
            grid_times,
            &self.wind.vg().series_at(cell.lat_idx, cell.lon_idx),
            settings.cadence,
        )?;
        let era_speed = resample_mean(
            grid_times,
            &self.wind.speed().series_at(cell.lat_idx, cell.lon_idx),
            settings.cadence,
        )?;
        let era_dir = resample_mean(
            grid_times,
            &self.wind.direction().series_at(cell.lat_idx, cell.lon_idx),
            settings.cadence,
        )?;

        let records = assemble_records(
            settings.cadence,
            &st_speed,
            &st_dir,
            &st_lon,
            &st_lat,
            &era_ug,
            &era_vg,
            &era_speed,
            &era_dir,
        );

        Ok((
            MergedStationSeries {
                station: station.clone(),
                cadence: settings.cadence,
                grid_lat: cell.lat,
                grid_lon: cell.lon,
                records,
            },
            relocation,
        ))
    }
}

/// Builds one record per station bucket; buckets outside the grid's coverage
/// get NaN ERA fields.
#[allow(clippy::too_many_arguments)]
fn assemble_records(
    cadence: Cadence,
    st_speed: &Resampled,
    st_dir: &Resampled,
    st_lon: &Resampled,
    st_lat: &Resampled,
    era_ug: &Resampled,
    era_vg: &Resampled,
    era_speed: &Resampled,
    era_dir: &Resampled,
) -> Vec<MergedStationRecord> {
    let era_origin = era_ug.buckets.first().copied();
    let mut records = Vec::with_capacity(st_speed.buckets.len());
    for (k, &bucket) in st_speed.buckets.iter().enumerate() {
        let era = era_origin.and_then(|origin| {
            let offset = bucket.offset_from(origin, cadence);
            if offset >= 0 && (offset as usize) < era_ug.values.len() {
                Some(offset as usize)
            } else {
                None
            }
        });
        let (ug, vg, speed, dir) = match era {
            Some(i) => (
                era_ug.values[i],
                era_vg.values[i],
                era_speed.values[i],
                era_dir.values[i],
            ),
            None => (f64::NAN, f64::NAN, f64::NAN, f64::NAN),
        };
        records.push(MergedStationRecord {
            time_bucket: bucket,
            station_lon: st_lon.values[k],
            station_lat: st_lat.values[k],
            station_wind_speed: st_speed.values[k],
            station_wind_dir: st_dir.values[k],
            era_ug: ug,
            era_vg: vg,
            era_wind_speed: speed,
            era_wind_dir: dir,
        });
    }
    records
}
