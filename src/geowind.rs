//! The run driver: owns the shared geostrophic wind field, its cell index and
//! the station registry, and schedules one merge task per station.

use crate::error::GeowindError;
use crate::join::{DistanceMetric, GridCellIndex};
use crate::merge::error::MergeError;
use crate::merge::pipeline::{MergeSettings, RelocationNotice, StationMerger};
use crate::persist;
use crate::types::merged::MergedStationSeries;
use crate::types::series::StationSeries;
use crate::types::station::StationRegistry;
use crate::types::time::{Cadence, TimeWindow};
use crate::types::wind_field::WindField;
use bon::bon;
use log::{info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

/// A station the run could not merge, with the reason it was skipped.
#[derive(Debug)]
pub struct SkippedStation {
    /// Station identifier from the registry.
    pub station_id: String,
    /// Why the station was skipped.
    pub reason: MergeError,
}

/// Outcome of one merge pass over the registry at a single cadence.
///
/// A per-station failure never aborts the pass; it lands in `skipped` and the
/// remaining stations are merged normally.
#[derive(Debug, Default)]
pub struct MergeRun {
    /// Successfully merged stations, sorted by station id.
    pub merged: Vec<MergedStationSeries>,
    /// Stations skipped with their reasons, sorted by station id.
    pub skipped: Vec<SkippedStation>,
    /// Stations whose first and last locations resolved to different grid
    /// cells, sorted by station id.
    pub relocations: Vec<RelocationNotice>,
}

/// Outcome of a full [`Geowind::run`]: the merge passes plus the files they
/// were persisted to.
#[derive(Debug)]
pub struct RunSummary {
    /// One merge pass per requested cadence.
    pub runs: Vec<(Cadence, MergeRun)>,
    /// Parquet files written, one per merged station and cadence.
    pub files: Vec<PathBuf>,
}

/// The main entry point for merging station observations with a geostrophic
/// wind field.
///
/// The wind field and cell index are built once and shared read-only across
/// all station tasks; the registry decides which stations a run considers.
///
/// # Examples
///
/// ```
/// use geowind::{geostrophic_wind, Geowind, GridField, GridGeometry, StationRegistry};
/// use chrono::{TimeZone, Utc};
/// use ndarray::Array3;
///
/// # fn main() -> Result<(), geowind::GeowindError> {
/// let lats = vec![58.0, 57.0, 56.0, 55.0];
/// let lons = vec![8.0, 9.0, 10.0, 11.0];
/// let times = vec![Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()];
/// let phi = GridField::new(Array3::zeros((1, 4, 4)), times, lats, lons, "m**2 s**-2")?;
/// let geometry = GridGeometry::new(phi.lats(), phi.lons())?;
/// let wind = geostrophic_wind(&phi, &geometry)?;
///
/// let registry = StationRegistry::from_pairs(&[("06041", "Skagen Fyr")]);
/// let client = Geowind::new(wind, registry)?;
/// assert!(client.registry().get("06041").is_some());
/// # Ok(())
/// # }
/// ```
pub struct Geowind {
    wind: Arc<WindField>,
    index: Arc<GridCellIndex>,
    registry: StationRegistry,
}

#[bon]
impl Geowind {
    /// Creates a driver over a wind field and a station registry, building
    /// the nearest-cell index over the field's grid.
    pub fn new(wind: WindField, registry: StationRegistry) -> Result<Geowind, GeowindError> {
        let index = GridCellIndex::for_field(&wind)?;
        Ok(Geowind {
            wind: Arc::new(wind),
            index: Arc::new(index),
            registry,
        })
    }

    /// The station registry the driver was configured with.
    pub fn registry(&self) -> &StationRegistry {
        &self.registry
    }

    /// The shared wind field.
    pub fn wind(&self) -> &WindField {
        &self.wind
    }

    /// Merges a single registry station against the wind field.
    ///
    /// # Arguments
    ///
    /// * `.station_id(&str)`: **Required.** Registry identifier of the station.
    /// * `.series(&StationSeries)`: **Required.** The station's observations.
    /// * `.cadence(Cadence)`: Optional. Aggregation cadence, default monthly.
    /// * `.metric(DistanceMetric)`: Optional. Join metric, default Euclidean.
    /// * `.window(TimeWindow)`: Optional. Inclusive observation window.
    ///
    /// # Errors
    ///
    /// [`GeowindError::UnknownStation`] when the id is not in the registry;
    /// [`GeowindError::Merge`] variants for per-station merge failures.
    #[builder]
    pub fn merge_station(
        &self,
        station_id: &str,
        series: &StationSeries,
        cadence: Option<Cadence>,
        metric: Option<DistanceMetric>,
        window: Option<TimeWindow>,
    ) -> Result<(MergedStationSeries, Option<RelocationNotice>), GeowindError> {
        let station = self
            .registry
            .get(station_id)
            .ok_or_else(|| GeowindError::UnknownStation(station_id.to_string()))?;
        let settings = MergeSettings {
            cadence: cadence.unwrap_or(Cadence::Monthly),
            metric: metric.unwrap_or_default(),
            window,
        };
        let merger = StationMerger::new(&self.wind, &self.index);
        Ok(merger.merge(station, series, &settings)?)
    }

    /// Merges every registry station that has observations, one blocking task
    /// per station.
    ///
    /// Stations without an entry in `observations`, and stations whose merge
    /// fails, are recorded in [`MergeRun::skipped`]; they never abort the
    /// rest of the run. Station tasks share the wind field by reference, not
    /// by copy, and may complete in any order; the returned collections are
    /// sorted by station id.
    ///
    /// # Arguments
    ///
    /// * `.observations(HashMap<String, StationSeries>)`: **Required.**
    ///   Observation series keyed by station id.
    /// * `.cadence(Cadence)`: Optional. Default monthly.
    /// * `.metric(DistanceMetric)`: Optional. Default Euclidean.
    /// * `.window(TimeWindow)`: Optional. Inclusive observation window.
    #[builder]
    pub async fn merge_all(
        &self,
        observations: HashMap<String, StationSeries>,
        cadence: Option<Cadence>,
        metric: Option<DistanceMetric>,
        window: Option<TimeWindow>,
    ) -> Result<MergeRun, GeowindError> {
        let observations = share_observations(observations);
        let settings = MergeSettings {
            cadence: cadence.unwrap_or(Cadence::Monthly),
            metric: metric.unwrap_or_default(),
            window,
        };
        self.merge_all_shared(&observations, settings).await
    }

    /// Full pipeline: merge at every requested cadence and persist each
    /// station's records to `<out_dir>/<station_id>_<cadence>.parquet`.
    ///
    /// # Arguments
    ///
    /// * `.observations(HashMap<String, StationSeries>)`: **Required.**
    /// * `.out_dir(&Path)`: **Required.** Output directory, created if absent.
    /// * `.cadences(Vec<Cadence>)`: Optional. Default monthly and yearly.
    /// * `.metric(DistanceMetric)`: Optional. Default Euclidean.
    /// * `.window(TimeWindow)`: Optional. Inclusive observation window.
    #[builder]
    pub async fn run(
        &self,
        observations: HashMap<String, StationSeries>,
        out_dir: &Path,
        cadences: Option<Vec<Cadence>>,
        metric: Option<DistanceMetric>,
        window: Option<TimeWindow>,
    ) -> Result<RunSummary, GeowindError> {
        let cadences = cadences.unwrap_or_else(|| vec![Cadence::Monthly, Cadence::Yearly]);
        let observations = share_observations(observations);

        let mut runs = Vec::with_capacity(cadences.len());
        let mut files = Vec::new();
        for cadence in cadences {
            let settings = MergeSettings {
                cadence,
                metric: metric.unwrap_or_default(),
                window,
            };
            let run = self.merge_all_shared(&observations, settings).await?;
            for merged in &run.merged {
                files.push(persist::write_station_parquet(merged, out_dir)?);
            }
            info!(
                "{} pass: merged {} stations, skipped {}, {} relocation notices",
                cadence,
                run.merged.len(),
                run.skipped.len(),
                run.relocations.len()
            );
            runs.push((cadence, run));
        }
        Ok(RunSummary { runs, files })
    }

    async fn merge_all_shared(
        &self,
        observations: &HashMap<String, Arc<StationSeries>>,
        settings: MergeSettings,
    ) -> Result<MergeRun, GeowindError> {
        let mut run = MergeRun::default();
        let mut tasks: JoinSet<(
            String,
            Result<(MergedStationSeries, Option<RelocationNotice>), MergeError>,
        )> = JoinSet::new();

        for station in self.registry.iter() {
            let Some(series) = observations.get(&station.id) else {
                warn!("no observations provided for station {}; skipping", station.id);
                run.skipped.push(SkippedStation {
                    station_id: station.id.clone(),
                    reason: MergeError::MissingStationData {
                        station: station.id.clone(),
                    },
                });
                continue;
            };
            let wind = Arc::clone(&self.wind);
            let index = Arc::clone(&self.index);
            let series = Arc::clone(series);
            let station = station.clone();
            tasks.spawn_blocking(move || {
                let merger = StationMerger::new(&wind, &index);
                let result = merger.merge(&station, &series, &settings);
                (station.id, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (station_id, result) = joined?;
            match result {
                Ok((merged, relocation)) => {
                    run.merged.push(merged);
                    if let Some(notice) = relocation {
                        run.relocations.push(notice);
                    }
                }
                Err(reason) => {
                    warn!("skipping station {station_id}: {reason}");
                    run.skipped.push(SkippedStation { station_id, reason });
                }
            }
        }

        run.merged.sort_by(|a, b| a.station.id.cmp(&b.station.id));
        run.skipped.sort_by(|a, b| a.station_id.cmp(&b.station_id));
        run.relocations.sort_by(|a, b| a.station_id.cmp(&b.station_id));
        Ok(run)
    }
}

fn share_observations(
    observations: HashMap<String, StationSeries>,
) -> HashMap<String, Arc<StationSeries>> {
    observations
        .into_iter()
        .map(|(id, series)| (id, Arc::new(series)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::geometry::GridGeometry;
    use crate::grid::geostrophic::geostrophic_wind;
    use crate::persist::read_station_parquet;
    use crate::types::grid_field::GridField;
    use crate::types::series::StationSample;
    use chrono::{DateTime, TimeZone, Utc};
    use ndarray::Array3;

    // 4x4 raw grid with constant geopotential: the 2x2 interior carries zero
    // geostrophic wind everywhere.
    fn constant_wind_field() -> crate::types::wind_field::WindField {
        let lats = vec![58.0, 57.0, 56.0, 55.0];
        let lons = vec![8.0, 9.0, 10.0, 11.0];
        let times: Vec<DateTime<Utc>> = (0..31)
            .map(|d| {
                Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
                    + chrono::Duration::days(d)
            })
            .collect();
        let phi = Array3::from_elem((times.len(), 4, 4), 49_000.0);
        let field = GridField::new(phi, times, lats, lons, "m**2 s**-2").unwrap();
        let geometry = GridGeometry::new(field.lats(), field.lons()).unwrap();
        geostrophic_wind(&field, &geometry).unwrap()
    }

    fn registry() -> StationRegistry {
        StationRegistry::from_pairs(&[("06041", "Skagen Fyr"), ("06052", "Thyborøn")])
    }

    fn observations_for(id: &str) -> HashMap<String, StationSeries> {
        let samples: Vec<StationSample> = (0..10)
            .map(|d| StationSample {
                time: Utc.with_ymd_and_hms(2020, 1, 1, 6, 0, 0).unwrap()
                    + chrono::Duration::days(d),
                wind_speed: 5.0 + d as f64 * 0.1,
                wind_dir: 270.0,
                lon: 10.1,
                lat: 56.9,
            })
            .collect();
        let mut map = HashMap::new();
        map.insert(id.to_string(), StationSeries::new(samples).unwrap());
        map
    }

    #[tokio::test]
    async fn constant_field_merges_to_zero_geostrophic_wind() {
        let client = Geowind::new(constant_wind_field(), registry()).unwrap();
        let run = client
            .merge_all()
            .observations(observations_for("06041"))
            .call()
            .await
            .unwrap();

        assert_eq!(run.merged.len(), 1);
        assert_eq!(run.skipped.len(), 1);
        assert_eq!(run.skipped[0].station_id, "06052");
        assert!(run.relocations.is_empty());

        let merged = &run.merged[0];
        assert_eq!(merged.station.id, "06041");
        assert_eq!(merged.records.len(), 1);
        let record = &merged.records[0];
        assert_eq!(record.era_ug, 0.0);
        assert_eq!(record.era_vg, 0.0);
        assert_eq!(record.era_wind_speed, 0.0);
        assert!((record.station_wind_speed - 5.45).abs() < 1e-12);
    }

    #[tokio::test]
    async fn skipped_stations_never_abort_the_run() {
        let client = Geowind::new(constant_wind_field(), registry()).unwrap();
        // Observations only for a station whose series is entirely NaN.
        let mut observations = observations_for("06041");
        observations.insert(
            "06052".to_string(),
            StationSeries::new(vec![StationSample::missing(
                Utc.with_ymd_and_hms(2020, 1, 5, 0, 0, 0).unwrap(),
            )])
            .unwrap(),
        );

        let run = client
            .merge_all()
            .observations(observations)
            .call()
            .await
            .unwrap();
        assert_eq!(run.merged.len(), 1);
        assert_eq!(run.skipped.len(), 1);
        assert!(matches!(
            run.skipped[0].reason,
            MergeError::MissingStationData { .. }
        ));
    }

    #[tokio::test]
    async fn run_persists_both_cadences_per_station() {
        let dir = tempfile::tempdir().unwrap();
        let client = Geowind::new(constant_wind_field(), registry()).unwrap();

        let summary = client
            .run()
            .observations(observations_for("06041"))
            .out_dir(dir.path())
            .call()
            .await
            .unwrap();

        assert_eq!(summary.runs.len(), 2);
        assert_eq!(summary.files.len(), 2);
        let names: Vec<String> = summary
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert!(names.contains(&"06041_monthly.parquet".to_string()));
        assert!(names.contains(&"06041_yearly.parquet".to_string()));

        let monthly = read_station_parquet(&dir.path().join("06041_monthly.parquet")).unwrap();
        assert_eq!(monthly.station.id, "06041");
        assert_eq!(monthly.cadence, Cadence::Monthly);
        assert_eq!(monthly.records[0].era_ug, 0.0);
    }

    #[tokio::test]
    async fn merge_station_requires_a_registry_entry() {
        let client = Geowind::new(constant_wind_field(), registry()).unwrap();
        let observations = observations_for("06041");
        let series = observations.get("06041").unwrap();

        let result = client
            .merge_station()
            .station_id("99999")
            .series(series)
            .call();
        assert!(matches!(result, Err(GeowindError::UnknownStation(id)) if id == "99999"));

        let (merged, relocation) = client
            .merge_station()
            .station_id("06041")
            .series(series)
            .cadence(Cadence::Yearly)
            .call()
            .unwrap();
        assert!(relocation.is_none());
        assert_eq!(merged.cadence, Cadence::Yearly);
        assert_eq!(merged.records.len(), 1);
    }
}
