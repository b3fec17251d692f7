//! Parquet persistence of merged station series.
//!
//! One file per station and cadence, named `<station_id>_<cadence>.parquet`,
//! gzip-compressed. The column set is fixed and round-trips field-for-field:
//!
//! `station_id`, `station_name`, `cadence`, `grid_lat`, `grid_lon`,
//! `time_bucket` (Date), `station_lon`, `station_lat`, `station_wind_speed`,
//! `station_wind_dir`, `ERA_ug`, `ERA_vg`, `ERA_wind_speed`, `ERA_wind_dir`,
//! `alpha`.
//!
//! Winds are m/s, directions meteorological "from" degrees, coordinates
//! degrees east/north, `alpha` signed degrees in (-180, 180]. Missing values
//! are NaN floats, never nulls. The `alpha` column is derived from the
//! records at write time; reading reconstructs the records and leaves the
//! angle derivable again.

pub mod error;

use crate::types::merged::{MergedStationRecord, MergedStationSeries};
use crate::types::station::Station;
use crate::types::time::{Cadence, TimeBucket};
use chrono::NaiveDate;
use error::PersistError;
use log::info;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

const COL_STATION_ID: &str = "station_id";
const COL_STATION_NAME: &str = "station_name";
const COL_CADENCE: &str = "cadence";
const COL_GRID_LAT: &str = "grid_lat";
const COL_GRID_LON: &str = "grid_lon";
const COL_TIME_BUCKET: &str = "time_bucket";
const COL_STATION_LON: &str = "station_lon";
const COL_STATION_LAT: &str = "station_lat";
const COL_STATION_WIND_SPEED: &str = "station_wind_speed";
const COL_STATION_WIND_DIR: &str = "station_wind_dir";
const COL_ERA_UG: &str = "ERA_ug";
const COL_ERA_VG: &str = "ERA_vg";
const COL_ERA_WIND_SPEED: &str = "ERA_wind_speed";
const COL_ERA_WIND_DIR: &str = "ERA_wind_dir";
const COL_ALPHA: &str = "alpha";

/// Column order of a persisted file.
pub const COLUMNS: [&str; 15] = [
    COL_STATION_ID,
    COL_STATION_NAME,
    COL_CADENCE,
    COL_GRID_LAT,
    COL_GRID_LON,
    COL_TIME_BUCKET,
    COL_STATION_LON,
    COL_STATION_LAT,
    COL_STATION_WIND_SPEED,
    COL_STATION_WIND_DIR,
    COL_ERA_UG,
    COL_ERA_VG,
    COL_ERA_WIND_SPEED,
    COL_ERA_WIND_DIR,
    COL_ALPHA,
];

/// File name for one station/cadence pair.
pub fn station_file_name(station_id: &str, cadence: Cadence) -> String {
    format!("{}_{}.parquet", station_id, cadence.label())
}

/// Writes a merged series to `<dir>/<station_id>_<cadence>.parquet` and
/// returns the path. The directory is created when missing.
pub fn write_station_parquet(
    series: &MergedStationSeries,
    dir: &Path,
) -> Result<PathBuf, PersistError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| PersistError::DirCreation(dir.to_path_buf(), e))?;
    let path = dir.join(station_file_name(&series.station.id, series.cadence));

    let mut df = to_dataframe(series).map_err(|e| PersistError::ParquetWritePolars(path.clone(), e))?;
    let file = File::create(&path).map_err(|e| PersistError::ParquetWriteIo(path.clone(), e))?;
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Gzip(None))
        .finish(&mut df)
        .map_err(|e| PersistError::ParquetWritePolars(path.clone(), e))?;
    info!(
        "wrote {} {} records for station {} to {:?}",
        df.height(),
        series.cadence,
        series.station.id,
        path
    );
    Ok(path)
}

/// Reads a file written by [`write_station_parquet`] back into a
/// [`MergedStationSeries`].
pub fn read_station_parquet(path: &Path) -> Result<MergedStationSeries, PersistError> {
    let df = LazyFrame::scan_parquet(path, Default::default())
        .map_err(|e| PersistError::ParquetScan(path.to_path_buf(), e))?
        .collect()
        .map_err(|e| PersistError::Collect(path.to_path_buf(), e))?;
    if df.height() == 0 {
        return Err(PersistError::Empty(path.to_path_buf()));
    }

    let ids = str_column(&df, path, COL_STATION_ID)?;
    let names = str_column(&df, path, COL_STATION_NAME)?;
    let cadences = str_column(&df, path, COL_CADENCE)?;
    let grid_lats = f64_column(&df, path, COL_GRID_LAT)?;
    let grid_lons = f64_column(&df, path, COL_GRID_LON)?;

    let station = Station::new(
        non_null_str(ids.get(0), path, 0, COL_STATION_ID)?,
        non_null_str(names.get(0), path, 0, COL_STATION_NAME)?,
    );
    let label = non_null_str(cadences.get(0), path, 0, COL_CADENCE)?;
    let cadence = Cadence::from_label(label).ok_or_else(|| PersistError::UnknownCadence {
        path: path.to_path_buf(),
        label: label.to_string(),
    })?;
    let grid_lat = grid_lats.get(0).unwrap_or(f64::NAN);
    let grid_lon = grid_lons.get(0).unwrap_or(f64::NAN);

    // Dates travel as days since the unix epoch underneath the Date dtype.
    let bucket_days = df
        .column(COL_TIME_BUCKET)
        .and_then(|c| c.cast(&DataType::Int32))
        .map_err(|source| PersistError::Column {
            path: path.to_path_buf(),
            column: COL_TIME_BUCKET,
            source,
        })?;
    let bucket_days = bucket_days.i32().map_err(|source| PersistError::Column {
        path: path.to_path_buf(),
        column: COL_TIME_BUCKET,
        source,
    })?;

    let station_lon = f64_column(&df, path, COL_STATION_LON)?;
    let station_lat = f64_column(&df, path, COL_STATION_LAT)?;
    let station_speed = f64_column(&df, path, COL_STATION_WIND_SPEED)?;
    let station_dir = f64_column(&df, path, COL_STATION_WIND_DIR)?;
    let era_ug = f64_column(&df, path, COL_ERA_UG)?;
    let era_vg = f64_column(&df, path, COL_ERA_VG)?;
    let era_speed = f64_column(&df, path, COL_ERA_WIND_SPEED)?;
    let era_dir = f64_column(&df, path, COL_ERA_WIND_DIR)?;

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let days = bucket_days
            .get(row)
            .ok_or_else(|| PersistError::NullField {
                path: path.to_path_buf(),
                row,
                column: COL_TIME_BUCKET,
            })?;
        records.push(MergedStationRecord {
            time_bucket: TimeBucket::from_start(date_from_epoch_days(days)),
            station_lon: station_lon.get(row).unwrap_or(f64::NAN),
            station_lat: station_lat.get(row).unwrap_or(f64::NAN),
            station_wind_speed: station_speed.get(row).unwrap_or(f64::NAN),
            station_wind_dir: station_dir.get(row).unwrap_or(f64::NAN),
            era_ug: era_ug.get(row).unwrap_or(f64::NAN),
            era_vg: era_vg.get(row).unwrap_or(f64::NAN),
            era_wind_speed: era_speed.get(row).unwrap_or(f64::NAN),
            era_wind_dir: era_dir.get(row).unwrap_or(f64::NAN),
        });
    }

    Ok(MergedStationSeries {
        station,
        cadence,
        grid_lat,
        grid_lon,
        records,
    })
}

fn to_dataframe(series: &MergedStationSeries) -> PolarsResult<DataFrame> {
    let n = series.records.len();
    let ids = vec![series.station.id.clone(); n];
    let names = vec![series.station.name.clone(); n];
    let cadences = vec![series.cadence.label().to_string(); n];
    let grid_lats = vec![series.grid_lat; n];
    let grid_lons = vec![series.grid_lon; n];
    let days: Vec<i32> = series
        .records
        .iter()
        .map(|r| epoch_days(r.time_bucket.date()))
        .collect();
    let pick = |f: fn(&MergedStationRecord) -> f64| -> Vec<f64> {
        series.records.iter().map(f).collect()
    };
    let alphas: Vec<f64> = series.records.iter().map(|r| r.alpha()).collect();

    DataFrame::new(vec![
        Series::new(COL_STATION_ID.into(), ids).into_column(),
        Series::new(COL_STATION_NAME.into(), names).into_column(),
        Series::new(COL_CADENCE.into(), cadences).into_column(),
        Series::new(COL_GRID_LAT.into(), grid_lats).into_column(),
        Series::new(COL_GRID_LON.into(), grid_lons).into_column(),
        Series::new(COL_TIME_BUCKET.into(), days)
            .cast(&DataType::Date)?
            .into_column(),
        Series::new(COL_STATION_LON.into(), pick(|r| r.station_lon)).into_column(),
        Series::new(COL_STATION_LAT.into(), pick(|r| r.station_lat)).into_column(),
        Series::new(COL_STATION_WIND_SPEED.into(), pick(|r| r.station_wind_speed)).into_column(),
        Series::new(COL_STATION_WIND_DIR.into(), pick(|r| r.station_wind_dir)).into_column(),
        Series::new(COL_ERA_UG.into(), pick(|r| r.era_ug)).into_column(),
        Series::new(COL_ERA_VG.into(), pick(|r| r.era_vg)).into_column(),
        Series::new(COL_ERA_WIND_SPEED.into(), pick(|r| r.era_wind_speed)).into_column(),
        Series::new(COL_ERA_WIND_DIR.into(), pick(|r| r.era_wind_dir)).into_column(),
        Series::new(COL_ALPHA.into(), alphas).into_column(),
    ])
}

fn f64_column<'a>(
    df: &'a DataFrame,
    path: &Path,
    column: &'static str,
) -> Result<&'a Float64Chunked, PersistError> {
    df.column(column)
        .and_then(|c| c.f64())
        .map_err(|source| PersistError::Column {
            path: path.to_path_buf(),
            column,
            source,
        })
}

fn str_column<'a>(
    df: &'a DataFrame,
    path: &Path,
    column: &'static str,
) -> Result<&'a StringChunked, PersistError> {
    df.column(column)
        .and_then(|c| c.str())
        .map_err(|source| PersistError::Column {
            path: path.to_path_buf(),
            column,
            source,
        })
}

fn non_null_str<'a>(
    value: Option<&'a str>,
    path: &Path,
    row: usize,
    column: &'static str,
) -> Result<&'a str, PersistError> {
    value.ok_or_else(|| PersistError::NullField {
        path: path.to_path_buf(),
        row,
        column,
    })
}

fn epoch_days(date: NaiveDate) -> i32 {
    (date - unix_epoch()).num_days() as i32
}

fn date_from_epoch_days(days: i32) -> NaiveDate {
    unix_epoch() + chrono::Duration::days(days as i64)
}

fn unix_epoch() -> NaiveDate {
    // 1970-01-01 is a valid date.
    NaiveDate::from_ymd_opt(1970, 1, 1).expect("unix epoch date")
}
