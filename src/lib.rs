mod error;
mod geowind;
mod grid;
mod join;
mod merge;
mod persist;
mod types;

pub use error::GeowindError;
pub use geowind::*;

pub use grid::error::GridError;
pub use grid::geometry::{GridGeometry, EARTH_RADIUS_M, EARTH_ROTATION_RATE};
pub use grid::geostrophic::{geostrophic_wind, WIND_DIRECTION_UNITS, WIND_SPEED_UNITS};

pub use join::error::JoinError;
pub use join::{DistanceMetric, GridCell, GridCellIndex};

pub use merge::angle::{signed_angle_deg, CALM_EPSILON};
pub use merge::error::MergeError;
pub use merge::pipeline::{MergeSettings, RelocationNotice, StationMerger};
pub use merge::resample::{resample_mean, resample_representative, Resampled};

pub use persist::error::PersistError;
pub use persist::{read_station_parquet, station_file_name, write_station_parquet, COLUMNS};

pub use types::grid_field::GridField;
pub use types::merged::{AngleSample, MergedStationRecord, MergedStationSeries};
pub use types::series::{SeriesError, StationSample, StationSeries};
pub use types::station::{Station, StationRegistry};
pub use types::time::{Cadence, TimeBucket, TimeWindow};
pub use types::wind_field::{components_from, direction_from, WindField, WindVector};
