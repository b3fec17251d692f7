//! A gridded scalar variable on a (time, latitude, longitude) box.

use crate::grid::error::GridError;
use chrono::{DateTime, Utc};
use ndarray::Array3;

/// One gridded variable: a dense `(time, lat, lon)` value cube plus its
/// coordinate axes and a units string for downstream unit-aware consumers.
///
/// Structural invariants enforced at construction: every axis length matches
/// the corresponding value dimension, spatial axes are strictly monotonic and
/// the time axis is strictly increasing. Values themselves may be NaN (missing
/// data propagates as NaN, it is never an error).
#[derive(Debug, Clone)]
pub struct GridField {
    values: Array3<f64>,
    times: Vec<DateTime<Utc>>,
    lats: Vec<f64>,
    lons: Vec<f64>,
    units: String,
}

impl GridField {
    /// Wraps a value cube and its axes, validating the structural invariants.
    pub fn new(
        values: Array3<f64>,
        times: Vec<DateTime<Utc>>,
        lats: Vec<f64>,
        lons: Vec<f64>,
        units: impl Into<String>,
    ) -> Result<GridField, GridError> {
        let (ntime, nlat, nlon) = values.dim();
        check_axis_len("time", times.len(), ntime)?;
        check_axis_len("latitude", lats.len(), nlat)?;
        check_axis_len("longitude", lons.len(), nlon)?;
        if !strictly_increasing_times(&times) {
            return Err(GridError::NonMonotonicAxis { axis: "time" });
        }
        if !strictly_monotonic(&lats) {
            return Err(GridError::NonMonotonicAxis { axis: "latitude" });
        }
        if !strictly_monotonic(&lons) {
            return Err(GridError::NonMonotonicAxis { axis: "longitude" });
        }
        Ok(GridField {
            values,
            times,
            lats,
            lons,
            units: units.into(),
        })
    }

    /// The value cube, indexed `(time, lat, lon)`.
    pub fn values(&self) -> &Array3<f64> {
        &self.values
    }

    /// Timestamps of the time axis, strictly increasing.
    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    /// Latitude axis values, degrees north.
    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    /// Longitude axis values, degrees east.
    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    /// Physical units of the values (e.g., `m s**-1`).
    pub fn units(&self) -> &str {
        &self.units
    }

    /// `(time, lat, lon)` dimensions.
    pub fn dim(&self) -> (usize, usize, usize) {
        self.values.dim()
    }

    /// The full time series at one grid cell.
    ///
    /// Panics when the cell indices are out of bounds; callers obtain indices
    /// from the cell index built over this field's own axes.
    pub fn series_at(&self, lat_idx: usize, lon_idx: usize) -> Vec<f64> {
        (0..self.times.len())
            .map(|t| self.values[[t, lat_idx, lon_idx]])
            .collect()
    }
}

fn check_axis_len(axis: &'static str, len: usize, expected: usize) -> Result<(), GridError> {
    if len != expected {
        return Err(GridError::AxisLengthMismatch {
            axis,
            len,
            expected,
        });
    }
    Ok(())
}

fn strictly_increasing_times(times: &[DateTime<Utc>]) -> bool {
    times.windows(2).all(|pair| pair[0] < pair[1])
}

/// Strictly monotonic in either direction; single-point axes pass.
pub(crate) fn strictly_monotonic(axis: &[f64]) -> bool {
    if axis.len() < 2 {
        return true;
    }
    let increasing = axis.windows(2).all(|pair| pair[0] < pair[1]);
    let decreasing = axis.windows(2).all(|pair| pair[0] > pair[1]);
    increasing || decreasing
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn times(n: usize) -> Vec<DateTime<Utc>> {
        (0..n)
            .map(|h| Utc.with_ymd_and_hms(2020, 1, 1, h as u32, 0, 0).unwrap())
            .collect()
    }

    #[test]
    fn accepts_decreasing_latitudes() {
        let field = GridField::new(
            Array3::zeros((2, 3, 4)),
            times(2),
            vec![58.0, 57.0, 56.0],
            vec![8.0, 9.0, 10.0, 11.0],
            "m**2 s**-2",
        );
        assert!(field.is_ok());
    }

    #[test]
    fn rejects_axis_length_mismatch() {
        let result = GridField::new(
            Array3::zeros((2, 3, 4)),
            times(2),
            vec![58.0, 57.0],
            vec![8.0, 9.0, 10.0, 11.0],
            "m**2 s**-2",
        );
        assert!(matches!(
            result,
            Err(GridError::AxisLengthMismatch { axis: "latitude", len: 2, expected: 3 })
        ));
    }

    #[test]
    fn rejects_non_monotonic_longitudes() {
        let result = GridField::new(
            Array3::zeros((1, 3, 3)),
            times(1),
            vec![58.0, 57.0, 56.0],
            vec![8.0, 10.0, 9.0],
            "m**2 s**-2",
        );
        assert!(matches!(
            result,
            Err(GridError::NonMonotonicAxis { axis: "longitude" })
        ));
    }

    #[test]
    fn cell_series_walks_the_time_axis() {
        let mut values = Array3::zeros((3, 3, 3));
        for t in 0..3 {
            values[[t, 1, 2]] = t as f64 + 0.5;
        }
        let field = GridField::new(
            values,
            times(3),
            vec![58.0, 57.0, 56.0],
            vec![8.0, 9.0, 10.0],
            "m s**-1",
        )
        .unwrap();
        assert_eq!(field.series_at(1, 2), vec![0.5, 1.5, 2.5]);
    }
}
