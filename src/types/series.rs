//! Time-indexed station wind observations.
//!
//! Missing measurements are carried as explicit `f64::NAN` placeholders, never
//! as omitted rows, so downstream resampling and bucket alignment can rely on
//! positional time arithmetic.

use crate::types::time::TimeWindow;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Errors raised while constructing or validating a station series.
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("station series timestamps must be strictly increasing (violation at index {index})")]
    UnsortedTimestamps { index: usize },
}

/// One station observation.
///
/// `wind_speed` is in m/s, `wind_dir` in meteorological "from" degrees.
/// `lon`/`lat` are the station's recorded position at observation time; any
/// of the four values may be NaN when the station did not report it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationSample {
    /// Observation instant (UTC).
    pub time: DateTime<Utc>,
    /// Observed 10 m wind speed, m/s.
    pub wind_speed: f64,
    /// Observed wind direction, degrees, "from" convention.
    pub wind_dir: f64,
    /// Station longitude at observation time, degrees east.
    pub lon: f64,
    /// Station latitude at observation time, degrees north.
    pub lat: f64,
}

impl StationSample {
    /// A placeholder sample standing in for a missing observation.
    pub fn missing(time: DateTime<Utc>) -> StationSample {
        StationSample {
            time,
            wind_speed: f64::NAN,
            wind_dir: f64::NAN,
            lon: f64::NAN,
            lat: f64::NAN,
        }
    }

    fn has_location(&self) -> bool {
        !self.lon.is_nan() && !self.lat.is_nan()
    }
}

/// A station's observation series, ordered by strictly increasing time.
#[derive(Debug, Clone, Default)]
pub struct StationSeries {
    samples: Vec<StationSample>,
}

impl StationSeries {
    /// Wraps a sample vector, validating strict time order.
    pub fn new(samples: Vec<StationSample>) -> Result<StationSeries, SeriesError> {
        for (index, pair) in samples.windows(2).enumerate() {
            if pair[1].time <= pair[0].time {
                return Err(SeriesError::UnsortedTimestamps { index: index + 1 });
            }
        }
        Ok(StationSeries { samples })
    }

    /// The underlying samples, in time order.
    pub fn samples(&self) -> &[StationSample] {
        &self.samples
    }

    /// Number of samples (placeholders included).
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the series holds no samples at all.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Inserts [`StationSample::missing`] placeholders wherever consecutive
    /// samples are more than `step` apart, so the series has no gaps at its
    /// nominal sampling interval.
    pub fn regularize(self, step: Duration) -> StationSeries {
        let mut filled: Vec<StationSample> = Vec::with_capacity(self.samples.len());
        for sample in self.samples {
            if let Some(prev) = filled.last().copied() {
                let mut expected = prev.time + step;
                while expected < sample.time {
                    filled.push(StationSample::missing(expected));
                    expected += step;
                }
            }
            filled.push(sample);
        }
        StationSeries { samples: filled }
    }

    /// Restricts the series to samples inside `window` (inclusive).
    pub fn clipped_to(&self, window: TimeWindow) -> StationSeries {
        StationSeries {
            samples: self
                .samples
                .iter()
                .copied()
                .filter(|s| window.contains(s.time))
                .collect(),
        }
    }

    /// Whether any sample carries a usable (non-NaN) wind speed.
    pub fn has_wind_data(&self) -> bool {
        self.samples.iter().any(|s| !s.wind_speed.is_nan())
    }

    /// Fills missing lon/lat pairs backward from the next reporting sample,
    /// then forward over any remaining trailing gap. Returns false when no
    /// sample reports a location at all.
    pub fn fill_locations(&mut self) -> bool {
        if !self.samples.iter().any(|s| s.has_location()) {
            return false;
        }
        // Backward pass: a missing location takes the next recorded one.
        let mut next: Option<(f64, f64)> = None;
        for sample in self.samples.iter_mut().rev() {
            if sample.has_location() {
                next = Some((sample.lon, sample.lat));
            } else if let Some((lon, lat)) = next {
                sample.lon = lon;
                sample.lat = lat;
            }
        }
        // Forward pass catches the trailing samples past the last report.
        let mut prev: Option<(f64, f64)> = None;
        for sample in self.samples.iter_mut() {
            if sample.has_location() {
                prev = Some((sample.lon, sample.lat));
            } else if let Some((lon, lat)) = prev {
                sample.lon = lon;
                sample.lat = lat;
            }
        }
        true
    }

    /// Location of the first sample, once locations are filled.
    pub fn first_location(&self) -> Option<(f64, f64)> {
        self.samples
            .first()
            .filter(|s| s.has_location())
            .map(|s| (s.lon, s.lat))
    }

    /// Location of the last sample, once locations are filled.
    pub fn last_location(&self) -> Option<(f64, f64)> {
        self.samples
            .last()
            .filter(|s| s.has_location())
            .map(|s| (s.lon, s.lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, h, 0, 0).unwrap()
    }

    fn sample(h: u32, speed: f64, lon: f64, lat: f64) -> StationSample {
        StationSample {
            time: at(h),
            wind_speed: speed,
            wind_dir: 180.0,
            lon,
            lat,
        }
    }

    #[test]
    fn rejects_unsorted_timestamps() {
        let result = StationSeries::new(vec![sample(2, 1.0, 8.0, 56.0), sample(1, 1.0, 8.0, 56.0)]);
        assert!(matches!(
            result,
            Err(SeriesError::UnsortedTimestamps { index: 1 })
        ));
    }

    #[test]
    fn regularize_inserts_nan_placeholders() {
        let series = StationSeries::new(vec![
            sample(0, 5.0, 8.0, 56.0),
            sample(3, 6.0, 8.0, 56.0),
        ])
        .unwrap()
        .regularize(Duration::hours(1));

        assert_eq!(series.len(), 4);
        assert_eq!(series.samples()[1].time, at(1));
        assert!(series.samples()[1].wind_speed.is_nan());
        assert!(series.samples()[2].wind_dir.is_nan());
        assert_eq!(series.samples()[3].wind_speed, 6.0);
    }

    #[test]
    fn fill_locations_backward_then_forward() {
        let mut series = StationSeries::new(vec![
            sample(0, 1.0, f64::NAN, f64::NAN),
            sample(1, 1.0, 8.0, 56.0),
            sample(2, 1.0, f64::NAN, f64::NAN),
            sample(3, 1.0, 9.0, 57.0),
            sample(4, 1.0, f64::NAN, f64::NAN),
        ])
        .unwrap();

        assert!(series.fill_locations());
        let locs: Vec<(f64, f64)> = series.samples().iter().map(|s| (s.lon, s.lat)).collect();
        // Leading and interior gaps take the next report, trailing the last.
        assert_eq!(locs, [(8.0, 56.0), (8.0, 56.0), (9.0, 57.0), (9.0, 57.0), (9.0, 57.0)]);
        assert_eq!(series.first_location(), Some((8.0, 56.0)));
        assert_eq!(series.last_location(), Some((9.0, 57.0)));
    }

    #[test]
    fn fill_locations_reports_fully_missing() {
        let mut series = StationSeries::new(vec![
            sample(0, 1.0, f64::NAN, f64::NAN),
            sample(1, 2.0, f64::NAN, f64::NAN),
        ])
        .unwrap();
        assert!(!series.fill_locations());
    }

    #[test]
    fn clip_keeps_inclusive_bounds() {
        let series = StationSeries::new(vec![
            sample(0, 1.0, 8.0, 56.0),
            sample(1, 2.0, 8.0, 56.0),
            sample(2, 3.0, 8.0, 56.0),
        ])
        .unwrap();
        let clipped = series.clipped_to(TimeWindow::new(at(1), at(2)));
        assert_eq!(clipped.len(), 2);
        assert_eq!(clipped.samples()[0].wind_speed, 2.0);
    }
}
