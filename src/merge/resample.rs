//! Fixed-cadence aggregation of time-indexed series.

use crate::merge::error::MergeError;
use crate::types::time::{Cadence, TimeBucket};
use chrono::{DateTime, Utc};

/// A series aggregated to calendar buckets; `buckets` and `values` are
/// parallel and cover the contiguous bucket range of the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Resampled {
    /// Bucket labels, consecutive at the resampling cadence.
    pub buckets: Vec<TimeBucket>,
    /// One aggregate per bucket; NaN where the bucket holds no usable sample.
    pub values: Vec<f64>,
}

impl Resampled {
    fn empty() -> Resampled {
        Resampled {
            buckets: Vec::new(),
            values: Vec::new(),
        }
    }
}

/// Arithmetic mean of the non-NaN samples in each bucket.
///
/// Buckets run contiguously from the bucket of the earliest timestamp to the
/// bucket of the latest; a bucket without any usable sample yields NaN, never
/// an error. An empty input yields an empty result.
pub fn resample_mean(
    times: &[DateTime<Utc>],
    values: &[f64],
    cadence: Cadence,
) -> Result<Resampled, MergeError> {
    resample_with(times, values, cadence, Aggregate::Mean)
}

/// Representative (first non-NaN per bucket) aggregation.
///
/// Used for attributes like coordinates where an arithmetic mean would be
/// physically meaningless.
pub fn resample_representative(
    times: &[DateTime<Utc>],
    values: &[f64],
    cadence: Cadence,
) -> Result<Resampled, MergeError> {
    resample_with(times, values, cadence, Aggregate::First)
}

enum Aggregate {
    Mean,
    First,
}

fn resample_with(
    times: &[DateTime<Utc>],
    values: &[f64],
    cadence: Cadence,
    aggregate: Aggregate,
) -> Result<Resampled, MergeError> {
    if times.len() != values.len() {
        return Err(MergeError::LengthMismatch {
            times: times.len(),
            values: values.len(),
        });
    }
    if times.is_empty() {
        return Ok(Resampled::empty());
    }

    let mut first = TimeBucket::of(times[0], cadence);
    let mut last = first;
    for &t in &times[1..] {
        let bucket = TimeBucket::of(t, cadence);
        if bucket < first {
            first = bucket;
        }
        if bucket > last {
            last = bucket;
        }
    }
    let count = last.offset_from(first, cadence) as usize + 1;

    let mut sums = vec![0.0; count];
    let mut counts = vec![0usize; count];
    let mut firsts = vec![f64::NAN; count];
    for (&t, &value) in times.iter().zip(values) {
        if value.is_nan() {
            continue;
        }
        let index = TimeBucket::of(t, cadence).offset_from(first, cadence) as usize;
        sums[index] += value;
        counts[index] += 1;
        if firsts[index].is_nan() {
            firsts[index] = value;
        }
    }

    let values = (0..count)
        .map(|i| match aggregate {
            Aggregate::Mean if counts[i] > 0 => sums[i] / counts[i] as f64,
            Aggregate::First => firsts[i],
            _ => f64::NAN,
        })
        .collect();
    let buckets = (0..count)
        .map(|i| first.advanced_by(i as i64, cadence))
        .collect();

    Ok(Resampled { buckets, values })
}
