//! Calendar cadences, aggregation buckets and observation windows used by the
//! resampling and merge stages.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The calendar width of an aggregation bucket.
///
/// Merged station output is produced at both cadences by default: one record
/// per calendar month and one per calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cadence {
    /// One bucket per calendar month.
    Monthly,
    /// One bucket per calendar year.
    Yearly,
}

impl Cadence {
    /// Stable lowercase label, used in file names and the persisted
    /// `cadence` column.
    pub fn label(&self) -> &'static str {
        match self {
            Cadence::Monthly => "monthly",
            Cadence::Yearly => "yearly",
        }
    }

    /// Parses the label produced by [`Cadence::label`].
    pub fn from_label(label: &str) -> Option<Cadence> {
        match label {
            "monthly" => Some(Cadence::Monthly),
            "yearly" => Some(Cadence::Yearly),
            _ => None,
        }
    }
}

/// Formats a `Cadence` using its [`Cadence::label`].
///
/// # Examples
///
/// ```
/// use geowind::Cadence;
///
/// assert_eq!(format!("{}", Cadence::Monthly), "monthly");
/// assert_eq!(Cadence::Yearly.to_string(), "yearly");
/// ```
impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A single aggregation bucket, labeled by its start date.
///
/// A monthly bucket is labeled by the first day of the month, a yearly bucket
/// by January 1st of the year.
///
/// # Examples
///
/// ```
/// use geowind::{Cadence, TimeBucket};
/// use chrono::{TimeZone, Utc};
///
/// let t = Utc.with_ymd_and_hms(2001, 7, 14, 12, 0, 0).unwrap();
/// assert_eq!(TimeBucket::of(t, Cadence::Monthly).date().to_string(), "2001-07-01");
/// assert_eq!(TimeBucket::of(t, Cadence::Yearly).date().to_string(), "2001-01-01");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TimeBucket(NaiveDate);

impl TimeBucket {
    /// The bucket containing `instant` at the given cadence.
    pub fn of(instant: DateTime<Utc>, cadence: Cadence) -> TimeBucket {
        let date = instant.date_naive();
        let start = match cadence {
            Cadence::Monthly => NaiveDate::from_ymd_opt(date.year(), date.month(), 1),
            Cadence::Yearly => NaiveDate::from_ymd_opt(date.year(), 1, 1),
        };
        // The first day of a month/year of a valid date is itself valid.
        TimeBucket(start.expect("bucket start is a valid calendar date"))
    }

    /// Reconstructs a bucket from its start date, as read back from storage.
    pub fn from_start(date: NaiveDate) -> TimeBucket {
        TimeBucket(date)
    }

    /// The bucket's start date (its label).
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Number of cadence steps from `origin` to `self`; negative when `self`
    /// precedes `origin`.
    pub fn offset_from(&self, origin: TimeBucket, cadence: Cadence) -> i64 {
        match cadence {
            Cadence::Monthly => {
                (self.0.year() as i64 - origin.0.year() as i64) * 12
                    + (self.0.month() as i64 - origin.0.month() as i64)
            }
            Cadence::Yearly => self.0.year() as i64 - origin.0.year() as i64,
        }
    }

    /// The bucket `steps` cadence steps after `self`.
    pub fn advanced_by(&self, steps: i64, cadence: Cadence) -> TimeBucket {
        let start = match cadence {
            Cadence::Monthly => {
                let months = self.0.year() as i64 * 12 + (self.0.month() as i64 - 1) + steps;
                let year = months.div_euclid(12);
                let month = months.rem_euclid(12) + 1;
                NaiveDate::from_ymd_opt(year as i32, month as u32, 1)
            }
            Cadence::Yearly => NaiveDate::from_ymd_opt((self.0.year() as i64 + steps) as i32, 1, 1),
        };
        TimeBucket(start.expect("bucket start is a valid calendar date"))
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An inclusive observation window applied to station series before merging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    /// First instant inside the window.
    pub start: DateTime<Utc>,
    /// Last instant inside the window.
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a window; `start` and `end` are both inclusive.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> TimeWindow {
        TimeWindow { start, end }
    }

    /// Whether `instant` falls inside the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// The window length as a chrono duration.
    pub fn span(&self) -> Duration {
        self.end - self.start
    }
}
