//! Wind vectors, meteorological direction conventions, and the four-variable
//! geostrophic wind field.

use crate::grid::error::GridError;
use crate::types::grid_field::GridField;
use chrono::{DateTime, Utc};

/// A horizontal wind vector: `u` eastward, `v` northward, both m/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindVector {
    /// Eastward component, m/s.
    pub u: f64,
    /// Northward component, m/s.
    pub v: f64,
}

impl WindVector {
    /// Builds a vector from its components.
    pub fn new(u: f64, v: f64) -> WindVector {
        WindVector { u, v }
    }

    /// Vector magnitude (wind speed).
    pub fn speed(&self) -> f64 {
        (self.u * self.u + self.v * self.v).sqrt()
    }

    /// Scalar product with `other`.
    pub fn dot(&self, other: WindVector) -> f64 {
        self.u * other.u + self.v * other.v
    }

    /// z-component of `self x other`.
    pub fn cross_z(&self, other: WindVector) -> f64 {
        self.u * other.v - self.v * other.u
    }
}

/// Meteorological "from" direction of a wind vector, in degrees.
///
/// North is 360, east 90, south 180, west 270; an exactly calm wind maps to 0.
/// NaN components propagate to a NaN direction.
///
/// # Examples
///
/// ```
/// use geowind::direction_from;
///
/// assert_eq!(direction_from(0.0, 1.0), 180.0); // southerly
/// assert_eq!(direction_from(1.0, 0.0), 270.0); // westerly
/// assert_eq!(direction_from(0.0, -1.0), 360.0); // northerly
/// assert_eq!(direction_from(0.0, 0.0), 0.0); // calm
/// ```
pub fn direction_from(u: f64, v: f64) -> f64 {
    if u == 0.0 && v == 0.0 {
        return 0.0;
    }
    let dir = (90.0 - (-v).atan2(-u).to_degrees()).rem_euclid(360.0);
    if dir == 0.0 {
        360.0
    } else {
        dir
    }
}

/// Wind components from speed and a meteorological "from" direction.
///
/// The math-convention angle is `270° - direction`; a wind *from* the west
/// (270°) blows *toward* the east, i.e. positive `u`.
pub fn components_from(speed: f64, direction_deg: f64) -> WindVector {
    let math_dir = (270.0 - direction_deg).to_radians();
    WindVector::new(speed * math_dir.cos(), speed * math_dir.sin())
}

/// The geostrophic wind field: u/v components, speed and direction on a
/// shared `(time, lat, lon)` box, each variable carrying its own units.
#[derive(Debug, Clone)]
pub struct WindField {
    ug: GridField,
    vg: GridField,
    speed: GridField,
    direction: GridField,
}

impl WindField {
    /// Bundles the four variables, validating that they share axes.
    pub fn new(
        ug: GridField,
        vg: GridField,
        speed: GridField,
        direction: GridField,
    ) -> Result<WindField, GridError> {
        let dim = ug.dim();
        if vg.dim() != dim || speed.dim() != dim || direction.dim() != dim {
            return Err(GridError::ComponentAxisMismatch);
        }
        Ok(WindField {
            ug,
            vg,
            speed,
            direction,
        })
    }

    /// Eastward geostrophic component, m/s.
    pub fn ug(&self) -> &GridField {
        &self.ug
    }

    /// Northward geostrophic component, m/s.
    pub fn vg(&self) -> &GridField {
        &self.vg
    }

    /// Geostrophic wind speed, m/s.
    pub fn speed(&self) -> &GridField {
        &self.speed
    }

    /// Geostrophic wind direction, "from" degrees.
    pub fn direction(&self) -> &GridField {
        &self.direction
    }

    /// Shared latitude axis.
    pub fn lats(&self) -> &[f64] {
        self.ug.lats()
    }

    /// Shared longitude axis.
    pub fn lons(&self) -> &[f64] {
        self.ug.lons()
    }

    /// Shared time axis.
    pub fn times(&self) -> &[DateTime<Utc>] {
        self.ug.times()
    }
}
