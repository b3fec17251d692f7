//! Grid spacing, Coriolis parameter and finite-difference coefficients
//! derived from the latitude/longitude axes of a geopotential grid.

use crate::grid::error::GridError;
use crate::types::grid_field::strictly_monotonic;

/// Earth radius used for grid metrics, meters.
pub const EARTH_RADIUS_M: f64 = 6.36e6;

/// Earth's rotation rate Ω, rad/s.
pub const EARTH_ROTATION_RATE: f64 = 7.292e-5;

/// Coriolis parameters below this magnitude make the geostrophic division
/// blow up; grids reaching this close to the equator are rejected.
const MIN_CORIOLIS: f64 = 1e-6;

/// Per-latitude geometry of a regular lat/lon grid.
///
/// For each latitude row `i` this holds the Coriolis parameter
/// `f = 2 Ω sin(lat)` and the centered-difference coefficients
///
/// ```text
/// coeff_u[i] = -1 / (f[i] * R * Δθ)
/// coeff_v[i] =  1 / (f[i] * cos(lat[i]) * R * Δλ)
/// ```
///
/// where Δθ and Δλ are the grid spacings in radians, signed to match the
/// axis orientation (a decreasing latitude axis negates Δθ) and carrying a
/// factor of two because the centered difference spans two grid cells.
///
/// Equatorial domains are a documented precondition violation: construction
/// fails with [`GridError::CoriolisSingularity`] when any row's `|f|`
/// underflows toward zero.
#[derive(Debug, Clone)]
pub struct GridGeometry {
    coriolis: Vec<f64>,
    coeff_u: Vec<f64>,
    coeff_v: Vec<f64>,
    nlat: usize,
    nlon: usize,
}

impl GridGeometry {
    /// Derives the geometry with the default Earth radius.
    ///
    /// # Examples
    ///
    /// ```
    /// use geowind::GridGeometry;
    ///
    /// let lats: Vec<f64> = (0..17).map(|i| 58.0 - 0.25 * i as f64).collect();
    /// let lons: Vec<f64> = (0..29).map(|i| 8.0 + 0.25 * i as f64).collect();
    /// let geometry = GridGeometry::new(&lats, &lons).unwrap();
    /// // Northern hemisphere: f positive on every row.
    /// assert!(geometry.coriolis().iter().all(|&f| f > 0.0));
    /// ```
    pub fn new(lats: &[f64], lons: &[f64]) -> Result<GridGeometry, GridError> {
        Self::with_radius(lats, lons, EARTH_RADIUS_M)
    }

    /// Derives the geometry with an explicit Earth radius in meters.
    pub fn with_radius(
        lats: &[f64],
        lons: &[f64],
        earth_radius: f64,
    ) -> Result<GridGeometry, GridError> {
        if lats.len() < 2 {
            return Err(GridError::GridTooSmall {
                axis: "latitude",
                required: 2,
                len: lats.len(),
            });
        }
        if lons.len() < 2 {
            return Err(GridError::GridTooSmall {
                axis: "longitude",
                required: 2,
                len: lons.len(),
            });
        }
        if !strictly_monotonic(lats) {
            return Err(GridError::NonMonotonicAxis { axis: "latitude" });
        }
        if !strictly_monotonic(lons) {
            return Err(GridError::NonMonotonicAxis { axis: "longitude" });
        }

        let lat_step = (lats[lats.len() - 1] - lats[0]) / (lats.len() - 1) as f64;
        let lon_step = (lons[lons.len() - 1] - lons[0]) / (lons.len() - 1) as f64;
        // The centered difference spans two grid cells, so the spacing
        // carries a factor of two; the latitude sign flip matches the
        // north-to-south axis orientation of the source grids.
        let delta_theta = -2.0 * lat_step.to_radians();
        let delta_lambda = 2.0 * lon_step.to_radians();

        let mut coriolis = Vec::with_capacity(lats.len());
        let mut coeff_u = Vec::with_capacity(lats.len());
        let mut coeff_v = Vec::with_capacity(lats.len());
        for &lat in lats {
            let lat_rad = lat.to_radians();
            let f = 2.0 * EARTH_ROTATION_RATE * lat_rad.sin();
            if f.abs() < MIN_CORIOLIS {
                return Err(GridError::CoriolisSingularity { latitude: lat });
            }
            coriolis.push(f);
            coeff_u.push(-1.0 / (f * earth_radius * delta_theta));
            coeff_v.push(1.0 / (f * lat_rad.cos() * earth_radius * delta_lambda));
        }

        Ok(GridGeometry {
            coriolis,
            coeff_u,
            coeff_v,
            nlat: lats.len(),
            nlon: lons.len(),
        })
    }

    /// Per-latitude Coriolis parameter `f`, s⁻¹.
    pub fn coriolis(&self) -> &[f64] {
        &self.coriolis
    }

    /// Per-latitude u-component coefficient.
    pub fn coeff_u(&self) -> &[f64] {
        &self.coeff_u
    }

    /// Per-latitude v-component coefficient.
    pub fn coeff_v(&self) -> &[f64] {
        &self.coeff_v
    }

    /// Number of latitude rows the geometry was derived for.
    pub fn nlat(&self) -> usize {
        self.nlat
    }

    /// Number of longitude columns the geometry was derived for.
    pub fn nlon(&self) -> usize {
        self.nlon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn danish_axes() -> (Vec<f64>, Vec<f64>) {
        let lats = (0..17).map(|i| 58.0 - 0.25 * i as f64).collect();
        let lons = (0..29).map(|i| 8.0 + 0.25 * i as f64).collect();
        (lats, lons)
    }

    #[test]
    fn coriolis_positive_in_northern_hemisphere() {
        let (lats, lons) = danish_axes();
        let geometry = GridGeometry::new(&lats, &lons).unwrap();
        assert_eq!(geometry.coriolis().len(), lats.len());
        for (&lat, &f) in lats.iter().zip(geometry.coriolis()) {
            assert!(f > 0.0, "f must be positive at {lat}°N");
            let expected = 2.0 * EARTH_ROTATION_RATE * lat.to_radians().sin();
            assert!((f - expected).abs() < 1e-18);
        }
    }

    #[test]
    fn coefficients_match_analytic_form() {
        let (lats, lons) = danish_axes();
        let geometry = GridGeometry::new(&lats, &lons).unwrap();
        // Decreasing latitude axis: Δθ positive, so coeff_u negative in NH.
        let delta_theta = -2.0 * (-0.25f64).to_radians();
        let delta_lambda = 2.0 * 0.25f64.to_radians();
        for i in 0..lats.len() {
            let f = geometry.coriolis()[i];
            let expected_u = -1.0 / (f * EARTH_RADIUS_M * delta_theta);
            let expected_v =
                1.0 / (f * lats[i].to_radians().cos() * EARTH_RADIUS_M * delta_lambda);
            assert!(geometry.coeff_u()[i] < 0.0);
            assert!(geometry.coeff_v()[i] > 0.0);
            assert!((geometry.coeff_u()[i] - expected_u).abs() < 1e-12);
            assert!((geometry.coeff_v()[i] - expected_v).abs() < 1e-12);
        }
    }

    #[test]
    fn equatorial_grid_is_rejected() {
        let lats = vec![1.0, 0.5, 0.0, -0.5];
        let lons = vec![8.0, 9.0, 10.0];
        let result = GridGeometry::new(&lats, &lons);
        assert!(matches!(
            result,
            Err(GridError::CoriolisSingularity { latitude }) if latitude == 0.0
        ));
    }

    #[test]
    fn rejects_degenerate_axes() {
        assert!(matches!(
            GridGeometry::new(&[56.0], &[8.0, 9.0]),
            Err(GridError::GridTooSmall { axis: "latitude", .. })
        ));
        assert!(matches!(
            GridGeometry::new(&[57.0, 56.0], &[8.0, 9.0, 8.5]),
            Err(GridError::NonMonotonicAxis { axis: "longitude" })
        ));
    }
}
