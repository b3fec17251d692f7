//! Geostrophic wind from gridded geopotential by centered finite differences.

use crate::grid::error::GridError;
use crate::grid::geometry::GridGeometry;
use crate::types::grid_field::GridField;
use crate::types::wind_field::{direction_from, WindField};
use ndarray::{s, Array3};

/// Units carried by the u/v component and speed variables.
pub const WIND_SPEED_UNITS: &str = "m s**-1";

/// Units carried by the direction variable.
pub const WIND_DIRECTION_UNITS: &str = "degrees";

/// Computes the geostrophic wind field from a geopotential grid.
///
/// For every interior cell `(t, i, j)`:
///
/// ```text
/// ug = coeff_u[i] * (Φ[t, i-1, j] - Φ[t, i+1, j])
/// vg = coeff_v[i] * (Φ[t, i, j+1] - Φ[t, i, j-1])
/// ```
///
/// with speed `sqrt(ug² + vg²)` and the meteorological "from" direction.
/// Edge rows and columns have no neighbor on both sides, so the centered
/// scheme leaves them undefined; the returned field is the interior-only
/// subgrid, one cell smaller on each spatial edge, with the latitude and
/// longitude axes trimmed to match. NaN geopotential values propagate into
/// NaN wind values.
pub fn geostrophic_wind(
    geopotential: &GridField,
    geometry: &GridGeometry,
) -> Result<WindField, GridError> {
    let (_, nlat, nlon) = geopotential.dim();
    if geometry.nlat() != nlat || geometry.nlon() != nlon {
        return Err(GridError::GeometryMismatch {
            expected_lat: geometry.nlat(),
            expected_lon: geometry.nlon(),
            lat: nlat,
            lon: nlon,
        });
    }
    if nlat < 3 {
        return Err(GridError::GridTooSmall {
            axis: "latitude",
            required: 3,
            len: nlat,
        });
    }
    if nlon < 3 {
        return Err(GridError::GridTooSmall {
            axis: "longitude",
            required: 3,
            len: nlon,
        });
    }

    let (ug_full, vg_full) = components(geopotential.values(), geometry);

    let interior = s![.., 1..nlat - 1, 1..nlon - 1];
    let ug = ug_full.slice(interior).to_owned();
    let vg = vg_full.slice(interior).to_owned();

    let mut speed = Array3::zeros(ug.dim());
    let mut direction = Array3::zeros(ug.dim());
    let (ntime, ilat, ilon) = ug.dim();
    for t in 0..ntime {
        for i in 0..ilat {
            for j in 0..ilon {
                let u = ug[[t, i, j]];
                let v = vg[[t, i, j]];
                speed[[t, i, j]] = (u * u + v * v).sqrt();
                direction[[t, i, j]] = direction_from(u, v);
            }
        }
    }

    let times = geopotential.times().to_vec();
    let lats = geopotential.lats()[1..nlat - 1].to_vec();
    let lons = geopotential.lons()[1..nlon - 1].to_vec();

    WindField::new(
        GridField::new(ug, times.clone(), lats.clone(), lons.clone(), WIND_SPEED_UNITS)?,
        GridField::new(vg, times.clone(), lats.clone(), lons.clone(), WIND_SPEED_UNITS)?,
        GridField::new(speed, times.clone(), lats.clone(), lons.clone(), WIND_SPEED_UNITS)?,
        GridField::new(direction, times, lats, lons, WIND_DIRECTION_UNITS)?,
    )
}

/// Full-size u/v components with NaN edges; only interior cells are written.
fn components(phi: &Array3<f64>, geometry: &GridGeometry) -> (Array3<f64>, Array3<f64>) {
    let (ntime, nlat, nlon) = phi.dim();
    let mut ug = Array3::from_elem((ntime, nlat, nlon), f64::NAN);
    let mut vg = Array3::from_elem((ntime, nlat, nlon), f64::NAN);
    for t in 0..ntime {
        for i in 1..nlat - 1 {
            let cu = geometry.coeff_u()[i];
            let cv = geometry.coeff_v()[i];
            for j in 1..nlon - 1 {
                ug[[t, i, j]] = cu * (phi[[t, i - 1, j]] - phi[[t, i + 1, j]]);
                vg[[t, i, j]] = cv * (phi[[t, i, j + 1]] - phi[[t, i, j - 1]]);
            }
        }
    }
    (ug, vg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::geometry::{GridGeometry, EARTH_RADIUS_M, EARTH_ROTATION_RATE};
    use chrono::{DateTime, TimeZone, Utc};
    use std::f64::consts::PI;

    fn times(n: usize) -> Vec<DateTime<Utc>> {
        (0..n)
            .map(|h| Utc.with_ymd_and_hms(1990, 1, 1, h as u32, 0, 0).unwrap())
            .collect()
    }

    fn axes() -> (Vec<f64>, Vec<f64>) {
        (vec![58.0, 57.0, 56.0, 55.0], vec![8.0, 9.0, 10.0, 11.0])
    }

    fn field_from(f: impl Fn(f64, f64) -> f64) -> GridField {
        let (lats, lons) = axes();
        let mut phi = Array3::zeros((2, lats.len(), lons.len()));
        for t in 0..2 {
            for (i, &lat) in lats.iter().enumerate() {
                for (j, &lon) in lons.iter().enumerate() {
                    phi[[t, i, j]] = f(lat, lon);
                }
            }
        }
        GridField::new(phi, times(2), lats, lons, "m**2 s**-2").unwrap()
    }

    #[test]
    fn constant_geopotential_gives_zero_wind() {
        let phi = field_from(|_, _| 5000.0 * 9.80665);
        let geometry = GridGeometry::new(phi.lats(), phi.lons()).unwrap();
        let wind = geostrophic_wind(&phi, &geometry).unwrap();

        assert_eq!(wind.ug().dim(), (2, 2, 2));
        for &u in wind.ug().values() {
            assert_eq!(u, 0.0);
        }
        for &v in wind.vg().values() {
            assert_eq!(v, 0.0);
        }
        for &s in wind.speed().values() {
            assert_eq!(s, 0.0);
        }
        // Calm cells carry direction 0 by convention.
        for &d in wind.direction().values() {
            assert_eq!(d, 0.0);
        }
    }

    #[test]
    fn output_axes_are_trimmed_interior() {
        let phi = field_from(|lat, lon| lat * lon);
        let geometry = GridGeometry::new(phi.lats(), phi.lons()).unwrap();
        let wind = geostrophic_wind(&phi, &geometry).unwrap();
        assert_eq!(wind.lats(), &[57.0, 56.0]);
        assert_eq!(wind.lons(), &[9.0, 10.0]);
        assert_eq!(wind.ug().units(), WIND_SPEED_UNITS);
        assert_eq!(wind.direction().units(), WIND_DIRECTION_UNITS);
    }

    #[test]
    fn edges_of_the_full_size_components_are_nan() {
        let phi = field_from(|lat, lon| 10.0 * lat + 3.0 * lon);
        let geometry = GridGeometry::new(phi.lats(), phi.lons()).unwrap();
        let (ug, vg) = components(phi.values(), &geometry);
        let (_, nlat, nlon) = ug.dim();
        for i in 0..nlat {
            for j in 0..nlon {
                let on_edge = i == 0 || i == nlat - 1 || j == 0 || j == nlon - 1;
                assert_eq!(ug[[0, i, j]].is_nan(), on_edge, "ug at ({i},{j})");
                assert_eq!(vg[[0, i, j]].is_nan(), on_edge, "vg at ({i},{j})");
            }
        }
    }

    #[test]
    fn meridional_gradient_reproduces_analytic_u() {
        let a = 50.0; // Φ = a·lat  ⇒  u = -(180/π)·a / (f·R), v = 0
        let phi = field_from(|lat, _| a * lat);
        let geometry = GridGeometry::new(phi.lats(), phi.lons()).unwrap();
        let wind = geostrophic_wind(&phi, &geometry).unwrap();

        for (i, &lat) in wind.lats().iter().enumerate() {
            let f = 2.0 * EARTH_ROTATION_RATE * lat.to_radians().sin();
            let expected = -(180.0 / PI) * a / (f * EARTH_RADIUS_M);
            for j in 0..wind.lons().len() {
                let u = wind.ug().values()[[0, i, j]];
                let v = wind.vg().values()[[0, i, j]];
                assert!((u - expected).abs() < expected.abs() * 1e-12);
                assert_eq!(v, 0.0);
            }
        }
    }

    #[test]
    fn zonal_gradient_reproduces_analytic_v() {
        let b = 80.0; // Φ = b·lon  ⇒  v = (180/π)·b / (f·R·cos lat), u = 0
        let phi = field_from(|_, lon| b * lon);
        let geometry = GridGeometry::new(phi.lats(), phi.lons()).unwrap();
        let wind = geostrophic_wind(&phi, &geometry).unwrap();

        for (i, &lat) in wind.lats().iter().enumerate() {
            let f = 2.0 * EARTH_ROTATION_RATE * lat.to_radians().sin();
            let expected = (180.0 / PI) * b / (f * EARTH_RADIUS_M * lat.to_radians().cos());
            for j in 0..wind.lons().len() {
                let u = wind.ug().values()[[0, i, j]];
                let v = wind.vg().values()[[0, i, j]];
                assert_eq!(u, 0.0);
                assert!((v - expected).abs() < expected.abs() * 1e-12);
            }
        }
    }

    #[test]
    fn speed_is_component_magnitude_everywhere() {
        let phi = field_from(|lat, lon| 12.0 * lat - 7.0 * lon + 0.3 * lat * lon);
        let geometry = GridGeometry::new(phi.lats(), phi.lons()).unwrap();
        let wind = geostrophic_wind(&phi, &geometry).unwrap();
        let (ntime, nlat, nlon) = wind.speed().dim();
        for t in 0..ntime {
            for i in 0..nlat {
                for j in 0..nlon {
                    let u = wind.ug().values()[[t, i, j]];
                    let v = wind.vg().values()[[t, i, j]];
                    assert_eq!(wind.speed().values()[[t, i, j]], (u * u + v * v).sqrt());
                }
            }
        }
    }

    #[test]
    fn nan_geopotential_propagates() {
        let (lats, lons) = axes();
        let mut phi = Array3::zeros((1, lats.len(), lons.len()));
        phi[[0, 0, 1]] = f64::NAN; // neighbor of interior cell (1, 1)
        let field = GridField::new(phi, times(1), lats, lons, "m**2 s**-2").unwrap();
        let geometry = GridGeometry::new(field.lats(), field.lons()).unwrap();
        let wind = geostrophic_wind(&field, &geometry).unwrap();
        assert!(wind.ug().values()[[0, 0, 0]].is_nan());
        assert!(wind.speed().values()[[0, 0, 0]].is_nan());
        // Cells away from the NaN are unaffected.
        assert!(!wind.ug().values()[[0, 1, 0]].is_nan());
    }

    #[test]
    fn mismatched_geometry_is_rejected() {
        let phi = field_from(|lat, lon| lat + lon);
        let other = GridGeometry::new(&[58.0, 57.0, 56.0], &[8.0, 9.0, 10.0]).unwrap();
        assert!(matches!(
            geostrophic_wind(&phi, &other),
            Err(GridError::GeometryMismatch { .. })
        ));
    }
}
