//! Signed angle between the geostrophic wind and the observed surface wind.

use crate::types::wind_field::WindVector;

/// Guard added to the norm product so calm winds cannot divide by zero.
pub const CALM_EPSILON: f64 = 1e-4;

/// Signed angle in degrees, range (-180, 180], from the geostrophic vector
/// `vg` to the observed 10 m vector `v10`.
///
/// The arcsine of the normalized cross product carries the sign but folds
/// angles beyond ±90° back into [-90, 90]; the arccosine of the normalized
/// dot product carries the unsigned magnitude over [0, 180]. When the
/// magnitude exceeds 90° the arccosine value is taken over, signed by the
/// arcsine branch:
///
/// ```text
/// if cos_deg > 90:  alpha = -cos_deg  if asin-alpha < 0,  else +cos_deg
/// ```
///
/// Both branches are required; neither alone covers the full range. The
/// threshold is strictly greater-than: at exactly 90° the arcsine value
/// stands.
///
/// NaN components propagate to a NaN angle. When both vectors are near-zero
/// the guard keeps the result finite (≈0°) but the angle is numerically
/// meaningless; callers should treat calm-on-calm samples as degenerate.
///
/// # Examples
///
/// ```
/// use geowind::{signed_angle_deg, WindVector};
///
/// // Observed wind rotated 90° clockwise from geostrophic.
/// let alpha = signed_angle_deg(WindVector::new(0.0, 1.0), WindVector::new(1.0, 0.0));
/// assert!((-90.0..-89.0).contains(&alpha));
///
/// // Identical vectors: no deviation.
/// let same = WindVector::new(3.0, 4.0);
/// assert_eq!(signed_angle_deg(same, same), 0.0);
/// ```
pub fn signed_angle_deg(vg: WindVector, v10: WindVector) -> f64 {
    let norm_product = vg.speed() * v10.speed() + CALM_EPSILON;
    let sin_alpha = vg.cross_z(v10) / norm_product;
    let alpha = sin_alpha.asin().to_degrees();
    let cos_deg = (vg.dot(v10) / norm_product).acos().to_degrees();
    if cos_deg > 90.0 {
        if alpha < 0.0 {
            -cos_deg
        } else {
            cos_deg
        }
    } else {
        alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_turn_clockwise_is_minus_ninety() {
        // vg north-pointing, v10 east-pointing: cross_z = -1, asin branch
        // ≈ -90°, acos branch exactly 90° (boundary, not taken).
        let alpha = signed_angle_deg(WindVector::new(0.0, 1.0), WindVector::new(1.0, 0.0));
        assert!(alpha < -89.0 && alpha >= -90.0, "got {alpha}");
    }

    #[test]
    fn quarter_turn_counterclockwise_is_plus_ninety() {
        let alpha = signed_angle_deg(WindVector::new(1.0, 0.0), WindVector::new(0.0, 1.0));
        assert!(alpha > 89.0 && alpha <= 90.0, "got {alpha}");
    }

    #[test]
    fn identical_vectors_have_zero_angle() {
        let v = WindVector::new(3.0, 4.0);
        assert_eq!(signed_angle_deg(v, v), 0.0);
    }

    #[test]
    fn obtuse_negative_angle_takes_the_arccos_branch() {
        // v10 at -153.43° from vg: the arcsine alone would fold this to
        // -26.57°; the correction restores the obtuse magnitude.
        let vg = WindVector::new(1.0, 0.0);
        let v10 = WindVector::new(-1.0, -0.5);
        let alpha = signed_angle_deg(vg, v10);
        assert!((alpha + 153.43).abs() < 0.1, "got {alpha}");
    }

    #[test]
    fn obtuse_positive_angle_takes_the_arccos_branch() {
        let vg = WindVector::new(1.0, 0.0);
        let v10 = WindVector::new(-1.0, 0.5);
        let alpha = signed_angle_deg(vg, v10);
        assert!((alpha - 153.43).abs() < 0.1, "got {alpha}");
    }

    #[test]
    fn antiparallel_vectors_approach_plus_180() {
        let alpha = signed_angle_deg(WindVector::new(2.0, 0.0), WindVector::new(-2.0, 0.0));
        assert!(alpha > 179.0 && alpha <= 180.0, "got {alpha}");
    }

    #[test]
    fn nan_components_propagate() {
        let vg = WindVector::new(f64::NAN, 0.0);
        let v10 = WindVector::new(1.0, 0.0);
        assert!(signed_angle_deg(vg, v10).is_nan());
        assert!(signed_angle_deg(v10, vg).is_nan());
    }

    #[test]
    fn calm_on_calm_stays_finite() {
        let calm = WindVector::new(0.0, 0.0);
        let alpha = signed_angle_deg(calm, calm);
        assert_eq!(alpha, 0.0);
    }
}
