use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("axis '{axis}' must be strictly monotonic")]
    NonMonotonicAxis { axis: &'static str },

    #[error("axis '{axis}' has {len} entries but the value array dimension is {expected}")]
    AxisLengthMismatch {
        axis: &'static str,
        len: usize,
        expected: usize,
    },

    #[error("axis '{axis}' needs at least {required} points for centered differencing, got {len}")]
    GridTooSmall {
        axis: &'static str,
        required: usize,
        len: usize,
    },

    #[error(
        "Coriolis parameter underflows at latitude {latitude}\u{b0}; \
         equatorial domains are outside the geostrophic approximation"
    )]
    CoriolisSingularity { latitude: f64 },

    #[error(
        "geometry was derived for a {expected_lat}x{expected_lon} grid \
         but the field is {lat}x{lon}"
    )]
    GeometryMismatch {
        expected_lat: usize,
        expected_lon: usize,
        lat: usize,
        lon: usize,
    },

    #[error("wind component fields must share time/lat/lon axes")]
    ComponentAxisMismatch,
}
