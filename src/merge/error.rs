use crate::join::error::JoinError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MergeError {
    /// The station has nothing usable inside the requested window. The run
    /// skips the station and continues.
    #[error("station '{station}' has no usable samples in the requested window")]
    MissingStationData { station: String },

    /// No sample of the station's series ever reports a location, so there is
    /// nothing to join against.
    #[error("station '{station}' never reports a location")]
    MissingLocation { station: String },

    /// Structural violation: a series' timestamp and value columns disagree.
    #[error("series lengths differ: {times} timestamps vs {values} values")]
    LengthMismatch { times: usize, values: usize },

    #[error(transparent)]
    Join(#[from] JoinError),
}
