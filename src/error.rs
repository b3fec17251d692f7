use crate::grid::error::GridError;
use crate::join::error::JoinError;
use crate::merge::error::MergeError;
use crate::persist::error::PersistError;
use crate::types::series::SeriesError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeowindError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Join(#[from] JoinError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error("station '{0}' is not present in the registry")]
    UnknownStation(String),

    #[error("background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
