use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JoinError {
    #[error("cannot build a cell index over an empty grid")]
    EmptyIndex,
}
