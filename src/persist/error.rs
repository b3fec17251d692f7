use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to create output directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("I/O error writing parquet file '{0}'")]
    ParquetWriteIo(PathBuf, #[source] std::io::Error),

    #[error("encoding error writing parquet file '{0}'")]
    ParquetWritePolars(PathBuf, #[source] PolarsError),

    #[error("failed to scan parquet file '{0}'")]
    ParquetScan(PathBuf, #[source] PolarsError),

    #[error("failed collecting dataframe from '{0}'")]
    Collect(PathBuf, #[source] PolarsError),

    #[error("column '{column}' missing or mistyped in '{path}'")]
    Column {
        path: PathBuf,
        column: &'static str,
        #[source]
        source: PolarsError,
    },

    #[error("file '{0}' contains no rows")]
    Empty(PathBuf),

    #[error("row {row} of '{path}' has a null '{column}'")]
    NullField {
        path: PathBuf,
        row: usize,
        column: &'static str,
    },

    #[error("file '{path}' carries unrecognized cadence label '{label}'")]
    UnknownCadence { path: PathBuf, label: String },
}
