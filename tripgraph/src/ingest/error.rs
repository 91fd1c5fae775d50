use std::path::PathBuf;

use parquet::errors::ParquetError;

use crate::store::StoreError;

#[derive(thiserror::Error, Debug)]
pub enum TripLoadError {
    #[error("Invalid input: {0}")]
    InvalidUserInput(String),
    #[error("Error reading from '{path}': {message}")]
    ReadError { path: PathBuf, message: String },
    #[error("Failed to create parquet reader: {source}")]
    ParquetReaderError { source: ParquetError },
    #[error("Failed to retrieve record batch from source: {source}")]
    RecordBatchRetrievalError { source: ParquetError },
    #[error("Failed to find column in trip file schema: {0}")]
    ColumnNotFoundError(String),
    #[error("Failed to cast trip file column to expected type: {0}")]
    ColumnCastError(String),
    #[error("Error writing to csv: {0}")]
    CsvWriteError(String),
    #[error("Error writing to '{path}': {message}")]
    WriteError { path: PathBuf, message: String },
    #[error("Serializing analytics result failed: {0}")]
    SerializationError(String),
    #[error(transparent)]
    StoreError(#[from] StoreError),
    #[error("Load cancelled while waiting for the store to become available")]
    Cancelled,
}
