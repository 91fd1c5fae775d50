#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Failed to connect to graph store: {0}")]
    ConnectionError(String),
    #[error("Store statement failed: {0}")]
    QueryError(String),
    #[error("Failed to deserialize store result row: {0}")]
    DeserializeError(String),
    #[error("Error creating a runtime to handle async code: {0}")]
    TokioError(String),
    #[error("Failed to create graph projection '{0}': store returned no result")]
    ProjectionFailed(String),
    #[error("Invalid graph projection name: {0}")]
    InvalidProjectionName(String),
}
