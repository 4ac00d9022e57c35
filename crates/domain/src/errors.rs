use thiserror::Error;

#[derive(Error, Debug)]
pub enum CartError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timed out after {0}s")]
    TimeoutError(u64),

    #[error("Server error: HTTP {0}")]
    ServerError(u16),

    #[error("Durable cart access requires an account id")]
    MissingUserId,

    #[error("Merge error: {0}")]
    MergeError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Item not found in cart: {0}")]
    ItemNotFound(String),
}
