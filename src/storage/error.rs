use thiserror::Error;

/// Errors raised by the object-store backends
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem or network I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored object could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic storage operation error with context
    #[error("Storage operation failed: {operation} - {details}")]
    OperationFailed { operation: String, details: String },
}

impl StorageError {
    /// Create an operation error with object context
    pub fn operation_failed(operation: &str, bucket: &str, key: &str, details: &str) -> Self {
        StorageError::OperationFailed {
            operation: operation.to_string(),
            details: format!("s3://{}/{}: {}", bucket, key, details),
        }
    }
}
