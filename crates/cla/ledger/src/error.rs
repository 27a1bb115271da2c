//! Error types for the ledger and its state store.

use thiserror::Error;

/// Failure of the durable key/value store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend unavailable or rejected the request.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// Stored value does not match the expected shape.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// In-memory lock was poisoned by a panicking writer.
    #[error("state store lock poisoned")]
    LockPoisoned,
}

/// Ledger operation failure.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for store operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
