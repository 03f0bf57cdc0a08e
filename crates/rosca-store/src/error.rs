//! Error types for store operations.

use rosca_ledger::LedgerError;
use thiserror::Error;

/// Errors that can occur while reading or writing persisted snapshots.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error reading or writing the state file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The state file does not hold a valid ledger record.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The state file path has no parent directory to stage writes in.
    #[error("invalid state path: {0}")]
    InvalidPath(String),
}

impl From<StoreError> for LedgerError {
    fn from(error: StoreError) -> Self {
        LedgerError::StoreError(error.to_string())
    }
}

/// Convenience type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
