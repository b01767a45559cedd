//! Record store errors
//!
//! All store errors are non-fatal: the operation is abandoned, the store is
//! unchanged and the outcome is reported.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Record store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("entry {hash} is a duplicate")]
    DuplicateKey { hash: u32 },

    #[error("entry {hash} not found")]
    NotFound { hash: u32 },

    #[error("entry {hash} could not be allocated")]
    AllocationFailure { hash: u32 },
}

impl StoreError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::DuplicateKey { .. } => "CHASH_STORE_DUPLICATE_KEY",
            StoreError::NotFound { .. } => "CHASH_STORE_NOT_FOUND",
            StoreError::AllocationFailure { .. } => "CHASH_STORE_ALLOCATION_FAILED",
        }
    }

    /// Hash of the record the operation targeted
    pub fn hash(&self) -> u32 {
        match *self {
            StoreError::DuplicateKey { hash }
            | StoreError::NotFound { hash }
            | StoreError::AllocationFailure { hash } => hash,
        }
    }
}
