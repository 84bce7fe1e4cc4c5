//! Error types for the ledger engine.

use thiserror::Error;

use creatorledger_core::{CoreError, CreatorId};
use creatorledger_store::StoreError;
use creatorledger_vault::VaultError;

/// Engine error.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed id, name, kind, or encoding.
    #[error("invalid input: {0}")]
    InvalidInput(CoreError),

    /// No row for this creator in the store.
    #[error("unknown creator: {0}")]
    UnknownCreator(CreatorId),

    /// A creator with this id was already minted.
    #[error("creator already exists: {0}")]
    CreatorExists(CreatorId),

    /// The append raced against another writer and lost. Retryable:
    /// re-read the tip (implicitly, by calling `append` again) and retry.
    #[error("append conflicted with a concurrent writer; retry the append")]
    ConcurrencyConflict,

    /// Backing-store failure not otherwise classified.
    #[error("storage error: {0}")]
    Storage(StoreError),

    /// Vault failure: path traversal, unsupported platform, or credential
    /// store I/O.
    #[error("vault error: {0}")]
    Vault(#[from] VaultError),

    /// Use of a secret seed after its release.
    #[error("secret seed was already released")]
    Lifecycle,
}

impl From<CoreError> for LedgerError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Lifecycle => LedgerError::Lifecycle,
            other => LedgerError::InvalidInput(other),
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::CreatorExists(id) => match CreatorId::new(id) {
                Ok(id) => LedgerError::CreatorExists(id),
                Err(core) => LedgerError::InvalidInput(core),
            },
            other => LedgerError::Storage(other),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
