//! Error types for the CreatorLedger core.

use thiserror::Error;

/// Errors from pure core operations: validation, encoding, key lifecycle.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid creator id: {0}")]
    InvalidCreatorId(String),

    #[error("invalid display name: {0}")]
    InvalidDisplayName(String),

    #[error("invalid event kind: {0}")]
    InvalidEventKind(String),

    #[error("invalid encoding: {0}")]
    InvalidEncoding(&'static str),

    #[error("secret seed was already released")]
    Lifecycle,
}

/// The check that failed when validating a stored event against its
/// creator's public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFault {
    /// `seq` is not the expected next value for the chain.
    SequenceGap,
    /// `prev_hash` does not match the prior event's `this_hash`.
    PrevHashMismatch,
    /// `this_hash` does not equal the hash of the canonical bytes.
    HashMismatch,
    /// The signature does not verify under the creator's public key.
    BadSignature,
}

impl std::fmt::Display for EventFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EventFault::SequenceGap => "sequence gap",
            EventFault::PrevHashMismatch => "prev hash mismatch",
            EventFault::HashMismatch => "hash mismatch",
            EventFault::BadSignature => "bad signature",
        };
        f.write_str(s)
    }
}
