//! Store trait: the abstract interface for ledger persistence.
//!
//! The engine is storage-agnostic through this trait. Implementations
//! include SQLite (primary) and in-memory (for tests). Both provide the
//! transactional guarantees the append protocol leans on: a conditional
//! insert either lands whole or not at all.

use async_trait::async_trait;
use creatorledger_core::{Creator, CreatorId, LedgerEvent, Sha256Hash};

use crate::error::Result;

/// The highest-seq event of a creator's chain, as read for an append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tip {
    /// Sequence of the newest event.
    pub seq: u64,
    /// `this_hash` of the newest event.
    pub this_hash: Sha256Hash,
    /// Row version of the newest event.
    pub row_version: i64,
}

impl Tip {
    /// The hash the next event must chain from: the tip's own hash, or
    /// zero for an empty chain.
    pub fn chain_hash(tip: Option<&Tip>) -> Sha256Hash {
        tip.map(|t| t.this_hash).unwrap_or(Sha256Hash::ZERO)
    }

    /// The sequence the next event must use.
    pub fn next_seq(tip: Option<&Tip>) -> u64 {
        tip.map(|t| t.seq).unwrap_or(0) + 1
    }
}

/// Result of a conditional event insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// The event row was inserted; it is now the tip.
    Inserted,
    /// The tip no longer matched the caller's observation; nothing was
    /// written. The caller may re-read the tip and retry.
    TipMoved,
}

/// Async interface for ledger persistence.
///
/// SQLite is synchronous under the hood; the implementation moves blocking
/// work off the runtime via `spawn_blocking`.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a creator row. Fails with `CreatorExists` on a duplicate id.
    async fn insert_creator(&self, creator: &Creator) -> Result<()>;

    /// Fetch a creator row by id.
    async fn get_creator(&self, creator_id: &CreatorId) -> Result<Option<Creator>>;

    /// Read the tip of a creator's chain, or `None` when it has no events.
    async fn get_tip(&self, creator_id: &CreatorId) -> Result<Option<Tip>>;

    /// Insert an event conditional on the tip still matching `observed`
    /// (`None` = the chain was observed empty).
    ///
    /// Exactly one of two things happens: the row is inserted and
    /// `Inserted` is returned, or nothing is written and `TipMoved` is
    /// returned. The store never retries on the caller's behalf.
    async fn insert_event(
        &self,
        event: &LedgerEvent,
        observed: Option<Tip>,
    ) -> Result<InsertResult>;

    /// Fetch one event by position.
    async fn get_event(&self, creator_id: &CreatorId, seq: u64) -> Result<Option<LedgerEvent>>;

    /// List events with `from_seq <= seq` (and `seq <= to_seq` when given),
    /// ordered by `seq` ascending.
    async fn list_events(
        &self,
        creator_id: &CreatorId,
        from_seq: u64,
        to_seq: Option<u64>,
    ) -> Result<Vec<LedgerEvent>>;

    /// Number of events in a creator's chain.
    async fn count_events(&self, creator_id: &CreatorId) -> Result<u64>;
}
