//! # CreatorLedger Store
//!
//! Persistence for the ledger engine: the [`Store`] trait, the SQLite
//! backend, an in-memory test backend, and the schema migration runner.
//!
//! The store is the arbiter of append-time concurrency: an event insert is
//! conditional on the tip the appender observed, enforced inside a
//! transaction with the `(creator_id, seq)` unique index as the final
//! guard. One of N racing appends lands; the rest see
//! [`InsertResult::TipMoved`] and nothing else changes.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use migration::CURRENT_VERSION;
pub use sqlite::SqliteStore;
pub use traits::{InsertResult, Store, Tip};
