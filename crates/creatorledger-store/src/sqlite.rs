//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via `tokio::spawn_blocking`. The conditional
//! insert runs inside a transaction that re-reads the tip, with the
//! `(creator_id, seq)` primary key as the final arbiter against races.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};

use creatorledger_core::{
    Creator, CreatorId, DisplayName, Ed25519PublicKey, Ed25519Signature, EventKind, LedgerEvent,
    Sha256Hash,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{InsertResult, Store, Tip};

/// SQLite-based store.
///
/// Thread-safe via an internal mutex; all operations run on the blocking
/// pool so the async runtime is never stalled by SQLite.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (and migrate) a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open (and migrate) an in-memory database. Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the locked connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = lock(&conn)?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(format!("blocking task failed: {e}"))))?
    }
}

fn lock(conn: &Arc<Mutex<Connection>>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| StoreError::InvalidData("connection mutex poisoned".into()))
}

fn blob_to_array<const N: usize>(bytes: Vec<u8>, what: &str) -> Result<[u8; N]> {
    bytes
        .try_into()
        .map_err(|_| StoreError::InvalidData(format!("{what} has the wrong length")))
}

fn row_to_event(row: &rusqlite::Row<'_>) -> Result<LedgerEvent> {
    let creator_id: String = row.get("creator_id").map_err(StoreError::from)?;
    let seq: i64 = row.get("seq").map_err(StoreError::from)?;
    let kind: String = row.get("kind").map_err(StoreError::from)?;
    let payload: Vec<u8> = row.get("payload").map_err(StoreError::from)?;
    let timestamp: i64 = row.get("timestamp").map_err(StoreError::from)?;
    let prev_hash: Vec<u8> = row.get("prev_hash").map_err(StoreError::from)?;
    let this_hash: Vec<u8> = row.get("this_hash").map_err(StoreError::from)?;
    let signature: Vec<u8> = row.get("signature").map_err(StoreError::from)?;
    let row_version: i64 = row.get("row_version").map_err(StoreError::from)?;

    Ok(LedgerEvent {
        creator_id: CreatorId::new(creator_id)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?,
        seq: seq as u64,
        kind: EventKind::new(kind).map_err(|e| StoreError::InvalidData(e.to_string()))?,
        payload: Bytes::from(payload),
        timestamp,
        prev_hash: Sha256Hash::from_bytes(blob_to_array(prev_hash, "prev_hash")?),
        this_hash: Sha256Hash::from_bytes(blob_to_array(this_hash, "this_hash")?),
        signature: Ed25519Signature::from_bytes(blob_to_array(signature, "signature")?),
        row_version,
    })
}

fn row_to_creator(row: &rusqlite::Row<'_>) -> Result<Creator> {
    let creator_id: String = row.get("creator_id").map_err(StoreError::from)?;
    let display_name: String = row.get("display_name").map_err(StoreError::from)?;
    let public_key: Vec<u8> = row.get("public_key").map_err(StoreError::from)?;
    let created_at: i64 = row.get("created_at").map_err(StoreError::from)?;
    let row_version: i64 = row.get("row_version").map_err(StoreError::from)?;

    Ok(Creator {
        creator_id: CreatorId::new(creator_id)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?,
        display_name: DisplayName::new(display_name)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?,
        public_key: Ed25519PublicKey::from_bytes(blob_to_array(public_key, "public_key")?),
        created_at,
        row_version,
    })
}

fn read_tip(conn: &Connection, creator_id: &CreatorId) -> Result<Option<Tip>> {
    let row: Option<(i64, Vec<u8>, i64)> = conn
        .query_row(
            "SELECT seq, this_hash, row_version FROM ledger_events
             WHERE creator_id = ?1 ORDER BY seq DESC LIMIT 1",
            params![creator_id.as_str()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;

    match row {
        None => Ok(None),
        Some((seq, hash, row_version)) => Ok(Some(Tip {
            seq: seq as u64,
            this_hash: Sha256Hash::from_bytes(blob_to_array(hash, "this_hash")?),
            row_version,
        })),
    }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_creator(&self, creator: &Creator) -> Result<()> {
        let creator = creator.clone();
        self.with_conn(move |conn| {
            let result = conn.execute(
                "INSERT INTO creators (creator_id, display_name, public_key, created_at, row_version)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    creator.creator_id.as_str(),
                    creator.display_name.as_str(),
                    creator.public_key.as_bytes().as_slice(),
                    creator.created_at,
                    creator.row_version,
                ],
            );
            match result {
                Ok(_) => Ok(()),
                Err(e) if is_constraint_violation(&e) => {
                    Err(StoreError::CreatorExists(creator.creator_id.to_string()))
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn get_creator(&self, creator_id: &CreatorId) -> Result<Option<Creator>> {
        let creator_id = creator_id.clone();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT creator_id, display_name, public_key, created_at, row_version
                 FROM creators WHERE creator_id = ?1",
            )?;
            let mut rows = stmt.query(params![creator_id.as_str()])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_creator(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    async fn get_tip(&self, creator_id: &CreatorId) -> Result<Option<Tip>> {
        let creator_id = creator_id.clone();
        self.with_conn(move |conn| read_tip(conn, &creator_id)).await
    }

    async fn insert_event(
        &self,
        event: &LedgerEvent,
        observed: Option<Tip>,
    ) -> Result<InsertResult> {
        let event = event.clone();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;

            // The tip must still be exactly what the caller composed
            // against; anything else means another appender won.
            let current = read_tip(&tx, &event.creator_id)?;
            let matches = match (&current, &observed) {
                (None, None) => true,
                (Some(c), Some(o)) => c.seq == o.seq && c.row_version == o.row_version,
                _ => false,
            };
            if !matches {
                return Ok(InsertResult::TipMoved);
            }

            let result = tx.execute(
                "INSERT INTO ledger_events
                 (creator_id, seq, kind, payload, timestamp, prev_hash, this_hash, signature, row_version)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    event.creator_id.as_str(),
                    event.seq as i64,
                    event.kind.as_str(),
                    event.payload.as_ref(),
                    event.timestamp,
                    event.prev_hash.as_bytes().as_slice(),
                    event.this_hash.as_bytes().as_slice(),
                    event.signature.as_bytes().as_slice(),
                    event.row_version,
                ],
            );
            match result {
                Ok(_) => {}
                // The unique index is the last line of defence when two
                // appends race past the tip re-read.
                Err(e) if is_constraint_violation(&e) => return Ok(InsertResult::TipMoved),
                Err(e) => return Err(e.into()),
            }

            tx.commit()?;
            Ok(InsertResult::Inserted)
        })
        .await
    }

    async fn get_event(&self, creator_id: &CreatorId, seq: u64) -> Result<Option<LedgerEvent>> {
        let creator_id = creator_id.clone();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT creator_id, seq, kind, payload, timestamp, prev_hash, this_hash,
                        signature, row_version
                 FROM ledger_events WHERE creator_id = ?1 AND seq = ?2",
            )?;
            let mut rows = stmt.query(params![creator_id.as_str(), seq as i64])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_event(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    async fn list_events(
        &self,
        creator_id: &CreatorId,
        from_seq: u64,
        to_seq: Option<u64>,
    ) -> Result<Vec<LedgerEvent>> {
        let creator_id = creator_id.clone();
        self.with_conn(move |conn| {
            let upper = to_seq.map(|s| s as i64).unwrap_or(i64::MAX);
            let mut stmt = conn.prepare(
                "SELECT creator_id, seq, kind, payload, timestamp, prev_hash, this_hash,
                        signature, row_version
                 FROM ledger_events
                 WHERE creator_id = ?1 AND seq >= ?2 AND seq <= ?3
                 ORDER BY seq",
            )?;
            let mut rows = stmt.query(params![creator_id.as_str(), from_seq as i64, upper])?;
            let mut events = Vec::new();
            while let Some(row) = rows.next()? {
                events.push(row_to_event(row)?);
            }
            Ok(events)
        })
        .await
    }

    async fn count_events(&self, creator_id: &CreatorId) -> Result<u64> {
        let creator_id = creator_id.clone();
        self.with_conn(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM ledger_events WHERE creator_id = ?1",
                params![creator_id.as_str()],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
        .await
    }
}
