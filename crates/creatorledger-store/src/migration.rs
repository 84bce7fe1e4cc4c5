//! Database schema migrations for SQLite.
//!
//! The backing store owns a single integer `schema_version`. On open, every
//! migration with an id strictly greater than the stored version is applied
//! in ascending order, one transaction per migration. Forward-only; there
//! are no down-migrations.

use rusqlite::Connection;
use tracing::info;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: i64 = 2;

/// Initialize or migrate the database schema.
///
/// Idempotent: calling it on an up-to-date database is a no-op.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
        [],
    )?;

    let stored: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;

    if stored > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {stored} is newer than this build ({CURRENT_VERSION})"
        )));
    }

    for version in (stored + 1)..=CURRENT_VERSION {
        let tx = conn.transaction()?;
        apply_migration(&tx, version)?;
        tx.execute("DELETE FROM schema_version", [])?;
        tx.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            rusqlite::params![version],
        )?;
        tx.commit()?;
        info!(version, "applied schema migration");
    }

    Ok(())
}

fn apply_migration(conn: &Connection, version: i64) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        2 => apply_v2(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {version}"
        ))),
    }
}

/// Migration 001: creators, ledger_events, and their indices.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE creators (
            creator_id TEXT PRIMARY KEY,      -- charset-validated id
            display_name TEXT NOT NULL,
            public_key BLOB NOT NULL,         -- 32 bytes, Ed25519
            created_at INTEGER NOT NULL       -- UTC seconds
        );

        CREATE TABLE ledger_events (
            creator_id TEXT NOT NULL,
            seq INTEGER NOT NULL,             -- 1-based, contiguous per creator
            kind TEXT NOT NULL,
            payload BLOB NOT NULL,
            timestamp INTEGER NOT NULL,       -- UTC seconds, caller-claimed
            prev_hash BLOB NOT NULL,          -- 32 bytes, zero at seq 1
            this_hash BLOB NOT NULL,          -- 32 bytes
            signature BLOB NOT NULL,          -- 64 bytes

            PRIMARY KEY (creator_id, seq)
        );

        CREATE INDEX idx_events_creator ON ledger_events(creator_id);
        CREATE INDEX idx_events_timestamp ON ledger_events(timestamp);
        "#,
    )?;
    Ok(())
}

/// Migration 002: row_version columns and the append-check index.
fn apply_v2(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        ALTER TABLE creators ADD COLUMN row_version INTEGER NOT NULL DEFAULT 1;
        ALTER TABLE ledger_events ADD COLUMN row_version INTEGER NOT NULL DEFAULT 1;

        CREATE INDEX idx_events_append_check
            ON ledger_events(creator_id, seq, row_version);
        "#,
    )?;
    Ok(())
}
