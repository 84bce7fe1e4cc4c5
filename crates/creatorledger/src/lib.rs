//! # CreatorLedger
//!
//! Cryptographic provenance for digital assets. A creator holds an Ed25519
//! signing key; each observable act on an asset is a signed event in a
//! per-creator append-only ledger whose events form a hash chain. A third
//! party given an exported proof bundle can verify the attestation offline
//! with no server.
//!
//! ## Core Invariants
//!
//! 1. **Contiguity**: per creator, `seq` runs 1..N with no gaps
//! 2. **Linkage**: every `prev_hash` equals the prior event's `this_hash`
//! 3. **Authenticity**: every signature verifies under the creator's key
//! 4. **Append-only**: no event is mutated after insertion
//!
//! ## Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use creatorledger::{now_timestamp, Ledger};
//! use creatorledger_core::{CreatorId, DisplayName, EventKind};
//! use creatorledger_store::SqliteStore;
//! use creatorledger_vault::{open_vault, VaultKind};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::open("ledger.db")?;
//! let vault = open_vault(VaultKind::Auto)?;
//! let ledger = Ledger::open(store, vault);
//!
//! let alice = CreatorId::new("alice")?;
//! ledger.mint_creator(alice.clone(), DisplayName::new("Alice")?).await?;
//! let event = ledger
//!     .append(&alice, EventKind::new("register")?, Bytes::from("asset"), now_timestamp())
//!     .await?;
//! let bundle = ledger.export_bundle(&alice, None).await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod ledger;

pub use error::{LedgerError, Result};
pub use ledger::{now_timestamp, ChainStatus, Ledger};
