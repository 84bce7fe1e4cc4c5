//! The ledger engine: minting creators, appending chained events, reading
//! and verifying chains, exporting proof bundles.
//!
//! Appends are optimistic. The engine reads the tip, composes and signs
//! the next event against it, and asks the store for a conditional insert.
//! A lost race surfaces as [`LedgerError::ConcurrencyConflict`]; the engine
//! never retries internally, so the retry policy (and its backoff under
//! adversarial load) stays with the caller.
//!
//! Every method is an `async fn` whose suspension points are the store and
//! vault awaits; dropping the future between them is the cooperative
//! cancellation surface. An in-flight insert either commits whole or rolls
//! back with the store transaction.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info};

use creatorledger_core::{
    generate_keypair, Creator, CreatorId, DisplayName, EventFault, EventKind, LedgerEvent,
    ProofBundle, SecretSeed,
};
use creatorledger_store::{InsertResult, Store, Tip};
use creatorledger_vault::{Vault, VaultError};

use crate::error::{LedgerError, Result};

/// Outcome of verifying a stored chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStatus {
    /// Every event chains and verifies; `events` is the chain length.
    Valid { events: u64 },
    /// The first offending event and what is wrong with it.
    Broken { seq: u64, fault: EventFault },
}

impl ChainStatus {
    /// Whether the chain verified clean.
    pub fn is_valid(&self) -> bool {
        matches!(self, ChainStatus::Valid { .. })
    }
}

/// The provenance ledger: one hash chain of signed events per creator.
pub struct Ledger<S: Store> {
    store: S,
    vault: Arc<dyn Vault>,
}

impl<S: Store> Ledger<S> {
    /// Open the ledger over an already-migrated store and a vault.
    pub fn open(store: S, vault: Box<dyn Vault>) -> Self {
        info!("ledger opened");
        Self {
            store,
            vault: Arc::from(vault),
        }
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────
    // Creators
    // ─────────────────────────────────────────────────────────────────────

    /// Mint a new creator: generate a keypair, put the seed in the vault,
    /// and create the public creator row. Happens exactly once per id.
    pub async fn mint_creator(
        &self,
        creator_id: CreatorId,
        display_name: DisplayName,
    ) -> Result<Creator> {
        if self.store.get_creator(&creator_id).await?.is_some() {
            return Err(LedgerError::CreatorExists(creator_id));
        }

        let (public_key, seed) = generate_keypair();
        self.vault_store(creator_id.clone(), seed).await?;

        let creator = Creator::new(creator_id, display_name, public_key, now_timestamp());
        self.store.insert_creator(&creator).await?;
        info!(creator_id = %creator.creator_id, "minted creator");
        Ok(creator)
    }

    /// Fetch a creator's public record.
    pub async fn get_creator(&self, creator_id: &CreatorId) -> Result<Option<Creator>> {
        Ok(self.store.get_creator(creator_id).await?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Appending
    // ─────────────────────────────────────────────────────────────────────

    /// Append one event to a creator's chain.
    ///
    /// `timestamp` is caller-claimed, UTC seconds since the Unix epoch;
    /// `payload` is opaque and should be canonicalised by the caller.
    pub async fn append(
        &self,
        creator_id: &CreatorId,
        kind: EventKind,
        payload: Bytes,
        timestamp: i64,
    ) -> Result<LedgerEvent> {
        if self.store.get_creator(creator_id).await?.is_none() {
            return Err(LedgerError::UnknownCreator(creator_id.clone()));
        }

        let tip = self.store.get_tip(creator_id).await?;
        let seq = Tip::next_seq(tip.as_ref());
        let prev_hash = Tip::chain_hash(tip.as_ref());

        let mut seed = self
            .vault_retrieve(creator_id.clone())
            .await?
            .ok_or_else(|| {
                VaultError::Backend(format!("no secret stored for creator {creator_id}"))
            })?;
        let event = LedgerEvent::compose(
            creator_id.clone(),
            seq,
            kind,
            payload,
            timestamp,
            prev_hash,
            &seed,
        );
        seed.release();
        let event = event?;

        match self.store.insert_event(&event, tip).await? {
            InsertResult::Inserted => {
                debug!(creator_id = %creator_id, seq, "appended event");
                Ok(event)
            }
            InsertResult::TipMoved => Err(LedgerError::ConcurrencyConflict),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reading
    // ─────────────────────────────────────────────────────────────────────

    /// Fetch one event by position.
    pub async fn get_event(
        &self,
        creator_id: &CreatorId,
        seq: u64,
    ) -> Result<Option<LedgerEvent>> {
        Ok(self.store.get_event(creator_id, seq).await?)
    }

    /// List events ordered by `seq` ascending, bounded below by `from_seq`
    /// and above by `to_seq` when given. A pure projection of stored state.
    pub async fn list_events(
        &self,
        creator_id: &CreatorId,
        from_seq: u64,
        to_seq: Option<u64>,
    ) -> Result<Vec<LedgerEvent>> {
        Ok(self.store.list_events(creator_id, from_seq, to_seq).await?)
    }

    /// The tip of a creator's chain, or `None` when it has no events.
    pub async fn get_tip(&self, creator_id: &CreatorId) -> Result<Option<Tip>> {
        Ok(self.store.get_tip(creator_id).await?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Verification and export
    // ─────────────────────────────────────────────────────────────────────

    /// Verify the entire stored chain of a creator: contiguous sequences,
    /// intact hash links, and a valid signature on every event.
    pub async fn verify_chain(&self, creator_id: &CreatorId) -> Result<ChainStatus> {
        let creator = self
            .store
            .get_creator(creator_id)
            .await?
            .ok_or_else(|| LedgerError::UnknownCreator(creator_id.clone()))?;

        let events = self.store.list_events(creator_id, 1, None).await?;
        let mut prev: Option<&LedgerEvent> = None;
        for event in &events {
            if let Err(fault) = event.check_linked(prev, &creator.public_key) {
                return Ok(ChainStatus::Broken {
                    seq: event.seq,
                    fault,
                });
            }
            prev = Some(event);
        }
        Ok(ChainStatus::Valid {
            events: events.len() as u64,
        })
    }

    /// Export a proof bundle covering events `1..=through_seq` (or the
    /// whole chain when `through_seq` is `None`).
    pub async fn export_bundle(
        &self,
        creator_id: &CreatorId,
        through_seq: Option<u64>,
    ) -> Result<ProofBundle> {
        let creator = self
            .store
            .get_creator(creator_id)
            .await?
            .ok_or_else(|| LedgerError::UnknownCreator(creator_id.clone()))?;

        let events = self.store.list_events(creator_id, 1, through_seq).await?;
        Ok(ProofBundle::assemble(&creator, &events))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Vault plumbing
    // ─────────────────────────────────────────────────────────────────────

    /// Vault backends may shell out to OS tools; keep them off the runtime.
    async fn vault_store(&self, creator_id: CreatorId, seed: SecretSeed) -> Result<()> {
        let vault = Arc::clone(&self.vault);
        tokio::task::spawn_blocking(move || vault.store(&creator_id, &seed))
            .await
            .map_err(|e| VaultError::Backend(format!("vault task failed: {e}")))??;
        Ok(())
    }

    async fn vault_retrieve(&self, creator_id: CreatorId) -> Result<Option<SecretSeed>> {
        let vault = Arc::clone(&self.vault);
        let seed = tokio::task::spawn_blocking(move || vault.retrieve(&creator_id))
            .await
            .map_err(|e| VaultError::Backend(format!("vault task failed: {e}")))??;
        Ok(seed)
    }
}

/// Current UTC time in seconds since the Unix epoch.
pub fn now_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
