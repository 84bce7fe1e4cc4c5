//! In-memory implementation of the Store trait.
//!
//! Test-only backend with the same observable semantics as SQLite:
//! conditional inserts against the observed tip, uniqueness of
//! `(creator_id, seq)`, ordered reads. No persistence.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use creatorledger_core::{Creator, CreatorId, LedgerEvent};

use crate::error::{Result, StoreError};
use crate::traits::{InsertResult, Store, Tip};

/// In-memory store. All data is lost on drop.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    creators: HashMap<CreatorId, Creator>,
    /// Events per creator, kept sorted by `seq` (they only ever append).
    events: HashMap<CreatorId, Vec<LedgerEvent>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn tip_of(events: &[LedgerEvent]) -> Option<Tip> {
    events.last().map(|e| Tip {
        seq: e.seq,
        this_hash: e.this_hash,
        row_version: e.row_version,
    })
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_creator(&self, creator: &Creator) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| StoreError::InvalidData("store lock poisoned".into()))?;
        if inner.creators.contains_key(&creator.creator_id) {
            return Err(StoreError::CreatorExists(creator.creator_id.to_string()));
        }
        inner
            .creators
            .insert(creator.creator_id.clone(), creator.clone());
        Ok(())
    }

    async fn get_creator(&self, creator_id: &CreatorId) -> Result<Option<Creator>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::InvalidData("store lock poisoned".into()))?;
        Ok(inner.creators.get(creator_id).cloned())
    }

    async fn get_tip(&self, creator_id: &CreatorId) -> Result<Option<Tip>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::InvalidData("store lock poisoned".into()))?;
        Ok(inner.events.get(creator_id).and_then(|e| tip_of(e)))
    }

    async fn insert_event(
        &self,
        event: &LedgerEvent,
        observed: Option<Tip>,
    ) -> Result<InsertResult> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| StoreError::InvalidData("store lock poisoned".into()))?;

        let chain = inner.events.entry(event.creator_id.clone()).or_default();
        let current = tip_of(chain);
        let matches = match (&current, &observed) {
            (None, None) => true,
            (Some(c), Some(o)) => c.seq == o.seq && c.row_version == o.row_version,
            _ => false,
        };
        if !matches || chain.iter().any(|e| e.seq == event.seq) {
            return Ok(InsertResult::TipMoved);
        }

        chain.push(event.clone());
        Ok(InsertResult::Inserted)
    }

    async fn get_event(&self, creator_id: &CreatorId, seq: u64) -> Result<Option<LedgerEvent>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::InvalidData("store lock poisoned".into()))?;
        Ok(inner
            .events
            .get(creator_id)
            .and_then(|chain| chain.iter().find(|e| e.seq == seq).cloned()))
    }

    async fn list_events(
        &self,
        creator_id: &CreatorId,
        from_seq: u64,
        to_seq: Option<u64>,
    ) -> Result<Vec<LedgerEvent>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::InvalidData("store lock poisoned".into()))?;
        let upper = to_seq.unwrap_or(u64::MAX);
        Ok(inner
            .events
            .get(creator_id)
            .map(|chain| {
                chain
                    .iter()
                    .filter(|e| e.seq >= from_seq && e.seq <= upper)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn count_events(&self, creator_id: &CreatorId) -> Result<u64> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::InvalidData("store lock poisoned".into()))?;
        Ok(inner.events.get(creator_id).map(|c| c.len() as u64).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use creatorledger_core::{generate_keypair, EventKind, SecretSeed, Sha256Hash};

    fn make_event(seed: &SecretSeed, seq: u64, prev: Sha256Hash) -> LedgerEvent {
        LedgerEvent::compose(
            CreatorId::new("alice").unwrap(),
            seq,
            EventKind::new("register").unwrap(),
            Bytes::from_static(b"payload"),
            1_700_000_000,
            prev,
            seed,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn conditional_insert_semantics_match_sqlite() {
        let store = MemoryStore::new();
        let (_public, seed) = generate_keypair();
        let id = CreatorId::new("alice").unwrap();

        let first = make_event(&seed, 1, Sha256Hash::ZERO);
        assert_eq!(
            store.insert_event(&first, None).await.unwrap(),
            InsertResult::Inserted
        );

        // Stale observation loses without writing.
        let rival = make_event(&seed, 1, Sha256Hash::ZERO);
        assert_eq!(
            store.insert_event(&rival, None).await.unwrap(),
            InsertResult::TipMoved
        );
        assert_eq!(store.count_events(&id).await.unwrap(), 1);

        // Fresh observation wins.
        let tip = store.get_tip(&id).await.unwrap();
        let second = make_event(&seed, 2, first.this_hash);
        assert_eq!(
            store.insert_event(&second, tip).await.unwrap(),
            InsertResult::Inserted
        );
        assert_eq!(store.get_tip(&id).await.unwrap().unwrap().seq, 2);
    }
}
