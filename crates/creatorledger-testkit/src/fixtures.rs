//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a deterministic creator with
//! its seed in a memory vault and its record in a memory store.

use bytes::Bytes;

use creatorledger_core::{
    Creator, CreatorId, DisplayName, EventKind, LedgerEvent, SecretSeed, Sha256Hash,
};
use creatorledger_store::{MemoryStore, Store};
use creatorledger_vault::{MemoryVault, Vault};

/// A test fixture: one creator, a memory store, and a memory vault.
pub struct TestFixture {
    pub creator: Creator,
    pub seed_bytes: [u8; 32],
    pub store: MemoryStore,
    pub vault: MemoryVault,
}

impl TestFixture {
    /// Create a fixture with a deterministic seed.
    pub fn with_seed(seed_bytes: [u8; 32]) -> Self {
        let seed = SecretSeed::from_bytes(seed_bytes);
        let creator = Creator::new(
            CreatorId::new("fixture-creator").unwrap(),
            DisplayName::new("Fixture Creator").unwrap(),
            seed.public_key().unwrap(),
            1_700_000_000,
        );

        let vault = MemoryVault::new();
        vault.store(&creator.creator_id, &seed).unwrap();

        Self {
            creator,
            seed_bytes,
            store: MemoryStore::new(),
            vault,
        }
    }

    /// Create a fixture with a fixed default seed.
    pub fn new() -> Self {
        Self::with_seed([0x42; 32])
    }

    /// Insert the creator row into the fixture's store.
    pub async fn register(&self) {
        self.store.insert_creator(&self.creator).await.unwrap();
    }

    /// Compose a valid chain of `n` events without touching the store.
    pub fn make_chain(&self, n: u64) -> Vec<LedgerEvent> {
        let seed = SecretSeed::from_bytes(self.seed_bytes);
        let mut events = Vec::new();
        let mut prev = Sha256Hash::ZERO;
        for seq in 1..=n {
            let event = LedgerEvent::compose(
                self.creator.creator_id.clone(),
                seq,
                EventKind::new("register").unwrap(),
                Bytes::from(format!("payload-{seq}").into_bytes()),
                1_700_000_000 + seq as i64,
                prev,
                &seed,
            )
            .unwrap();
            prev = event.this_hash;
            events.push(event);
        }
        events
    }

    /// Compose a chain and insert it into the fixture's store.
    pub async fn seed_chain(&self, n: u64) -> Vec<LedgerEvent> {
        let events = self.make_chain(n);
        for event in &events {
            let tip = self.store.get_tip(&self.creator.creator_id).await.unwrap();
            self.store.insert_event(event, tip).await.unwrap();
        }
        events
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple fixtures with distinct deterministic seeds.
pub fn multi_creator_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            TestFixture::with_seed(seed)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_chain_links() {
        let fixture = TestFixture::new();
        let events = fixture.make_chain(3);

        assert_eq!(events[0].prev_hash, Sha256Hash::ZERO);
        assert_eq!(events[1].prev_hash, events[0].this_hash);
        assert_eq!(events[2].prev_hash, events[1].this_hash);
        for event in &events {
            assert!(event.check(&fixture.creator.public_key).is_ok());
        }
    }

    #[tokio::test]
    async fn seeded_chain_lands_in_store() {
        let fixture = TestFixture::new();
        fixture.register().await;
        fixture.seed_chain(4).await;

        let tip = fixture
            .store
            .get_tip(&fixture.creator.creator_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tip.seq, 4);
    }

    #[test]
    fn multi_creator_fixtures_have_distinct_keys() {
        let fixtures = multi_creator_fixtures(3);
        assert_ne!(fixtures[0].creator.public_key, fixtures[1].creator.public_key);
        assert_ne!(fixtures[1].creator.public_key, fixtures[2].creator.public_key);
    }
}
