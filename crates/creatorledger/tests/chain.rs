//! Engine integration tests: minting, appending, chain invariants.

use bytes::Bytes;
use creatorledger::{ChainStatus, Ledger, LedgerError};
use creatorledger_core::{CreatorId, DisplayName, EventFault, EventKind, Sha256Hash};
use creatorledger_store::{MemoryStore, SqliteStore, Store};
use creatorledger_vault::MemoryVault;

fn memory_ledger() -> Ledger<MemoryStore> {
    Ledger::open(MemoryStore::new(), Box::new(MemoryVault::new()))
}

fn sqlite_ledger() -> Ledger<SqliteStore> {
    Ledger::open(
        SqliteStore::open_memory().unwrap(),
        Box::new(MemoryVault::new()),
    )
}

async fn mint_alice<S: Store>(ledger: &Ledger<S>) -> CreatorId {
    let id = CreatorId::new("alice").unwrap();
    ledger
        .mint_creator(id.clone(), DisplayName::new("Alice").unwrap())
        .await
        .unwrap();
    id
}

#[tokio::test]
async fn first_append_starts_the_chain() {
    let ledger = memory_ledger();
    let alice = mint_alice(&ledger).await;

    let event = ledger
        .append(
            &alice,
            EventKind::new("register").unwrap(),
            Bytes::from_static(b"asset-1"),
            1_700_000_000,
        )
        .await
        .unwrap();

    assert_eq!(event.seq, 1);
    assert_eq!(event.prev_hash, Sha256Hash::ZERO);
    assert_ne!(event.this_hash, Sha256Hash::ZERO);
    assert!(!event.signature.is_zero());

    let creator = ledger.get_creator(&alice).await.unwrap().unwrap();
    assert!(event.check(&creator.public_key).is_ok());
}

#[tokio::test]
async fn second_append_links_to_the_first() {
    let ledger = memory_ledger();
    let alice = mint_alice(&ledger).await;

    let first = ledger
        .append(
            &alice,
            EventKind::new("register").unwrap(),
            Bytes::from_static(b"asset-1"),
            1_700_000_000,
        )
        .await
        .unwrap();
    let second = ledger
        .append(
            &alice,
            EventKind::new("transfer").unwrap(),
            Bytes::from_static(b"to-bob"),
            1_700_000_100,
        )
        .await
        .unwrap();

    assert_eq!(second.seq, 2);
    assert_eq!(second.prev_hash, first.this_hash);
}

#[tokio::test]
async fn chain_invariants_hold_after_many_appends() {
    let ledger = sqlite_ledger();
    let alice = mint_alice(&ledger).await;

    for i in 0..10u64 {
        ledger
            .append(
                &alice,
                EventKind::new("update").unwrap(),
                Bytes::from(format!("rev-{i}").into_bytes()),
                1_700_000_000 + i as i64,
            )
            .await
            .unwrap();
    }

    // I1: contiguous 1..=10
    let events = ledger.list_events(&alice, 1, None).await.unwrap();
    let seqs: Vec<u64> = events.iter().map(|e| e.seq).collect();
    assert_eq!(seqs, (1..=10).collect::<Vec<_>>());

    // I2 + I3 via the engine's own verifier
    assert_eq!(
        ledger.verify_chain(&alice).await.unwrap(),
        ChainStatus::Valid { events: 10 }
    );
}

#[tokio::test]
async fn identical_payloads_back_to_back_are_allowed() {
    let ledger = memory_ledger();
    let alice = mint_alice(&ledger).await;

    for _ in 0..2 {
        ledger
            .append(
                &alice,
                EventKind::new("ping").unwrap(),
                Bytes::from_static(b"same"),
                1_700_000_000,
            )
            .await
            .unwrap();
    }

    let events = ledger.list_events(&alice, 1, None).await.unwrap();
    assert_eq!(events.len(), 2);
    // Same (kind, payload, timestamp), different hashes: seq and prev_hash
    // feed the canonical bytes.
    assert_ne!(events[0].this_hash, events[1].this_hash);
}

#[tokio::test]
async fn append_to_unknown_creator_fails() {
    let ledger = memory_ledger();
    let ghost = CreatorId::new("ghost").unwrap();

    let result = ledger
        .append(
            &ghost,
            EventKind::new("register").unwrap(),
            Bytes::new(),
            1_700_000_000,
        )
        .await;
    assert!(matches!(result, Err(LedgerError::UnknownCreator(_))));
}

#[tokio::test]
async fn minting_twice_fails() {
    let ledger = memory_ledger();
    let alice = mint_alice(&ledger).await;

    let result = ledger
        .mint_creator(alice, DisplayName::new("Alice Again").unwrap())
        .await;
    assert!(matches!(result, Err(LedgerError::CreatorExists(_))));
}

#[tokio::test]
async fn verify_chain_flags_a_tampered_row() {
    // Tamper below the engine: write a bad event straight into the store.
    let fixture = creatorledger_testkit::TestFixture::new();
    fixture.store.insert_creator(&fixture.creator).await.unwrap();

    let mut events = fixture.make_chain(3);
    events[1].payload = Bytes::from_static(b"tampered");
    for event in &events {
        let tip = fixture.store.get_tip(&fixture.creator.creator_id).await.unwrap();
        fixture.store.insert_event(event, tip).await.unwrap();
    }

    let ledger = Ledger::open(fixture.store, Box::new(MemoryVault::new()));
    let status = ledger
        .verify_chain(&fixture.creator.creator_id)
        .await
        .unwrap();
    assert_eq!(
        status,
        ChainStatus::Broken {
            seq: 2,
            fault: EventFault::BadSignature
        }
    );
}

#[tokio::test]
async fn reads_are_pure_projections() {
    let ledger = memory_ledger();
    let alice = mint_alice(&ledger).await;

    for i in 0..5u64 {
        ledger
            .append(
                &alice,
                EventKind::new("update").unwrap(),
                Bytes::new(),
                1_700_000_000 + i as i64,
            )
            .await
            .unwrap();
    }

    let window_a = ledger.list_events(&alice, 2, Some(4)).await.unwrap();
    let window_b = ledger.list_events(&alice, 2, Some(4)).await.unwrap();
    assert_eq!(window_a, window_b);
    assert_eq!(window_a.iter().map(|e| e.seq).collect::<Vec<_>>(), vec![2, 3, 4]);

    assert!(ledger.get_event(&alice, 3).await.unwrap().is_some());
    assert!(ledger.get_event(&alice, 99).await.unwrap().is_none());
}
