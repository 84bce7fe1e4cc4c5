//! End-to-end proof-bundle tests: export from the engine, verify offline.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use creatorledger::Ledger;
use creatorledger_core::{
    verify_bundle, verify_bundle_file, CreatorId, DisplayName, EventKind, VerifyOutcome,
};
use creatorledger_store::MemoryStore;
use creatorledger_vault::MemoryVault;

async fn ledger_with_three_events() -> (Ledger<MemoryStore>, CreatorId) {
    let ledger = Ledger::open(MemoryStore::new(), Box::new(MemoryVault::new()));
    let alice = CreatorId::new("alice").unwrap();
    ledger
        .mint_creator(alice.clone(), DisplayName::new("Alice").unwrap())
        .await
        .unwrap();
    for (i, kind) in ["register", "transfer", "revoke"].iter().enumerate() {
        ledger
            .append(
                &alice,
                EventKind::new(*kind).unwrap(),
                Bytes::from(format!("payload-{i}").into_bytes()),
                1_700_000_000 + i as i64,
            )
            .await
            .unwrap();
    }
    (ledger, alice)
}

#[tokio::test]
async fn exported_bundle_verifies_offline() {
    let (ledger, alice) = ledger_with_three_events().await;
    let bundle = ledger.export_bundle(&alice, None).await.unwrap();

    assert_eq!(bundle.events.len(), 3);
    assert_eq!(verify_bundle(&bundle.to_bytes()), VerifyOutcome::Ok);
}

#[tokio::test]
async fn bundle_export_respects_through_seq() {
    let (ledger, alice) = ledger_with_three_events().await;
    let bundle = ledger.export_bundle(&alice, Some(2)).await.unwrap();

    assert_eq!(bundle.events.len(), 2);
    assert_eq!(verify_bundle(&bundle.to_bytes()), VerifyOutcome::Ok);
}

#[tokio::test]
async fn mutated_event_payload_is_flagged_at_its_seq() {
    let (ledger, alice) = ledger_with_three_events().await;
    let mut bundle = ledger.export_bundle(&alice, None).await.unwrap();

    let mut payload = BASE64.decode(&bundle.events[1].payload).unwrap();
    payload[0] ^= 0x01;
    bundle.events[1].payload = BASE64.encode(&payload);

    assert_eq!(
        verify_bundle(&bundle.to_bytes()),
        VerifyOutcome::BadSignature(2)
    );
}

#[tokio::test]
async fn swapped_events_are_flagged_as_broken_chain() {
    let (ledger, alice) = ledger_with_three_events().await;
    let mut bundle = ledger.export_bundle(&alice, None).await.unwrap();
    bundle.events.swap(1, 2);

    assert_eq!(
        verify_bundle(&bundle.to_bytes()),
        VerifyOutcome::BrokenChain(2)
    );
}

#[tokio::test]
async fn bundle_survives_a_filesystem_roundtrip() {
    let (ledger, alice) = ledger_with_three_events().await;
    let bundle = ledger.export_bundle(&alice, None).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alice.bundle.json");
    std::fs::write(&path, bundle.to_bytes()).unwrap();

    assert_eq!(verify_bundle_file(&path), VerifyOutcome::Ok);
    assert_eq!(
        verify_bundle_file(dir.path().join("missing.json")),
        VerifyOutcome::InvalidInput
    );
}

#[tokio::test]
async fn two_exports_are_byte_identical() {
    let (ledger, alice) = ledger_with_three_events().await;
    let a = ledger.export_bundle(&alice, None).await.unwrap().to_bytes();
    let b = ledger.export_bundle(&alice, None).await.unwrap().to_bytes();
    assert_eq!(a, b);
}
