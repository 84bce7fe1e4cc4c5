//! Proof bundles: self-contained, offline-verifiable exports of a prefix
//! of a creator's chain.
//!
//! The wire format is JSON. Field order is fixed by struct declaration
//! order (which `serde_json` preserves), numbers are plain JSON integers,
//! `payload` and `signature` are standard base64, hashes are lowercase hex,
//! and the public key uses its canonical `ed25519:` form. That choice is
//! fixed: two exports of the same chain prefix are byte-identical.
//!
//! Verification is a pure function of the bundle bytes and the embedded
//! public key. It has no dependency on the ledger engine, storage, or the
//! vault.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::canonical::event_signing_bytes;
use crate::crypto::{Ed25519PublicKey, Ed25519Signature, Sha256Hash};
use crate::event::{EventKind, LedgerEvent};
use crate::identity::{Creator, CreatorId, DisplayName};

/// Current bundle format version.
pub const BUNDLE_VERSION: u32 = 1;

/// One event as carried on the bundle wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleEvent {
    pub seq: u64,
    pub kind: String,
    /// Standard base64 of the payload bytes.
    pub payload: String,
    pub timestamp: i64,
    /// Lowercase hex of the 32 prev-hash bytes.
    pub prev_hash: String,
    /// Lowercase hex of the 32 this-hash bytes.
    pub this_hash: String,
    /// Standard base64 of the 64 signature bytes.
    pub signature: String,
}

impl BundleEvent {
    fn from_event(event: &LedgerEvent) -> Self {
        Self {
            seq: event.seq,
            kind: event.kind.as_str().to_string(),
            payload: BASE64.encode(&event.payload),
            timestamp: event.timestamp,
            prev_hash: event.prev_hash.to_hex(),
            this_hash: event.this_hash.to_hex(),
            signature: event.signature.to_canonical_string(),
        }
    }
}

/// A packaged attestation: creator identity plus events `1..=N`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBundle {
    pub bundle_version: u32,
    pub creator_id: String,
    pub display_name: String,
    /// Canonical `ed25519:<base64>` form.
    pub public_key: String,
    pub events: Vec<BundleEvent>,
}

impl ProofBundle {
    /// Assemble a bundle from a creator record and its ordered events.
    pub fn assemble(creator: &Creator, events: &[LedgerEvent]) -> Self {
        Self {
            bundle_version: BUNDLE_VERSION,
            creator_id: creator.creator_id.as_str().to_string(),
            display_name: creator.display_name.as_str().to_string(),
            public_key: creator.public_key.to_canonical_string(),
            events: events.iter().map(BundleEvent::from_event).collect(),
        }
    }

    /// Serialise to the stable wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_else(|_| {
            unreachable!("bundle serialisation has no failure modes")
        })
    }
}

/// Outcome of verifying a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Every event parses, chains, and verifies.
    Ok,
    /// The bundle source does not exist (e.g. missing file).
    InvalidInput,
    /// The signature at `seq` does not verify under the bundle's key.
    BadSignature(u64),
    /// The chain linkage breaks at `seq`.
    BrokenChain(u64),
    /// The bytes are not a well-formed bundle.
    MalformedBundle(String),
}

impl VerifyOutcome {
    /// Whether the bundle verified clean.
    pub fn is_ok(&self) -> bool {
        matches!(self, VerifyOutcome::Ok)
    }
}

impl fmt::Display for VerifyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyOutcome::Ok => f.write_str("ok"),
            VerifyOutcome::InvalidInput => f.write_str("invalid input"),
            VerifyOutcome::BadSignature(seq) => write!(f, "bad signature at seq {seq}"),
            VerifyOutcome::BrokenChain(seq) => write!(f, "broken chain at seq {seq}"),
            VerifyOutcome::MalformedBundle(reason) => write!(f, "malformed bundle: {reason}"),
        }
    }
}

/// Verify a bundle from its raw bytes.
pub fn verify_bundle(bytes: &[u8]) -> VerifyOutcome {
    let bundle: ProofBundle = match serde_json::from_slice(bytes) {
        Ok(b) => b,
        Err(e) => return VerifyOutcome::MalformedBundle(e.to_string()),
    };
    verify_parsed(&bundle)
}

/// Verify a bundle read from the filesystem.
///
/// A missing path is `InvalidInput`; unreadable or malformed content goes
/// through the same normalisation as [`verify_bundle`].
pub fn verify_bundle_file(path: impl AsRef<Path>) -> VerifyOutcome {
    let path = path.as_ref();
    if !path.exists() {
        return VerifyOutcome::InvalidInput;
    }
    match std::fs::read(path) {
        Ok(bytes) => verify_bundle(&bytes),
        Err(e) => VerifyOutcome::MalformedBundle(format!("unreadable bundle: {e}")),
    }
}

fn verify_parsed(bundle: &ProofBundle) -> VerifyOutcome {
    if bundle.bundle_version != BUNDLE_VERSION {
        return VerifyOutcome::MalformedBundle(format!(
            "unsupported bundle_version {}",
            bundle.bundle_version
        ));
    }

    let creator_id = match CreatorId::new(bundle.creator_id.clone()) {
        Ok(id) => id,
        Err(e) => return VerifyOutcome::MalformedBundle(e.to_string()),
    };
    if let Err(e) = DisplayName::new(bundle.display_name.clone()) {
        return VerifyOutcome::MalformedBundle(e.to_string());
    }
    let public_key = match Ed25519PublicKey::parse(&bundle.public_key) {
        Ok(pk) => pk,
        Err(e) => return VerifyOutcome::MalformedBundle(e.to_string()),
    };

    let mut prior_hash = Sha256Hash::ZERO;
    for (index, wire) in bundle.events.iter().enumerate() {
        let expected_seq = index as u64 + 1;
        if wire.seq != expected_seq {
            return VerifyOutcome::BrokenChain(expected_seq);
        }

        let kind = match EventKind::new(wire.kind.clone()) {
            Ok(k) => k,
            Err(e) => return VerifyOutcome::MalformedBundle(e.to_string()),
        };
        let payload = match BASE64.decode(&wire.payload) {
            Ok(p) => p,
            Err(_) => {
                return VerifyOutcome::MalformedBundle(format!(
                    "payload at seq {} is not base64",
                    wire.seq
                ))
            }
        };
        let prev_hash = match Sha256Hash::from_hex(&wire.prev_hash) {
            Ok(h) => h,
            Err(e) => return VerifyOutcome::MalformedBundle(e.to_string()),
        };
        let this_hash = match Sha256Hash::from_hex(&wire.this_hash) {
            Ok(h) => h,
            Err(e) => return VerifyOutcome::MalformedBundle(e.to_string()),
        };
        let signature = match Ed25519Signature::parse(&wire.signature) {
            Ok(s) => s,
            Err(e) => return VerifyOutcome::MalformedBundle(e.to_string()),
        };

        // Linkage against the stored hashes: zero at the head, then each
        // event must point at its predecessor.
        if prev_hash != prior_hash {
            return VerifyOutcome::BrokenChain(wire.seq);
        }

        let bytes = event_signing_bytes(
            &creator_id,
            wire.seq,
            &kind,
            wire.timestamp,
            &prev_hash,
            &payload,
        );
        if !public_key.verify(&bytes, &signature) {
            return VerifyOutcome::BadSignature(wire.seq);
        }
        // A valid signature over bytes whose hash differs from the stored
        // this_hash means the hash field itself was tampered with, which
        // breaks what the next event links against.
        if Sha256Hash::hash(&bytes) != this_hash {
            return VerifyOutcome::BrokenChain(wire.seq);
        }

        prior_hash = this_hash;
    }

    VerifyOutcome::Ok
}
