//! Ledger events: one signed, hash-chained record per observable act.
//!
//! An event is immutable once created. Changes to an asset are represented
//! as further events, never as edits.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::canonical::{event_hash, event_signing_bytes, FIELD_SEPARATOR};
use crate::crypto::{Ed25519PublicKey, Ed25519Signature, SecretSeed, Sha256Hash};
use crate::error::{CoreError, EventFault};
use crate::identity::CreatorId;

/// Maximum length of an event kind in bytes.
pub const MAX_EVENT_KIND_LEN: usize = 64;

/// Opaque short string naming the event category.
///
/// Must not contain the `0x1F` byte, which terminates the kind field in
/// the canonical byte layout.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventKind(String);

impl EventKind {
    /// Validate and wrap an event kind.
    pub fn new(kind: impl Into<String>) -> Result<Self, CoreError> {
        let kind = kind.into();
        if kind.is_empty() || kind.len() > MAX_EVENT_KIND_LEN {
            return Err(CoreError::InvalidEventKind(format!(
                "length must be 1..={} bytes, got {}",
                MAX_EVENT_KIND_LEN,
                kind.len()
            )));
        }
        if kind.bytes().any(|b| b == FIELD_SEPARATOR) {
            return Err(CoreError::InvalidEventKind(
                "kind must not contain the 0x1F separator".into(),
            ));
        }
        Ok(Self(kind))
    }

    /// The kind as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EventKind {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.0
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventKind({})", self.0)
    }
}

/// One signed, chained record in a creator's ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEvent {
    /// Owner of the ledger this event belongs to.
    pub creator_id: CreatorId,

    /// 1-based position in the creator's chain. Contiguous, no gaps.
    pub seq: u64,

    /// Event category.
    pub kind: EventKind,

    /// Opaque payload, canonicalised by the caller before appending.
    pub payload: Bytes,

    /// Caller-claimed time, UTC seconds since the Unix epoch.
    pub timestamp: i64,

    /// `this_hash` of the event at `seq - 1`, or zero for `seq = 1`.
    pub prev_hash: Sha256Hash,

    /// SHA-256 of the canonical signing bytes.
    pub this_hash: Sha256Hash,

    /// Ed25519 signature over the same canonical bytes.
    pub signature: Ed25519Signature,

    /// Optimistic-concurrency counter carried by the stored row.
    pub row_version: i64,
}

impl LedgerEvent {
    /// Compose and sign a new event from its parts.
    ///
    /// Computes the canonical bytes once and derives both `this_hash` and
    /// the signature from them.
    pub fn compose(
        creator_id: CreatorId,
        seq: u64,
        kind: EventKind,
        payload: Bytes,
        timestamp: i64,
        prev_hash: Sha256Hash,
        seed: &SecretSeed,
    ) -> Result<Self, CoreError> {
        let bytes =
            event_signing_bytes(&creator_id, seq, &kind, timestamp, &prev_hash, &payload);
        let this_hash = Sha256Hash::hash(&bytes);
        let signature = seed.sign(&bytes)?;
        Ok(Self {
            creator_id,
            seq,
            kind,
            payload,
            timestamp,
            prev_hash,
            this_hash,
            signature,
            row_version: 1,
        })
    }

    /// The canonical bytes this event was hashed and signed over.
    pub fn signing_bytes(&self) -> Vec<u8> {
        event_signing_bytes(
            &self.creator_id,
            self.seq,
            &self.kind,
            self.timestamp,
            &self.prev_hash,
            &self.payload,
        )
    }

    /// Whether this is the first event of a chain.
    pub fn is_first(&self) -> bool {
        self.seq == 1
    }

    /// Check this event in isolation: recompute `this_hash` and verify the
    /// signature under the creator's public key.
    pub fn check(&self, public_key: &Ed25519PublicKey) -> Result<(), EventFault> {
        let bytes = self.signing_bytes();
        if !public_key.verify(&bytes, &self.signature) {
            return Err(EventFault::BadSignature);
        }
        if Sha256Hash::hash(&bytes) != self.this_hash {
            return Err(EventFault::HashMismatch);
        }
        Ok(())
    }

    /// Check this event in chain context: `seq` must follow the previous
    /// event, `prev_hash` must link to it, and [`check`](Self::check) must
    /// pass.
    ///
    /// `prev` is `None` for the head of the chain.
    pub fn check_linked(
        &self,
        prev: Option<&LedgerEvent>,
        public_key: &Ed25519PublicKey,
    ) -> Result<(), EventFault> {
        match prev {
            None => {
                if self.seq != 1 {
                    return Err(EventFault::SequenceGap);
                }
                if self.prev_hash != Sha256Hash::ZERO {
                    return Err(EventFault::PrevHashMismatch);
                }
            }
            Some(prev) => {
                if self.seq != prev.seq + 1 {
                    return Err(EventFault::SequenceGap);
                }
                if self.prev_hash != prev.this_hash {
                    return Err(EventFault::PrevHashMismatch);
                }
            }
        }
        self.check(public_key)
    }
}

/// Recompute the expected hash of an event's canonical bytes.
pub fn recompute_hash(event: &LedgerEvent) -> Sha256Hash {
    event_hash(
        &event.creator_id,
        event.seq,
        &event.kind,
        event.timestamp,
        &event.prev_hash,
        &event.payload,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::generate_keypair;

    fn compose_first(seed: &SecretSeed) -> LedgerEvent {
        LedgerEvent::compose(
            CreatorId::new("alice").unwrap(),
            1,
            EventKind::new("register").unwrap(),
            Bytes::from_static(b"asset-1"),
            1_700_000_000,
            Sha256Hash::ZERO,
            seed,
        )
        .unwrap()
    }

    #[test]
    fn event_kind_rejects_separator_and_empty() {
        assert!(EventKind::new("register").is_ok());
        assert!(EventKind::new("").is_err());
        assert!(EventKind::new("a\u{1F}b").is_err());
        assert!(EventKind::new("k".repeat(65)).is_err());
    }

    #[test]
    fn composed_event_checks_clean() {
        let (public, seed) = generate_keypair();
        let event = compose_first(&seed);

        assert!(event.is_first());
        assert_eq!(event.prev_hash, Sha256Hash::ZERO);
        assert_eq!(event.this_hash, recompute_hash(&event));
        assert!(event.check(&public).is_ok());
        assert!(event.check_linked(None, &public).is_ok());
    }

    #[test]
    fn chained_event_links_to_previous() {
        let (public, seed) = generate_keypair();
        let first = compose_first(&seed);
        let second = LedgerEvent::compose(
            first.creator_id.clone(),
            2,
            EventKind::new("transfer").unwrap(),
            Bytes::from_static(b"to-bob"),
            1_700_000_100,
            first.this_hash,
            &seed,
        )
        .unwrap();

        assert!(second.check_linked(Some(&first), &public).is_ok());
    }

    #[test]
    fn tampered_payload_fails_signature() {
        let (public, seed) = generate_keypair();
        let mut event = compose_first(&seed);
        event.payload = Bytes::from_static(b"asset-2");

        assert_eq!(event.check(&public), Err(EventFault::BadSignature));
    }

    #[test]
    fn wrong_seq_is_a_gap() {
        let (public, seed) = generate_keypair();
        let first = compose_first(&seed);
        let third = LedgerEvent::compose(
            first.creator_id.clone(),
            3,
            EventKind::new("transfer").unwrap(),
            Bytes::new(),
            1_700_000_100,
            first.this_hash,
            &seed,
        )
        .unwrap();

        assert_eq!(
            third.check_linked(Some(&first), &public),
            Err(EventFault::SequenceGap)
        );
    }

    #[test]
    fn broken_link_is_detected() {
        let (public, seed) = generate_keypair();
        let first = compose_first(&seed);
        let second = LedgerEvent::compose(
            first.creator_id.clone(),
            2,
            EventKind::new("transfer").unwrap(),
            Bytes::new(),
            1_700_000_100,
            Sha256Hash::hash(b"unrelated"),
            &seed,
        )
        .unwrap();

        assert_eq!(
            second.check_linked(Some(&first), &public),
            Err(EventFault::PrevHashMismatch)
        );
    }

    #[test]
    fn first_event_must_use_zero_prev_hash() {
        let (public, seed) = generate_keypair();
        let event = LedgerEvent::compose(
            CreatorId::new("alice").unwrap(),
            1,
            EventKind::new("register").unwrap(),
            Bytes::new(),
            0,
            Sha256Hash::hash(b"nonzero"),
            &seed,
        )
        .unwrap();

        assert_eq!(
            event.check_linked(None, &public),
            Err(EventFault::PrevHashMismatch)
        );
    }

    #[test]
    fn released_seed_cannot_compose() {
        let (_public, mut seed) = generate_keypair();
        seed.release();
        let result = LedgerEvent::compose(
            CreatorId::new("alice").unwrap(),
            1,
            EventKind::new("register").unwrap(),
            Bytes::new(),
            0,
            Sha256Hash::ZERO,
            &seed,
        );
        assert!(matches!(result, Err(CoreError::Lifecycle)));
    }
}
