//! Canonical byte serialisation for ledger events.
//!
//! Both `this_hash` and the event signature are computed over exactly the
//! byte string produced here. Producer and verifier must agree on it
//! bit-for-bit; any deviation invalidates the chain.
//!
//! Layout, concatenated with no other delimiters:
//!
//! 1. `creator_id` UTF-8 bytes, terminated by `0x1F`
//! 2. `seq` as u64 big-endian
//! 3. `kind` UTF-8 bytes, terminated by `0x1F`
//! 4. `timestamp` as i64 big-endian
//! 5. `prev_hash` as 32 raw bytes
//! 6. `payload` length as u64 big-endian, then the payload bytes
//!
//! The `0x1F` unit separator cannot appear inside `creator_id` (charset)
//! or `kind` (validated at construction), so the framing is unambiguous.

use crate::crypto::Sha256Hash;
use crate::event::EventKind;
use crate::identity::CreatorId;

/// Field terminator for the variable-length string fields.
pub const FIELD_SEPARATOR: u8 = 0x1F;

/// Build the canonical byte string that is hashed and signed for an event.
pub fn event_signing_bytes(
    creator_id: &CreatorId,
    seq: u64,
    kind: &EventKind,
    timestamp: i64,
    prev_hash: &Sha256Hash,
    payload: &[u8],
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(
        creator_id.as_str().len() + kind.as_str().len() + payload.len() + 58,
    );
    buf.extend_from_slice(creator_id.as_str().as_bytes());
    buf.push(FIELD_SEPARATOR);
    buf.extend_from_slice(&seq.to_be_bytes());
    buf.extend_from_slice(kind.as_str().as_bytes());
    buf.push(FIELD_SEPARATOR);
    buf.extend_from_slice(&timestamp.to_be_bytes());
    buf.extend_from_slice(prev_hash.as_bytes());
    buf.extend_from_slice(&(payload.len() as u64).to_be_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// Hash of the canonical bytes: the event's `this_hash`.
pub fn event_hash(
    creator_id: &CreatorId,
    seq: u64,
    kind: &EventKind,
    timestamp: i64,
    prev_hash: &Sha256Hash,
    payload: &[u8],
) -> Sha256Hash {
    Sha256Hash::hash(&event_signing_bytes(
        creator_id, seq, kind, timestamp, prev_hash, payload,
    ))
}
