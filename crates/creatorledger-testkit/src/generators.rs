//! Proptest generators for property-based testing.

use bytes::Bytes;
use proptest::prelude::*;

use creatorledger_core::{
    CreatorId, DisplayName, EventKind, LedgerEvent, SecretSeed, Sha256Hash,
};

/// Generate a random 32-byte seed.
pub fn seed() -> impl Strategy<Value = [u8; 32]> {
    any::<[u8; 32]>()
}

/// Generate a valid creator id.
pub fn creator_id() -> impl Strategy<Value = CreatorId> {
    "[a-z][a-z0-9_-]{0,31}".prop_map(|s| CreatorId::new(s).expect("generated id is valid"))
}

/// Generate a valid display name.
pub fn display_name() -> impl Strategy<Value = DisplayName> {
    "[A-Za-z0-9][A-Za-z0-9 _.,!?()@-]{0,63}"
        .prop_map(|s| DisplayName::new(s).expect("generated name is valid"))
}

/// Generate a valid event kind.
pub fn event_kind() -> impl Strategy<Value = EventKind> {
    "[a-z][a-z0-9._-]{0,31}".prop_map(|s| EventKind::new(s).expect("generated kind is valid"))
}

/// Generate payload bytes up to `max_len`.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a plausible timestamp (UTC seconds).
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=4_102_444_800 // through 2100
}

/// Parameters for generating one event.
#[derive(Debug, Clone)]
pub struct EventParams {
    pub seed: [u8; 32],
    pub creator_id: CreatorId,
    pub seq: u64,
    pub kind: EventKind,
    pub timestamp: i64,
    pub payload: Vec<u8>,
    pub prev_hash: [u8; 32],
}

impl Arbitrary for EventParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            seed(),
            creator_id(),
            1u64..=1000u64,
            event_kind(),
            timestamp(),
            payload(1000),
            any::<[u8; 32]>(),
        )
            .prop_map(
                |(seed, creator_id, seq, kind, timestamp, payload, prev_hash)| EventParams {
                    seed,
                    creator_id,
                    seq,
                    kind,
                    timestamp,
                    payload,
                    prev_hash,
                },
            )
            .boxed()
    }
}

/// Compose a signed event from parameters.
pub fn event_from_params(params: &EventParams) -> LedgerEvent {
    let seed = SecretSeed::from_bytes(params.seed);
    LedgerEvent::compose(
        params.creator_id.clone(),
        params.seq,
        params.kind.clone(),
        Bytes::from(params.payload.clone()),
        params.timestamp,
        Sha256Hash::from_bytes(params.prev_hash),
        &seed,
    )
    .expect("fresh seed signs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use creatorledger_core::{Ed25519PublicKey, Ed25519Signature};

    proptest! {
        #[test]
        fn sign_verify_roundtrip(seed_bytes in seed(), message in payload(512)) {
            let secret = SecretSeed::from_bytes(seed_bytes);
            let public = secret.public_key().unwrap();
            let signature = secret.sign(&message).unwrap();

            prop_assert!(public.verify(&message, &signature));
        }

        #[test]
        fn any_bit_flip_breaks_verification(
            seed_bytes in seed(),
            message in payload(64),
            bit in 0usize..512,
        ) {
            let secret = SecretSeed::from_bytes(seed_bytes);
            let public = secret.public_key().unwrap();
            let signature = secret.sign(&message).unwrap();

            let mut sig = *signature.as_bytes();
            sig[bit / 8] ^= 1 << (bit % 8);
            prop_assert!(!public.verify(&message, &Ed25519Signature::from_bytes(sig)));
        }

        #[test]
        fn tampered_message_breaks_verification(
            seed_bytes in seed(),
            message in prop::collection::vec(any::<u8>(), 1..=64),
            index in 0usize..64,
        ) {
            prop_assume!(index < message.len());
            let secret = SecretSeed::from_bytes(seed_bytes);
            let public = secret.public_key().unwrap();
            let signature = secret.sign(&message).unwrap();

            let mut tampered = message.clone();
            tampered[index] ^= 0x01;
            prop_assert!(!public.verify(&tampered, &signature));
        }

        #[test]
        fn public_key_text_roundtrip(seed_bytes in seed()) {
            let secret = SecretSeed::from_bytes(seed_bytes);
            let public = secret.public_key().unwrap();

            let parsed = Ed25519PublicKey::parse(&public.to_canonical_string()).unwrap();
            prop_assert_eq!(parsed, public);
        }

        #[test]
        fn signature_text_roundtrip(seed_bytes in seed(), message in payload(64)) {
            let secret = SecretSeed::from_bytes(seed_bytes);
            let signature = secret.sign(&message).unwrap();

            let parsed = Ed25519Signature::parse(&signature.to_canonical_string()).unwrap();
            prop_assert_eq!(parsed, signature);
        }

        #[test]
        fn event_composition_is_deterministic(params: EventParams) {
            let a = event_from_params(&params);
            let b = event_from_params(&params);

            prop_assert_eq!(a.this_hash, b.this_hash);
            prop_assert_eq!(a.signature, b.signature);
        }

        #[test]
        fn different_payloads_hash_differently(
            params: EventParams,
            extra in 1u8..=255,
        ) {
            let a = event_from_params(&params);

            let mut changed = params.clone();
            changed.payload.push(extra);
            let b = event_from_params(&changed);

            prop_assert_ne!(a.this_hash, b.this_hash);
        }
    }
}
