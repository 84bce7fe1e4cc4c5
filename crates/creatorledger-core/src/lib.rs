//! # CreatorLedger Core
//!
//! Pure primitives for CreatorLedger: keys, identities, events, canonical
//! bytes, and proof bundles.
//!
//! This crate contains no I/O, no storage, no process spawning. It is pure
//! computation over cryptographic data structures.
//!
//! ## Key Types
//!
//! - [`SecretSeed`] / [`Ed25519PublicKey`] - signing key material
//! - [`CreatorId`] / [`DisplayName`] / [`Creator`] - creator identity
//! - [`LedgerEvent`] - one signed, hash-chained ledger record
//! - [`ProofBundle`] - an exportable, offline-verifiable chain prefix
//!
//! ## Canonicalization
//!
//! `this_hash` and the event signature are both computed over the byte
//! string defined in [`canonical`]; producer and verifier must agree on it
//! bit-for-bit.

pub mod bundle;
pub mod canonical;
pub mod crypto;
pub mod error;
pub mod event;
pub mod identity;

pub use bundle::{verify_bundle, verify_bundle_file, BundleEvent, ProofBundle, VerifyOutcome, BUNDLE_VERSION};
pub use canonical::{event_hash, event_signing_bytes, FIELD_SEPARATOR};
pub use crypto::{
    generate_keypair, Ed25519PublicKey, Ed25519Signature, SecretSeed, Sha256Hash,
    PUBLIC_KEY_PREFIX,
};
pub use error::{CoreError, EventFault};
pub use event::{recompute_hash, EventKind, LedgerEvent, MAX_EVENT_KIND_LEN};
pub use identity::{Creator, CreatorId, DisplayName, MAX_CREATOR_ID_LEN, MAX_DISPLAY_NAME_LEN};
