//! Cryptographic primitives for CreatorLedger.
//!
//! Wraps Ed25519 signing and SHA-256 hashing with strong types. Signing is
//! deterministic per RFC 8032: the same seed and message always produce the
//! same signature.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

use crate::error::CoreError;

/// Textual prefix of the canonical public-key form.
pub const PUBLIC_KEY_PREFIX: &str = "ed25519:";

/// A 32-byte SHA-256 hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sha256Hash(pub [u8; 32]);

impl Sha256Hash {
    /// Compute the SHA-256 hash of the given data.
    pub fn hash(data: &[u8]) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s).map_err(|_| CoreError::InvalidEncoding("hash is not hex"))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidEncoding("hash must be 32 bytes"))?;
        Ok(Self(arr))
    }

    /// The zero hash: `prev_hash` of the first event in a chain.
    pub const ZERO: Self = Self([0u8; 32]);
}

impl fmt::Debug for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256({})", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Sha256Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Sha256Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// A 32-byte Ed25519 public key.
///
/// Canonical text form is `ed25519:` followed by standard base64 of the
/// 32 raw bytes. Equality is byte equality.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ed25519PublicKey(pub [u8; 32]);

impl Ed25519PublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Canonical text form: `ed25519:<base64>`.
    pub fn to_canonical_string(&self) -> String {
        format!("{}{}", PUBLIC_KEY_PREFIX, BASE64.encode(self.0))
    }

    /// Parse the canonical text form.
    ///
    /// Fails on a wrong prefix, non-base64 content, or a decoded length
    /// other than 32 bytes.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let encoded = s
            .strip_prefix(PUBLIC_KEY_PREFIX)
            .ok_or(CoreError::InvalidEncoding("missing ed25519: prefix"))?;
        let bytes = BASE64
            .decode(encoded)
            .map_err(|_| CoreError::InvalidEncoding("public key is not base64"))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidEncoding("public key must be 32 bytes"))?;
        Ok(Self(arr))
    }

    /// Non-raising form of [`parse`](Self::parse).
    pub fn try_parse(s: &str) -> Option<Self> {
        Self::parse(s).ok()
    }

    /// Verify a signature over a message.
    ///
    /// Returns `false` for an invalid key encoding, an invalid signature,
    /// or a mismatch; it never fails loudly.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.0) else {
            return false;
        };
        let sig = Signature::from_bytes(&signature.0);
        verifying_key.verify(message, &sig).is_ok()
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Pub({})", &hex::encode(self.0)[..16])
    }
}

impl fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl AsRef<[u8]> for Ed25519PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A 64-byte Ed25519 signature.
///
/// The all-zero value is distinguished as "no signature": it encodes to the
/// empty string and parses back from it. On every wire format the canonical
/// text form is used, so no byte-level serde is provided.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature(pub [u8; 64]);

impl Ed25519Signature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Whether this is the distinguished "no signature" value.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Canonical text form: standard base64, or `""` for the zero signature.
    pub fn to_canonical_string(&self) -> String {
        if self.is_zero() {
            String::new()
        } else {
            BASE64.encode(self.0)
        }
    }

    /// Parse the canonical text form.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if s.is_empty() {
            return Ok(Self::ZERO);
        }
        let bytes = BASE64
            .decode(s)
            .map_err(|_| CoreError::InvalidEncoding("signature is not base64"))?;
        let arr: [u8; 64] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidEncoding("signature must be 64 bytes"))?;
        Ok(Self(arr))
    }

    /// Non-raising form of [`parse`](Self::parse).
    pub fn try_parse(s: &str) -> Option<Self> {
        Self::parse(s).ok()
    }

    /// The zero signature ("no signature").
    pub const ZERO: Self = Self([0u8; 64]);
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            write!(f, "Ed25519Sig(zero)")
        } else {
            write!(f, "Ed25519Sig({}...)", &hex::encode(self.0)[..16])
        }
    }
}

impl AsRef<[u8]> for Ed25519Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 64]> for Ed25519Signature {
    fn from(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }
}

/// A creator's 32-byte Ed25519 seed.
///
/// This is secret material. The seed region is zeroed when the value is
/// released or dropped, and every accessor fails with
/// [`CoreError::Lifecycle`] after release. `Debug` redacts.
pub struct SecretSeed {
    seed: [u8; 32],
    released: bool,
}

impl SecretSeed {
    /// Wrap raw seed bytes, taking ownership of the secret.
    pub fn from_bytes(seed: [u8; 32]) -> Self {
        Self {
            seed,
            released: false,
        }
    }

    /// Generate a fresh seed from the OS RNG.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self::from_bytes(signing_key.to_bytes())
    }

    /// Borrow the raw seed bytes.
    pub fn expose(&self) -> Result<&[u8; 32], CoreError> {
        if self.released {
            return Err(CoreError::Lifecycle);
        }
        Ok(&self.seed)
    }

    /// Derive the public key for this seed.
    pub fn public_key(&self) -> Result<Ed25519PublicKey, CoreError> {
        let seed = self.expose()?;
        let signing_key = SigningKey::from_bytes(seed);
        Ok(Ed25519PublicKey(signing_key.verifying_key().to_bytes()))
    }

    /// Sign a message. Deterministic per RFC 8032.
    pub fn sign(&self, message: &[u8]) -> Result<Ed25519Signature, CoreError> {
        let seed = self.expose()?;
        let signing_key = SigningKey::from_bytes(seed);
        Ok(Ed25519Signature(signing_key.sign(message).to_bytes()))
    }

    /// Zero the seed region and mark the value released.
    ///
    /// Idempotent. Subsequent `expose`/`sign`/`public_key` calls fail.
    pub fn release(&mut self) {
        self.seed.zeroize();
        self.released = true;
    }

    /// Whether the seed has been released.
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Drop for SecretSeed {
    fn drop(&mut self) {
        self.seed.zeroize();
    }
}

impl fmt::Debug for SecretSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.released {
            write!(f, "SecretSeed([RELEASED])")
        } else {
            write!(f, "SecretSeed([REDACTED 32 bytes])")
        }
    }
}

/// Generate a new keypair from the OS RNG.
pub fn generate_keypair() -> (Ed25519PublicKey, SecretSeed) {
    let seed = SecretSeed::generate();
    let public = seed
        .public_key()
        .unwrap_or_else(|_| unreachable!("fresh seed is never released"));
    (public, seed)
}
