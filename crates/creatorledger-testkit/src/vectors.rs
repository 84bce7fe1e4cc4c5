//! RFC 8032 §7.1 test vectors.
//!
//! Any Ed25519 implementation backing this system must reproduce these
//! published seeds, public keys, and signatures bit-for-bit. Signing is
//! deterministic, so the check is exact equality, not just verification.

use creatorledger_core::{Ed25519PublicKey, Ed25519Signature, SecretSeed};

/// One RFC 8032 test vector: all fields hex, exactly as published.
#[derive(Debug, Clone)]
pub struct Rfc8032Vector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// 32-byte secret seed.
    pub seed: &'static str,
    /// 32-byte public key derived from the seed.
    pub public_key: &'static str,
    /// Message bytes (may be empty).
    pub message: &'static str,
    /// 64-byte signature over the message.
    pub signature: &'static str,
}

/// The three §7.1 vectors: empty message, one byte, two bytes.
pub fn all_vectors() -> Vec<Rfc8032Vector> {
    vec![
        Rfc8032Vector {
            name: "TEST 1 (empty message)",
            seed: "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60",
            public_key: "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a",
            message: "",
            signature: "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e065224901555fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b",
        },
        Rfc8032Vector {
            name: "TEST 2 (one byte)",
            seed: "4ccd089b28ff96da9db6c346ec114e0f5b8a319f35aba624da8cf6ed4fb8a6fb",
            public_key: "3d4017c3e843895a92b70aa74d1b7ebc9c982ccf2ec4968cc0cd55f12af4660c",
            message: "72",
            signature: "92a009a9f0d4cab8720e820b5f642540a2b27b5416503f8fb3762223ebdb69da085ac1e43e15996e458f3613d0f11d8c387b2eaeb4302aeeb00d291612bb0c00",
        },
        Rfc8032Vector {
            name: "TEST 3 (two bytes)",
            seed: "c5aa8df43f9f837bedb7442f31dcb7b166d38535076f094b85ce3a2e0b4458f7",
            public_key: "fc51cd8e6218a1a38da47ed00230f0580816ed13ba3303ac5deb911548908025",
            message: "af82",
            signature: "6291d657deec24024827e69c3abe01a30ce548a284743a445e3680d7db5ac3ac18ff9b538d16f290ae67f760984dc6594a7c15e9716ed28dc027beceea1ec40a",
        },
    ]
}

fn decode32(s: &str) -> [u8; 32] {
    let bytes = hex::decode(s).expect("vector hex");
    bytes.try_into().expect("vector is 32 bytes")
}

/// Run one vector: derive the public key, sign the message, and compare
/// both against the published values. Also checks that `verify` accepts
/// the published signature.
pub fn check_vector(vector: &Rfc8032Vector) -> bool {
    let seed = SecretSeed::from_bytes(decode32(vector.seed));
    let expected_public = Ed25519PublicKey::from_bytes(decode32(vector.public_key));
    let message = hex::decode(vector.message).expect("vector hex");

    let Ok(public) = seed.public_key() else {
        return false;
    };
    let Ok(signature) = seed.sign(&message) else {
        return false;
    };

    public == expected_public
        && hex::encode(signature.as_bytes()) == vector.signature
        && expected_public.verify(&message, &signature)
}

/// Check every vector, returning `(name, passed)` pairs.
pub fn verify_all_vectors() -> Vec<(&'static str, bool)> {
    all_vectors()
        .iter()
        .map(|v| (v.name, check_vector(v)))
        .collect()
}
