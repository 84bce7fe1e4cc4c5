//! Creator identity: id, display name, and the public creator record.
//!
//! All identifiers are validating newtypes so that malformed input is
//! rejected at the boundary, before it can reach a vault path or a SQL
//! parameter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::crypto::Ed25519PublicKey;
use crate::error::CoreError;

/// Maximum length of a creator id in bytes.
pub const MAX_CREATOR_ID_LEN: usize = 64;

/// Maximum length of a display name in bytes.
pub const MAX_DISPLAY_NAME_LEN: usize = 128;

/// Opaque stable identifier of a creator.
///
/// URL-safe and safe as a filename component: `[A-Za-z0-9_-]{1,64}`.
/// Immutable for the lifetime of the creator.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CreatorId(String);

impl CreatorId {
    /// Validate and wrap a creator id.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.is_empty() || id.len() > MAX_CREATOR_ID_LEN {
            return Err(CoreError::InvalidCreatorId(format!(
                "length must be 1..={} bytes, got {}",
                MAX_CREATOR_ID_LEN,
                id.len()
            )));
        }
        if !id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(CoreError::InvalidCreatorId(
                "allowed characters are A-Z a-z 0-9 _ -".into(),
            ));
        }
        Ok(Self(id))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CreatorId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CreatorId {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CreatorId> for String {
    fn from(id: CreatorId) -> Self {
        id.0
    }
}

impl fmt::Display for CreatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for CreatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CreatorId({})", self.0)
    }
}

impl AsRef<str> for CreatorId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Human-readable creator label. Not a key.
///
/// Charset `[A-Za-z0-9 \-_.,!?()@]`, length 1..=128. Treated as
/// append-time immutable.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and wrap a display name.
    pub fn new(name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        if name.is_empty() || name.len() > MAX_DISPLAY_NAME_LEN {
            return Err(CoreError::InvalidDisplayName(format!(
                "length must be 1..={} bytes, got {}",
                MAX_DISPLAY_NAME_LEN,
                name.len()
            )));
        }
        let ok = name.bytes().all(|b| {
            b.is_ascii_alphanumeric() || matches!(b, b' ' | b'-' | b'_' | b'.' | b',' | b'!' | b'?' | b'(' | b')' | b'@')
        });
        if !ok {
            return Err(CoreError::InvalidDisplayName(
                "allowed characters are A-Z a-z 0-9 space - _ . , ! ? ( ) @".into(),
            ));
        }
        Ok(Self(name))
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<DisplayName> for String {
    fn from(name: DisplayName) -> Self {
        name.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DisplayName({})", self.0)
    }
}

/// The public record of a creator: one row, created exactly once.
///
/// `row_version` is reserved for future mutable identity fields and is
/// never consulted today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creator {
    /// Stable identifier.
    pub creator_id: CreatorId,

    /// Human-readable label.
    pub display_name: DisplayName,

    /// The creator's registered public key. Never modified.
    pub public_key: Ed25519PublicKey,

    /// Creation time, UTC seconds since the Unix epoch.
    pub created_at: i64,

    /// Reserved optimistic-concurrency counter.
    pub row_version: i64,
}

impl Creator {
    /// Assemble a new creator record at version 1.
    pub fn new(
        creator_id: CreatorId,
        display_name: DisplayName,
        public_key: Ed25519PublicKey,
        created_at: i64,
    ) -> Self {
        Self {
            creator_id,
            display_name,
            public_key,
            created_at,
            row_version: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creator_id_accepts_charset() {
        for id in ["alice", "alice-2024", "A_b-C", "0", &"x".repeat(64)] {
            assert!(CreatorId::new(id).is_ok(), "{id} should be accepted");
        }
    }

    #[test]
    fn creator_id_rejects_bad_input() {
        for id in ["", "../evil", "a b", "über", "a/b", &"x".repeat(65)] {
            assert!(CreatorId::new(id).is_err(), "{id:?} should be rejected");
        }
    }

    #[test]
    fn creator_id_roundtrips_through_str() {
        let id: CreatorId = "alice_01".parse().unwrap();
        assert_eq!(id.as_str(), "alice_01");
        assert_eq!(id.to_string(), "alice_01");
    }

    #[test]
    fn display_name_accepts_charset() {
        for name in ["Alice", "Alice (photo), v2!", "who? me@example", &"n".repeat(128)] {
            assert!(DisplayName::new(name).is_ok(), "{name} should be accepted");
        }
    }

    #[test]
    fn display_name_rejects_bad_input() {
        for name in ["", "tab\tname", "emoji \u{1F600}", &"n".repeat(129)] {
            assert!(DisplayName::new(name).is_err(), "{name:?} should be rejected");
        }
    }

    #[test]
    fn creator_record_starts_at_version_one() {
        let (public, _seed) = crate::crypto::generate_keypair();
        let creator = Creator::new(
            CreatorId::new("alice").unwrap(),
            DisplayName::new("Alice").unwrap(),
            public,
            1_700_000_000,
        );
        assert_eq!(creator.row_version, 1);
    }

    #[test]
    fn serde_rejects_invalid_id() {
        let parsed: Result<CreatorId, _> = serde_json::from_str("\"../evil\"");
        assert!(parsed.is_err());
    }
}
