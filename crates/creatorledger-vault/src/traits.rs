//! The vault trait: one capability set shared by every backend.

use creatorledger_core::{CreatorId, SecretSeed};

use crate::error::Result;

/// Keyed storage for creator secret seeds.
///
/// All four backends share these semantics:
///
/// - `store` replaces an existing slot atomically from the caller's point
///   of view (idempotent).
/// - `retrieve` returns a fresh owned [`SecretSeed`] per call; the caller
///   releases it.
/// - `delete` reports whether a slot existed.
///
/// Backends that shell out to OS tools may block for a while; callers
/// treat every call as potentially long.
pub trait Vault: Send + Sync {
    /// Persist a creator's seed, replacing any existing slot.
    fn store(&self, creator_id: &CreatorId, seed: &SecretSeed) -> Result<()>;

    /// Fetch a creator's seed, or `None` if no slot exists.
    fn retrieve(&self, creator_id: &CreatorId) -> Result<Option<SecretSeed>>;

    /// Remove a creator's slot. Returns whether it existed.
    fn delete(&self, creator_id: &CreatorId) -> Result<bool>;

    /// Whether a slot exists for this creator.
    fn exists(&self, creator_id: &CreatorId) -> Result<bool>;
}
