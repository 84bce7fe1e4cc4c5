//! In-process vault backend.
//!
//! NOT SECURE: seeds live in ordinary process memory and do not persist.
//! This backend exists for tests, headless CI, and as the factory's
//! fallback on platforms without a usable credential store.

use std::collections::HashMap;
use std::sync::RwLock;

use creatorledger_core::{CreatorId, SecretSeed};
use zeroize::Zeroizing;

use crate::error::{Result, VaultError};
use crate::traits::Vault;

/// In-memory vault. Keys are lost when the value is dropped.
#[derive(Default)]
pub struct MemoryVault {
    slots: RwLock<HashMap<CreatorId, Zeroizing<[u8; 32]>>>,
}

impl MemoryVault {
    /// Create a new empty in-memory vault.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Vault for MemoryVault {
    fn store(&self, creator_id: &CreatorId, seed: &SecretSeed) -> Result<()> {
        let bytes = *seed.expose()?;
        let mut slots = self
            .slots
            .write()
            .map_err(|_| VaultError::Backend("vault lock poisoned".into()))?;
        slots.insert(creator_id.clone(), Zeroizing::new(bytes));
        Ok(())
    }

    fn retrieve(&self, creator_id: &CreatorId) -> Result<Option<SecretSeed>> {
        let slots = self
            .slots
            .read()
            .map_err(|_| VaultError::Backend("vault lock poisoned".into()))?;
        Ok(slots
            .get(creator_id)
            .map(|bytes| SecretSeed::from_bytes(**bytes)))
    }

    fn delete(&self, creator_id: &CreatorId) -> Result<bool> {
        let mut slots = self
            .slots
            .write()
            .map_err(|_| VaultError::Backend("vault lock poisoned".into()))?;
        Ok(slots.remove(creator_id).is_some())
    }

    fn exists(&self, creator_id: &CreatorId) -> Result<bool> {
        let slots = self
            .slots
            .read()
            .map_err(|_| VaultError::Backend("vault lock poisoned".into()))?;
        Ok(slots.contains_key(creator_id))
    }
}
