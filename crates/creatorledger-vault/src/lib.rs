//! # CreatorLedger Vault
//!
//! OS-protected storage for creator secret seeds.
//!
//! Four backends share the [`Vault`] capability set:
//!
//! - [`FileVault`] - DPAPI-encrypted key files (Windows)
//! - [`SecretToolVault`] - freedesktop secret service (Linux)
//! - [`KeychainVault`] - login keychain (macOS)
//! - [`MemoryVault`] - in-process map, NOT SECURE, for tests and CI
//!
//! [`open_vault`] routes `Auto` by the current OS with `MemoryVault` as
//! the explicit fallback for unknown platforms.

mod factory;
mod file;
mod keychain;
mod memory;
mod secret_tool;

pub mod error;
pub mod traits;

pub use error::{Result, VaultError};
pub use factory::{open_vault, VaultKind};
pub use file::{ensure_contained, FileVault};
pub use keychain::KeychainVault;
pub use memory::MemoryVault;
pub use secret_tool::SecretToolVault;
pub use traits::Vault;

/// Logical service name under which every backend files its entries.
pub const SERVICE_NAME: &str = "CreatorLedger";
