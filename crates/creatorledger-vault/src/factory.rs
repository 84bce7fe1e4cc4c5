//! Vault selection: explicit backend requests and OS auto-routing.

use tracing::warn;

use crate::error::{Result, VaultError};
use crate::file::FileVault;
use crate::keychain::KeychainVault;
use crate::memory::MemoryVault;
use crate::secret_tool::SecretToolVault;
use crate::traits::Vault;

/// Which vault backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultKind {
    /// Route by the current operating system.
    Auto,
    /// DPAPI-encrypted key files (Windows).
    File,
    /// freedesktop secret service via `secret-tool` (Linux).
    SecretTool,
    /// Login keychain via `security` (macOS).
    Keychain,
    /// In-process map. NOT SECURE; tests and headless CI.
    Memory,
}

/// Open the requested vault backend.
///
/// An explicit request for a backend that does not match the running OS
/// fails with `PlatformNotSupported`. `Auto` picks the OS-native backend
/// and falls back to [`MemoryVault`] (with a warning) on an unknown OS or
/// when the Linux secret service tooling is missing.
pub fn open_vault(kind: VaultKind) -> Result<Box<dyn Vault>> {
    match kind {
        VaultKind::Memory => Ok(Box::new(MemoryVault::new())),
        VaultKind::File => {
            if !cfg!(target_os = "windows") {
                return Err(VaultError::PlatformNotSupported(
                    "file vault is Windows-only",
                ));
            }
            Ok(Box::new(FileVault::new()?))
        }
        VaultKind::SecretTool => Ok(Box::new(SecretToolVault::new()?)),
        VaultKind::Keychain => Ok(Box::new(KeychainVault::new()?)),
        VaultKind::Auto => open_auto(),
    }
}

fn open_auto() -> Result<Box<dyn Vault>> {
    match std::env::consts::OS {
        "windows" => Ok(Box::new(FileVault::new()?)),
        "macos" => Ok(Box::new(KeychainVault::new()?)),
        "linux" => match SecretToolVault::new() {
            Ok(vault) => Ok(Box::new(vault)),
            Err(e) => {
                warn!(error = %e, "secret service unavailable, falling back to in-memory vault");
                Ok(Box::new(MemoryVault::new()))
            }
        },
        other => {
            warn!(os = other, "unknown OS, falling back to in-memory vault");
            Ok(Box::new(MemoryVault::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_is_always_available() {
        assert!(open_vault(VaultKind::Memory).is_ok());
    }

    #[test]
    fn auto_always_yields_some_vault_or_a_platform_error() {
        // On any OS, Auto either opens the native backend or falls back
        // to memory; it never panics.
        let result = open_vault(VaultKind::Auto);
        if let Err(e) = result {
            assert!(matches!(e, VaultError::PlatformNotSupported(_)));
        }
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn explicit_file_vault_requires_windows() {
        assert!(matches!(
            open_vault(VaultKind::File),
            Err(VaultError::PlatformNotSupported(_))
        ));
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn explicit_keychain_requires_macos() {
        assert!(matches!(
            open_vault(VaultKind::Keychain),
            Err(VaultError::PlatformNotSupported(_))
        ));
    }
}
