//! macOS vault backend delegating to the login keychain via the
//! `security` CLI.
//!
//! Entries are keyed on `(service = "CreatorLedger", account = creator_id)`
//! with the seed base64-encoded. `security` reports "not found" as exit
//! code 44, which is "absent" here rather than a failure.

use std::process::Command;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use creatorledger_core::{CreatorId, SecretSeed};

use crate::error::{Result, VaultError};
use crate::traits::Vault;
use crate::SERVICE_NAME;

/// `security` exit code for "the specified item could not be found".
const NOT_FOUND_EXIT: i32 = 44;

/// Vault backed by the macOS keychain.
pub struct KeychainVault {
    _private: (),
}

impl KeychainVault {
    /// Construct the vault. Fails with `PlatformNotSupported` off macOS;
    /// `security` itself ships with the OS.
    pub fn new() -> Result<Self> {
        if !cfg!(target_os = "macos") {
            return Err(VaultError::PlatformNotSupported(
                "keychain vault is macOS-only",
            ));
        }
        Ok(Self { _private: () })
    }
}

impl Vault for KeychainVault {
    fn store(&self, creator_id: &CreatorId, seed: &SecretSeed) -> Result<()> {
        let encoded = BASE64.encode(seed.expose()?);

        // -U updates in place when the item already exists.
        let output = Command::new("security")
            .args([
                "add-generic-password",
                "-s",
                SERVICE_NAME,
                "-a",
                creator_id.as_str(),
                "-w",
                encoded.as_str(),
                "-U",
            ])
            .output()
            .map_err(backend_error)?;
        if !output.status.success() {
            return Err(fold_failure("security add-generic-password", &output.stderr));
        }
        Ok(())
    }

    fn retrieve(&self, creator_id: &CreatorId) -> Result<Option<SecretSeed>> {
        let output = Command::new("security")
            .args([
                "find-generic-password",
                "-s",
                SERVICE_NAME,
                "-a",
                creator_id.as_str(),
                "-w",
            ])
            .output()
            .map_err(backend_error)?;

        if output.status.code() == Some(NOT_FOUND_EXIT) {
            return Ok(None);
        }
        if !output.status.success() {
            return Err(fold_failure("security find-generic-password", &output.stderr));
        }

        let encoded = String::from_utf8(output.stdout)
            .map_err(|_| VaultError::Backend("security returned non-UTF-8 output".into()))?;
        let bytes = BASE64
            .decode(encoded.trim_end())
            .map_err(|_| VaultError::Backend("stored secret is not base64".into()))?;
        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| VaultError::Backend("stored secret is not 32 bytes".into()))?;
        Ok(Some(SecretSeed::from_bytes(seed)))
    }

    fn delete(&self, creator_id: &CreatorId) -> Result<bool> {
        let output = Command::new("security")
            .args([
                "delete-generic-password",
                "-s",
                SERVICE_NAME,
                "-a",
                creator_id.as_str(),
            ])
            .output()
            .map_err(backend_error)?;

        if output.status.code() == Some(NOT_FOUND_EXIT) {
            return Ok(false);
        }
        if !output.status.success() {
            return Err(fold_failure("security delete-generic-password", &output.stderr));
        }
        Ok(true)
    }

    fn exists(&self, creator_id: &CreatorId) -> Result<bool> {
        let output = Command::new("security")
            .args([
                "find-generic-password",
                "-s",
                SERVICE_NAME,
                "-a",
                creator_id.as_str(),
            ])
            .output()
            .map_err(backend_error)?;

        if output.status.code() == Some(NOT_FOUND_EXIT) {
            return Ok(false);
        }
        if !output.status.success() {
            return Err(fold_failure("security find-generic-password", &output.stderr));
        }
        Ok(true)
    }
}

fn backend_error(e: std::io::Error) -> VaultError {
    VaultError::Backend(format!("security invocation failed: {e}"))
}

/// Fold captured stderr into a short reason; never propagate it verbatim.
fn fold_failure(what: &str, stderr: &[u8]) -> VaultError {
    let reason = String::from_utf8_lossy(stderr);
    let reason = reason.lines().next().unwrap_or("no diagnostic output");
    VaultError::Backend(format!("{what} failed: {reason}"))
}
