//! Linux vault backend delegating to the freedesktop secret service via
//! the `secret-tool` CLI.
//!
//! Entries are keyed on `(service = "CreatorLedger", account = creator_id)`
//! and the 32-byte seed travels base64-encoded. Commands are always built
//! as argument arrays; creator ids are already charset-restricted but are
//! never interpolated into a shell line regardless.

use std::io::Write;
use std::process::{Command, Stdio};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use creatorledger_core::{CreatorId, SecretSeed};

use crate::error::{Result, VaultError};
use crate::traits::Vault;
use crate::SERVICE_NAME;

/// Vault backed by `secret-tool` on the Linux secret service.
pub struct SecretToolVault {
    _private: (),
}

impl SecretToolVault {
    /// Probe for `secret-tool` and construct the vault.
    ///
    /// Fails with `PlatformNotSupported` off Linux or when the binary is
    /// not on PATH.
    pub fn new() -> Result<Self> {
        if !cfg!(target_os = "linux") {
            return Err(VaultError::PlatformNotSupported(
                "secret-tool vault is Linux-only",
            ));
        }
        let probe = Command::new("secret-tool")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match probe {
            Ok(_) => Ok(Self { _private: () }),
            Err(_) => Err(VaultError::PlatformNotSupported(
                "secret-tool is not on PATH",
            )),
        }
    }
}

impl Vault for SecretToolVault {
    fn store(&self, creator_id: &CreatorId, seed: &SecretSeed) -> Result<()> {
        let encoded = BASE64.encode(seed.expose()?);

        let mut child = Command::new("secret-tool")
            .args([
                "store",
                "--label",
                SERVICE_NAME,
                "service",
                SERVICE_NAME,
                "account",
                creator_id.as_str(),
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(backend_error)?;

        child
            .stdin
            .take()
            .ok_or_else(|| VaultError::Backend("secret-tool stdin unavailable".into()))?
            .write_all(encoded.as_bytes())
            .map_err(backend_error)?;

        let output = child.wait_with_output().map_err(backend_error)?;
        if !output.status.success() {
            return Err(fold_failure("secret-tool store", &output.stderr));
        }
        Ok(())
    }

    fn retrieve(&self, creator_id: &CreatorId) -> Result<Option<SecretSeed>> {
        let output = Command::new("secret-tool")
            .args(["lookup", "service", SERVICE_NAME, "account", creator_id.as_str()])
            .output()
            .map_err(backend_error)?;

        if !output.status.success() {
            // lookup exits non-zero when no matching secret exists.
            return Ok(None);
        }

        let encoded = String::from_utf8(output.stdout)
            .map_err(|_| VaultError::Backend("secret-tool returned non-UTF-8 output".into()))?;
        let bytes = BASE64
            .decode(encoded.trim_end())
            .map_err(|_| VaultError::Backend("stored secret is not base64".into()))?;
        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| VaultError::Backend("stored secret is not 32 bytes".into()))?;
        Ok(Some(SecretSeed::from_bytes(seed)))
    }

    fn delete(&self, creator_id: &CreatorId) -> Result<bool> {
        if !self.exists(creator_id)? {
            return Ok(false);
        }
        let output = Command::new("secret-tool")
            .args(["clear", "service", SERVICE_NAME, "account", creator_id.as_str()])
            .output()
            .map_err(backend_error)?;
        if !output.status.success() {
            return Err(fold_failure("secret-tool clear", &output.stderr));
        }
        Ok(true)
    }

    fn exists(&self, creator_id: &CreatorId) -> Result<bool> {
        let output = Command::new("secret-tool")
            .args(["lookup", "service", SERVICE_NAME, "account", creator_id.as_str()])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(backend_error)?;
        Ok(output.status.success())
    }
}

fn backend_error(e: std::io::Error) -> VaultError {
    VaultError::Backend(format!("secret-tool invocation failed: {e}"))
}

/// Fold captured stderr into a short reason; never propagate it verbatim.
fn fold_failure(what: &str, stderr: &[u8]) -> VaultError {
    let reason = String::from_utf8_lossy(stderr);
    let reason = reason.lines().next().unwrap_or("no diagnostic output");
    VaultError::Backend(format!("{what} failed: {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(target_os = "linux"))]
    #[test]
    fn construction_fails_off_linux() {
        assert!(matches!(
            SecretToolVault::new(),
            Err(VaultError::PlatformNotSupported(_))
        ));
    }

    #[test]
    fn fold_failure_keeps_first_line_only() {
        let err = fold_failure("secret-tool store", b"line one\nline two\n");
        let msg = err.to_string();
        assert!(msg.contains("line one"));
        assert!(!msg.contains("line two"));
    }
}
