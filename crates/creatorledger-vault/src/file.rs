//! File-backed vault using Windows user-scoped data protection.
//!
//! Each seed is encrypted with DPAPI (`CryptProtectData`, user scope) and
//! written to `{base}/{creator_id}.key`. The `CreatorId` charset already
//! rules out path separators, but containment of the resolved path inside
//! the base directory is checked again before any I/O.
//!
//! The path arithmetic is portable and unit-tested on every OS; only the
//! protect/unprotect calls are Windows-specific.

use std::fs;
use std::path::{Component, Path, PathBuf};

use creatorledger_core::{CreatorId, SecretSeed};

use crate::error::{Result, VaultError};
use crate::traits::Vault;

/// File-backed vault rooted at a base directory.
pub struct FileVault {
    base: PathBuf,
}

impl FileVault {
    /// Open a vault at the default per-user local data directory.
    pub fn new() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("io", "CreatorLedger", "CreatorLedger")
            .ok_or(VaultError::PlatformNotSupported(
                "no per-user data directory on this platform",
            ))?;
        Self::with_base(dirs.data_local_dir().join("keys"))
    }

    /// Open a vault at an injected base directory.
    pub fn with_base(base: impl Into<PathBuf>) -> Result<Self> {
        let base = base.into();
        fs::create_dir_all(&base)?;
        Ok(Self { base })
    }

    /// The base directory this vault writes under.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Resolve the key file path for a creator, enforcing containment.
    fn key_path(&self, creator_id: &CreatorId) -> Result<PathBuf> {
        let candidate = self.base.join(format!("{}.key", creator_id.as_str()));
        ensure_contained(&self.base, &candidate)?;
        Ok(candidate)
    }
}

impl Vault for FileVault {
    fn store(&self, creator_id: &CreatorId, seed: &SecretSeed) -> Result<()> {
        let path = self.key_path(creator_id)?;
        let ciphertext = dpapi::protect(seed.expose()?)?;

        // Write-then-rename so a concurrent reader never sees a torn file.
        let tmp = path.with_extension("key.tmp");
        fs::write(&tmp, &ciphertext)?;
        restrict_permissions(&tmp)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn retrieve(&self, creator_id: &CreatorId) -> Result<Option<SecretSeed>> {
        let path = self.key_path(creator_id)?;
        let ciphertext = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let plaintext = dpapi::unprotect(&ciphertext)?;
        let seed: [u8; 32] = plaintext
            .as_slice()
            .try_into()
            .map_err(|_| VaultError::Backend("key file did not decrypt to 32 bytes".into()))?;
        Ok(Some(SecretSeed::from_bytes(seed)))
    }

    fn delete(&self, creator_id: &CreatorId) -> Result<bool> {
        let path = self.key_path(creator_id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, creator_id: &CreatorId) -> Result<bool> {
        Ok(self.key_path(creator_id)?.exists())
    }
}

/// Reject `candidate` unless its normalised form lies inside the
/// normalised `base`.
///
/// Purely lexical: the key file does not exist yet on the store path, so
/// the check cannot rely on `canonicalize`.
pub fn ensure_contained(base: &Path, candidate: &Path) -> Result<()> {
    let base = lexical_normalize(base);
    let candidate = lexical_normalize(candidate);
    if candidate.starts_with(&base) && candidate != base {
        Ok(())
    } else {
        Err(VaultError::PathTraversal(candidate.display().to_string()))
    }
}

/// Collapse `.` and `..` components without touching the filesystem.
///
/// A `..` that would climb above the path's root (or its first component,
/// for relative paths) is kept, which makes escapes visible to the
/// `starts_with` check rather than silently dropped.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(Component::ParentDir);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    // Windows files inherit the per-user ACL of the data directory.
    Ok(())
}

#[cfg(windows)]
mod dpapi {
    //! User-scoped DPAPI protect/unprotect.

    use windows::core::PCWSTR;
    use windows::Win32::Foundation::{HLOCAL, LocalFree};
    use windows::Win32::Security::Cryptography::{
        CryptProtectData, CryptUnprotectData, CRYPTPROTECT_UI_FORBIDDEN, CRYPT_INTEGER_BLOB,
    };

    use crate::error::{Result, VaultError};

    pub fn protect(data: &[u8]) -> Result<Vec<u8>> {
        let input = CRYPT_INTEGER_BLOB {
            cbData: data.len() as u32,
            pbData: data.as_ptr() as *mut u8,
        };
        let mut output = CRYPT_INTEGER_BLOB::default();
        unsafe {
            CryptProtectData(
                &input,
                PCWSTR::null(),
                None,
                None,
                None,
                CRYPTPROTECT_UI_FORBIDDEN,
                &mut output,
            )
            .map_err(|e| VaultError::Backend(format!("CryptProtectData failed: {e}")))?;
            Ok(take_blob(output))
        }
    }

    pub fn unprotect(data: &[u8]) -> Result<Vec<u8>> {
        let input = CRYPT_INTEGER_BLOB {
            cbData: data.len() as u32,
            pbData: data.as_ptr() as *mut u8,
        };
        let mut output = CRYPT_INTEGER_BLOB::default();
        unsafe {
            CryptUnprotectData(
                &input,
                None,
                None,
                None,
                None,
                CRYPTPROTECT_UI_FORBIDDEN,
                &mut output,
            )
            .map_err(|e| VaultError::Backend(format!("CryptUnprotectData failed: {e}")))?;
            Ok(take_blob(output))
        }
    }

    unsafe fn take_blob(blob: CRYPT_INTEGER_BLOB) -> Vec<u8> {
        let bytes = std::slice::from_raw_parts(blob.pbData, blob.cbData as usize).to_vec();
        let _ = LocalFree(HLOCAL(blob.pbData.cast()));
        bytes
    }
}

#[cfg(not(windows))]
mod dpapi {
    use crate::error::{Result, VaultError};

    pub fn protect(_data: &[u8]) -> Result<Vec<u8>> {
        Err(VaultError::PlatformNotSupported(
            "file vault requires Windows data protection",
        ))
    }

    pub fn unprotect(_data: &[u8]) -> Result<Vec<u8>> {
        Err(VaultError::PlatformNotSupported(
            "file vault requires Windows data protection",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_id_resolves_inside_base() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FileVault::with_base(dir.path()).unwrap();

        let path = vault.key_path(&CreatorId::new("alice-01").unwrap()).unwrap();
        assert!(path.starts_with(dir.path()));
        assert_eq!(path.file_name().unwrap(), "alice-01.key");
    }

    #[test]
    fn traversal_id_cannot_be_constructed() {
        // The charset check fires before any vault interaction is possible.
        assert!(CreatorId::new("../evil").is_err());
    }

    #[test]
    fn containment_rejects_escaping_candidates() {
        let base = Path::new("/srv/vault/keys");
        assert!(ensure_contained(base, Path::new("/srv/vault/keys/a.key")).is_ok());
        assert!(ensure_contained(base, Path::new("/srv/vault/keys/../../etc/shadow")).is_err());
        assert!(ensure_contained(base, Path::new("/etc/shadow")).is_err());
        // The base itself is not a valid key file.
        assert!(ensure_contained(base, base).is_err());
    }

    #[test]
    fn containment_survives_forged_relative_base() {
        let base = Path::new("keys/../keys");
        assert!(ensure_contained(base, Path::new("keys/a.key")).is_ok());
        assert!(ensure_contained(base, Path::new("keys/../escape.key")).is_err());
    }

    #[test]
    fn lexical_normalize_collapses_dots() {
        assert_eq!(
            lexical_normalize(Path::new("/a/b/../c/./d")),
            PathBuf::from("/a/c/d")
        );
        assert_eq!(
            lexical_normalize(Path::new("a/../../b")),
            PathBuf::from("../b")
        );
    }

    #[cfg(not(windows))]
    #[test]
    fn store_fails_off_windows_after_path_checks() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FileVault::with_base(dir.path()).unwrap();
        let seed = SecretSeed::from_bytes([0x42; 32]);

        let result = vault.store(&CreatorId::new("alice").unwrap(), &seed);
        assert!(matches!(result, Err(VaultError::PlatformNotSupported(_))));
        // The path checks passed but no file was written.
        assert!(!dir.path().join("alice.key").exists());
    }

    #[cfg(windows)]
    #[test]
    fn store_retrieve_roundtrip_under_dpapi() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FileVault::with_base(dir.path()).unwrap();
        let id = CreatorId::new("alice").unwrap();
        let seed = SecretSeed::from_bytes([0x42; 32]);

        vault.store(&id, &seed).unwrap();
        assert!(vault.exists(&id).unwrap());

        // Ciphertext on disk must not contain the raw seed.
        let on_disk = fs::read(dir.path().join("alice.key")).unwrap();
        assert!(!on_disk.windows(32).any(|w| w == [0x42; 32]));

        let fetched = vault.retrieve(&id).unwrap().unwrap();
        assert_eq!(fetched.expose().unwrap(), &[0x42; 32]);

        assert!(vault.delete(&id).unwrap());
        assert!(!vault.exists(&id).unwrap());
    }
}
