//! Error types for the vault module.

use thiserror::Error;

/// Errors that can occur during vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The resolved key path escaped the vault's base directory.
    #[error("vault path escapes its base directory: {0}")]
    PathTraversal(String),

    /// The requested backend is unavailable on this platform.
    #[error("vault backend not supported here: {0}")]
    PlatformNotSupported(&'static str),

    /// Filesystem interaction failed.
    #[error("vault i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The OS credential store rejected or garbled the interaction.
    ///
    /// Raw process output is captured and folded into the short reason;
    /// it is never propagated verbatim to callers.
    #[error("credential store error: {0}")]
    Backend(String),

    /// Secret material failed a lifecycle or encoding check.
    #[error(transparent)]
    Core(#[from] creatorledger_core::CoreError),
}

/// Result type for vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;
