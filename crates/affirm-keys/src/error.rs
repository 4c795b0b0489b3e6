//! Error types for `affirm-keys`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// `cipher()` was called before `initialize()`, or after `delete_key()`.
  #[error("key manager is not initialized")]
  NotInitialized,

  #[error("stored key has wrong length: {0} bytes (expected 32)")]
  InvalidKeyLength(usize),

  #[error("credential store error: {0}")]
  Credential(String),

  #[error("credential store {0} is read-only")]
  ReadOnlyCredential(String),

  #[error("encryption failed")]
  Encryption,

  /// Authentication of a sealed payload failed: wrong key or tampered data.
  #[error("decryption failed")]
  Decryption,

  #[error("sealed payload too short: {0} bytes")]
  Truncated(usize),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
