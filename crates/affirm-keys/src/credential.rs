//! Backends that hold the storage key outside the database.
//!
//! - [`KeychainCredentialStore`]: macOS Keychain via Security.framework.
//! - [`EnvCredentialStore`]: a hex key supplied through an environment
//!   variable. Read-only; suited to headless hosts without a keyring.
//! - [`MemoryCredentialStore`]: process memory only, for tests and throwaway
//!   sessions.

use std::sync::Arc;

use parking_lot::Mutex;
use zeroize::Zeroizing;

use crate::{Error, Result};

/// Somewhere the raw storage key can be kept out of plain files.
pub trait CredentialStore: Send + Sync {
  /// Load the stored key, or `None` if nothing has been stored yet.
  fn load(&self) -> Result<Option<Zeroizing<Vec<u8>>>>;

  /// Store `secret`, replacing any previous value.
  fn save(&self, secret: &[u8]) -> Result<()>;

  /// Remove the stored key. Removing an absent key succeeds.
  fn remove(&self) -> Result<()>;
}

// ─── Memory ──────────────────────────────────────────────────────────────────

/// Keeps the key in process memory. Clones share the same slot, which lets
/// tests simulate an app relaunch by building a second manager over a clone.
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
  slot: Arc<Mutex<Option<Zeroizing<Vec<u8>>>>>,
}

impl CredentialStore for MemoryCredentialStore {
  fn load(&self) -> Result<Option<Zeroizing<Vec<u8>>>> {
    Ok(self.slot.lock().clone())
  }

  fn save(&self, secret: &[u8]) -> Result<()> {
    *self.slot.lock() = Some(Zeroizing::new(secret.to_vec()));
    Ok(())
  }

  fn remove(&self) -> Result<()> {
    self.slot.lock().take();
    Ok(())
  }
}

// ─── Environment ─────────────────────────────────────────────────────────────

/// Reads a hex-encoded key from an environment variable.
///
/// The variable is never written: `save` and `remove` fail with
/// [`Error::ReadOnlyCredential`], so a missing variable surfaces on first run
/// instead of silently generating a key that would be lost at exit.
#[derive(Debug, Clone)]
pub struct EnvCredentialStore {
  var: String,
}

impl EnvCredentialStore {
  pub fn new(var: impl Into<String>) -> Self { Self { var: var.into() } }
}

impl CredentialStore for EnvCredentialStore {
  fn load(&self) -> Result<Option<Zeroizing<Vec<u8>>>> {
    let Ok(raw) = std::env::var(&self.var) else {
      return Ok(None);
    };
    let raw = Zeroizing::new(raw);
    hex::decode(raw.trim())
      .map(|bytes| Some(Zeroizing::new(bytes)))
      .map_err(|e| Error::Credential(format!("{} is not valid hex: {e}", self.var)))
  }

  fn save(&self, _secret: &[u8]) -> Result<()> {
    Err(Error::ReadOnlyCredential(format!(
      "${} (set it to a hex-encoded 32-byte key)",
      self.var
    )))
  }

  fn remove(&self) -> Result<()> {
    Err(Error::ReadOnlyCredential(format!("${}", self.var)))
  }
}

// ─── macOS Keychain ──────────────────────────────────────────────────────────

#[cfg(target_os = "macos")]
pub use keychain::KeychainCredentialStore;

#[cfg(target_os = "macos")]
mod keychain {
  use security_framework::passwords::{
    delete_generic_password, get_generic_password, set_generic_password,
  };
  use zeroize::Zeroizing;

  use super::CredentialStore;
  use crate::{Error, Result};

  /// `errSecItemNotFound`.
  const ITEM_NOT_FOUND: i32 = -25300;

  /// A generic-password item in the login keychain, stored as hex.
  #[derive(Debug, Clone)]
  pub struct KeychainCredentialStore {
    service: String,
    account: String,
  }

  impl KeychainCredentialStore {
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
      Self { service: service.into(), account: account.into() }
    }
  }

  impl CredentialStore for KeychainCredentialStore {
    fn load(&self) -> Result<Option<Zeroizing<Vec<u8>>>> {
      match get_generic_password(&self.service, &self.account) {
        Ok(data) => {
          let data = Zeroizing::new(data);
          let key = hex::decode(data.trim_ascii()).map_err(|e| {
            Error::Credential(format!("keychain item is not valid hex: {e}"))
          })?;
          Ok(Some(Zeroizing::new(key)))
        }
        Err(e) if e.code() == ITEM_NOT_FOUND => Ok(None),
        Err(e) => Err(Error::Credential(format!("keychain read failed: {e}"))),
      }
    }

    fn save(&self, secret: &[u8]) -> Result<()> {
      let encoded = Zeroizing::new(hex::encode(secret));
      set_generic_password(&self.service, &self.account, encoded.as_bytes())
        .map_err(|e| Error::Credential(format!("keychain write failed: {e}")))
    }

    fn remove(&self) -> Result<()> {
      match delete_generic_password(&self.service, &self.account) {
        Ok(()) => Ok(()),
        Err(e) if e.code() == ITEM_NOT_FOUND => Ok(()),
        Err(e) => Err(Error::Credential(format!("keychain delete failed: {e}"))),
      }
    }
  }
}
