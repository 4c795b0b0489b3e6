//! [`KeyManager`] — owns the storage key's lifecycle.

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::{
  Error, Result,
  cipher::{Cipher, generate_key},
  credential::CredentialStore,
};

/// Owns the storage key: creates it on first run, hands out [`Cipher`]
/// handles, and supports reset and deletion.
///
/// The manager caches the cipher after `initialize()`; the raw key itself is
/// only held transiently while a cipher is built.
pub struct KeyManager<C> {
  credentials: C,
  cipher:      RwLock<Option<Cipher>>,
}

impl<C: CredentialStore> KeyManager<C> {
  pub fn new(credentials: C) -> Self {
    Self { credentials, cipher: RwLock::new(None) }
  }

  /// Make sure a key exists and return its cipher.
  ///
  /// Loads the stored key if there is one and generates and persists a new
  /// one otherwise. Once initialised, further calls return the cached cipher
  /// without touching the credential store, so repeated initialisation never
  /// yields a different key.
  pub fn initialize(&self) -> Result<Cipher> {
    let mut slot = self.cipher.write();
    if let Some(cipher) = slot.as_ref() {
      return Ok(cipher.clone());
    }

    let cipher = match self.credentials.load()? {
      Some(key) => {
        debug!("loaded storage key from credential store");
        Cipher::from_key(&key)?
      }
      None => {
        let key = generate_key();
        self.credentials.save(&key[..])?;
        let cipher = Cipher::from_fixed(&key);
        info!(fingerprint = %cipher.fingerprint(), "generated new storage key");
        cipher
      }
    };

    *slot = Some(cipher.clone());
    Ok(cipher)
  }

  /// The current cipher. Fails with [`Error::NotInitialized`] before
  /// [`initialize`](Self::initialize) or after [`delete_key`](Self::delete_key).
  pub fn cipher(&self) -> Result<Cipher> {
    self.cipher.read().clone().ok_or(Error::NotInitialized)
  }

  pub fn is_initialized(&self) -> bool { self.cipher.read().is_some() }

  /// Replace the key with a freshly generated one.
  ///
  /// Everything sealed under the previous key becomes unreadable; reads of
  /// such records fail with a decryption error.
  pub fn reset(&self) -> Result<Cipher> {
    let mut slot = self.cipher.write();
    let key = generate_key();
    self.credentials.save(&key[..])?;
    let cipher = Cipher::from_fixed(&key);
    info!(fingerprint = %cipher.fingerprint(), "storage key reset");
    *slot = Some(cipher.clone());
    Ok(cipher)
  }

  /// Remove the key from the credential store and from memory.
  pub fn delete_key(&self) -> Result<()> {
    let mut slot = self.cipher.write();
    self.credentials.remove()?;
    *slot = None;
    info!("storage key deleted");
    Ok(())
  }
}
