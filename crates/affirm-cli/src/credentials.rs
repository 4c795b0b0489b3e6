//! The credential backend selected by configuration.

#[cfg(target_os = "macos")]
use affirm_keys::KeychainCredentialStore;
use affirm_keys::{
  CredentialStore, EnvCredentialStore, MemoryCredentialStore, Result, Zeroizing,
};
use tracing::warn;

use crate::config::{AppConfig, CredentialBackend};

const KEYCHAIN_SERVICE: &str = "app.affirm.storage";
const KEYCHAIN_ACCOUNT: &str = "storage-key";

pub enum Credentials {
  #[cfg(target_os = "macos")]
  Keychain(KeychainCredentialStore),
  Env(EnvCredentialStore),
  Memory(MemoryCredentialStore),
}

impl Credentials {
  pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
    match cfg.credential {
      #[cfg(target_os = "macos")]
      CredentialBackend::Keychain => Ok(Self::Keychain(
        KeychainCredentialStore::new(KEYCHAIN_SERVICE, KEYCHAIN_ACCOUNT),
      )),
      #[cfg(not(target_os = "macos"))]
      CredentialBackend::Keychain => anyhow::bail!(
        "the keychain credential backend is only available on macOS; \
         set `credential = \"env\"` and provide {}",
        cfg.key_var
      ),
      CredentialBackend::Env => {
        Ok(Self::Env(EnvCredentialStore::new(cfg.key_var.clone())))
      }
      CredentialBackend::Memory => {
        warn!("using an in-memory storage key; stored data will not be readable next run");
        Ok(Self::Memory(MemoryCredentialStore::default()))
      }
    }
  }

  fn inner(&self) -> &dyn CredentialStore {
    match self {
      #[cfg(target_os = "macos")]
      Self::Keychain(store) => store,
      Self::Env(store) => store,
      Self::Memory(store) => store,
    }
  }
}

impl CredentialStore for Credentials {
  fn load(&self) -> Result<Option<Zeroizing<Vec<u8>>>> { self.inner().load() }

  fn save(&self, secret: &[u8]) -> Result<()> { self.inner().save(secret) }

  fn remove(&self) -> Result<()> { self.inner().remove() }
}
