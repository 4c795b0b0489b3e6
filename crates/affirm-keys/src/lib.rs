//! Storage encryption key management.
//!
//! A single 256-bit key is generated on first run, kept in a platform
//! credential store, and handed to the storage layer as a [`Cipher`]. The raw
//! key never reaches disk outside the credential store and is never logged.

pub mod cipher;
pub mod credential;
pub mod error;
pub mod manager;

pub use cipher::Cipher;
pub use credential::{CredentialStore, EnvCredentialStore, MemoryCredentialStore};
#[cfg(target_os = "macos")]
pub use credential::KeychainCredentialStore;
pub use error::{Error, Result};
pub use manager::KeyManager;
pub use zeroize::Zeroizing;
