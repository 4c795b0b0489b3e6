//! AES-256-GCM record cipher.
//!
//! Sealed layout: `nonce (12 bytes) || ciphertext || tag (16 bytes)`. A fresh
//! random nonce is drawn per seal. The caller-supplied associated data binds a
//! payload to its storage address, so a record copied under another key fails
//! to open.

use std::fmt;

use aes_gcm::{
  Aes256Gcm, Nonce,
  aead::{Aead, KeyInit, Payload},
};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::{Error, Result};

pub const KEY_SIZE: usize = 32;
pub const NONCE_SIZE: usize = 12;
pub const TAG_SIZE: usize = 16;

const FINGERPRINT_DOMAIN: &[u8] = b"affirm-storage-key-fingerprint-v1";

/// Generate a fresh key from the operating system CSPRNG.
pub(crate) fn generate_key() -> Zeroizing<[u8; KEY_SIZE]> {
  let mut key = Zeroizing::new([0u8; KEY_SIZE]);
  OsRng.fill_bytes(&mut key[..]);
  key
}

/// A ready-to-use handle for sealing and opening records.
///
/// Cloning is cheap. Two ciphers are equal iff they were built from the same
/// key material.
#[derive(Clone)]
pub struct Cipher {
  aead:        Aes256Gcm,
  fingerprint: [u8; 32],
}

impl Cipher {
  /// Build a cipher from raw key bytes. Fails unless `key` is 32 bytes.
  pub fn from_key(key: &[u8]) -> Result<Self> {
    let fixed: &[u8; KEY_SIZE] = key
      .try_into()
      .map_err(|_| Error::InvalidKeyLength(key.len()))?;
    Ok(Self::from_fixed(fixed))
  }

  pub(crate) fn from_fixed(key: &[u8; KEY_SIZE]) -> Self {
    let aead = Aes256Gcm::new(key.into());

    let mut hasher = Sha256::new();
    hasher.update(FINGERPRINT_DOMAIN);
    hasher.update(key);

    Self { aead, fingerprint: hasher.finalize().into() }
  }

  /// A cipher over a random key that is never persisted. Data sealed with it
  /// is unrecoverable once the value is dropped.
  pub fn ephemeral() -> Self { Self::from_fixed(&generate_key()) }

  /// Short, non-reversible identifier of the key, safe to display.
  pub fn fingerprint(&self) -> String { hex::encode(&self.fingerprint[..8]) }

  /// Encrypt `plaintext`, binding it to `aad`.
  pub fn seal(&self, aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);

    let ciphertext = self
      .aead
      .encrypt(Nonce::from_slice(&nonce_bytes), Payload { msg: plaintext, aad })
      .map_err(|_| Error::Encryption)?;

    let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
  }

  /// Decrypt a payload produced by [`Cipher::seal`] with the same `aad`.
  ///
  /// Any mismatch (wrong key, wrong `aad`, flipped bit) yields
  /// [`Error::Decryption`]; partial plaintext is never returned.
  pub fn open(&self, aad: &[u8], sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if sealed.len() < NONCE_SIZE + TAG_SIZE {
      return Err(Error::Truncated(sealed.len()));
    }
    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);

    self
      .aead
      .decrypt(Nonce::from_slice(nonce_bytes), Payload { msg: ciphertext, aad })
      .map(Zeroizing::new)
      .map_err(|_| Error::Decryption)
  }
}

impl PartialEq for Cipher {
  fn eq(&self, other: &Self) -> bool { self.fingerprint == other.fingerprint }
}

impl Eq for Cipher {}

impl fmt::Debug for Cipher {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Cipher")
      .field("fingerprint", &self.fingerprint())
      .finish_non_exhaustive()
  }
}
