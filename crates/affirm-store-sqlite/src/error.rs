//! Error type for `affirm-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The store was explicitly closed.
  #[error("store is closed")]
  Closed,

  #[error("database error: {0}")]
  Database(#[source] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// The payload at `address` failed authentication.
  #[error("could not decrypt record at {address}")]
  Decryption { address: String },

  #[error("cipher error: {0}")]
  Cipher(#[from] affirm_keys::Error),
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    match e {
      // A handle cloned before `close()` reports this on its next call.
      tokio_rusqlite::Error::ConnectionClosed => Self::Closed,
      other => Self::Database(other),
    }
  }
}

impl From<Error> for affirm_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Closed => Self::StorageClosed,
      Error::Decryption { address } => Self::Decryption(address),
      Error::Json(e) => Self::Serialization(e),
      other => Self::storage(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
