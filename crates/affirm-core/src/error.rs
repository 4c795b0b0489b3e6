//! Error types for `affirm-core`.

use thiserror::Error;
use uuid::Uuid;

/// Failures raised below the use-case boundary: repositories and the
/// [`RecordStore`](crate::store::RecordStore) backends both surface this type.
#[derive(Debug, Error)]
pub enum Error {
  #[error("affirmation not found: {0}")]
  NotFound(Uuid),

  #[error("an affirmation with id {0} already exists")]
  DuplicateId(Uuid),

  #[error("invalid value for {field}: {reason}")]
  InvalidSetting { field: &'static str, reason: String },

  /// The store was used after an explicit close.
  #[error("store is closed")]
  StorageClosed,

  /// A stored payload failed authentication. Usually the key was reset or
  /// the record was written with a different key.
  #[error("could not decrypt record {0}")]
  Decryption(String),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Wrap any backend error as [`Error::Storage`].
  pub fn storage(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Storage(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
