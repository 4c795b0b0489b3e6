//! The use-case boundary's failure type.
//!
//! Expected failures (validation, stale ids) and infrastructure failures
//! (storage, decryption) are all returned as values so that callers never
//! need panic handling around ordinary operations.

use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// Result of every use case: `Ok` is success, `Err` the tagged failure.
pub type Outcome<T> = Result<T, Failure>;

/// Input that must change before a retry can succeed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
  #[error("affirmation text cannot be empty")]
  EmptyText,

  #[error("affirmation is too long: {actual} characters (maximum {max})")]
  TooLong { actual: usize, max: usize },

  #[error("reorder needs at least one id")]
  EmptyReorder,

  #[error("invalid value for {field}: {reason}")]
  InvalidSetting { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum Failure {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  /// The id is stale; the caller should reload its view.
  #[error("affirmation not found: {0}")]
  NotFound(Uuid),

  #[error("an affirmation with id {0} already exists")]
  Duplicate(Uuid),

  #[error("storage is closed")]
  StorageClosed,

  /// Stored data cannot be read with the current key. Needs an explicit
  /// key recovery or reset; retrying will not help.
  #[error("stored data could not be decrypted ({0})")]
  Decryption(String),

  #[error("storage failure: {0}")]
  Storage(String),

  #[error("import failed: {0}")]
  Import(String),
}

impl From<affirm_core::Error> for Failure {
  fn from(e: affirm_core::Error) -> Self {
    use affirm_core::Error as E;
    match e {
      E::NotFound(id) => Self::NotFound(id),
      E::DuplicateId(id) => Self::Duplicate(id),
      E::InvalidSetting { field, reason } => {
        ValidationError::InvalidSetting { field, reason }.into()
      }
      E::StorageClosed => Self::StorageClosed,
      E::Decryption(address) => {
        error!(%address, "record failed authentication");
        Self::Decryption(address)
      }
      other => {
        error!(error = %other, "storage failure");
        Self::Storage(other.to_string())
      }
    }
  }
}
