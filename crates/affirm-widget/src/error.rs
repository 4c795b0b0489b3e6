use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Deriving the snapshot from the store failed.
  #[error("could not read state: {0}")]
  Source(#[from] affirm_core::Error),

  #[error("shared area I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("shared area encoding error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("refresh request failed: {0}")]
  Notify(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
