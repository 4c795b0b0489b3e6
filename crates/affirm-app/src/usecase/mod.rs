//! The use-case boundary.
//!
//! Every operation returns an [`Outcome`](crate::Outcome) and publishes a
//! [`ChangeEvent`](crate::ChangeEvent) once its writes have committed.

mod affirmations;
mod import;
mod settings;

pub use affirmations::{AffirmationService, EditAffirmation};
pub use import::{ImportMode, ImportReport, Rejected};
pub use settings::SettingsService;

use affirm_core::affirmation::{MAX_TEXT_CHARS, text_len};

use crate::ValidationError;

/// Trim `text` and check it against the length rules.
pub(crate) fn validate_text(text: &str) -> Result<String, ValidationError> {
  let trimmed = text.trim();
  let actual = text_len(trimmed);
  if actual == 0 {
    Err(ValidationError::EmptyText)
  } else if actual > MAX_TEXT_CHARS {
    Err(ValidationError::TooLong { actual, max: MAX_TEXT_CHARS })
  } else {
    Ok(trimmed.to_owned())
  }
}
