//! The affirmation record and its creation input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound on the trimmed text length, in Unicode scalar values.
pub const MAX_TEXT_CHARS: usize = 280;

// ─── Affirmation ─────────────────────────────────────────────────────────────

/// A single affirmation as persisted in the `affirmations` namespace.
///
/// Length limits on `text` are enforced by the use-case layer, not here:
/// records written out of band (e.g. by an older import) must still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affirmation {
  pub id:            Uuid,
  pub text:          String,
  /// Set once by the repository; never changes afterwards.
  pub created_at:    DateTime<Utc>,
  /// Always `>= created_at`.
  pub updated_at:    DateTime<Utc>,
  /// Informational only; selection never reads it.
  #[serde(default)]
  pub display_count: u64,
  #[serde(default = "default_active")]
  pub is_active:     bool,
  #[serde(default)]
  pub sort_order:    i64,
}

fn default_active() -> bool { true }

impl Affirmation {
  /// Number of Unicode scalar values in the trimmed text.
  pub fn text_len(&self) -> usize { text_len(&self.text) }
}

/// Count Unicode scalar values of `text` after trimming surrounding
/// whitespace.
pub fn text_len(text: &str) -> usize { text.trim().chars().count() }

/// Sort records into presentation order: ascending `sort_order`, ties broken
/// by creation time so the order is stable across reads.
pub fn sort_for_display(records: &mut [Affirmation]) {
  records.sort_by(|a, b| {
    a.sort_order
      .cmp(&b.sort_order)
      .then(a.created_at.cmp(&b.created_at))
  });
}

// ─── NewAffirmation ──────────────────────────────────────────────────────────

/// Input to `AffirmationRepository::create`.
///
/// `id` is generated when absent. Timestamps and `sort_order` are always
/// assigned by the repository.
#[derive(Debug, Clone)]
pub struct NewAffirmation {
  pub id:        Option<Uuid>,
  pub text:      String,
  pub is_active: bool,
}

impl NewAffirmation {
  /// An active affirmation with a generated id.
  pub fn new(text: impl Into<String>) -> Self {
    Self { id: None, text: text.into(), is_active: true }
  }
}
