//! Bulk import and export through the plain-text format in `affirm-text`.

use std::{collections::HashSet, path::Path};

use affirm_core::{affirmation::NewAffirmation, store::RecordStore};
use chrono::Utc;
use strum::{Display, EnumIter, EnumString};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{AffirmationService, validate_text};
use crate::{Failure, Outcome, ValidationError, events::ChangeEvent};

const PREVIEW_CHARS: usize = 40;

/// How imported entries combine with what is already stored.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ImportMode {
  /// Add every valid entry after the existing ones.
  #[default]
  Append,
  /// Remove everything first, provided the payload has a valid entry.
  Replace,
  /// Add only entries whose trimmed text does not already exist,
  /// ignoring case.
  SkipDuplicates,
}

/// An entry that failed validation and was left out.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
  /// 1-based line in the source where the entry starts.
  pub line:    usize,
  /// The first few characters of the entry, for display.
  pub preview: String,
  pub reason:  ValidationError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
  pub imported:           usize,
  pub skipped_duplicates: usize,
  pub rejected:           Vec<Rejected>,
  /// Cancellation stopped the import early. Entries committed before that
  /// point are kept.
  pub interrupted:        bool,
}

impl<S: RecordStore> AffirmationService<S> {
  /// Parse `source` and persist its entries according to `mode`.
  ///
  /// `cancel` is checked before anything is cleared and before each entry
  /// is written.
  pub async fn import(
    &self,
    source: &str,
    mode: ImportMode,
    cancel: &CancellationToken,
  ) -> Outcome<ImportReport> {
    if source.trim().is_empty() {
      return Err(Failure::Import("the import source is empty".into()));
    }
    let entries = affirm_text::parse(source);
    if entries.is_empty() {
      return Err(Failure::Import(
        "no affirmations found in the import source".into(),
      ));
    }

    let mut report = ImportReport::default();
    let mut valid = Vec::with_capacity(entries.len());
    for entry in entries {
      match validate_text(&entry.text) {
        Ok(text) => valid.push(text),
        Err(reason) => report.rejected.push(Rejected {
          line: entry.line,
          preview: entry.text.chars().take(PREVIEW_CHARS).collect(),
          reason,
        }),
      }
    }

    // Nothing has been written yet; a cancelled import leaves the store as
    // it was, including in replace mode.
    if cancel.is_cancelled() {
      report.interrupted = true;
      self.finish(&report);
      return Ok(report);
    }

    let mut seen = HashSet::new();
    match mode {
      ImportMode::Append => {}
      ImportMode::Replace if valid.is_empty() => {}
      ImportMode::Replace => {
        self.affirmations.delete_all().await.map_err(persist_failed)?;
        self.publish(ChangeEvent::Cleared);
      }
      ImportMode::SkipDuplicates => {
        let existing = self.affirmations.get_all().await.map_err(persist_failed)?;
        seen.extend(existing.iter().map(|a| fold(&a.text)));
      }
    }

    for text in valid {
      if cancel.is_cancelled() {
        report.interrupted = true;
        break;
      }
      if mode == ImportMode::SkipDuplicates && !seen.insert(fold(&text)) {
        report.skipped_duplicates += 1;
        continue;
      }
      if let Err(e) = self.affirmations.create(NewAffirmation::new(text)).await {
        self.finish(&report);
        return Err(Failure::Import(format!(
          "stopped after {} affirmations: {}",
          report.imported,
          Failure::from(e)
        )));
      }
      report.imported += 1;
    }

    self.finish(&report);
    Ok(report)
  }

  /// Read `path` as UTF-8 and [`import`](Self::import) it.
  pub async fn import_file(
    &self,
    path: &Path,
    mode: ImportMode,
    cancel: &CancellationToken,
  ) -> Outcome<ImportReport> {
    let source = tokio::fs::read_to_string(path).await.map_err(|e| {
      Failure::Import(format!("could not read {}: {e}", path.display()))
    })?;
    self.import(&source, mode, cancel).await
  }

  /// Every affirmation, active or not, in the plain-text export format.
  pub async fn export(&self) -> Outcome<String> {
    let all = self.affirmations.get_all().await?;
    Ok(affirm_text::serialize(&all, Utc::now()))
  }

  /// Write [`export`](Self::export) to `path`. Returns the record count.
  pub async fn export_to_file(&self, path: &Path) -> Outcome<usize> {
    let all = self.affirmations.get_all().await?;
    let text = affirm_text::serialize(&all, Utc::now());
    tokio::fs::write(path, text).await.map_err(|e| {
      Failure::Storage(format!("could not write {}: {e}", path.display()))
    })?;
    info!(count = all.len(), "exported affirmations");
    Ok(all.len())
  }

  fn finish(&self, report: &ImportReport) {
    info!(
      imported = report.imported,
      skipped = report.skipped_duplicates,
      rejected = report.rejected.len(),
      interrupted = report.interrupted,
      "import finished"
    );
    if report.imported > 0 {
      self.publish(ChangeEvent::Imported { count: report.imported });
    }
  }
}

/// Comparison key for duplicate detection. Internal whitespace is kept.
fn fold(text: &str) -> String { text.trim().to_lowercase() }

fn persist_failed(e: affirm_core::Error) -> Failure {
  let failure = Failure::from(e);
  warn!(error = %failure, "import aborted before writing entries");
  Failure::Import(failure.to_string())
}
