use std::{collections::HashSet, sync::Arc};

use affirm_core::{
  Error, Result,
  affirmation::{Affirmation, NewAffirmation, sort_for_display},
  store::{Namespace, RecordStore},
};
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::AppStateRepository;

/// CRUD over the `affirmations` namespace.
///
/// Records are keyed by the hyphenated form of their id. Every
/// read-modify-write goes through one writer lock shared by all clones, so
/// `sort_order` assignment and counters never race.
pub struct AffirmationRepository<S> {
  store:  Arc<S>,
  state:  AppStateRepository<S>,
  writer: Arc<Mutex<()>>,
}

impl<S> Clone for AffirmationRepository<S> {
  fn clone(&self) -> Self {
    Self {
      store:  self.store.clone(),
      state:  self.state.clone(),
      writer: self.writer.clone(),
    }
  }
}

impl<S: RecordStore> AffirmationRepository<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      state: AppStateRepository::new(store.clone()),
      store,
      writer: Arc::new(Mutex::new(())),
    }
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Every record in presentation order.
  pub async fn get_all(&self) -> Result<Vec<Affirmation>> {
    let mut all: Vec<Affirmation> = self
      .store
      .values(Namespace::Affirmations)
      .await
      .map_err(Into::into)?;
    sort_for_display(&mut all);
    Ok(all)
  }

  /// Active records in presentation order.
  pub async fn get_active(&self) -> Result<Vec<Affirmation>> {
    let mut all = self.get_all().await?;
    all.retain(|a| a.is_active);
    Ok(all)
  }

  pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Affirmation>> {
    self
      .store
      .get(Namespace::Affirmations, &key(id))
      .await
      .map_err(Into::into)
  }

  pub async fn count(&self) -> Result<usize> {
    let all: Vec<Affirmation> = self
      .store
      .values(Namespace::Affirmations)
      .await
      .map_err(Into::into)?;
    Ok(all.len())
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Persist a new record, generating its id when absent.
  ///
  /// The record is placed after everything created before it, including
  /// records that have since been deleted.
  pub async fn create(&self, input: NewAffirmation) -> Result<Affirmation> {
    let _guard = self.writer.lock().await;
    let id = input.id.unwrap_or_else(Uuid::new_v4);
    if self.get_by_id(id).await?.is_some() {
      return Err(Error::DuplicateId(id));
    }

    let sort_order = self.next_sort_order().await?;
    let now = Utc::now();
    let record = Affirmation {
      id,
      text: input.text,
      created_at: now,
      updated_at: now,
      display_count: 0,
      is_active: input.is_active,
      sort_order,
    };

    self.put(&record).await?;
    self.state.set_next_sort_order(sort_order + 1).await?;
    debug!(%id, sort_order, "affirmation created");
    Ok(record)
  }

  /// Replace a stored record with `record`, stamping `updated_at`.
  ///
  /// `created_at` is taken from the stored copy; last write wins for every
  /// other field.
  pub async fn update(&self, mut record: Affirmation) -> Result<Affirmation> {
    let _guard = self.writer.lock().await;
    let stored = self
      .get_by_id(record.id)
      .await?
      .ok_or(Error::NotFound(record.id))?;

    record.created_at = stored.created_at;
    record.updated_at = Utc::now().max(stored.created_at);
    self.put(&record).await?;
    Ok(record)
  }

  /// Remove one record. Returns `false` if it did not exist.
  ///
  /// A current pick naming the record is cleared in the same critical
  /// section, so no pick can outlive its record.
  pub async fn delete(&self, id: Uuid) -> Result<bool> {
    let _guard = self.writer.lock().await;
    let removed = self
      .store
      .delete(Namespace::Affirmations, &key(id))
      .await
      .map_err(Into::into)?;
    if removed && self.state.current_pick().await? == Some(id) {
      self.state.set_current_pick(None).await?;
    }
    Ok(removed)
  }

  /// Remove every record, clear the current pick and restart `sort_order`
  /// numbering.
  pub async fn delete_all(&self) -> Result<()> {
    let _guard = self.writer.lock().await;
    self
      .store
      .clear(Namespace::Affirmations)
      .await
      .map_err(Into::into)?;
    self.state.set_current_pick(None).await?;
    self.state.clear_sort_order().await
  }

  /// Move the listed ids to the front, in the given order.
  ///
  /// Listed records take the positions just below the lowest unlisted one,
  /// so unlisted records keep their `sort_order` and nothing collides. When
  /// every record is listed the order is renumbered from 0. Unknown and
  /// repeated ids are ignored.
  pub async fn reorder(&self, ids: &[Uuid]) -> Result<()> {
    let _guard = self.writer.lock().await;
    let all: Vec<Affirmation> = self
      .store
      .values(Namespace::Affirmations)
      .await
      .map_err(Into::into)?;

    let mut seen = HashSet::new();
    let listed: Vec<&Affirmation> = ids
      .iter()
      .filter(|id| seen.insert(**id))
      .filter_map(|id| all.iter().find(|a| a.id == *id))
      .collect();

    let len = i64::try_from(listed.len()).unwrap_or(i64::MAX);
    let start = all
      .iter()
      .filter(|a| !seen.contains(&a.id))
      .map(|a| a.sort_order)
      .min()
      .map_or(0, |lowest| lowest.saturating_sub(len));

    for (position, record) in (start..).zip(listed) {
      if record.sort_order != position {
        let mut record = record.clone();
        record.sort_order = position;
        self.put(&record).await?;
      }
    }
    Ok(())
  }

  /// Bump `display_count` for `id` and make it the current pick.
  pub async fn record_display(&self, id: Uuid) -> Result<Affirmation> {
    let _guard = self.writer.lock().await;
    let mut record = self.get_by_id(id).await?.ok_or(Error::NotFound(id))?;
    record.display_count = record.display_count.saturating_add(1);
    self.put(&record).await?;
    self.state.set_current_pick(Some(id)).await?;
    Ok(record)
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  async fn put(&self, record: &Affirmation) -> Result<()> {
    self
      .store
      .put(Namespace::Affirmations, &key(record.id), record)
      .await
      .map_err(Into::into)
  }

  /// `max(max_existing + 1, high_water)`, or 0 for an empty, fresh store.
  async fn next_sort_order(&self) -> Result<i64> {
    let all: Vec<Affirmation> = self
      .store
      .values(Namespace::Affirmations)
      .await
      .map_err(Into::into)?;
    let after_existing = all
      .iter()
      .map(|a| a.sort_order.saturating_add(1))
      .max()
      .unwrap_or(0);
    let high_water = self.state.next_sort_order().await?.unwrap_or(0);
    Ok(after_existing.max(high_water))
  }
}

fn key(id: Uuid) -> String { id.to_string() }
