use std::sync::Arc;

use affirm_core::{
  affirmation::{Affirmation, NewAffirmation},
  selection,
  store::RecordStore,
};
use rand::{Rng, SeedableRng as _, rngs::StdRng};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use super::validate_text;
use crate::{
  Failure, Outcome, ValidationError,
  events::ChangeEvent,
  repo::{AffirmationRepository, AppStateRepository},
};

/// Input to [`AffirmationService::edit`].
#[derive(Debug, Clone)]
pub struct EditAffirmation {
  pub id:        Uuid,
  pub text:      String,
  /// `None` leaves the flag as it is.
  pub is_active: Option<bool>,
}

/// Affirmation use cases: CRUD, ordering, picking, import and export.
pub struct AffirmationService<S> {
  pub(super) affirmations: AffirmationRepository<S>,
  state:                   AppStateRepository<S>,
  pub(super) events:       broadcast::Sender<ChangeEvent>,
}

impl<S> Clone for AffirmationService<S> {
  fn clone(&self) -> Self {
    Self {
      affirmations: self.affirmations.clone(),
      state:        self.state.clone(),
      events:       self.events.clone(),
    }
  }
}

impl<S: RecordStore> AffirmationService<S> {
  pub fn new(store: Arc<S>, events: broadcast::Sender<ChangeEvent>) -> Self {
    Self {
      affirmations: AffirmationRepository::new(store.clone()),
      state: AppStateRepository::new(store),
      events,
    }
  }

  pub fn repository(&self) -> &AffirmationRepository<S> { &self.affirmations }

  pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
    self.events.subscribe()
  }

  /// Publish after commit. Having no subscribers is not an error.
  pub(super) fn publish(&self, event: ChangeEvent) {
    let _ = self.events.send(event);
  }

  // ── Queries ───────────────────────────────────────────────────────────────

  /// Records in presentation order; inactive ones only when asked for.
  pub async fn list(&self, include_inactive: bool) -> Outcome<Vec<Affirmation>> {
    Ok(if include_inactive {
      self.affirmations.get_all().await?
    } else {
      self.affirmations.get_active().await?
    })
  }

  /// The stored current pick, if it still names an active record.
  pub async fn current(&self) -> Outcome<Option<Affirmation>> {
    let Some(id) = self.state.current_pick().await? else {
      return Ok(None);
    };
    Ok(self.affirmations.get_by_id(id).await?.filter(|a| a.is_active))
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  pub async fn create(&self, text: &str) -> Outcome<Affirmation> {
    let text = validate_text(text)?;
    let record = self.affirmations.create(NewAffirmation::new(text)).await?;
    self.publish(ChangeEvent::Created(record.id));
    Ok(record)
  }

  /// Replace the text of an existing record and optionally its active flag.
  /// Id, creation time and display count are preserved.
  pub async fn edit(&self, edit: EditAffirmation) -> Outcome<Affirmation> {
    let mut record = self.existing(edit.id).await?;
    record.text = validate_text(&edit.text)?;
    if let Some(is_active) = edit.is_active {
      record.is_active = is_active;
    }
    let record = self.affirmations.update(record).await?;
    self.publish(ChangeEvent::Updated(record.id));
    Ok(record)
  }

  /// Flip `is_active` without touching the text. Records written out of
  /// band with an over-long text can still be toggled.
  pub async fn set_active(&self, id: Uuid, is_active: bool) -> Outcome<Affirmation> {
    let mut record = self.existing(id).await?;
    if record.is_active == is_active {
      return Ok(record);
    }
    record.is_active = is_active;
    let record = self.affirmations.update(record).await?;
    self.publish(ChangeEvent::Updated(id));
    Ok(record)
  }

  /// Remove one record. An unknown id yields [`Failure::NotFound`] every
  /// time it is asked for, which callers may treat as already deleted.
  pub async fn delete(&self, id: Uuid) -> Outcome<Uuid> {
    if !self.affirmations.delete(id).await? {
      return Err(Failure::NotFound(id));
    }
    self.publish(ChangeEvent::Deleted(id));
    Ok(id)
  }

  /// Remove every record. Returns how many were removed.
  pub async fn delete_all(&self) -> Outcome<usize> {
    let removed = self.affirmations.count().await?;
    self.affirmations.delete_all().await?;
    self.publish(ChangeEvent::Cleared);
    Ok(removed)
  }

  /// Move the listed ids to the front, in the given order.
  pub async fn reorder(&self, ids: &[Uuid]) -> Outcome<()> {
    if ids.is_empty() {
      return Err(ValidationError::EmptyReorder.into());
    }
    self.affirmations.reorder(ids).await?;
    self.publish(ChangeEvent::Reordered);
    Ok(())
  }

  /// Pick the next affirmation to show, never repeating the current one
  /// while there is an alternative.
  pub async fn next(&self) -> Outcome<Option<Affirmation>> {
    self.next_with(&mut StdRng::from_entropy()).await
  }

  pub async fn next_with<R>(&self, rng: &mut R) -> Outcome<Option<Affirmation>>
  where
    R: Rng + Send + ?Sized,
  {
    let active = self.affirmations.get_active().await?;
    let previous = self.state.current_pick().await?;
    let picked = selection::select(&active, previous, rng).map(|a| a.id);

    let Some(id) = picked else {
      if previous.is_some() {
        self.state.set_current_pick(None).await?;
        self.publish(ChangeEvent::PickChanged(None));
      }
      return Ok(None);
    };

    let record = self.affirmations.record_display(id).await?;
    debug!(%id, "picked affirmation");
    self.publish(ChangeEvent::PickChanged(Some(id)));
    Ok(Some(record))
  }

  async fn existing(&self, id: Uuid) -> Outcome<Affirmation> {
    self
      .affirmations
      .get_by_id(id)
      .await?
      .ok_or(Failure::NotFound(id))
  }
}
