use std::sync::Arc;

use affirm_core::{
  Result,
  store::{Namespace, RecordStore},
};
use uuid::Uuid;

const CURRENT_PICK: &str = "current_affirmation_id";
const NEXT_SORT_ORDER: &str = "next_sort_order";

/// Small bookkeeping values that are neither affirmations nor settings.
pub struct AppStateRepository<S> {
  store: Arc<S>,
}

impl<S> Clone for AppStateRepository<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone() } }
}

impl<S: RecordStore> AppStateRepository<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// The id of the affirmation most recently shown, if any.
  pub async fn current_pick(&self) -> Result<Option<Uuid>> {
    self
      .store
      .get(Namespace::AppState, CURRENT_PICK)
      .await
      .map_err(Into::into)
  }

  pub async fn set_current_pick(&self, id: Option<Uuid>) -> Result<()> {
    match id {
      Some(id) => self
        .store
        .put(Namespace::AppState, CURRENT_PICK, &id)
        .await
        .map_err(Into::into),
      None => self
        .store
        .delete(Namespace::AppState, CURRENT_PICK)
        .await
        .map(|_| ())
        .map_err(Into::into),
    }
  }

  /// Lowest `sort_order` a new affirmation may take. Never decreases except
  /// through [`clear_sort_order`](Self::clear_sort_order).
  pub async fn next_sort_order(&self) -> Result<Option<i64>> {
    self
      .store
      .get(Namespace::AppState, NEXT_SORT_ORDER)
      .await
      .map_err(Into::into)
  }

  pub async fn set_next_sort_order(&self, value: i64) -> Result<()> {
    self
      .store
      .put(Namespace::AppState, NEXT_SORT_ORDER, &value)
      .await
      .map_err(Into::into)
  }

  pub async fn clear_sort_order(&self) -> Result<()> {
    self
      .store
      .delete(Namespace::AppState, NEXT_SORT_ORDER)
      .await
      .map(|_| ())
      .map_err(Into::into)
  }
}
