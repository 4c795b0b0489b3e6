//! [`WidgetBridge`]: keeps the shared area in step with the store.

use std::sync::Arc;

use affirm_app::{
  ChangeEvent,
  repo::{AffirmationRepository, AppStateRepository, SettingsRepository},
};
use affirm_core::store::RecordStore;
use tokio::{
  sync::broadcast::{
    Receiver,
    error::{RecvError, TryRecvError},
  },
  task::JoinHandle,
};
use tracing::{debug, warn};

use crate::{Result, SharedArea, WidgetSnapshot, notify::RefreshNotifier};

pub struct WidgetBridge<S, A, N> {
  affirmations: AffirmationRepository<S>,
  state:        AppStateRepository<S>,
  settings:     SettingsRepository<S>,
  area:         A,
  notifier:     N,
}

impl<S, A, N> WidgetBridge<S, A, N>
where
  S: RecordStore + 'static,
  A: SharedArea + 'static,
  N: RefreshNotifier + 'static,
{
  pub fn new(store: Arc<S>, area: A, notifier: N) -> Self {
    Self {
      affirmations: AffirmationRepository::new(store.clone()),
      state: AppStateRepository::new(store.clone()),
      settings: SettingsRepository::new(store),
      area,
      notifier,
    }
  }

  pub fn area(&self) -> &A { &self.area }

  /// Re-derive the snapshot, write it, and request a redraw.
  pub async fn sync(&self) -> Result<WidgetSnapshot> {
    let snapshot =
      WidgetSnapshot::derive(&self.affirmations, &self.state, &self.settings)
        .await?;
    self.area.replace(snapshot.to_shared_map()?).await?;
    self.notifier.request_refresh();
    debug!(
      count = snapshot.list.len(),
      has_current = snapshot.current.is_some(),
      "widget state mirrored"
    );
    Ok(snapshot)
  }

  /// [`sync`](Self::sync), logging instead of returning failures.
  pub async fn sync_quietly(&self) {
    if let Err(e) = self.sync().await {
      warn!(error = %e, "widget sync failed");
    }
  }

  /// Mirror again after every event until the channel closes.
  ///
  /// The loop does not sync on entry; call [`sync`](Self::sync) first when
  /// the area may be stale. Events that arrived while a sync was running
  /// are folded into the next one. A lagged receiver simply resyncs, since
  /// every sync is a full re-derivation.
  pub async fn run(self, mut events: Receiver<ChangeEvent>) {
    loop {
      match events.recv().await {
        Ok(event) => debug!(?event, "change received"),
        Err(RecvError::Lagged(missed)) => debug!(missed, "change feed lagged"),
        Err(RecvError::Closed) => break,
      }
      loop {
        match events.try_recv() {
          Ok(_) | Err(TryRecvError::Lagged(_)) => {}
          Err(_) => break,
        }
      }
      self.sync_quietly().await;
    }
    debug!("change feed closed; widget bridge stopped");
  }

  /// Run the bridge on its own task.
  pub fn spawn(self, events: Receiver<ChangeEvent>) -> JoinHandle<()> {
    tokio::spawn(self.run(events))
  }
}
