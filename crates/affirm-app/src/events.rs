//! Post-commit change notifications.
//!
//! Use cases publish a [`ChangeEvent`] after a mutation has been persisted.
//! Subscribers (the widget bridge) react on their own task; a slow or absent
//! subscriber never blocks or fails the mutation.

use affirm_core::settings::SettingKey;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Capacity of the broadcast buffer. A subscriber that falls further behind
/// than this sees `Lagged` and is expected to resync from the store.
pub const CHANNEL_CAPACITY: usize = 64;

/// A committed, user-visible state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
  Created(Uuid),
  Updated(Uuid),
  Deleted(Uuid),
  Reordered,
  Imported { count: usize },
  /// Every affirmation was removed.
  Cleared,
  /// The current pick moved to another affirmation, or was cleared.
  PickChanged(Option<Uuid>),
  SettingsChanged(SettingKey),
  SettingsReset,
}

/// Create the event channel shared by all services.
pub fn channel() -> (broadcast::Sender<ChangeEvent>, broadcast::Receiver<ChangeEvent>) {
  broadcast::channel(CHANNEL_CAPACITY)
}
