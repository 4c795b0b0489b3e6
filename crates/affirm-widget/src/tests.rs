//! Bridge tests against an in-memory `SqliteStore`.

use std::{sync::Arc, time::Duration};

use affirm_app::{AffirmationService, SettingsService, events};
use affirm_core::settings::ThemeMode;
use affirm_keys::Cipher;
use affirm_store_sqlite::SqliteStore;

use crate::{
  CommandNotifier, CountingNotifier, FileSharedArea, MemorySharedArea,
  MirroredAffirmation, SharedArea, SharedMap, SharedValue, WidgetBridge,
  snapshot::keys,
};

type Bridge = WidgetBridge<SqliteStore, MemorySharedArea, CountingNotifier>;

struct Harness {
  store:        Arc<SqliteStore>,
  affirmations: AffirmationService<SqliteStore>,
  settings:     SettingsService<SqliteStore>,
  area:         MemorySharedArea,
  notifier:     CountingNotifier,
  bridge:       Bridge,
}

fn harness() -> Harness {
  let store = Arc::new(SqliteStore::in_memory(Cipher::ephemeral()));
  let (tx, _) = events::channel();
  let area = MemorySharedArea::default();
  let notifier = CountingNotifier::default();
  Harness {
    affirmations: AffirmationService::new(store.clone(), tx.clone()),
    settings: SettingsService::new(store.clone(), tx),
    bridge: WidgetBridge::new(store.clone(), area.clone(), notifier.clone()),
    area,
    notifier,
    store,
  }
}

fn mirrored_list(area: &MemorySharedArea) -> Vec<MirroredAffirmation> {
  let raw = area.get(keys::LIST).unwrap();
  serde_json::from_str(raw.as_str().unwrap()).unwrap()
}

// ─── Snapshot contents ───────────────────────────────────────────────────────

#[tokio::test]
async fn empty_store_mirrors_defaults() {
  let h = harness();
  h.bridge.sync().await.unwrap();

  let a = &h.area;
  assert_eq!(a.get(keys::HAS_AFFIRMATIONS), Some(SharedValue::Bool(false)));
  assert_eq!(a.get(keys::COUNT), Some(SharedValue::Int(0)));
  assert_eq!(a.get(keys::LIST), Some(SharedValue::Text("[]".into())));
  assert_eq!(a.get(keys::CURRENT_ID), None);
  assert_eq!(a.get(keys::CURRENT_TEXT), None);
  assert_eq!(a.get(keys::THEME_MODE), Some(SharedValue::Text("system".into())));
  assert_eq!(a.get(keys::REFRESH_MODE), Some(SharedValue::Text("hourly".into())));
  assert_eq!(a.get(keys::ROTATION_ENABLED), Some(SharedValue::Bool(true)));
  assert_eq!(a.get(keys::FONT_SIZE_MULTIPLIER), Some(SharedValue::Float(1.0)));
  assert_eq!(h.notifier.count(), 1);
}

#[tokio::test]
async fn current_pick_and_active_list_are_mirrored() {
  let h = harness();
  let shown = h.affirmations.create("I am capable").await.unwrap();
  let hidden = h.affirmations.create("I rest").await.unwrap();
  h.affirmations.set_active(hidden.id, false).await.unwrap();
  h.affirmations.next().await.unwrap();
  h.settings.set_theme_mode(ThemeMode::Dark).await.unwrap();

  h.bridge.sync().await.unwrap();

  assert_eq!(
    h.area.get(keys::CURRENT_ID),
    Some(SharedValue::Text(shown.id.to_string()))
  );
  assert_eq!(
    h.area.get(keys::CURRENT_TEXT),
    Some(SharedValue::Text("I am capable".into()))
  );
  assert_eq!(h.area.get(keys::COUNT), Some(SharedValue::Int(1)));
  assert_eq!(h.area.get(keys::THEME_MODE), Some(SharedValue::Text("dark".into())));
  assert_eq!(
    mirrored_list(&h.area),
    vec![MirroredAffirmation {
      id:        shown.id,
      text:      "I am capable".into(),
      is_active: true,
    }]
  );

  let raw = h.area.get(keys::LIST).unwrap();
  assert!(raw.as_str().unwrap().contains("\"isActive\":true"));
}

#[tokio::test]
async fn deleting_the_only_affirmation_clears_the_mirror() {
  let h = harness();
  let only = h.affirmations.create("only one").await.unwrap();
  h.affirmations.next().await.unwrap();
  h.bridge.sync().await.unwrap();
  assert_eq!(h.area.get(keys::HAS_AFFIRMATIONS), Some(SharedValue::Bool(true)));

  h.affirmations.delete(only.id).await.unwrap();
  h.bridge.sync().await.unwrap();

  assert_eq!(h.area.get(keys::HAS_AFFIRMATIONS), Some(SharedValue::Bool(false)));
  assert_eq!(h.area.get(keys::CURRENT_ID), None);
  assert_eq!(h.area.get(keys::CURRENT_TEXT), None);
  assert!(mirrored_list(&h.area).is_empty());
}

#[tokio::test]
async fn deactivated_pick_is_not_mirrored() {
  let h = harness();
  h.affirmations.create("a").await.unwrap();
  h.affirmations.create("b").await.unwrap();
  h.affirmations.next().await.unwrap();
  let current = h.affirmations.current().await.unwrap().unwrap();

  h.affirmations.set_active(current.id, false).await.unwrap();
  let snapshot = h.bridge.sync().await.unwrap();

  assert!(snapshot.current.is_none());
  assert_eq!(h.area.get(keys::CURRENT_ID), None);
  assert_eq!(snapshot.list.len(), 1);
}

// ─── Failure handling ────────────────────────────────────────────────────────

#[tokio::test]
async fn sync_failures_are_swallowed() {
  let h = harness();
  h.bridge.sync().await.unwrap();
  h.store.close().await.unwrap();

  assert!(h.bridge.sync().await.is_err());
  h.bridge.sync_quietly().await;

  // The last good snapshot stays in place.
  assert_eq!(h.area.get(keys::HAS_AFFIRMATIONS), Some(SharedValue::Bool(false)));
  assert_eq!(h.notifier.count(), 1);
}

// ─── Event loop ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn run_follows_committed_changes() {
  let h = harness();
  let rx = h.affirmations.subscribe();
  let task = h.bridge.spawn(rx);

  h.affirmations.create("first").await.unwrap();
  h.affirmations.create("second").await.unwrap();

  let mut synced = false;
  for _ in 0..100 {
    if h.area.get(keys::COUNT) == Some(SharedValue::Int(2)) {
      synced = true;
      break;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
  }
  assert!(synced, "bridge never mirrored both affirmations");

  // Dropping every sender ends the loop.
  drop(h.affirmations);
  drop(h.settings);
  tokio::time::timeout(Duration::from_secs(5), task)
    .await
    .unwrap()
    .unwrap();
}

// ─── Areas and notifiers ─────────────────────────────────────────────────────

#[tokio::test]
async fn file_area_replaces_atomically() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("group").join("widget.json");
  let area = FileSharedArea::new(&path);

  assert!(area.read().await.unwrap().is_empty());

  let mut first = SharedMap::new();
  first.insert("a".into(), SharedValue::Int(1));
  first.insert("b".into(), SharedValue::Text("x".into()));
  area.replace(first.clone()).await.unwrap();
  assert_eq!(area.read().await.unwrap(), first);

  let mut second = SharedMap::new();
  second.insert("a".into(), SharedValue::Float(2.5));
  area.replace(second.clone()).await.unwrap();
  assert_eq!(area.read().await.unwrap(), second);

  let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
    .unwrap()
    .map(|e| e.unwrap().file_name())
    .collect();
  assert_eq!(leftovers, vec![std::ffi::OsString::from("widget.json")]);
}

#[tokio::test]
async fn bridge_writes_through_a_file_area() {
  let dir = tempfile::tempdir().unwrap();
  let store = Arc::new(SqliteStore::in_memory(Cipher::ephemeral()));
  let (tx, _) = events::channel();
  let svc = AffirmationService::new(store.clone(), tx);
  svc.create("on disk").await.unwrap();

  let area = FileSharedArea::new(dir.path().join("widget.json"));
  let bridge = WidgetBridge::new(store, area.clone(), CountingNotifier::default());
  bridge.sync().await.unwrap();

  let map = area.read().await.unwrap();
  assert_eq!(map.get(keys::COUNT), Some(&SharedValue::Int(1)));
  assert_eq!(map.get(keys::FONT_SIZE_MULTIPLIER), Some(&SharedValue::Float(1.0)));
  assert_eq!(map.get(keys::HAS_AFFIRMATIONS), Some(&SharedValue::Bool(true)));
}

#[test]
fn command_notifier_parses_command_lines() {
  assert!(CommandNotifier::from_command_line("   ").is_none());
  assert!(CommandNotifier::from_command_line("reload-widgets --all").is_some());
}

#[tokio::test]
async fn absent_notifier_is_a_no_op() {
  let store = Arc::new(SqliteStore::in_memory(Cipher::ephemeral()));
  let area = MemorySharedArea::default();
  let bridge = WidgetBridge::new(store, area.clone(), None::<CommandNotifier>);
  bridge.sync().await.unwrap();
  assert_eq!(area.get(keys::COUNT), Some(SharedValue::Int(0)));
}
