//! Use-case tests against an in-memory `SqliteStore`.

use std::sync::Arc;

use affirm_core::settings::{RefreshMode, SettingKey, Settings, ThemeMode};
use affirm_keys::Cipher;
use affirm_store_sqlite::SqliteStore;
use rand::{SeedableRng as _, rngs::StdRng};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
  AffirmationService, ChangeEvent, EditAffirmation, Failure, ImportMode,
  SettingsService, ValidationError, events, repo::AppStateRepository,
};

struct Harness {
  store:        Arc<SqliteStore>,
  affirmations: AffirmationService<SqliteStore>,
  settings:     SettingsService<SqliteStore>,
}

fn harness() -> Harness {
  let store = Arc::new(SqliteStore::in_memory(Cipher::ephemeral()));
  let (tx, _) = events::channel();
  Harness {
    affirmations: AffirmationService::new(store.clone(), tx.clone()),
    settings: SettingsService::new(store.clone(), tx),
    store,
  }
}

async fn texts(svc: &AffirmationService<SqliteStore>) -> Vec<String> {
  svc
    .list(true)
    .await
    .unwrap()
    .into_iter()
    .map(|a| a.text)
    .collect()
}

// ─── Create / edit / delete ──────────────────────────────────────────────────

#[tokio::test]
async fn create_first_affirmation() {
  let h = harness();
  let a = h.affirmations.create("  I am capable \n").await.unwrap();

  assert_eq!(a.text, "I am capable");
  assert_eq!(a.sort_order, 0);
  assert!(a.is_active);
  assert_eq!(a.display_count, 0);
  assert_eq!(h.affirmations.list(true).await.unwrap(), vec![a]);
}

#[tokio::test]
async fn sort_order_is_not_reused_after_delete() {
  let h = harness();
  let a = h.affirmations.create("A").await.unwrap();
  let b = h.affirmations.create("B").await.unwrap();
  assert_eq!((a.sort_order, b.sort_order), (0, 1));

  h.affirmations.delete(a.id).await.unwrap();
  let c = h.affirmations.create("C").await.unwrap();
  assert_eq!(c.sort_order, 2);
}

#[tokio::test]
async fn sort_order_increases_across_interleaved_deletes() {
  let h = harness();
  let mut last = -1;
  for round in 0..6 {
    let record = h.affirmations.create(&format!("n{round}")).await.unwrap();
    assert!(record.sort_order > last);
    last = record.sort_order;
    // Always delete the newest record, so the stored maximum drops.
    h.affirmations.delete(record.id).await.unwrap();
  }
}

#[tokio::test]
async fn text_length_boundary() {
  let h = harness();
  assert!(h.affirmations.create(&"x".repeat(280)).await.is_ok());

  let err = h.affirmations.create(&"x".repeat(281)).await.unwrap_err();
  assert!(matches!(
    err,
    Failure::Validation(ValidationError::TooLong { actual: 281, max: 280 })
  ));
  assert!(err.to_string().contains("280"));
  assert_eq!(h.affirmations.repository().count().await.unwrap(), 1);
}

#[tokio::test]
async fn blank_text_is_rejected() {
  let h = harness();
  assert!(matches!(
    h.affirmations.create("   \n ").await,
    Err(Failure::Validation(ValidationError::EmptyText))
  ));
}

#[tokio::test]
async fn delete_unknown_id_is_not_found_every_time() {
  let h = harness();
  let id = Uuid::new_v4();
  for _ in 0..3 {
    assert!(matches!(
      h.affirmations.delete(id).await,
      Err(Failure::NotFound(missing)) if missing == id
    ));
  }

  let a = h.affirmations.create("gone soon").await.unwrap();
  assert_eq!(h.affirmations.delete(a.id).await.unwrap(), a.id);
  assert!(matches!(
    h.affirmations.delete(a.id).await,
    Err(Failure::NotFound(_))
  ));
}

#[tokio::test]
async fn edit_preserves_identity_and_counters() {
  let h = harness();
  let a = h.affirmations.create("draft").await.unwrap();
  h.affirmations.next().await.unwrap();

  let edited = h
    .affirmations
    .edit(EditAffirmation { id: a.id, text: " final ".into(), is_active: None })
    .await
    .unwrap();

  assert_eq!(edited.id, a.id);
  assert_eq!(edited.text, "final");
  assert_eq!(edited.created_at, a.created_at);
  assert!(edited.updated_at >= edited.created_at);
  assert_eq!(edited.display_count, 1);
  assert!(edited.is_active);
}

#[tokio::test]
async fn edit_unknown_id_is_not_found() {
  let h = harness();
  let id = Uuid::new_v4();
  let result = h
    .affirmations
    .edit(EditAffirmation { id, text: "x".into(), is_active: Some(false) })
    .await;
  assert!(matches!(result, Err(Failure::NotFound(missing)) if missing == id));
}

#[tokio::test]
async fn inactive_records_are_listed_only_on_request() {
  let h = harness();
  let a = h.affirmations.create("resting").await.unwrap();
  h.affirmations.create("working").await.unwrap();
  h.affirmations.set_active(a.id, false).await.unwrap();

  let active = h.affirmations.list(false).await.unwrap();
  assert_eq!(active.len(), 1);
  assert_eq!(active[0].text, "working");
  assert_eq!(h.affirmations.list(true).await.unwrap().len(), 2);
}

#[tokio::test]
async fn reorder_moves_listed_ids_and_ignores_unknown() {
  let h = harness();
  let a = h.affirmations.create("a").await.unwrap();
  let b = h.affirmations.create("b").await.unwrap();
  let c = h.affirmations.create("c").await.unwrap();

  h.affirmations
    .reorder(&[c.id, Uuid::new_v4(), a.id])
    .await
    .unwrap();
  let order: Vec<_> = h
    .affirmations
    .list(true)
    .await
    .unwrap()
    .into_iter()
    .map(|r| r.id)
    .collect();
  // c and a move in front of b, which keeps its position.
  assert_eq!(order, vec![c.id, a.id, b.id]);
  let b_after = h.affirmations.repository().get_by_id(b.id).await.unwrap();
  assert_eq!(b_after.unwrap().sort_order, 1);

  assert!(matches!(
    h.affirmations.reorder(&[]).await,
    Err(Failure::Validation(ValidationError::EmptyReorder))
  ));
}

#[tokio::test]
async fn partial_reorder_moves_one_to_the_front() {
  let h = harness();
  h.affirmations.create("a").await.unwrap();
  h.affirmations.create("b").await.unwrap();
  let c = h.affirmations.create("c").await.unwrap();

  h.affirmations.reorder(&[c.id]).await.unwrap();
  assert_eq!(texts(&h.affirmations).await, ["c", "a", "b"]);

  // Later records still land at the end.
  h.affirmations.create("d").await.unwrap();
  assert_eq!(texts(&h.affirmations).await, ["c", "a", "b", "d"]);
}

#[tokio::test]
async fn full_reorder_renumbers_from_zero() {
  let h = harness();
  let a = h.affirmations.create("a").await.unwrap();
  let b = h.affirmations.create("b").await.unwrap();

  h.affirmations.reorder(&[b.id, a.id, b.id]).await.unwrap();
  let orders: Vec<(String, i64)> = h
    .affirmations
    .list(true)
    .await
    .unwrap()
    .into_iter()
    .map(|r| (r.text, r.sort_order))
    .collect();
  assert_eq!(orders, [("b".to_owned(), 0), ("a".to_owned(), 1)]);
}

#[tokio::test]
async fn delete_all_restarts_numbering() {
  let h = harness();
  h.affirmations.create("a").await.unwrap();
  h.affirmations.create("b").await.unwrap();

  assert_eq!(h.affirmations.delete_all().await.unwrap(), 2);
  assert!(texts(&h.affirmations).await.is_empty());
  assert_eq!(h.affirmations.create("c").await.unwrap().sort_order, 0);
}

// ─── Picking ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn next_never_repeats_with_alternatives() {
  let h = harness();
  for text in ["one", "two", "three"] {
    h.affirmations.create(text).await.unwrap();
  }

  let mut rng = StdRng::seed_from_u64(7);
  let mut previous = None;
  for _ in 0..200 {
    let pick = h.affirmations.next_with(&mut rng).await.unwrap().unwrap();
    assert_ne!(Some(pick.id), previous);
    previous = Some(pick.id);
  }

  let total: u64 = h
    .affirmations
    .list(true)
    .await
    .unwrap()
    .iter()
    .map(|a| a.display_count)
    .sum();
  assert_eq!(total, 200);
}

#[tokio::test]
async fn next_with_single_affirmation_repeats_it() {
  let h = harness();
  let only = h.affirmations.create("only").await.unwrap();
  for _ in 0..3 {
    let pick = h.affirmations.next().await.unwrap().unwrap();
    assert_eq!(pick.id, only.id);
  }
  assert_eq!(h.affirmations.current().await.unwrap().unwrap().id, only.id);
}

#[tokio::test]
async fn next_on_empty_set_is_none() {
  let h = harness();
  assert!(h.affirmations.next().await.unwrap().is_none());
  assert!(h.affirmations.current().await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_the_current_pick_clears_it() {
  let h = harness();
  let a = h.affirmations.create("a").await.unwrap();
  h.affirmations.next().await.unwrap();
  assert!(h.affirmations.current().await.unwrap().is_some());

  h.affirmations.delete(a.id).await.unwrap();
  assert!(h.affirmations.current().await.unwrap().is_none());
}

#[tokio::test]
async fn repository_delete_clears_the_pick_with_the_record() {
  let h = harness();
  let a = h.affirmations.create("a").await.unwrap();
  let repo = h.affirmations.repository();
  let state = AppStateRepository::new(h.store.clone());

  repo.record_display(a.id).await.unwrap();
  assert_eq!(state.current_pick().await.unwrap(), Some(a.id));

  assert!(repo.delete(a.id).await.unwrap());
  assert_eq!(state.current_pick().await.unwrap(), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_next_and_delete_never_leave_a_dangling_pick() {
  let h = harness();
  let mut ids = Vec::new();
  for i in 0..20 {
    ids.push(h.affirmations.create(&format!("n{i}")).await.unwrap().id);
  }

  let picker = {
    let svc = h.affirmations.clone();
    tokio::spawn(async move {
      for _ in 0..60 {
        // A pick may race a delete and report NotFound; that is fine.
        let _ = svc.next().await;
      }
    })
  };
  let deleter = {
    let svc = h.affirmations.clone();
    tokio::spawn(async move {
      for id in ids {
        let _ = svc.delete(id).await;
      }
    })
  };
  picker.await.unwrap();
  deleter.await.unwrap();

  let state = AppStateRepository::new(h.store.clone());
  assert_eq!(state.current_pick().await.unwrap(), None);
  assert_eq!(h.affirmations.repository().count().await.unwrap(), 0);
}

#[tokio::test]
async fn deactivated_pick_is_not_current() {
  let h = harness();
  let a = h.affirmations.create("a").await.unwrap();
  h.affirmations.next().await.unwrap();
  h.affirmations.set_active(a.id, false).await.unwrap();
  assert!(h.affirmations.current().await.unwrap().is_none());
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn mutations_publish_after_commit() {
  let h = harness();
  let mut rx = h.affirmations.subscribe();

  let a = h.affirmations.create("a").await.unwrap();
  assert_eq!(rx.recv().await.unwrap(), ChangeEvent::Created(a.id));

  h.affirmations.next().await.unwrap();
  assert_eq!(rx.recv().await.unwrap(), ChangeEvent::PickChanged(Some(a.id)));

  h.affirmations.delete(a.id).await.unwrap();
  assert_eq!(rx.recv().await.unwrap(), ChangeEvent::Deleted(a.id));

  // Failed operations publish nothing.
  let _ = h.affirmations.create("").await;
  h.settings.set_theme_mode(ThemeMode::Dark).await.unwrap();
  assert_eq!(
    rx.recv().await.unwrap(),
    ChangeEvent::SettingsChanged(SettingKey::ThemeMode)
  );
}

// ─── Import / export ─────────────────────────────────────────────────────────

#[tokio::test]
async fn import_numbered_list_into_empty_store() {
  let h = harness();
  let report = h
    .affirmations
    .import("1. First\n2. Second\n", ImportMode::Append, &CancellationToken::new())
    .await
    .unwrap();

  assert_eq!(report.imported, 2);
  assert!(report.rejected.is_empty());
  assert!(!report.interrupted);
  assert_eq!(texts(&h.affirmations).await, ["First", "Second"]);
}

#[tokio::test]
async fn export_then_replace_import_round_trips() {
  let h = harness();
  h.affirmations.create("I am capable").await.unwrap();
  h.affirmations.create("I breathe in\ncalm").await.unwrap();
  h.affirmations.create("I rest\n\nwhen I need to").await.unwrap();
  h.affirmations.create("Steps:\n  breathe\n  smile").await.unwrap();
  let hidden = h.affirmations.create("1. looks numbered").await.unwrap();
  h.affirmations.set_active(hidden.id, false).await.unwrap();
  let before = texts(&h.affirmations).await;

  let exported = h.affirmations.export().await.unwrap();
  h.affirmations.create("scratch").await.unwrap();

  let report = h
    .affirmations
    .import(&exported, ImportMode::Replace, &CancellationToken::new())
    .await
    .unwrap();
  assert_eq!(report.imported, 5);
  assert_eq!(texts(&h.affirmations).await, before);
}

#[tokio::test]
async fn replace_keeps_existing_when_nothing_is_valid() {
  let h = harness();
  h.affirmations.create("keep me").await.unwrap();

  let report = h
    .affirmations
    .import("1.\n\n2.   \n", ImportMode::Replace, &CancellationToken::new())
    .await
    .unwrap();
  assert_eq!(report.imported, 0);
  assert_eq!(report.rejected.len(), 2);
  assert_eq!(texts(&h.affirmations).await, ["keep me"]);
}

#[tokio::test]
async fn skip_duplicates_ignores_case_and_repeats() {
  let h = harness();
  h.affirmations.create("I am Calm").await.unwrap();

  let report = h
    .affirmations
    .import(
      "i am calm\nI am brave\n  I AM BRAVE  \nI am  brave",
      ImportMode::SkipDuplicates,
      &CancellationToken::new(),
    )
    .await
    .unwrap();

  assert_eq!(report.imported, 2);
  assert_eq!(report.skipped_duplicates, 2);
  assert_eq!(
    texts(&h.affirmations).await,
    ["I am Calm", "I am brave", "I am  brave"]
  );
}

#[tokio::test]
async fn invalid_entries_are_reported_with_their_line() {
  let h = harness();
  let long = "y".repeat(300);
  let source = format!("# header\nGood one\n{long}\nAnother");

  let report = h
    .affirmations
    .import(&source, ImportMode::Append, &CancellationToken::new())
    .await
    .unwrap();

  assert_eq!(report.imported, 2);
  assert_eq!(report.rejected.len(), 1);
  let rejected = &report.rejected[0];
  assert_eq!(rejected.line, 3);
  assert_eq!(rejected.preview.chars().count(), 40);
  assert!(matches!(rejected.reason, ValidationError::TooLong { actual: 300, .. }));
}

#[tokio::test]
async fn empty_or_comment_only_sources_fail() {
  let h = harness();
  let token = CancellationToken::new();
  for source in ["", "  \n\t\n", "# only\n# metadata\n"] {
    assert!(matches!(
      h.affirmations.import(source, ImportMode::Append, &token).await,
      Err(Failure::Import(_))
    ));
  }
}

#[tokio::test]
async fn cancelled_import_stops_and_reports_interrupted() {
  let h = harness();
  let token = CancellationToken::new();
  token.cancel();

  let report = h
    .affirmations
    .import("a\nb\nc", ImportMode::Append, &token)
    .await
    .unwrap();
  assert!(report.interrupted);
  assert_eq!(report.imported, 0);
  assert!(texts(&h.affirmations).await.is_empty());
}

#[tokio::test]
async fn cancelled_replace_import_keeps_existing_data() {
  let h = harness();
  let kept = h.affirmations.create("precious").await.unwrap();
  h.affirmations.next().await.unwrap();
  let token = CancellationToken::new();
  token.cancel();

  let report = h
    .affirmations
    .import("new one", ImportMode::Replace, &token)
    .await
    .unwrap();
  assert!(report.interrupted);
  assert_eq!(report.imported, 0);
  assert_eq!(texts(&h.affirmations).await, ["precious"]);
  assert_eq!(h.affirmations.current().await.unwrap().unwrap().id, kept.id);
}

#[tokio::test]
async fn import_and_export_files() {
  let h = harness();
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("affirmations.txt");

  h.affirmations.create("from disk").await.unwrap();
  assert_eq!(h.affirmations.export_to_file(&path).await.unwrap(), 1);

  let report = h
    .affirmations
    .import_file(&path, ImportMode::Append, &CancellationToken::new())
    .await
    .unwrap();
  assert_eq!(report.imported, 1);
  assert_eq!(texts(&h.affirmations).await, ["from disk", "from disk"]);

  let missing = dir.path().join("missing.txt");
  assert!(matches!(
    h.affirmations
      .import_file(&missing, ImportMode::Append, &CancellationToken::new())
      .await,
    Err(Failure::Import(_))
  ));
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn settings_default_and_persist_on_first_read() {
  let h = harness();
  let repo = h.settings.repository();

  assert_eq!(repo.snapshot().await.unwrap(), Settings::default());
  assert_eq!(h.settings.load().await.unwrap(), Settings::default());
  assert_eq!(repo.theme_mode().await.unwrap(), ThemeMode::System);
  assert_eq!(repo.refresh_mode().await.unwrap(), RefreshMode::Hourly);
}

#[tokio::test]
async fn settings_fields_update_independently() {
  let h = harness();
  h.settings.set_theme_mode(ThemeMode::Dark).await.unwrap();
  h.settings.set("refresh_mode".parse().unwrap(), "onUnlock").await.unwrap();
  h.settings.set_font_size_multiplier(1.25).await.unwrap();
  h.settings.complete_onboarding().await.unwrap();

  let s = h.settings.load().await.unwrap();
  assert_eq!(s.theme_mode, ThemeMode::Dark);
  assert_eq!(s.refresh_mode, RefreshMode::OnUnlock);
  assert_eq!(s.font_size_multiplier, 1.25);
  assert!(s.has_completed_onboarding);
  assert_eq!(s.language, "en");
  assert!(s.widget_rotation_enabled);
}

#[tokio::test]
async fn invalid_settings_are_rejected() {
  let h = harness();
  for value in [0.0, -1.0, f64::NAN, f64::INFINITY] {
    assert!(matches!(
      h.settings.set_font_size_multiplier(value).await,
      Err(Failure::Validation(ValidationError::InvalidSetting {
        field: "font_size_multiplier",
        ..
      }))
    ));
  }
  assert!(matches!(
    h.settings.set_language("  ").await,
    Err(Failure::Validation(_))
  ));
  assert!(matches!(
    h.settings.set(SettingKey::ThemeMode, "sepia").await,
    Err(Failure::Validation(_))
  ));
  assert_eq!(h.settings.load().await.unwrap(), Settings::default());
}

#[tokio::test]
async fn reset_restores_defaults() {
  let h = harness();
  h.settings.set_language("pt-BR").await.unwrap();
  h.settings.set_widget_rotation_enabled(false).await.unwrap();

  assert_eq!(h.settings.reset().await.unwrap(), Settings::default());
  assert_eq!(h.settings.load().await.unwrap(), Settings::default());
}

// ─── Storage failures ────────────────────────────────────────────────────────

#[tokio::test]
async fn closed_store_surfaces_storage_closed() {
  let h = harness();
  h.affirmations.create("a").await.unwrap();
  h.store.close().await.unwrap();

  assert!(matches!(
    h.affirmations.create("b").await,
    Err(Failure::StorageClosed)
  ));
  assert!(matches!(h.settings.load().await, Err(Failure::StorageClosed)));
}

#[tokio::test]
async fn wrong_key_surfaces_decryption() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("affirm.db");
  let (tx, _) = events::channel();

  let store = Arc::new(SqliteStore::new(&path, Cipher::ephemeral()));
  AffirmationService::new(store.clone(), tx.clone())
    .create("sealed")
    .await
    .unwrap();
  store.close().await.unwrap();

  let reopened = Arc::new(SqliteStore::new(&path, Cipher::ephemeral()));
  let svc = AffirmationService::new(reopened, tx);
  assert!(matches!(svc.list(true).await, Err(Failure::Decryption(_))));
}
