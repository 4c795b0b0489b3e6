//! Subcommands and their handlers.

use std::{path::PathBuf, sync::Arc};

use affirm_app::{
  AffirmationService, EditAffirmation, ImportMode, ImportReport, SettingsService,
};
use affirm_core::{
  affirmation::Affirmation,
  settings::{SettingKey, Settings},
  store::{Namespace, RecordStore},
};
use affirm_keys::{CredentialStore, KeyManager};
use affirm_store_sqlite::SqliteStore;
use affirm_widget::{FileSharedArea, WidgetBridge};
use anyhow::{Context as _, bail};
use clap::Subcommand;
use strum::IntoEnumIterator as _;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::AppConfig;

type Affirmations = AffirmationService<SqliteStore>;
type SettingsSvc = SettingsService<SqliteStore>;

#[derive(Subcommand)]
pub enum Command {
  /// Add a new affirmation.
  Add { text: String },

  /// List affirmations in display order.
  List {
    /// Include inactive affirmations.
    #[arg(long)]
    all: bool,
  },

  /// Replace the text of an affirmation.
  Edit { id: String, text: String },

  /// Flip an affirmation between active and inactive.
  Toggle { id: String },

  /// Delete an affirmation.
  Delete { id: String },

  /// Put the given affirmations first, in this order.
  Reorder {
    #[arg(required = true)]
    ids: Vec<String>,
  },

  /// Show the next affirmation, never the one shown last.
  Next,

  /// Show the current affirmation without picking a new one.
  Current,

  /// Import affirmations from a text file.
  Import {
    file: PathBuf,
    /// append, replace, or skip-duplicates.
    #[arg(long, default_value_t = ImportMode::Append)]
    mode: ImportMode,
  },

  /// Export every affirmation. Writes to stdout without a file.
  Export { file: Option<PathBuf> },

  /// Show or change preferences.
  Settings {
    #[command(subcommand)]
    action: SettingsAction,
  },

  /// Rewrite the home-screen mirror from stored state.
  Sync,

  /// Manage the storage key.
  Key {
    #[command(subcommand)]
    action: KeyAction,
  },
}

#[derive(Subcommand)]
pub enum SettingsAction {
  Show,
  /// Set one field, e.g. `theme_mode dark`.
  Set { key: SettingKey, value: String },
  Reset,
}

#[derive(Subcommand)]
pub enum KeyAction {
  /// Print the key fingerprint.
  Status,
  /// Replace the storage key and erase everything stored with the old one.
  Reset {
    /// Confirm that existing data will be erased.
    #[arg(long)]
    yes: bool,
  },
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

pub async fn run(
  command: Command,
  affirmations: &Affirmations,
  settings: &SettingsSvc,
) -> anyhow::Result<()> {
  match command {
    Command::Add { text } => {
      let a = affirmations.create(&text).await?;
      println!("added {}", short(a.id));
    }
    Command::List { all } => {
      for a in affirmations.list(all).await? {
        print_row(&a);
      }
    }
    Command::Edit { id, text } => {
      let id = resolve(affirmations, &id).await?;
      affirmations
        .edit(EditAffirmation { id, text, is_active: None })
        .await?;
      println!("updated {}", short(id));
    }
    Command::Toggle { id } => {
      let id = resolve(affirmations, &id).await?;
      let current = affirmations
        .repository()
        .get_by_id(id)
        .await?
        .context("affirmation disappeared")?;
      let a = affirmations.set_active(id, !current.is_active).await?;
      println!(
        "{} is now {}",
        short(id),
        if a.is_active { "active" } else { "inactive" }
      );
    }
    Command::Delete { id } => {
      let id = resolve(affirmations, &id).await?;
      affirmations.delete(id).await?;
      println!("deleted {}", short(id));
    }
    Command::Reorder { ids } => {
      let mut resolved = Vec::with_capacity(ids.len());
      for raw in &ids {
        resolved.push(resolve(affirmations, raw).await?);
      }
      affirmations.reorder(&resolved).await?;
    }
    Command::Next => match affirmations.next().await? {
      Some(a) => println!("{}", a.text),
      None => println!("no active affirmations yet; add one with `affirm add`"),
    },
    Command::Current => {
      if let Some(a) = affirmations.current().await? {
        println!("{}", a.text);
      }
    }
    Command::Import { file, mode } => {
      let cancel = CancellationToken::new();
      let on_interrupt = cancel.clone();
      tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
          on_interrupt.cancel();
        }
      });
      let report = affirmations.import_file(&file, mode, &cancel).await?;
      print_report(&report);
    }
    Command::Export { file: Some(path) } => {
      let count = affirmations.export_to_file(&path).await?;
      println!("exported {count} affirmation(s) to {}", path.display());
    }
    Command::Export { file: None } => print!("{}", affirmations.export().await?),
    Command::Settings { action } => match action {
      SettingsAction::Show => print_settings(&settings.load().await?),
      SettingsAction::Set { key, value } => settings.set(key, &value).await?,
      SettingsAction::Reset => print_settings(&settings.reset().await?),
    },
    Command::Sync | Command::Key { .. } => {
      bail!("this command is handled before the store is opened")
    }
  }
  Ok(())
}

/// Key commands run before any service exists: a reset invalidates the
/// cipher every service would have been built with.
pub async fn key<C: CredentialStore>(
  action: &KeyAction,
  keys: &KeyManager<C>,
  cfg: &AppConfig,
) -> anyhow::Result<()> {
  match action {
    KeyAction::Status => {
      println!("storage key fingerprint: {}", keys.cipher()?.fingerprint());
    }
    KeyAction::Reset { yes: false } => {
      bail!("resetting the key erases every affirmation and setting; rerun with --yes")
    }
    KeyAction::Reset { yes: true } => {
      let cipher = keys.reset().context("failed to reset storage key")?;
      let store = Arc::new(SqliteStore::new(cfg.database_path(), cipher));
      for namespace in Namespace::iter() {
        store.clear(namespace).await?;
      }
      WidgetBridge::new(
        store.clone(),
        FileSharedArea::new(cfg.shared_path()),
        None::<affirm_widget::CommandNotifier>,
      )
      .sync_quietly()
      .await;
      store.close().await?;
      println!("storage key replaced; all data erased");
    }
  }
  Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Accept a full id or an unambiguous prefix of one.
async fn resolve(affirmations: &Affirmations, raw: &str) -> anyhow::Result<Uuid> {
  if let Ok(id) = raw.parse::<Uuid>() {
    return Ok(id);
  }
  let prefix = raw.to_ascii_lowercase();
  let matches: Vec<Uuid> = affirmations
    .list(true)
    .await?
    .into_iter()
    .map(|a| a.id)
    .filter(|id| id.to_string().starts_with(&prefix))
    .collect();
  match matches.as_slice() {
    [id] => Ok(*id),
    [] => bail!("no affirmation matches {raw:?}"),
    _ => bail!("{raw:?} matches {} affirmations; use more characters", matches.len()),
  }
}

fn short(id: Uuid) -> String { id.to_string()[..8].to_owned() }

fn print_row(a: &Affirmation) {
  let marker = if a.is_active { ' ' } else { '-' };
  let mut lines = a.text.lines();
  println!("{}{marker} {}", short(a.id), lines.next().unwrap_or_default());
  for line in lines {
    println!("           {line}");
  }
}

fn print_report(report: &ImportReport) {
  println!("imported {} affirmation(s)", report.imported);
  if report.skipped_duplicates > 0 {
    println!("skipped {} duplicate(s)", report.skipped_duplicates);
  }
  for rejected in &report.rejected {
    println!("line {}: {} ({:?})", rejected.line, rejected.reason, rejected.preview);
  }
  if report.interrupted {
    println!("interrupted; entries imported so far were kept");
  }
}

fn print_settings(settings: &Settings) {
  for key in SettingKey::iter() {
    let value = match key {
      SettingKey::ThemeMode => settings.theme_mode.to_string(),
      SettingKey::RefreshMode => settings.refresh_mode.to_string(),
      SettingKey::Language => settings.language.clone(),
      SettingKey::FontSizeMultiplier => settings.font_size_multiplier.to_string(),
      SettingKey::WidgetRotationEnabled => settings.widget_rotation_enabled.to_string(),
      SettingKey::HasCompletedOnboarding => {
        settings.has_completed_onboarding.to_string()
      }
    };
    println!("{:<26} {value}", key.as_str());
  }
}
