//! `affirm` — manage affirmations from the terminal.
//!
//! # Usage
//!
//! ```text
//! affirm add "I am capable"
//! affirm list --all
//! affirm next
//! affirm import notes.txt --mode skip-duplicates
//! affirm settings set theme_mode dark
//! ```
//!
//! Every mutation is mirrored into `<shared_dir>/widget.json` for the
//! home-screen renderer before the process exits.

mod commands;
mod config;
mod credentials;

use std::{path::PathBuf, sync::Arc};

use affirm_app::{AffirmationService, SettingsService, events};
use affirm_keys::KeyManager;
use affirm_store_sqlite::SqliteStore;
use affirm_widget::{CommandNotifier, FileSharedArea, WidgetBridge};
use anyhow::Context as _;
use clap::Parser;
use commands::Command;
use config::{AppConfig, expand_tilde};
use credentials::Credentials;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "affirm", version, about = "Personal affirmations, mirrored to your home screen")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(
    short,
    long,
    env = "AFFIRM_CONFIG",
    default_value = "~/.config/affirm/config.toml"
  )]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = AppConfig::load(&expand_tilde(&cli.config))?;

  // Storage key.
  let keys = KeyManager::new(Credentials::from_config(&cfg)?);
  let cipher = keys.initialize().context("failed to initialise storage key")?;

  if let Command::Key { action } = &cli.command {
    return commands::key(action, &keys, &cfg).await;
  }

  std::fs::create_dir_all(&cfg.data_dir)
    .with_context(|| format!("failed to create {}", cfg.data_dir.display()))?;
  let store = Arc::new(SqliteStore::new(cfg.database_path(), cipher));

  let bridge = WidgetBridge::new(
    store.clone(),
    FileSharedArea::new(cfg.shared_path()),
    cfg
      .refresh_command
      .as_deref()
      .and_then(CommandNotifier::from_command_line),
  );

  if let Command::Sync = cli.command {
    let snapshot = bridge.sync().await.context("widget sync failed")?;
    println!(
      "mirrored {} affirmation(s) to {}",
      snapshot.list.len(),
      bridge.area().path().display()
    );
    store.close().await?;
    return Ok(());
  }

  // The bridge follows every committed change and stops once the services
  // (and with them every sender) are dropped.
  let (tx, rx) = events::channel();
  let follower = bridge.spawn(rx);
  let result = {
    let affirmations = AffirmationService::new(store.clone(), tx.clone());
    let settings = SettingsService::new(store.clone(), tx);
    commands::run(cli.command, &affirmations, &settings).await
  };
  follower.await.context("widget bridge task failed")?;
  store.close().await?;
  result
}
