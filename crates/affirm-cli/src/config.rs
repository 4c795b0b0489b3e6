//! Runtime configuration: an optional TOML file under `AFFIRM_*` variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Where the storage key lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
  /// The login keychain. macOS only.
  Keychain,
  /// A hex-encoded key in an environment variable. Read-only: the key must
  /// be provisioned before first run.
  Env,
  /// A key that lives for one process. Data written with it cannot be read
  /// back by a later run.
  Memory,
}

impl Default for CredentialBackend {
  fn default() -> Self {
    if cfg!(target_os = "macos") { Self::Keychain } else { Self::Env }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Directory holding `affirm.db`.
  pub data_dir:        PathBuf,
  /// Directory holding the renderer's `widget.json`.
  pub shared_dir:      PathBuf,
  pub credential:      CredentialBackend,
  /// Variable read by the `env` backend.
  pub key_var:         String,
  /// Command run after each mirror write, e.g. a widget reload hook.
  pub refresh_command: Option<String>,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      data_dir:        PathBuf::from("~/.local/share/affirm"),
      shared_dir:      PathBuf::from("~/.local/share/affirm/shared"),
      credential:      CredentialBackend::default(),
      key_var:         "AFFIRM_STORAGE_KEY".to_owned(),
      refresh_command: None,
    }
  }
}

impl AppConfig {
  /// Layer `path` (if it exists) under `AFFIRM_*` environment variables and
  /// expand `~` in every path.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("AFFIRM"))
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?;

    let mut cfg: AppConfig = settings
      .try_deserialize()
      .context("failed to deserialise AppConfig")?;
    cfg.data_dir = expand_tilde(&cfg.data_dir);
    cfg.shared_dir = expand_tilde(&cfg.shared_dir);
    Ok(cfg)
  }

  pub fn database_path(&self) -> PathBuf { self.data_dir.join("affirm.db") }

  pub fn shared_path(&self) -> PathBuf { self.shared_dir.join("widget.json") }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
