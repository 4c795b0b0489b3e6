//! Cross-process key/value areas.

use std::{
  collections::BTreeMap,
  future::Future,
  path::{Path, PathBuf},
  sync::Arc,
};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;

/// A primitive the renderer can read without knowing any app types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SharedValue {
  Bool(bool),
  Int(i64),
  Float(f64),
  Text(String),
}

impl SharedValue {
  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::Text(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Self::Bool(b) => Some(*b),
      _ => None,
    }
  }

  pub fn as_i64(&self) -> Option<i64> {
    match self {
      Self::Int(i) => Some(*i),
      _ => None,
    }
  }

  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Self::Float(f) => Some(*f),
      Self::Int(i) => Some(*i as f64),
      _ => None,
    }
  }
}

/// The full contents of an area. A key that is absent is "unset".
pub type SharedMap = BTreeMap<String, SharedValue>;

/// Storage readable by another process.
///
/// Writes replace the whole map at once, so a reader sees either the previous
/// snapshot or the new one and never a mix of the two.
pub trait SharedArea: Send + Sync {
  fn replace(&self, entries: SharedMap) -> impl Future<Output = Result<()>> + Send;

  fn read(&self) -> impl Future<Output = Result<SharedMap>> + Send;
}

// ─── File ────────────────────────────────────────────────────────────────────

/// One JSON document on disk, e.g. inside an app-group container.
///
/// Each write goes to a sibling temp file which is then renamed over the
/// target.
#[derive(Debug, Clone)]
pub struct FileSharedArea {
  path: PathBuf,
}

impl FileSharedArea {
  pub fn new(path: impl AsRef<Path>) -> Self {
    Self { path: path.as_ref().to_path_buf() }
  }

  pub fn path(&self) -> &Path { &self.path }

  fn staging_path(&self) -> PathBuf {
    let mut name = self
      .path
      .file_name()
      .map(|n| n.to_os_string())
      .unwrap_or_default();
    name.push(".tmp");
    self.path.with_file_name(name)
  }
}

impl SharedArea for FileSharedArea {
  async fn replace(&self, entries: SharedMap) -> Result<()> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      tokio::fs::create_dir_all(parent).await?;
    }
    let body = serde_json::to_vec_pretty(&entries)?;
    let staging = self.staging_path();
    tokio::fs::write(&staging, body).await?;
    tokio::fs::rename(&staging, &self.path).await?;
    debug!(path = %self.path.display(), keys = entries.len(), "shared area written");
    Ok(())
  }

  async fn read(&self) -> Result<SharedMap> {
    match tokio::fs::read(&self.path).await {
      Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SharedMap::new()),
      Err(e) => Err(e.into()),
    }
  }
}

// ─── Memory ──────────────────────────────────────────────────────────────────

/// An in-process area. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemorySharedArea {
  entries: Arc<Mutex<SharedMap>>,
}

impl MemorySharedArea {
  pub fn get(&self, key: &str) -> Option<SharedValue> {
    self.entries.lock().get(key).cloned()
  }
}

impl SharedArea for MemorySharedArea {
  async fn replace(&self, entries: SharedMap) -> Result<()> {
    *self.entries.lock() = entries;
    Ok(())
  }

  async fn read(&self) -> Result<SharedMap> { Ok(self.entries.lock().clone()) }
}
