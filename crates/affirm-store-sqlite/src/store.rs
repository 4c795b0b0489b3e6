//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`].

use std::{
  collections::HashSet,
  path::{Path, PathBuf},
  sync::Arc,
};

use affirm_core::store::{Namespace, RecordStore};
use affirm_keys::Cipher;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::OptionalExtension as _;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::{
  Error, Result,
  schema::{CONNECTION_PRAGMAS, namespace_table},
};

// ─── Store ───────────────────────────────────────────────────────────────────

enum Target {
  File(PathBuf),
  Memory,
}

enum State {
  /// Constructed but not yet touched.
  Pending,
  Open(Connection),
  Closed,
}

struct Inner {
  target: Target,
  cipher: Cipher,
  state:  RwLock<State>,
  /// Namespaces whose table is known to exist on the open connection.
  ready:  Mutex<HashSet<Namespace>>,
}

/// An encrypted record store backed by a single SQLite file.
///
/// Nothing touches the disk until the first operation: the connection is
/// opened then, and each namespace's table is created the first time that
/// namespace is used. The store stays open until [`close`](Self::close).
///
/// Cloning is cheap — clones share the connection and its lifecycle.
#[derive(Clone)]
pub struct SqliteStore {
  inner: Arc<Inner>,
}

impl SqliteStore {
  /// A store at `path`, sealed with `cipher`. Opens lazily.
  pub fn new(path: impl AsRef<Path>, cipher: Cipher) -> Self {
    Self::with_target(Target::File(path.as_ref().to_path_buf()), cipher)
  }

  /// An in-memory store — useful for testing.
  pub fn in_memory(cipher: Cipher) -> Self {
    Self::with_target(Target::Memory, cipher)
  }

  fn with_target(target: Target, cipher: Cipher) -> Self {
    Self {
      inner: Arc::new(Inner {
        target,
        cipher,
        state: RwLock::new(State::Pending),
        ready: Mutex::new(HashSet::new()),
      }),
    }
  }

  /// Close the connection. Every later operation fails with
  /// [`Error::Closed`]. Closing twice is a no-op.
  pub async fn close(&self) -> Result<()> {
    let mut state = self.inner.state.write().await;
    let previous = std::mem::replace(&mut *state, State::Closed);
    self.inner.ready.lock().clear();
    if let State::Open(conn) = previous {
      conn.close().await?;
      debug!("store closed");
    }
    Ok(())
  }

  pub async fn is_closed(&self) -> bool {
    matches!(*self.inner.state.read().await, State::Closed)
  }

  /// The live connection, opening it on first use.
  async fn connection(&self) -> Result<Connection> {
    {
      let state = self.inner.state.read().await;
      match &*state {
        State::Open(conn) => return Ok(conn.clone()),
        State::Closed => return Err(Error::Closed),
        State::Pending => {}
      }
    }

    let mut state = self.inner.state.write().await;
    match &*state {
      State::Open(conn) => Ok(conn.clone()),
      State::Closed => Err(Error::Closed),
      State::Pending => {
        let conn = match &self.inner.target {
          Target::File(path) => Connection::open(path).await?,
          Target::Memory => Connection::open_in_memory().await?,
        };
        conn
          .call(|conn| {
            conn.execute_batch(CONNECTION_PRAGMAS)?;
            Ok(())
          })
          .await?;
        debug!("store opened");
        *state = State::Open(conn.clone());
        Ok(conn)
      }
    }
  }

  /// The connection, with `namespace`'s table guaranteed to exist.
  async fn namespace(&self, namespace: Namespace) -> Result<Connection> {
    let conn = self.connection().await?;
    if self.inner.ready.lock().contains(&namespace) {
      return Ok(conn);
    }

    let ddl = namespace_table(namespace);
    conn
      .call(move |conn| {
        conn.execute_batch(&ddl)?;
        Ok(())
      })
      .await?;

    self.inner.ready.lock().insert(namespace);
    debug!(%namespace, "namespace opened");
    Ok(conn)
  }

  fn seal<T: Serialize + ?Sized>(
    &self,
    namespace: Namespace,
    key: &str,
    record: &T,
  ) -> Result<Vec<u8>> {
    let plaintext = serde_json::to_vec(record)?;
    Ok(self.inner.cipher.seal(address(namespace, key).as_bytes(), &plaintext)?)
  }

  fn unseal<T: DeserializeOwned>(
    &self,
    namespace: Namespace,
    key: &str,
    payload: &[u8],
  ) -> Result<T> {
    let address = address(namespace, key);
    let plaintext = self
      .inner
      .cipher
      .open(address.as_bytes(), payload)
      .map_err(|_| Error::Decryption { address })?;
    Ok(serde_json::from_slice(&plaintext)?)
  }
}

/// The associated data a record is sealed under. Binding the payload to its
/// location means a row copied to another key or namespace fails to open.
fn address(namespace: Namespace, key: &str) -> String {
  format!("{namespace}/{key}")
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  async fn get<T>(&self, namespace: Namespace, key: &str) -> Result<Option<T>>
  where
    T: DeserializeOwned + Send + 'static,
  {
    let conn = self.namespace(namespace).await?;
    let sql = format!("SELECT payload FROM {namespace} WHERE key = ?1");
    let key_owned = key.to_owned();

    let payload: Option<Vec<u8>> = conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![key_owned], |row| row.get(0))
            .optional()?,
        )
      })
      .await?;

    payload
      .map(|bytes| self.unseal(namespace, key, &bytes))
      .transpose()
  }

  async fn put<T>(&self, namespace: Namespace, key: &str, record: &T) -> Result<()>
  where
    T: Serialize + Sync,
  {
    let payload = self.seal(namespace, key, record)?;
    let conn = self.namespace(namespace).await?;
    let sql = format!(
      "INSERT INTO {namespace} (key, payload, written_at) VALUES (?1, ?2, ?3)
       ON CONFLICT(key) DO UPDATE SET
         payload    = excluded.payload,
         written_at = excluded.written_at"
    );
    let key_owned = key.to_owned();
    let written_at = Utc::now().to_rfc3339();

    conn
      .call(move |conn| {
        conn.execute(&sql, rusqlite::params![key_owned, payload, written_at])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete(&self, namespace: Namespace, key: &str) -> Result<bool> {
    let conn = self.namespace(namespace).await?;
    let sql = format!("DELETE FROM {namespace} WHERE key = ?1");
    let key_owned = key.to_owned();

    let removed = conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params![key_owned])?))
      .await?;
    Ok(removed > 0)
  }

  async fn values<T>(&self, namespace: Namespace) -> Result<Vec<T>>
  where
    T: DeserializeOwned + Send + 'static,
  {
    let conn = self.namespace(namespace).await?;
    let sql = format!("SELECT key, payload FROM {namespace}");

    let rows: Vec<(String, Vec<u8>)> = conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .iter()
      .map(|(key, payload)| self.unseal(namespace, key, payload))
      .collect()
  }

  async fn clear(&self, namespace: Namespace) -> Result<()> {
    let conn = self.namespace(namespace).await?;
    let sql = format!("DELETE FROM {namespace}");
    conn
      .call(move |conn| {
        conn.execute(&sql, [])?;
        Ok(())
      })
      .await?;
    debug!(%namespace, "namespace cleared");
    Ok(())
  }
}
