//! The `RecordStore` trait and its namespaces.
//!
//! The trait is implemented by storage backends (e.g. `affirm-store-sqlite`).
//! Repositories depend on this abstraction, never on a concrete backend.

use std::future::Future;

use serde::{Serialize, de::DeserializeOwned};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

// ─── Namespaces ──────────────────────────────────────────────────────────────

/// Logical partitions of the store. Each namespace is an independent
/// key → record map.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter,
  IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Namespace {
  Affirmations,
  Settings,
  AppState,
}

impl Namespace {
  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an encrypted, typed key/record store.
///
/// Records are opaque to the backend: they are serialised, sealed, and stored
/// whole, so every `put` is atomic per record. Backends must never return a
/// record whose payload failed authentication; they report
/// [`Error::Decryption`](crate::Error::Decryption) instead.
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  /// Fetch one record. Returns `None` if the key is absent.
  fn get<T>(
    &self,
    namespace: Namespace,
    key: &str,
  ) -> impl Future<Output = Result<Option<T>, Self::Error>> + Send
  where
    T: DeserializeOwned + Send + 'static;

  /// Insert or replace one record.
  fn put<T>(
    &self,
    namespace: Namespace,
    key: &str,
    record: &T,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send
  where
    T: Serialize + Sync;

  /// Remove one record. Returns `true` if it existed.
  fn delete(
    &self,
    namespace: Namespace,
    key: &str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

  /// Every record in `namespace`, in no particular order.
  fn values<T>(
    &self,
    namespace: Namespace,
  ) -> impl Future<Output = Result<Vec<T>, Self::Error>> + Send
  where
    T: DeserializeOwned + Send + 'static;

  /// Remove every record in `namespace`.
  fn clear(
    &self,
    namespace: Namespace,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
