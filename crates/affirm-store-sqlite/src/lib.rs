//! Encrypted SQLite backend for the Affirm record store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every record is sealed with an
//! [`affirm_keys::Cipher`] before it reaches disk.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
