//! SQL schema for the Affirm SQLite store.
//!
//! Connection-wide pragmas run once when the connection opens. Each namespace
//! gets its own table, created the first time that namespace is touched.

use affirm_core::store::Namespace;

/// Executed once per connection.
pub const CONNECTION_PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA synchronous = FULL;
PRAGMA user_version = 1;
";

/// DDL for one namespace table; idempotent thanks to `IF NOT EXISTS`.
///
/// `payload` holds `nonce || ciphertext || tag`; nothing in the row is
/// plaintext apart from the key and the write timestamp.
pub fn namespace_table(namespace: Namespace) -> String {
  let table = namespace.as_str();
  format!(
    "CREATE TABLE IF NOT EXISTS {table} (
         key        TEXT PRIMARY KEY,
         payload    BLOB NOT NULL,
         written_at TEXT NOT NULL    -- RFC 3339 UTC
     );"
  )
}
