//! Plain-text import/export codec for affirmations.
//!
//! Pure and synchronous; no storage dependencies. The importer accepts three
//! shapes, which may be mixed in one payload:
//!
//! - one affirmation per non-empty line;
//! - numbered entries (`1. text` or `1) text`) whose following lines continue
//!   the entry until a blank line or the next marker;
//! - the export format, whose `#` comment lines carry metadata and are never
//!   treated as content.
//!
//! # Quick start
//!
//! ```no_run
//! let entries = affirm_text::parse("1. I am calm\n2. I am focused\n");
//! assert_eq!(entries[1].text, "I am focused");
//! ```

mod parse;
mod serialize;

pub use parse::{Entry, parse};
pub use serialize::serialize;
