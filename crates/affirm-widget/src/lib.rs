//! Mirrors Affirm state into an area the home-screen renderer can read on
//! its own.
//!
//! The renderer runs out of process and may wake at any time, so it never
//! calls back into the app. Instead the [`WidgetBridge`] re-derives a
//! [`WidgetSnapshot`] from the store after every committed change, writes it
//! to a [`SharedArea`], and pokes a [`RefreshNotifier`].
//!
//! Bridge failures are logged and swallowed; they never fail the operation
//! that triggered them.

pub mod area;
pub mod bridge;
pub mod error;
pub mod notify;
pub mod snapshot;

pub use area::{FileSharedArea, MemorySharedArea, SharedArea, SharedMap, SharedValue};
pub use bridge::WidgetBridge;
pub use error::{Error, Result};
pub use notify::{CommandNotifier, CountingNotifier, RefreshNotifier};
pub use snapshot::{MirroredAffirmation, WidgetSnapshot};

#[cfg(test)]
mod tests;
