//! Repositories and use cases for the Affirm data core.
//!
//! Everything here is generic over [`affirm_core::store::RecordStore`]; the
//! composition root decides which backend to inject.
//!
//! # Wiring
//!
//! ```rust,ignore
//! let store = Arc::new(SqliteStore::new(path, keys.initialize()?));
//! let (events, _) = affirm_app::events::channel();
//! let affirmations = AffirmationService::new(store.clone(), events.clone());
//! let settings = SettingsService::new(store, events);
//! ```

pub mod error;
pub mod events;
pub mod repo;
pub mod usecase;

pub use error::{Failure, Outcome, ValidationError};
pub use events::ChangeEvent;
pub use usecase::{
  AffirmationService, EditAffirmation, ImportMode, ImportReport, Rejected,
  SettingsService,
};

#[cfg(test)]
mod tests;
