//! Typed repositories over a [`RecordStore`](affirm_core::store::RecordStore).
//!
//! Repositories speak [`affirm_core::Error`]; conversion to the use-case
//! [`Failure`](crate::Failure) happens one layer up.

mod affirmations;
mod app_state;
mod settings;

pub use affirmations::AffirmationRepository;
pub use app_state::AppStateRepository;
pub use settings::SettingsRepository;
