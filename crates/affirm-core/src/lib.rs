//! Core types and trait definitions for the Affirm data core.
//!
//! This crate is deliberately free of database, crypto, and filesystem
//! dependencies. Every other crate depends on it.

pub mod affirmation;
pub mod error;
pub mod selection;
pub mod settings;
pub mod store;

pub use error::{Error, Result};
