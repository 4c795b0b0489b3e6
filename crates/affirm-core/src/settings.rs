//! User preferences.
//!
//! Settings are one logical record but are persisted as discrete keys in the
//! `settings` namespace so that each field can be updated on its own.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

// ─── Enumerated values ───────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display,
  EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ThemeMode {
  Light,
  Dark,
  #[default]
  System,
}

/// How often the companion renderer should rotate on its own schedule.
/// Advisory only; nothing in the core schedules work from it.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display,
  EnumString, EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum RefreshMode {
  OnUnlock,
  #[default]
  Hourly,
  Daily,
}

// ─── Keys ────────────────────────────────────────────────────────────────────

/// The storage key of each settings field.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter,
  IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum SettingKey {
  ThemeMode,
  RefreshMode,
  Language,
  FontSizeMultiplier,
  WidgetRotationEnabled,
  HasCompletedOnboarding,
}

impl SettingKey {
  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Settings ────────────────────────────────────────────────────────────────

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_FONT_SIZE_MULTIPLIER: f64 = 1.0;

/// The assembled settings record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
  pub theme_mode:               ThemeMode,
  pub refresh_mode:             RefreshMode,
  /// BCP 47 locale tag, e.g. `en` or `pt-BR`.
  pub language:                 String,
  /// Clamped to a sensible range by the UI; the core only requires it to be
  /// positive and finite.
  pub font_size_multiplier:     f64,
  pub widget_rotation_enabled:  bool,
  pub has_completed_onboarding: bool,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      theme_mode:               ThemeMode::default(),
      refresh_mode:             RefreshMode::default(),
      language:                 DEFAULT_LANGUAGE.to_owned(),
      font_size_multiplier:     DEFAULT_FONT_SIZE_MULTIPLIER,
      widget_rotation_enabled:  true,
      has_completed_onboarding: false,
    }
  }
}
