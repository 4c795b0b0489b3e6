use std::{str::FromStr, sync::Arc};

use affirm_core::{
  Error, Result,
  settings::{RefreshMode, SettingKey, Settings, ThemeMode},
  store::{Namespace, RecordStore},
};
use serde::{Serialize, de::DeserializeOwned};
use strum::IntoEnumIterator as _;
use tracing::debug;

/// Field-level access to the `settings` namespace.
///
/// Each getter writes the field's default the first time it finds the field
/// missing, so the stored record converges on a complete set of keys.
pub struct SettingsRepository<S> {
  store: Arc<S>,
}

impl<S> Clone for SettingsRepository<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone() } }
}

impl<S: RecordStore> SettingsRepository<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  // ── Getters ───────────────────────────────────────────────────────────────

  pub async fn theme_mode(&self) -> Result<ThemeMode> {
    self.field(SettingKey::ThemeMode, ThemeMode::default()).await
  }

  pub async fn refresh_mode(&self) -> Result<RefreshMode> {
    self.field(SettingKey::RefreshMode, RefreshMode::default()).await
  }

  pub async fn language(&self) -> Result<String> {
    self
      .field(SettingKey::Language, Settings::default().language)
      .await
  }

  pub async fn font_size_multiplier(&self) -> Result<f64> {
    self
      .field(
        SettingKey::FontSizeMultiplier,
        Settings::default().font_size_multiplier,
      )
      .await
  }

  pub async fn widget_rotation_enabled(&self) -> Result<bool> {
    self
      .field(
        SettingKey::WidgetRotationEnabled,
        Settings::default().widget_rotation_enabled,
      )
      .await
  }

  pub async fn has_completed_onboarding(&self) -> Result<bool> {
    self
      .field(
        SettingKey::HasCompletedOnboarding,
        Settings::default().has_completed_onboarding,
      )
      .await
  }

  /// The whole record, persisting defaults for any missing field.
  pub async fn load(&self) -> Result<Settings> {
    Ok(Settings {
      theme_mode:               self.theme_mode().await?,
      refresh_mode:             self.refresh_mode().await?,
      language:                 self.language().await?,
      font_size_multiplier:     self.font_size_multiplier().await?,
      widget_rotation_enabled:  self.widget_rotation_enabled().await?,
      has_completed_onboarding: self.has_completed_onboarding().await?,
    })
  }

  /// The whole record without writing anything. Missing fields read as
  /// their defaults.
  pub async fn snapshot(&self) -> Result<Settings> {
    let d = Settings::default();
    Ok(Settings {
      theme_mode:               self
        .peek(SettingKey::ThemeMode, d.theme_mode)
        .await?,
      refresh_mode:             self
        .peek(SettingKey::RefreshMode, d.refresh_mode)
        .await?,
      language:                 self.peek(SettingKey::Language, d.language).await?,
      font_size_multiplier:     self
        .peek(SettingKey::FontSizeMultiplier, d.font_size_multiplier)
        .await?,
      widget_rotation_enabled:  self
        .peek(SettingKey::WidgetRotationEnabled, d.widget_rotation_enabled)
        .await?,
      has_completed_onboarding: self
        .peek(SettingKey::HasCompletedOnboarding, d.has_completed_onboarding)
        .await?,
    })
  }

  // ── Setters ───────────────────────────────────────────────────────────────

  pub async fn set_theme_mode(&self, value: ThemeMode) -> Result<()> {
    self.write(SettingKey::ThemeMode, &value).await
  }

  pub async fn set_refresh_mode(&self, value: RefreshMode) -> Result<()> {
    self.write(SettingKey::RefreshMode, &value).await
  }

  /// Rejects an empty (or whitespace-only) tag.
  pub async fn set_language(&self, value: &str) -> Result<()> {
    let value = value.trim();
    if value.is_empty() {
      return Err(invalid(SettingKey::Language, "language tag cannot be empty"));
    }
    self.write(SettingKey::Language, &value).await
  }

  /// Rejects values that are not finite and strictly positive.
  pub async fn set_font_size_multiplier(&self, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
      return Err(invalid(
        SettingKey::FontSizeMultiplier,
        format!("{value} is not a positive number"),
      ));
    }
    self.write(SettingKey::FontSizeMultiplier, &value).await
  }

  pub async fn set_widget_rotation_enabled(&self, value: bool) -> Result<()> {
    self.write(SettingKey::WidgetRotationEnabled, &value).await
  }

  pub async fn set_has_completed_onboarding(&self, value: bool) -> Result<()> {
    self.write(SettingKey::HasCompletedOnboarding, &value).await
  }

  /// Parse `raw` for the field named by `key` and store it.
  pub async fn set_from_str(&self, key: SettingKey, raw: &str) -> Result<()> {
    let raw = raw.trim();
    match key {
      SettingKey::ThemeMode => self.set_theme_mode(parse(key, raw)?).await,
      SettingKey::RefreshMode => self.set_refresh_mode(parse(key, raw)?).await,
      SettingKey::Language => self.set_language(raw).await,
      SettingKey::FontSizeMultiplier => {
        self.set_font_size_multiplier(parse(key, raw)?).await
      }
      SettingKey::WidgetRotationEnabled => {
        self.set_widget_rotation_enabled(parse(key, raw)?).await
      }
      SettingKey::HasCompletedOnboarding => {
        self.set_has_completed_onboarding(parse(key, raw)?).await
      }
    }
  }

  /// Write every field's default, one key at a time.
  pub async fn reset_to_defaults(&self) -> Result<()> {
    let d = Settings::default();
    for key in SettingKey::iter() {
      match key {
        SettingKey::ThemeMode => self.write(key, &d.theme_mode).await?,
        SettingKey::RefreshMode => self.write(key, &d.refresh_mode).await?,
        SettingKey::Language => self.write(key, &d.language).await?,
        SettingKey::FontSizeMultiplier => {
          self.write(key, &d.font_size_multiplier).await?
        }
        SettingKey::WidgetRotationEnabled => {
          self.write(key, &d.widget_rotation_enabled).await?
        }
        SettingKey::HasCompletedOnboarding => {
          self.write(key, &d.has_completed_onboarding).await?
        }
      }
    }
    debug!("settings reset to defaults");
    Ok(())
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  async fn field<T>(&self, key: SettingKey, default: T) -> Result<T>
  where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
  {
    match self.read(key).await? {
      Some(value) => Ok(value),
      None => {
        self.write(key, &default).await?;
        Ok(default)
      }
    }
  }

  async fn peek<T>(&self, key: SettingKey, default: T) -> Result<T>
  where
    T: DeserializeOwned + Send + 'static,
  {
    Ok(self.read(key).await?.unwrap_or(default))
  }

  async fn read<T>(&self, key: SettingKey) -> Result<Option<T>>
  where
    T: DeserializeOwned + Send + 'static,
  {
    self
      .store
      .get(Namespace::Settings, key.as_str())
      .await
      .map_err(Into::into)
  }

  async fn write<T>(&self, key: SettingKey, value: &T) -> Result<()>
  where
    T: Serialize + Sync,
  {
    self
      .store
      .put(Namespace::Settings, key.as_str(), value)
      .await
      .map_err(Into::into)
  }
}

fn invalid(key: SettingKey, reason: impl Into<String>) -> Error {
  Error::InvalidSetting { field: key.as_str(), reason: reason.into() }
}

fn parse<T>(key: SettingKey, raw: &str) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  raw
    .parse()
    .map_err(|e: T::Err| invalid(key, format!("{raw:?}: {e}")))
}
