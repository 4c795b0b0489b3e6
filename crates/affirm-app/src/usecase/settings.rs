use std::sync::Arc;

use affirm_core::{
  settings::{RefreshMode, SettingKey, Settings, ThemeMode},
  store::RecordStore,
};
use tokio::sync::broadcast;

use crate::{Outcome, events::ChangeEvent, repo::SettingsRepository};

/// Settings use cases. Each successful write publishes
/// [`ChangeEvent::SettingsChanged`] for the field it touched.
pub struct SettingsService<S> {
  settings: SettingsRepository<S>,
  events:   broadcast::Sender<ChangeEvent>,
}

impl<S> Clone for SettingsService<S> {
  fn clone(&self) -> Self {
    Self { settings: self.settings.clone(), events: self.events.clone() }
  }
}

impl<S: RecordStore> SettingsService<S> {
  pub fn new(store: Arc<S>, events: broadcast::Sender<ChangeEvent>) -> Self {
    Self { settings: SettingsRepository::new(store), events }
  }

  pub fn repository(&self) -> &SettingsRepository<S> { &self.settings }

  pub async fn load(&self) -> Outcome<Settings> { Ok(self.settings.load().await?) }

  pub async fn set_theme_mode(&self, value: ThemeMode) -> Outcome<()> {
    self.settings.set_theme_mode(value).await?;
    self.changed(SettingKey::ThemeMode)
  }

  pub async fn set_refresh_mode(&self, value: RefreshMode) -> Outcome<()> {
    self.settings.set_refresh_mode(value).await?;
    self.changed(SettingKey::RefreshMode)
  }

  pub async fn set_language(&self, value: &str) -> Outcome<()> {
    self.settings.set_language(value).await?;
    self.changed(SettingKey::Language)
  }

  pub async fn set_font_size_multiplier(&self, value: f64) -> Outcome<()> {
    self.settings.set_font_size_multiplier(value).await?;
    self.changed(SettingKey::FontSizeMultiplier)
  }

  pub async fn set_widget_rotation_enabled(&self, value: bool) -> Outcome<()> {
    self.settings.set_widget_rotation_enabled(value).await?;
    self.changed(SettingKey::WidgetRotationEnabled)
  }

  pub async fn complete_onboarding(&self) -> Outcome<()> {
    self.settings.set_has_completed_onboarding(true).await?;
    self.changed(SettingKey::HasCompletedOnboarding)
  }

  /// Set a field from its textual form, e.g. `("theme_mode", "dark")`.
  pub async fn set(&self, key: SettingKey, raw: &str) -> Outcome<()> {
    self.settings.set_from_str(key, raw).await?;
    self.changed(key)
  }

  pub async fn reset(&self) -> Outcome<Settings> {
    self.settings.reset_to_defaults().await?;
    let _ = self.events.send(ChangeEvent::SettingsReset);
    Ok(Settings::default())
  }

  fn changed(&self, key: SettingKey) -> Outcome<()> {
    let _ = self.events.send(ChangeEvent::SettingsChanged(key));
    Ok(())
  }
}
