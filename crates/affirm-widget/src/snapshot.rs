//! The denormalised view the renderer reads.

use affirm_app::repo::{AffirmationRepository, AppStateRepository, SettingsRepository};
use affirm_core::{settings::Settings, store::RecordStore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Result, SharedMap, SharedValue};

/// Keys of the shared area. The renderer depends on these exact names.
pub mod keys {
  pub const CURRENT_TEXT: &str = "current_affirmation_text";
  pub const CURRENT_ID: &str = "current_affirmation_id";
  pub const LIST: &str = "affirmations_list";
  pub const COUNT: &str = "affirmations_count";
  pub const HAS_AFFIRMATIONS: &str = "has_affirmations";
  pub const THEME_MODE: &str = "theme_mode";
  pub const ROTATION_ENABLED: &str = "widget_rotation_enabled";
  pub const FONT_SIZE_MULTIPLIER: &str = "font_size_multiplier";
  pub const REFRESH_MODE: &str = "refresh_mode";
}

/// One entry of `affirmations_list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirroredAffirmation {
  pub id:        Uuid,
  pub text:      String,
  pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSnapshot {
  /// The current pick, only when it names an active affirmation.
  pub current:  Option<MirroredAffirmation>,
  /// Active affirmations in presentation order.
  pub list:     Vec<MirroredAffirmation>,
  pub settings: Settings,
}

impl WidgetSnapshot {
  /// Derive a snapshot from the store. Reads only; settings that were never
  /// written appear with their defaults.
  pub async fn derive<S: RecordStore>(
    affirmations: &AffirmationRepository<S>,
    state: &AppStateRepository<S>,
    settings: &SettingsRepository<S>,
  ) -> Result<Self> {
    let list: Vec<MirroredAffirmation> = affirmations
      .get_active()
      .await?
      .into_iter()
      .map(|a| MirroredAffirmation { id: a.id, text: a.text, is_active: a.is_active })
      .collect();

    let current = match state.current_pick().await? {
      Some(id) => list.iter().find(|a| a.id == id).cloned(),
      None => None,
    };

    Ok(Self { current, list, settings: settings.snapshot().await? })
  }

  pub fn has_affirmations(&self) -> bool { !self.list.is_empty() }

  /// Flatten into the shared-area key schema. Unset values are left out.
  pub fn to_shared_map(&self) -> Result<SharedMap> {
    let mut map = SharedMap::new();
    let mut set = |key: &str, value: SharedValue| {
      map.insert(key.to_owned(), value);
    };

    if let Some(current) = &self.current {
      set(keys::CURRENT_TEXT, SharedValue::Text(current.text.clone()));
      set(keys::CURRENT_ID, SharedValue::Text(current.id.to_string()));
    }
    set(keys::LIST, SharedValue::Text(serde_json::to_string(&self.list)?));
    set(
      keys::COUNT,
      SharedValue::Int(i64::try_from(self.list.len()).unwrap_or(i64::MAX)),
    );
    set(keys::HAS_AFFIRMATIONS, SharedValue::Bool(self.has_affirmations()));
    set(
      keys::THEME_MODE,
      SharedValue::Text(self.settings.theme_mode.to_string()),
    );
    set(
      keys::ROTATION_ENABLED,
      SharedValue::Bool(self.settings.widget_rotation_enabled),
    );
    set(
      keys::FONT_SIZE_MULTIPLIER,
      SharedValue::Float(self.settings.font_size_multiplier),
    );
    set(
      keys::REFRESH_MODE,
      SharedValue::Text(self.settings.refresh_mode.to_string()),
    );
    Ok(map)
  }
}
