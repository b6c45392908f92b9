use std::sync::Arc;

use serde_json::{Map, Value};

use super::{PartialSettings, Settings, FIRST_INSTALL_KEY, SETTING_KEYS};
use crate::error::AssistantError;
use crate::storage::StorageArea;

/// Reads and writes [`Settings`] in a synced storage area.
#[derive(Clone)]
pub struct SettingsStore {
    area: Arc<dyn StorageArea>,
}

impl SettingsStore {
    pub fn new(area: Arc<dyn StorageArea>) -> Self {
        Self { area }
    }

    /// Loads the settings, filling every absent or unusable field from the defaults.
    ///
    /// Never fails: an unreadable store yields the defaults.
    pub async fn load(&self) -> Settings {
        match self.area.get_all().await {
            Ok(stored) => merge_over_defaults(stored),
            Err(err) => {
                log::warn!("Settings unavailable, using defaults: {err}");
                Settings::default()
            }
        }
    }

    /// Persists the fields present in `partial`; other stored fields are left as they are.
    ///
    /// Out-of-range values are rejected and nothing is written.
    pub async fn save(&self, partial: &PartialSettings) -> Result<(), AssistantError> {
        let invalid = partial.out_of_range_fields();
        if !invalid.is_empty() {
            return Err(AssistantError::missing(invalid));
        }
        let items = match serde_json::to_value(partial)? {
            Value::Object(items) => items,
            _ => Map::new(),
        };
        if items.is_empty() {
            return Ok(());
        }
        self.area.set(items).await.map_err(persist_failed)
    }

    /// Resets everything to the defaults.
    pub async fn clear(&self) -> Result<(), AssistantError> {
        self.area.clear().await.map_err(persist_failed)
    }

    /// Whether the first-run welcome is still pending. Absent means yes.
    pub async fn first_install(&self) -> bool {
        match self.area.get(FIRST_INSTALL_KEY).await {
            Ok(Some(Value::Bool(flag))) => flag,
            Ok(_) => true,
            Err(err) => {
                log::warn!("Could not read first-install flag: {err}");
                true
            }
        }
    }

    pub async fn set_first_install(&self, flag: bool) -> Result<(), AssistantError> {
        self.area
            .set_one(FIRST_INSTALL_KEY, Value::Bool(flag))
            .await
            .map_err(persist_failed)
    }
}

fn persist_failed(err: AssistantError) -> AssistantError {
    log::warn!("Settings write failed: {err}");
    AssistantError::Persistence(format!("persist failed: {err}"))
}

/// Overlays stored keys on the defaults one at a time so a single bad value
/// only loses that field.
fn merge_over_defaults(stored: Map<String, Value>) -> Settings {
    let defaults = Settings::default();
    let mut merged = match serde_json::to_value(&defaults) {
        Ok(Value::Object(map)) => map,
        _ => return defaults,
    };

    for key in SETTING_KEYS {
        let Some(value) = stored.get(key) else {
            continue;
        };
        let mut candidate = merged.clone();
        candidate.insert(key.to_string(), value.clone());
        match serde_json::from_value::<Settings>(Value::Object(candidate.clone())) {
            Ok(settings) if settings.is_within_bounds() => merged = candidate,
            _ => log::warn!("Ignoring stored setting {key}={value}"),
        }
    }

    serde_json::from_value(Value::Object(merged)).unwrap_or(defaults)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{AutoShow, FontSize, Position, Theme};
    use crate::storage::MemoryArea;
    use rstest::rstest;
    use serde_json::json;

    fn store_with(items: Value) -> (SettingsStore, Arc<MemoryArea>) {
        let map = match items {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let area = Arc::new(MemoryArea::with_items(map));
        (SettingsStore::new(area.clone()), area)
    }

    #[tokio::test]
    async fn empty_store_loads_defaults() {
        let (store, _) = store_with(json!({}));
        assert_eq!(store.load().await, Settings::default());
    }

    #[rstest]
    #[case::api_key(PartialSettings { api_key: Some("fw-key".into()), ..Default::default() })]
    #[case::layout(PartialSettings {
        position: Some(Position::Top),
        auto_show: Some(AutoShow::Keywords),
        font_size: Some(FontSize::Large),
        ..Default::default()
    })]
    #[case::numbers(PartialSettings { opacity: Some(0.5), max_tokens: Some(64), ..Default::default() })]
    #[case::lowest_bounds(PartialSettings { opacity: Some(0.0), max_tokens: Some(1), ..Default::default() })]
    #[case::highest_opacity(PartialSettings { opacity: Some(1.0), max_tokens: Some(u32::MAX), ..Default::default() })]
    #[case::flags(PartialSettings {
        animations: Some(false),
        sound_effects: Some(true),
        cache_results: Some(false),
        theme: Some(Theme::Auto),
        ..Default::default()
    })]
    #[tokio::test]
    async fn load_after_save_is_defaults_merged_with_partial(#[case] partial: PartialSettings) {
        let (store, _) = store_with(json!({}));
        store.save(&partial).await.expect("save");

        let mut expected = Settings::default();
        expected.apply(&partial);
        assert_eq!(store.load().await, expected);
    }

    #[rstest]
    #[case::zero_tokens(PartialSettings { max_tokens: Some(0), ..Default::default() }, "maxTokens")]
    #[case::negative_opacity(PartialSettings { opacity: Some(-0.1), ..Default::default() }, "opacity")]
    #[case::opacity_above_one(PartialSettings { opacity: Some(1.5), theme: Some(Theme::Dark), ..Default::default() }, "opacity")]
    #[tokio::test]
    async fn out_of_range_save_is_rejected_without_writing(
        #[case] partial: PartialSettings,
        #[case] field: &str,
    ) {
        let (store, area) = store_with(json!({}));
        let err = store.save(&partial).await.expect_err("should be rejected");
        assert!(
            matches!(err, AssistantError::Validation { ref fields } if fields == &[field.to_string()])
        );
        assert!(area.get_all().await.expect("get_all").is_empty());
        assert_eq!(store.load().await, Settings::default());
    }

    #[tokio::test]
    async fn later_saves_keep_earlier_fields() {
        let (store, _) = store_with(json!({}));
        store
            .save(&PartialSettings {
                api_key: Some("fw-key".into()),
                ..Default::default()
            })
            .await
            .expect("save key");
        store
            .save(&PartialSettings {
                theme: Some(Theme::Dark),
                ..Default::default()
            })
            .await
            .expect("save theme");

        let settings = store.load().await;
        assert_eq!(settings.api_key, "fw-key");
        assert_eq!(settings.theme, Theme::Dark);
    }

    #[tokio::test]
    async fn repeated_loads_are_identical() {
        let (store, _) = store_with(json!({"theme": "dark", "maxTokens": 42}));
        let first = store.load().await;
        let second = store.load().await;
        assert_eq!(first, second);
        assert_eq!(first.max_tokens, 42);
    }

    #[tokio::test]
    async fn bad_values_fall_back_per_field() {
        let (store, _) = store_with(json!({
            "theme": "neon",
            "opacity": 3.5,
            "maxTokens": "many",
            "position": "overlay",
            "firstInstall": false
        }));
        let settings = store.load().await;
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.opacity, 0.95);
        assert_eq!(settings.max_tokens, 300);
        assert_eq!(settings.position, Position::Overlay);
    }

    #[tokio::test]
    async fn clear_resets_to_defaults() {
        let (store, _) = store_with(json!({"apiKey": "fw-key", "firstInstall": false}));
        store.clear().await.expect("clear");
        assert_eq!(store.load().await, Settings::default());
        assert!(store.first_install().await);
    }

    #[tokio::test]
    async fn failed_write_reports_persist_failed() {
        let (store, area) = store_with(json!({}));
        area.fail_writes(true);
        let err = store
            .save(&PartialSettings {
                theme: Some(Theme::Dark),
                ..Default::default()
            })
            .await
            .expect_err("write should fail");
        assert!(matches!(err, AssistantError::Persistence(ref msg) if msg.starts_with("persist failed")));
    }

    #[tokio::test]
    async fn first_install_flag_round_trips() {
        let (store, _) = store_with(json!({}));
        assert!(store.first_install().await);
        store.set_first_install(false).await.expect("set flag");
        assert!(!store.first_install().await);
        assert_eq!(store.load().await, Settings::default());
    }
}
