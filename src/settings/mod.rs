//! User settings shared by the page widget, the popup chat and the options page.

mod store;

pub use store::SettingsStore;

use serde::{Deserialize, Serialize};

/// Storage key of the first-run flag, kept next to the settings.
pub const FIRST_INSTALL_KEY: &str = "firstInstall";

/// Keys of every persisted setting, in declaration order.
pub const SETTING_KEYS: [&str; 10] = [
    "apiKey",
    "theme",
    "position",
    "autoShow",
    "opacity",
    "fontSize",
    "animations",
    "soundEffects",
    "maxTokens",
    "cacheResults",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// Follows the host's colour-scheme preference.
    Auto,
}

/// A theme after `auto` has been decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedTheme {
    Light,
    Dark,
}

impl Theme {
    pub fn resolve(self, prefers_dark: bool) -> ResolvedTheme {
        match self {
            Theme::Light => ResolvedTheme::Light,
            Theme::Dark => ResolvedTheme::Dark,
            Theme::Auto if prefers_dark => ResolvedTheme::Dark,
            Theme::Auto => ResolvedTheme::Light,
        }
    }
}

impl ResolvedTheme {
    pub fn as_str(self) -> &'static str {
        match self {
            ResolvedTheme::Light => "light",
            ResolvedTheme::Dark => "dark",
        }
    }
}

/// Where the page widget is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Right,
    Top,
    Overlay,
}

/// Whether the page widget asks for an answer on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoShow {
    #[default]
    Always,
    Keywords,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSize {
    pub fn css_class(self) -> &'static str {
        match self {
            FontSize::Small => "font-small",
            FontSize::Medium => "font-medium",
            FontSize::Large => "font-large",
        }
    }
}

/// The complete settings record. Always fully populated; see [`SettingsStore::load`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub api_key: String,
    pub theme: Theme,
    pub position: Position,
    pub auto_show: AutoShow,
    pub opacity: f64,
    pub font_size: FontSize,
    pub animations: bool,
    pub sound_effects: bool,
    pub max_tokens: u32,
    pub cache_results: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            theme: Theme::Light,
            position: Position::Right,
            auto_show: AutoShow::Always,
            opacity: 0.95,
            font_size: FontSize::Medium,
            animations: true,
            sound_effects: false,
            max_tokens: 300,
            cache_results: true,
        }
    }
}

impl Settings {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    fn is_within_bounds(&self) -> bool {
        (0.0..=1.0).contains(&self.opacity) && self.max_tokens > 0
    }

    /// Overwrites the fields present in `partial`.
    pub fn apply(&mut self, partial: &PartialSettings) {
        let PartialSettings {
            api_key,
            theme,
            position,
            auto_show,
            opacity,
            font_size,
            animations,
            sound_effects,
            max_tokens,
            cache_results,
        } = partial;
        if let Some(v) = api_key {
            self.api_key = v.clone();
        }
        if let Some(v) = theme {
            self.theme = *v;
        }
        if let Some(v) = position {
            self.position = *v;
        }
        if let Some(v) = auto_show {
            self.auto_show = *v;
        }
        if let Some(v) = opacity {
            self.opacity = *v;
        }
        if let Some(v) = font_size {
            self.font_size = *v;
        }
        if let Some(v) = animations {
            self.animations = *v;
        }
        if let Some(v) = sound_effects {
            self.sound_effects = *v;
        }
        if let Some(v) = max_tokens {
            self.max_tokens = *v;
        }
        if let Some(v) = cache_results {
            self.cache_results = *v;
        }
    }
}

/// A subset of [`Settings`]; only the populated fields are written on save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_show: Option<AutoShow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<FontSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animations: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_effects: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_results: Option<bool>,
}

impl PartialSettings {
    /// Names of the populated fields holding values no [`Settings`] may have.
    pub fn out_of_range_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self
            .opacity
            .is_some_and(|opacity| !(0.0..=1.0).contains(&opacity))
        {
            fields.push("opacity");
        }
        if self.max_tokens == Some(0) {
            fields.push("maxTokens");
        }
        fields
    }
}

impl From<&Settings> for PartialSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            api_key: Some(settings.api_key.clone()),
            theme: Some(settings.theme),
            position: Some(settings.position),
            auto_show: Some(settings.auto_show),
            opacity: Some(settings.opacity),
            font_size: Some(settings.font_size),
            animations: Some(settings.animations),
            sound_effects: Some(settings.sound_effects),
            max_tokens: Some(settings.max_tokens),
            cache_results: Some(settings.cache_results),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_host_key_names() {
        let value = serde_json::to_value(Settings::default()).expect("serialize");
        let object = value.as_object().expect("object");
        for key in SETTING_KEYS {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert_eq!(object.len(), SETTING_KEYS.len());
        assert_eq!(value["autoShow"], json!("always"));
        assert_eq!(value["fontSize"], json!("medium"));
    }

    #[test]
    fn auto_theme_follows_preference() {
        assert_eq!(Theme::Auto.resolve(true), ResolvedTheme::Dark);
        assert_eq!(Theme::Auto.resolve(false), ResolvedTheme::Light);
        assert_eq!(Theme::Dark.resolve(false), ResolvedTheme::Dark);
    }

    #[test]
    fn apply_only_touches_present_fields() {
        let mut settings = Settings::default();
        settings.apply(&PartialSettings {
            position: Some(Position::Overlay),
            max_tokens: Some(120),
            ..Default::default()
        });
        assert_eq!(settings.position, Position::Overlay);
        assert_eq!(settings.max_tokens, 120);
        assert_eq!(settings.theme, Theme::Light);
        assert!(settings.cache_results);
    }

    #[test]
    fn blank_api_key_does_not_count() {
        let settings = Settings {
            api_key: "   ".to_string(),
            ..Settings::default()
        };
        assert!(!settings.has_api_key());
    }
}
