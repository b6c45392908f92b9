//! Options page: the settings form, reset, API key test and first-run banner.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::client::AnswerSource;
use crate::error::AssistantError;
use crate::settings::{
    AutoShow, FontSize, PartialSettings, Position, Settings, SettingsStore, Theme,
};

/// How long a status message stays visible.
pub const STATUS_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub shown_at: Instant,
}

impl StatusMessage {
    fn success(text: &str) -> Self {
        Self {
            text: text.to_string(),
            kind: StatusKind::Success,
            shown_at: Instant::now(),
        }
    }

    fn error(text: &str) -> Self {
        Self {
            text: text.to_string(),
            kind: StatusKind::Error,
            shown_at: Instant::now(),
        }
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) < STATUS_DURATION
    }
}

/// Raw form contents. Numeric inputs stay text until submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionsForm {
    pub api_key: String,
    pub theme: Theme,
    pub position: Position,
    pub auto_show: AutoShow,
    pub opacity: String,
    pub font_size: FontSize,
    pub animations: bool,
    pub sound_effects: bool,
    pub max_tokens: String,
    pub cache_results: bool,
}

impl From<&Settings> for OptionsForm {
    fn from(settings: &Settings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            theme: settings.theme,
            position: settings.position,
            auto_show: settings.auto_show,
            opacity: settings.opacity.to_string(),
            font_size: settings.font_size,
            animations: settings.animations,
            sound_effects: settings.sound_effects,
            max_tokens: settings.max_tokens.to_string(),
            cache_results: settings.cache_results,
        }
    }
}

impl OptionsForm {
    /// Parses the form into a full set of fields to save.
    pub fn to_partial(&self) -> Result<PartialSettings, AssistantError> {
        let api_key = self.api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(AssistantError::Config(
                "Please enter your Fireworks API key".to_string(),
            ));
        }
        let opacity: f64 = self
            .opacity
            .trim()
            .parse()
            .ok()
            .filter(|value| (0.0..=1.0).contains(value))
            .ok_or_else(|| AssistantError::Config("Opacity must be between 0 and 1".to_string()))?;
        let max_tokens: u32 = self
            .max_tokens
            .trim()
            .parse()
            .ok()
            .filter(|value| *value > 0)
            .ok_or_else(|| {
                AssistantError::Config("Max tokens must be a positive number".to_string())
            })?;

        Ok(PartialSettings {
            api_key: Some(api_key),
            theme: Some(self.theme),
            position: Some(self.position),
            auto_show: Some(self.auto_show),
            opacity: Some(opacity),
            font_size: Some(self.font_size),
            animations: Some(self.animations),
            sound_effects: Some(self.sound_effects),
            max_tokens: Some(max_tokens),
            cache_results: Some(self.cache_results),
        })
    }

    /// Opacity as shown next to the slider, e.g. "95%".
    pub fn opacity_label(&self) -> String {
        let value: f64 = self.opacity.trim().parse().unwrap_or(0.0);
        format!("{}%", (value * 100.0).round() as i64)
    }
}

/// State of the options page.
pub struct OptionsPage {
    store: SettingsStore,
    pub form: OptionsForm,
    pub status: Option<StatusMessage>,
    pub banner_visible: bool,
    testing: Arc<AtomicBool>,
}

/// Clears the testing flag when the API test ends, even if it is dropped.
struct TestingGuard(Arc<AtomicBool>);

impl TestingGuard {
    fn raise(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag.clone())
    }
}

impl Drop for TestingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl OptionsPage {
    pub async fn open(store: SettingsStore) -> Self {
        let settings = store.load().await;
        let banner_visible = store.first_install().await;
        Self {
            store,
            form: OptionsForm::from(&settings),
            status: None,
            banner_visible,
            testing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether an API test is waiting on the relay.
    pub fn is_testing(&self) -> bool {
        self.testing.load(Ordering::SeqCst)
    }

    /// Shared view of the testing flag, readable while `test_api` runs.
    pub fn testing_handle(&self) -> Arc<AtomicBool> {
        self.testing.clone()
    }

    /// Validates and saves the form. Returns whether anything was written.
    pub async fn submit(&mut self) -> bool {
        let partial = match self.form.to_partial() {
            Ok(partial) => partial,
            Err(AssistantError::Config(message)) => {
                self.status = Some(StatusMessage::error(&message));
                return false;
            }
            Err(err) => {
                self.status = Some(StatusMessage::error(&err.to_string()));
                return false;
            }
        };

        match self.store.save(&partial).await {
            Ok(()) => {
                self.form.api_key = partial.api_key.unwrap_or_default();
                self.status = Some(StatusMessage::success("✅ Settings saved successfully!"));
                true
            }
            Err(err) => {
                log::warn!("Saving settings failed: {err}");
                self.status = Some(StatusMessage::error("❌ Failed to save settings"));
                false
            }
        }
    }

    /// Resets every setting to its default once the user has confirmed.
    pub async fn reset(&mut self, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }
        if let Err(err) = self.store.clear().await {
            log::warn!("Resetting settings failed: {err}");
            self.status = Some(StatusMessage::error("❌ Failed to save settings"));
            return false;
        }
        let settings = self.store.load().await;
        self.form = OptionsForm::from(&settings);
        self.status = Some(StatusMessage::success("🔄 Settings reset to defaults"));
        true
    }

    /// Sends a small test query with the key currently in the form.
    pub async fn test_api(&mut self, source: &dyn AnswerSource) -> bool {
        let api_key = self.form.api_key.trim().to_string();
        if api_key.is_empty() {
            self.status = Some(StatusMessage::error("❌ Please enter your API key first"));
            return false;
        }

        let result = {
            let _testing = TestingGuard::raise(&self.testing);
            source.check_connection(&api_key).await
        };

        let (ok, status) = match result {
            Ok(_) => (true, StatusMessage::success("✅ API connection successful!")),
            Err(AssistantError::Upstream { status, .. }) => {
                log::info!("API test rejected with status {status}");
                (
                    false,
                    StatusMessage::error("❌ API test failed. Check your API key."),
                )
            }
            Err(err) => {
                log::info!("API test could not reach the relay: {err}");
                (
                    false,
                    StatusMessage::error("❌ Network error. Check your connection."),
                )
            }
        };
        self.status = Some(status);
        ok
    }

    /// Hides the welcome banner for good.
    pub async fn dismiss_banner(&mut self) {
        self.banner_visible = false;
        if let Err(err) = self.store.set_first_install(false).await {
            log::warn!("Could not clear first-install flag: {err}");
        }
    }

    pub fn visible_status(&self, now: Instant) -> Option<&StatusMessage> {
        self.status
            .as_ref()
            .filter(|status| status.is_visible_at(now))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::client::{AnswerRequest, TEST_MAX_TOKENS, TEST_QUERY};
    use crate::storage::MemoryArea;

    enum Canned {
        Ok,
        Rejected,
        Unreachable,
    }

    #[async_trait]
    impl AnswerSource for Canned {
        async fn ask(&self, request: &AnswerRequest) -> Result<String, AssistantError> {
            assert_eq!(request.query, TEST_QUERY);
            assert_eq!(request.max_tokens, TEST_MAX_TOKENS);
            match self {
                Canned::Ok => Ok("hi".to_string()),
                Canned::Rejected => Err(AssistantError::Upstream {
                    status: 401,
                    message: "bad key".to_string(),
                }),
                Canned::Unreachable => Err(AssistantError::Network("refused".to_string())),
            }
        }
    }

    /// Holds the test query until released.
    #[derive(Default)]
    struct Gated {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl AnswerSource for Gated {
        async fn ask(&self, _request: &AnswerRequest) -> Result<String, AssistantError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok("hi".to_string())
        }
    }

    async fn page() -> (OptionsPage, SettingsStore, Arc<MemoryArea>) {
        let area = Arc::new(MemoryArea::new());
        let store = SettingsStore::new(area.clone());
        (OptionsPage::open(store.clone()).await, store, area)
    }

    #[tokio::test]
    async fn form_starts_from_defaults() {
        let (page, _, _) = page().await;
        assert_eq!(page.form, OptionsForm::from(&Settings::default()));
        assert_eq!(page.form.opacity_label(), "95%");
        assert!(page.banner_visible);
    }

    #[tokio::test]
    async fn submit_requires_api_key() {
        let (mut page, store, _) = page().await;
        page.form.api_key = "   ".to_string();
        assert!(!page.submit().await);
        let status = page.status.as_ref().expect("status");
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.text, "Please enter your Fireworks API key");
        assert_eq!(store.load().await, Settings::default());
    }

    #[tokio::test]
    async fn submit_saves_trimmed_form() {
        let (mut page, store, _) = page().await;
        page.form.api_key = "  fw-key ".to_string();
        page.form.theme = Theme::Dark;
        page.form.max_tokens = "150".to_string();
        assert!(page.submit().await);

        let settings = store.load().await;
        assert_eq!(settings.api_key, "fw-key");
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.max_tokens, 150);
        assert_eq!(
            page.status.as_ref().map(|s| s.text.as_str()),
            Some("✅ Settings saved successfully!")
        );
    }

    #[tokio::test]
    async fn storage_failure_reports_save_error() {
        let (mut page, _, area) = page().await;
        page.form.api_key = "fw-key".to_string();
        area.fail_writes(true);
        assert!(!page.submit().await);
        assert_eq!(
            page.status.as_ref().map(|s| s.text.as_str()),
            Some("❌ Failed to save settings")
        );
    }

    #[tokio::test]
    async fn invalid_numbers_are_rejected() {
        let (mut page, _, _) = page().await;
        page.form.api_key = "fw-key".to_string();
        page.form.opacity = "1.5".to_string();
        assert!(!page.submit().await);
        page.form.opacity = "0.8".to_string();
        page.form.max_tokens = "lots".to_string();
        assert!(!page.submit().await);
    }

    #[tokio::test]
    async fn reset_needs_confirmation() {
        let (mut page, store, _) = page().await;
        page.form.api_key = "fw-key".to_string();
        page.submit().await;

        assert!(!page.reset(false).await);
        assert_eq!(store.load().await.api_key, "fw-key");

        assert!(page.reset(true).await);
        assert_eq!(store.load().await, Settings::default());
        assert_eq!(page.form.api_key, "");
    }

    #[tokio::test]
    async fn test_api_reports_each_outcome() {
        let (mut page, _, _) = page().await;
        assert!(!page.test_api(&Canned::Ok).await);
        assert_eq!(
            page.status.as_ref().map(|s| s.text.as_str()),
            Some("❌ Please enter your API key first")
        );

        page.form.api_key = "fw-key".to_string();
        assert!(page.test_api(&Canned::Ok).await);
        assert!(!page.is_testing());

        assert!(!page.test_api(&Canned::Rejected).await);
        assert_eq!(
            page.status.as_ref().map(|s| s.text.as_str()),
            Some("❌ API test failed. Check your API key.")
        );

        assert!(!page.test_api(&Canned::Unreachable).await);
        assert_eq!(
            page.status.as_ref().map(|s| s.text.as_str()),
            Some("❌ Network error. Check your connection.")
        );
    }

    #[tokio::test]
    async fn testing_flag_is_raised_while_waiting() {
        let (mut page, _, _) = page().await;
        page.form.api_key = "fw-key".to_string();
        let handle = page.testing_handle();
        let gate = Gated::default();

        let (ok, during) = tokio::join!(page.test_api(&gate), async {
            gate.entered.notified().await;
            let during = handle.load(Ordering::SeqCst);
            gate.release.notify_one();
            during
        });
        assert!(ok);
        assert!(during);
        assert!(!page.is_testing());
    }

    #[tokio::test]
    async fn abandoned_test_lowers_flag() {
        let (mut page, _, _) = page().await;
        page.form.api_key = "fw-key".to_string();
        let gate = Gated::default();

        let waited =
            tokio::time::timeout(Duration::from_millis(50), page.test_api(&gate)).await;
        assert!(waited.is_err());
        assert!(!page.is_testing());
        assert!(page.status.is_none());
    }

    #[tokio::test]
    async fn dismissing_banner_persists() {
        let (mut page, store, _) = page().await;
        page.dismiss_banner().await;
        assert!(!page.banner_visible);
        assert!(!store.first_install().await);

        let reopened = OptionsPage::open(store).await;
        assert!(!reopened.banner_visible);
    }

    #[tokio::test]
    async fn status_hides_after_five_seconds() {
        let (mut page, _, _) = page().await;
        page.reset(true).await;
        let shown = page.status.as_ref().expect("status").shown_at;
        assert!(page.visible_status(shown + Duration::from_secs(4)).is_some());
        assert!(page.visible_status(shown + Duration::from_secs(5)).is_none());
    }
}
