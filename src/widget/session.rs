use std::sync::Arc;

use tokio::task::JoinHandle;
use url::Url;

use super::controller::{PageContext, ResponseOutcome, WidgetController};
use crate::client::AnswerSource;
use crate::config::ClientConfig;
use crate::settings::SettingsStore;

/// Keeps one widget mounted per URL of a single-page results view.
///
/// When the URL changes without a reload, the session waits for the page to
/// settle, tears the current widget down and mounts a fresh one (with an
/// empty cache).
pub struct WidgetSession {
    store: SettingsStore,
    source: Arc<dyn AnswerSource>,
    config: ClientConfig,
    page: PageContext,
    controller: WidgetController,
    pending: Option<JoinHandle<Option<ResponseOutcome>>>,
}

impl WidgetSession {
    /// Mounts the widget for `page` and kicks off the auto-show policy.
    pub async fn start(
        store: SettingsStore,
        source: Arc<dyn AnswerSource>,
        config: ClientConfig,
        page: PageContext,
    ) -> Self {
        let controller = WidgetController::new(Arc::clone(&source), config.timeout());
        controller.mount(&store, &page).await;
        let mut session = Self {
            store,
            source,
            config,
            page,
            controller,
            pending: None,
        };
        session.spawn_auto_show();
        session
    }

    pub fn controller(&self) -> &WidgetController {
        &self.controller
    }

    pub fn current_url(&self) -> &Url {
        &self.page.url
    }

    /// Waits for the auto-show request started by the last mount.
    pub async fn settle(&mut self) -> Option<ResponseOutcome> {
        let handle = self.pending.take()?;
        match handle.await {
            Ok(outcome) => outcome,
            Err(err) => {
                log::debug!("Auto-show task ended early: {err}");
                None
            }
        }
    }

    /// Reports a URL observed by the host. Returns whether the widget was remounted.
    pub async fn navigate(&mut self, url: Url) -> bool {
        if url == self.page.url {
            return false;
        }
        log::debug!("Navigation detected: {} -> {}", self.page.url, url);
        self.page.url = url;

        tokio::time::sleep(self.config.settle_delay()).await;

        self.controller.teardown();
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }

        self.controller = WidgetController::new(Arc::clone(&self.source), self.config.timeout());
        self.controller.mount(&self.store, &self.page).await;
        self.spawn_auto_show();
        true
    }

    /// Tears the widget down for good.
    pub fn unmount(&mut self) {
        self.controller.teardown();
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    fn spawn_auto_show(&mut self) {
        let controller = self.controller.clone();
        self.pending = Some(tokio::spawn(async move { controller.auto_show().await }));
    }
}

impl Drop for WidgetSession {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::client::AnswerRequest;
    use crate::error::AssistantError;
    use crate::storage::MemoryArea;

    #[derive(Default)]
    struct EchoSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AnswerSource for EchoSource {
        async fn ask(&self, request: &AnswerRequest) -> Result<String, AssistantError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("answer to {}", request.query))
        }
    }

    fn store() -> SettingsStore {
        let mut items = serde_json::Map::new();
        items.insert("apiKey".to_string(), json!("fw-key"));
        SettingsStore::new(Arc::new(MemoryArea::with_items(items)))
    }

    fn page(raw: &str) -> PageContext {
        PageContext::new(Url::parse(raw).expect("url"))
    }

    #[tokio::test(start_paused = true)]
    async fn url_change_remounts_after_settle_delay() {
        let source = Arc::new(EchoSource::default());
        let mut session = WidgetSession::start(
            store(),
            source.clone(),
            ClientConfig::default(),
            page("https://www.bing.com/search?q=first"),
        )
        .await;
        assert_eq!(session.settle().await, Some(ResponseOutcome::Answered));

        let before = tokio::time::Instant::now();
        let remounted = session
            .navigate(Url::parse("https://www.bing.com/search?q=second").expect("url"))
            .await;
        assert!(remounted);
        assert!(before.elapsed() >= Duration::from_millis(1_000));

        assert_eq!(session.settle().await, Some(ResponseOutcome::Answered));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        let state = session.controller().state();
        assert_eq!(state.query.as_deref(), Some("second"));
        assert_eq!(session.controller().cached_answer("first"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn same_url_is_ignored() {
        let source = Arc::new(EchoSource::default());
        let url = "https://duckduckgo.com/?q=rust";
        let mut session =
            WidgetSession::start(store(), source.clone(), ClientConfig::default(), page(url)).await;
        session.settle().await;

        assert!(!session.navigate(Url::parse(url).expect("url")).await);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_tears_the_widget_down() {
        let source = Arc::new(EchoSource::default());
        let mut session = WidgetSession::start(
            store(),
            source,
            ClientConfig::default(),
            page("https://www.google.com/search?q=rust"),
        )
        .await;
        session.settle().await;
        session.unmount();
        assert!(session.controller().view().is_none());
    }
}
