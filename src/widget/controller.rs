use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::state::{PanelState, Phase, WidgetState};
use super::view::{render, WidgetView};
use super::{is_question, ERROR_MESSAGE};
use crate::client::{AnswerRequest, AnswerSource};
use crate::engine::SearchEngine;
use crate::error::AssistantError;
use crate::lifecycle::HostAction;
use crate::settings::{AutoShow, SettingsStore};

/// What the host knows about the page being decorated.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub url: Url,
    pub prefers_dark: bool,
}

impl PageContext {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            prefers_dark: false,
        }
    }
}

/// Result of one [`WidgetController::get_ai_response`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// Another request was already in flight; nothing happened.
    InFlight,
    /// The page has no recognizable search query.
    NoQuery,
    /// Served from the session cache without a network call.
    Cached,
    Answered,
    Failed,
    /// The widget was torn down while the request was running.
    Cancelled,
}

struct Inner {
    state: WidgetState,
    /// Exact query text to last answer; lives as long as this controller.
    cache: HashMap<String, String>,
}

/// Page widget controller. Clones share the same widget.
#[derive(Clone)]
pub struct WidgetController {
    inner: Arc<Mutex<Inner>>,
    loading: Arc<AtomicBool>,
    source: Arc<dyn AnswerSource>,
    cancel: CancellationToken,
    timeout: Duration,
}

/// Releases the single-flight flag on every exit path.
struct FlightGuard(Arc<AtomicBool>);

impl FlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl WidgetController {
    pub fn new(source: Arc<dyn AnswerSource>, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: WidgetState::default(),
                cache: HashMap::new(),
            })),
            loading: Arc::new(AtomicBool::new(false)),
            source,
            cancel: CancellationToken::new(),
            timeout,
        }
    }

    /// Loads settings, reads the page and renders the widget.
    pub async fn mount(&self, store: &SettingsStore, page: &PageContext) {
        let settings = store.load().await;
        let engine = SearchEngine::detect(&page.url);
        let query = engine.and_then(|engine| engine.extract_query(&page.url));

        let mut inner = self.inner.lock();
        let state = &mut inner.state;
        state.settings = settings;
        state.engine = engine;
        state.query = query;
        state.prefers_dark = page.prefers_dark;
        state.phase = Phase::SettingsLoaded;
        log::debug!(
            "Widget settings loaded for {:?}, query present: {}",
            state.engine,
            state.query.is_some()
        );

        state.panel_visible = state.settings.auto_show != AutoShow::Manual;
        state.phase = Phase::Rendered(PanelState::Idle);
    }

    /// Applies the auto-show policy. Returns `None` when the policy decided
    /// not to ask.
    pub async fn auto_show(&self) -> Option<ResponseOutcome> {
        let (mode, query) = {
            let inner = self.inner.lock();
            (inner.state.settings.auto_show, inner.state.query.clone())
        };
        let query = query?;
        let fire = match mode {
            AutoShow::Always => true,
            AutoShow::Keywords => is_question(&query),
            AutoShow::Manual => false,
        };
        if !fire {
            return None;
        }
        Some(self.get_ai_response(false).await)
    }

    /// Fetches (or recalls) the answer for the page's query and renders it.
    pub async fn get_ai_response(&self, force_refresh: bool) -> ResponseOutcome {
        if self.loading.load(Ordering::Acquire) {
            return ResponseOutcome::InFlight;
        }

        let request = {
            let mut inner = self.inner.lock();
            let Some(query) = inner.state.query.clone() else {
                return ResponseOutcome::NoQuery;
            };

            if !force_refresh && inner.state.settings.cache_results {
                if let Some(cached) = inner.cache.get(&query).cloned() {
                    inner.state.set_panel(PanelState::Showing(cached));
                    return ResponseOutcome::Cached;
                }
            }

            let settings = &inner.state.settings;
            if !settings.has_api_key() {
                log::warn!("No API key configured, not calling the relay");
                inner
                    .state
                    .set_panel(PanelState::Error(ERROR_MESSAGE.to_string()));
                return ResponseOutcome::Failed;
            }
            AnswerRequest::new(query, &settings.api_key, settings.max_tokens)
        };

        let Some(_flight) = FlightGuard::acquire(&self.loading) else {
            return ResponseOutcome::InFlight;
        };
        self.inner.lock().state.set_panel(PanelState::Loading);

        let result = tokio::select! {
            _ = self.cancel.cancelled() => Err(AssistantError::Cancelled),
            answer = tokio::time::timeout(self.timeout, self.source.ask(&request)) => {
                answer.unwrap_or_else(|_| {
                    Err(AssistantError::Timeout(format!(
                        "no answer within {}s",
                        self.timeout.as_secs()
                    )))
                })
            }
        };

        let mut inner = self.inner.lock();
        match result {
            Ok(answer) => {
                if inner.state.settings.cache_results {
                    inner.cache.insert(request.query.clone(), answer.clone());
                }
                inner.state.set_panel(PanelState::Showing(answer));
                ResponseOutcome::Answered
            }
            Err(AssistantError::Cancelled) => ResponseOutcome::Cancelled,
            Err(err) => {
                log::warn!("AI response failed: {err}");
                inner
                    .state
                    .set_panel(PanelState::Error(ERROR_MESSAGE.to_string()));
                ResponseOutcome::Failed
            }
        }
    }

    /// Refresh control: always goes to the relay.
    pub async fn refresh(&self) -> ResponseOutcome {
        self.get_ai_response(true).await
    }

    /// Trigger control (manual mode): shows the panel and asks.
    pub async fn trigger(&self) -> ResponseOutcome {
        self.inner.lock().state.panel_visible = true;
        self.get_ai_response(false).await
    }

    /// Close control: hides the panel, bringing the trigger back in manual mode.
    pub fn close(&self) {
        self.inner.lock().state.panel_visible = false;
    }

    pub fn open_settings(&self) -> HostAction {
        HostAction::OpenSettings
    }

    /// Cancels any in-flight request and unmounts the widget.
    pub fn teardown(&self) {
        self.cancel.cancel();
        let mut inner = self.inner.lock();
        inner.state.phase = Phase::Uninitialized;
        inner.state.panel_visible = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn state(&self) -> WidgetState {
        self.inner.lock().state.clone()
    }

    pub fn view(&self) -> Option<WidgetView> {
        render(&self.inner.lock().state)
    }

    pub fn cached_answer(&self, query: &str) -> Option<String> {
        self.inner.lock().cache.get(query).cloned()
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
