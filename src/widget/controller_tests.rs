use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Notify;

use super::*;
use crate::settings::Settings;
use crate::storage::MemoryArea;
use crate::widget::PanelBody;

const GOOGLE_QUESTION: &str = "https://www.google.com/search?q=What+is+the+capital+of+France";
const GOOGLE_PLAIN: &str = "https://www.google.com/search?q=weather+today";

struct ScriptedSource {
    calls: AtomicUsize,
    reply: Result<String, u16>,
    started: Notify,
    release: Option<Notify>,
    hang: bool,
}

impl ScriptedSource {
    fn answering(text: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            reply: Ok(text.to_string()),
            started: Notify::new(),
            release: None,
            hang: false,
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            ..Self::answering("")
        }
    }

    fn gated(text: &str) -> Self {
        Self {
            release: Some(Notify::new()),
            ..Self::answering(text)
        }
    }

    fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::answering("")
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnswerSource for ScriptedSource {
    async fn ask(&self, _request: &AnswerRequest) -> Result<String, AssistantError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        if let Some(release) = &self.release {
            release.notified().await;
        }
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.reply
            .clone()
            .map_err(|status| AssistantError::Upstream {
                status,
                message: "upstream failed".to_string(),
            })
    }
}

fn settings_store(overrides: Value) -> SettingsStore {
    let mut items = serde_json::Map::new();
    items.insert("apiKey".to_string(), json!("fw-key"));
    if let Value::Object(extra) = overrides {
        items.extend(extra);
    }
    SettingsStore::new(Arc::new(MemoryArea::with_items(items)))
}

async fn mounted(
    source: Arc<ScriptedSource>,
    overrides: Value,
    url: &str,
) -> WidgetController {
    let controller = WidgetController::new(source, Duration::from_secs(20));
    let page = PageContext::new(Url::parse(url).expect("url"));
    controller.mount(&settings_store(overrides), &page).await;
    controller
}

#[tokio::test]
async fn mount_walks_to_rendered_idle() {
    let source = Arc::new(ScriptedSource::answering("Paris"));
    let controller = WidgetController::new(source, Duration::from_secs(1));
    assert_eq!(controller.state().phase, Phase::Uninitialized);
    assert!(controller.view().is_none());

    let page = PageContext::new(Url::parse(GOOGLE_QUESTION).expect("url"));
    controller.mount(&settings_store(json!({})), &page).await;

    let state = controller.state();
    assert_eq!(state.phase, Phase::Rendered(PanelState::Idle));
    assert_eq!(state.query.as_deref(), Some("What is the capital of France"));
    assert_eq!(state.settings.api_key, "fw-key");
    assert!(state.panel_visible);
}

#[tokio::test]
async fn always_mode_answers_and_caches() {
    let source = Arc::new(ScriptedSource::answering("Paris"));
    let controller = mounted(source.clone(), json!({}), GOOGLE_PLAIN).await;

    assert_eq!(controller.auto_show().await, Some(ResponseOutcome::Answered));
    assert_eq!(source.calls(), 1);
    assert_eq!(controller.cached_answer("weather today").as_deref(), Some("Paris"));
    let view = controller.view().expect("view");
    assert_eq!(
        view.body,
        PanelBody::Answer {
            html: "Paris".to_string()
        }
    );
}

#[tokio::test]
async fn cache_hit_makes_no_network_call() {
    let source = Arc::new(ScriptedSource::answering("Paris"));
    let controller = mounted(source.clone(), json!({}), GOOGLE_QUESTION).await;

    assert_eq!(controller.get_ai_response(false).await, ResponseOutcome::Answered);
    controller.close();
    assert_eq!(controller.get_ai_response(false).await, ResponseOutcome::Cached);
    assert_eq!(source.calls(), 1);

    let state = controller.state();
    assert!(state.panel_visible);
    assert_eq!(state.panel(), Some(&PanelState::Showing("Paris".to_string())));
}

#[tokio::test]
async fn refresh_bypasses_the_cache() {
    let source = Arc::new(ScriptedSource::answering("Paris"));
    let controller = mounted(source.clone(), json!({}), GOOGLE_QUESTION).await;

    controller.get_ai_response(false).await;
    assert_eq!(controller.refresh().await, ResponseOutcome::Answered);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn disabled_cache_always_calls() {
    let source = Arc::new(ScriptedSource::answering("Paris"));
    let controller = mounted(source.clone(), json!({"cacheResults": false}), GOOGLE_QUESTION).await;

    controller.get_ai_response(false).await;
    assert_eq!(controller.get_ai_response(false).await, ResponseOutcome::Answered);
    assert_eq!(source.calls(), 2);
    assert_eq!(controller.cached_answer("What is the capital of France"), None);
}

#[tokio::test]
async fn keywords_mode_only_fires_for_questions() {
    let source = Arc::new(ScriptedSource::answering("Sunny"));
    let plain = mounted(source.clone(), json!({"autoShow": "keywords"}), GOOGLE_PLAIN).await;
    assert_eq!(plain.auto_show().await, None);
    assert_eq!(source.calls(), 0);

    let question = mounted(source.clone(), json!({"autoShow": "keywords"}), GOOGLE_QUESTION).await;
    assert_eq!(question.auto_show().await, Some(ResponseOutcome::Answered));
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn manual_mode_waits_for_the_trigger() {
    let source = Arc::new(ScriptedSource::answering("Paris"));
    let controller = mounted(source.clone(), json!({"autoShow": "manual"}), GOOGLE_QUESTION).await;

    assert_eq!(controller.auto_show().await, None);
    let view = controller.view().expect("view");
    assert!(!view.panel_visible);
    assert!(view.trigger.is_some_and(|t| t.visible));

    assert_eq!(controller.trigger().await, ResponseOutcome::Answered);
    let view = controller.view().expect("view");
    assert!(view.panel_visible);
    assert!(view.trigger.is_some_and(|t| !t.visible));

    controller.close();
    let view = controller.view().expect("view");
    assert!(!view.panel_visible);
    assert!(view.trigger.is_some_and(|t| t.visible));
}

#[tokio::test]
async fn second_request_while_loading_is_a_no_op() {
    let source = Arc::new(ScriptedSource::gated("Paris"));
    let controller = mounted(source.clone(), json!({}), GOOGLE_QUESTION).await;

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.get_ai_response(false).await }
    });
    source.started.notified().await;

    assert!(controller.is_loading());
    assert_eq!(controller.view().expect("view").body, PanelBody::Loading("Getting AI insights..."));
    assert_eq!(controller.refresh().await, ResponseOutcome::InFlight);

    if let Some(release) = &source.release {
        release.notify_one();
    }
    assert_eq!(first.await.expect("join"), ResponseOutcome::Answered);
    assert_eq!(source.calls(), 1);
    assert!(!controller.is_loading());
}

#[tokio::test]
async fn relay_failure_renders_fixed_message_and_clears_flag() {
    let source = Arc::new(ScriptedSource::failing(500));
    let controller = mounted(source.clone(), json!({}), GOOGLE_QUESTION).await;

    assert_eq!(controller.get_ai_response(false).await, ResponseOutcome::Failed);
    assert!(!controller.is_loading());
    assert_eq!(
        controller.state().panel(),
        Some(&PanelState::Error(ERROR_MESSAGE.to_string()))
    );
    assert_eq!(controller.cached_answer("What is the capital of France"), None);
}

#[tokio::test]
async fn missing_key_never_reaches_the_relay() {
    let source = Arc::new(ScriptedSource::answering("Paris"));
    let controller = mounted(source.clone(), json!({"apiKey": ""}), GOOGLE_QUESTION).await;

    assert_eq!(controller.get_ai_response(false).await, ResponseOutcome::Failed);
    assert_eq!(source.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn slow_relay_times_out() {
    let source = Arc::new(ScriptedSource::hanging());
    let controller = WidgetController::new(source, Duration::from_secs(20));
    let page = PageContext::new(Url::parse(GOOGLE_QUESTION).expect("url"));
    controller.mount(&settings_store(json!({})), &page).await;

    assert_eq!(controller.get_ai_response(false).await, ResponseOutcome::Failed);
    assert!(!controller.is_loading());
}

#[tokio::test]
async fn teardown_cancels_in_flight_request() {
    let source = Arc::new(ScriptedSource::hanging());
    let controller = mounted(source.clone(), json!({}), GOOGLE_QUESTION).await;

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.get_ai_response(false).await }
    });
    source.started.notified().await;
    controller.teardown();

    assert_eq!(pending.await.expect("join"), ResponseOutcome::Cancelled);
    assert!(!controller.is_loading());
    assert!(controller.view().is_none());
}

#[tokio::test]
async fn unsupported_page_has_no_query() {
    let source = Arc::new(ScriptedSource::answering("Paris"));
    let controller = mounted(source.clone(), json!({}), "https://example.com/?q=x").await;

    assert_eq!(controller.auto_show().await, None);
    assert_eq!(controller.get_ai_response(true).await, ResponseOutcome::NoQuery);
    assert_eq!(controller.state().settings, Settings {
        api_key: "fw-key".to_string(),
        ..Settings::default()
    });
}
