use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::view::{render, ChatView};
use super::{FAILURE_MESSAGE, MISSING_KEY_MESSAGE, PERSIST_FAILED_MESSAGE, WELCOME_MESSAGE};
use crate::client::{AnswerRequest, AnswerSource};
use crate::error::AssistantError;
use crate::history::{ChatHistoryStore, ChatMessage};
use crate::lifecycle::HostAction;
use crate::settings::{Settings, SettingsStore};

/// A transcript line. Local notices are shown but never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub message: ChatMessage,
    pub persisted: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ChatState {
    pub settings: Settings,
    pub transcript: Vec<TranscriptEntry>,
    pub typing: bool,
    pub clear_modal_open: bool,
    pub input: String,
    pub sending: bool,
    pub prefers_dark: bool,
}

impl ChatState {
    fn persisted(&self) -> Vec<ChatMessage> {
        self.transcript
            .iter()
            .filter(|entry| entry.persisted)
            .map(|entry| entry.message.clone())
            .collect()
    }

    fn push(&mut self, message: ChatMessage, persisted: bool) {
        self.transcript.push(TranscriptEntry { message, persisted });
    }

    fn notice(&mut self, text: &str) {
        self.push(ChatMessage::assistant(text), false);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input.
    Ignored,
    /// A previous message is still waiting for its reply.
    Busy,
    /// No API key configured; the relay was not called.
    MissingKey,
    Replied,
    Failed,
    Cancelled,
}

/// Popup chat controller. Clones share the same conversation.
#[derive(Clone)]
pub struct ChatController {
    state: Arc<Mutex<ChatState>>,
    sending: Arc<AtomicBool>,
    source: Arc<dyn AnswerSource>,
    history: ChatHistoryStore,
    cancel: CancellationToken,
    /// Child of `cancel` for the send currently waiting on a reply.
    in_flight: Arc<Mutex<Option<CancellationToken>>>,
    timeout: Duration,
}

struct SendGuard {
    flag: Arc<AtomicBool>,
    state: Arc<Mutex<ChatState>>,
}

impl SendGuard {
    fn acquire(flag: &Arc<AtomicBool>, state: &Arc<Mutex<ChatState>>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        state.lock().sending = true;
        Some(Self {
            flag: Arc::clone(flag),
            state: Arc::clone(state),
        })
    }
}

impl Drop for SendGuard {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.sending = false;
        state.typing = false;
        self.flag.store(false, Ordering::Release);
    }
}

impl ChatController {
    /// Loads settings and history; seeds the welcome message into an empty history.
    pub async fn open(
        settings: &SettingsStore,
        history: ChatHistoryStore,
        source: Arc<dyn AnswerSource>,
        timeout: Duration,
        prefers_dark: bool,
    ) -> Self {
        let settings = settings.load().await;
        let (messages, load_failed) = match history.load().await {
            Ok(messages) => (messages, false),
            Err(err) => {
                log::warn!("Chat history unreadable, starting fresh: {err}");
                (Vec::new(), true)
            }
        };

        let mut state = ChatState {
            settings,
            prefers_dark,
            ..ChatState::default()
        };
        for message in messages {
            state.push(message, true);
        }
        if load_failed {
            state.notice("⚠️ Could not load previous messages");
        }

        let controller = Self {
            state: Arc::new(Mutex::new(state)),
            sending: Arc::new(AtomicBool::new(false)),
            source,
            history,
            cancel: CancellationToken::new(),
            in_flight: Arc::new(Mutex::new(None)),
            timeout,
        };
        let empty = controller.state.lock().persisted().is_empty();
        if empty {
            controller.add_welcome_message().await;
        }
        controller
    }

    pub fn set_input(&self, text: impl Into<String>) {
        self.state.lock().input = text.into();
    }

    /// Sends whatever is in the input box, clearing it when accepted.
    pub async fn submit_input(&self) -> SendOutcome {
        let text = self.state.lock().input.clone();
        self.send_message(&text).await
    }

    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }
        if self.sending.load(Ordering::Acquire) {
            return SendOutcome::Busy;
        }

        let request = {
            let mut state = self.state.lock();
            if !state.settings.has_api_key() {
                state.notice(MISSING_KEY_MESSAGE);
                return SendOutcome::MissingKey;
            }
            AnswerRequest::new(text, &state.settings.api_key, state.settings.max_tokens)
        };

        let Some(_guard) = SendGuard::acquire(&self.sending, &self.state) else {
            return SendOutcome::Busy;
        };

        {
            let mut state = self.state.lock();
            state.input.clear();
            state.push(ChatMessage::user(text), true);
        }
        self.persist().await;
        self.state.lock().typing = true;

        let token = self.cancel.child_token();
        *self.in_flight.lock() = Some(token.clone());
        let result = tokio::select! {
            _ = token.cancelled() => Err(AssistantError::Cancelled),
            answer = tokio::time::timeout(self.timeout, self.source.ask(&request)) => {
                answer.unwrap_or_else(|_| {
                    Err(AssistantError::Timeout(format!(
                        "no reply within {}s",
                        self.timeout.as_secs()
                    )))
                })
            }
        };
        self.in_flight.lock().take();

        {
            // A clear cancels under the state lock, so the check and the push
            // cannot interleave with it.
            let mut state = self.state.lock();
            state.typing = false;
            match result {
                _ if token.is_cancelled() => return SendOutcome::Cancelled,
                Ok(answer) => state.push(ChatMessage::assistant(answer), true),
                Err(AssistantError::Cancelled) => return SendOutcome::Cancelled,
                Err(err) => {
                    log::warn!("Chat request failed: {err}");
                    state.notice(FAILURE_MESSAGE);
                    return SendOutcome::Failed;
                }
            }
        }
        self.persist().await;
        SendOutcome::Replied
    }

    /// Opens the confirmation modal; nothing is deleted yet.
    pub fn request_clear(&self) {
        self.state.lock().clear_modal_open = true;
    }

    /// Closes the modal without clearing (cancel button, backdrop click or Escape).
    pub fn cancel_clear(&self) {
        self.state.lock().clear_modal_open = false;
    }

    /// Wipes the persisted history and re-seeds the welcome message. A send
    /// still waiting for its reply is abandoned.
    ///
    /// Does nothing unless the confirmation modal is open.
    pub async fn confirm_clear(&self) -> bool {
        {
            let mut state = self.state.lock();
            if !state.clear_modal_open {
                return false;
            }
            if let Some(token) = self.in_flight.lock().take() {
                token.cancel();
            }
            state.transcript.clear();
            state.clear_modal_open = false;
        }
        if let Err(err) = self.history.clear().await {
            log::warn!("Could not clear chat history: {err}");
            self.state.lock().notice(PERSIST_FAILED_MESSAGE);
        }
        self.add_welcome_message().await;
        true
    }

    pub fn open_settings(&self) -> HostAction {
        HostAction::OpenSettings
    }

    /// Abandons an in-flight request, e.g. when the popup closes.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn state(&self) -> ChatState {
        self.state.lock().clone()
    }

    pub fn view(&self) -> ChatView {
        render(&self.state.lock())
    }

    async fn add_welcome_message(&self) {
        self.state
            .lock()
            .push(ChatMessage::assistant(WELCOME_MESSAGE), true);
        self.persist().await;
    }

    async fn persist(&self) {
        let snapshot = self.state.lock().persisted();
        if let Err(err) = self.history.save(&snapshot).await {
            log::warn!("Chat history not saved: {err}");
            self.state.lock().notice(PERSIST_FAILED_MESSAGE);
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
