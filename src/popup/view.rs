use super::controller::ChatState;
use crate::markup::format_message;
use crate::settings::ResolvedTheme;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub class: &'static str,
    /// Escaped and lightly formatted content.
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatView {
    pub theme: ResolvedTheme,
    pub messages: Vec<MessageView>,
    pub typing: bool,
    pub clear_modal_open: bool,
    pub send_enabled: bool,
}

pub fn render(state: &ChatState) -> ChatView {
    ChatView {
        theme: state.settings.theme.resolve(state.prefers_dark),
        messages: state
            .transcript
            .iter()
            .map(|entry| MessageView {
                class: entry.message.sender.css_class(),
                html: format_message(&entry.message.content),
            })
            .collect(),
        typing: state.typing,
        clear_modal_open: state.clear_modal_open,
        send_enabled: !state.input.trim().is_empty() && !state.sending,
    }
}
