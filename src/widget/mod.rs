//! In-page answer widget for search result pages.
//!
//! [`WidgetController`] owns the per-page state machine
//! (`Uninitialized -> SettingsLoaded -> Rendered`), the session cache and the
//! single-flight guard; [`render`] turns its state into a [`WidgetView`] for
//! whatever host draws it. [`WidgetSession`] remounts the controller when a
//! single-page results view changes URL.

mod controller;
mod session;
mod state;
mod view;

pub use controller::{PageContext, ResponseOutcome, WidgetController};
pub use session::WidgetSession;
pub use state::{PanelState, Phase, WidgetState};
pub use view::{render, PanelBody, Placement, TriggerView, WidgetView};

/// Shown in the panel whenever an answer could not be produced.
pub const ERROR_MESSAGE: &str = "Failed to get AI response. Please check your settings.";

const QUESTION_WORDS: [&str; 14] = [
    "what", "how", "why", "when", "where", "who", "which", "can", "should", "will", "is", "are",
    "do", "does",
];

/// Whether `query` reads like a question: it starts with an interrogative
/// word (case-insensitive prefix) or contains a question mark.
pub fn is_question(query: &str) -> bool {
    let lower = query.to_lowercase();
    QUESTION_WORDS.iter().any(|word| lower.starts_with(word)) || query.contains('?')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("What is the capital of France", true)]
    #[case("how to tie a tie", true)]
    #[case("DOES rust have GC", true)]
    #[case("rust traits?", true)]
    #[case("weather today", false)]
    #[case("best pizza near me", false)]
    fn classifies_questions(#[case] query: &str, #[case] expected: bool) {
        assert_eq!(is_question(query), expected);
    }
}
