use crate::engine::SearchEngine;
use crate::settings::Settings;

/// What the answer panel currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelState {
    Idle,
    Loading,
    Showing(String),
    Error(String),
}

/// Lifecycle of one widget mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    SettingsLoaded,
    Rendered(PanelState),
}

/// Everything [`super::render`] needs.
#[derive(Debug, Clone)]
pub struct WidgetState {
    pub phase: Phase,
    pub settings: Settings,
    pub engine: Option<SearchEngine>,
    pub query: Option<String>,
    pub panel_visible: bool,
    pub prefers_dark: bool,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self {
            phase: Phase::Uninitialized,
            settings: Settings::default(),
            engine: None,
            query: None,
            panel_visible: false,
            prefers_dark: false,
        }
    }
}

impl WidgetState {
    pub fn panel(&self) -> Option<&PanelState> {
        match &self.phase {
            Phase::Rendered(panel) => Some(panel),
            _ => None,
        }
    }

    pub(super) fn set_panel(&mut self, panel: PanelState) {
        if matches!(self.phase, Phase::Rendered(_)) {
            self.phase = Phase::Rendered(panel);
            self.panel_visible = true;
        }
    }
}
