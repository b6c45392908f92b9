use super::state::{PanelState, Phase, WidgetState};
use crate::markup::escape_html;
use crate::settings::{AutoShow, Position, ResolvedTheme};

const LOADING_TEXT: &str = "Getting AI insights...";
const IDLE_HINT: &str = "Press refresh to get an AI answer for this search.";
const FOOTER: &str = "Powered by Dobby 8B";

/// Where the panel goes on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Floating, docked to the right edge.
    RightDocked,
    /// Inserted before the results, at the first selector present on the page
    /// or the body when none is.
    TopInserted { anchors: &'static [&'static str] },
    Overlay,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelBody {
    Hint(&'static str),
    Loading(&'static str),
    /// Escaped answer markup.
    Answer { html: String },
    Error { message: String },
}

/// Presentation-ready description of the widget.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetView {
    pub theme: ResolvedTheme,
    pub placement: Placement,
    pub font_class: &'static str,
    pub opacity: f64,
    pub animate: bool,
    /// Present only in manual mode.
    pub trigger: Option<TriggerView>,
    pub panel_visible: bool,
    pub body: PanelBody,
    pub footer: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerView {
    pub visible: bool,
    pub pulse: bool,
}

/// Maps widget state to its view; `None` until the widget is rendered.
pub fn render(state: &WidgetState) -> Option<WidgetView> {
    let Phase::Rendered(panel) = &state.phase else {
        return None;
    };
    let settings = &state.settings;

    let placement = match settings.position {
        Position::Right => Placement::RightDocked,
        Position::Top => Placement::TopInserted {
            anchors: state
                .engine
                .map(|engine| engine.results_container_selectors())
                .unwrap_or(&[]),
        },
        Position::Overlay => Placement::Overlay,
    };

    let trigger = (settings.auto_show == AutoShow::Manual).then(|| TriggerView {
        visible: !state.panel_visible,
        pulse: settings.animations,
    });

    let body = match panel {
        PanelState::Idle => PanelBody::Hint(IDLE_HINT),
        PanelState::Loading => PanelBody::Loading(LOADING_TEXT),
        PanelState::Showing(answer) => PanelBody::Answer {
            html: escape_html(answer),
        },
        PanelState::Error(message) => PanelBody::Error {
            message: message.clone(),
        },
    };

    Some(WidgetView {
        theme: settings.theme.resolve(state.prefers_dark),
        placement,
        font_class: settings.font_size.css_class(),
        opacity: settings.opacity,
        animate: settings.animations && state.panel_visible,
        trigger,
        panel_visible: state.panel_visible,
        body,
        footer: FOOTER,
    })
}
