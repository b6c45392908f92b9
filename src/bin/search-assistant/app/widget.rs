use anyhow::Context;
use url::Url;

use search_assistant::widget::{PageContext, PanelBody, PanelState, Placement, WidgetSession};

use crate::host::Host;

pub async fn run_ask(
    host: &Host,
    url: &str,
    next: &[String],
    refresh: bool,
    prefers_dark: bool,
) -> anyhow::Result<()> {
    let mut page = PageContext::new(parse_url(url)?);
    page.prefers_dark = prefers_dark;

    let mut session = WidgetSession::start(
        host.settings.clone(),
        host.relay.clone(),
        host.client.clone(),
        page,
    )
    .await;
    show(&mut session, refresh).await;

    for raw in next {
        if session.navigate(parse_url(raw)?).await {
            show(&mut session, refresh).await;
        }
    }
    session.unmount();
    Ok(())
}

fn parse_url(raw: &str) -> anyhow::Result<Url> {
    Url::parse(raw).with_context(|| format!("not a URL: {raw}"))
}

async fn show(session: &mut WidgetSession, refresh: bool) {
    let mut outcome = session.settle().await;
    if refresh {
        outcome = Some(session.controller().refresh().await);
    }
    log::debug!("Widget outcome: {outcome:?}");

    let controller = session.controller();
    let state = controller.state();
    println!("# {}", session.current_url());
    if let Some(query) = &state.query {
        println!("query: {query}");
    }
    let Some(view) = controller.view() else {
        println!("(widget not rendered)");
        return;
    };
    let placement = match view.placement {
        Placement::RightDocked => "right".to_string(),
        Placement::Overlay => "overlay".to_string(),
        Placement::TopInserted { anchors } => format!("top ({})", anchors.join(" or ")),
    };
    println!(
        "theme: {}  placement: {placement}  font: {}",
        view.theme.as_str(),
        view.font_class
    );
    if !view.panel_visible {
        println!("(panel hidden; run with --refresh to ask)");
        return;
    }
    match (&view.body, state.panel()) {
        (_, Some(PanelState::Showing(answer))) => println!("{answer}"),
        (PanelBody::Error { message }, _) => eprintln!("{message}"),
        (PanelBody::Hint(text), _) | (PanelBody::Loading(text), _) => println!("{text}"),
        (PanelBody::Answer { html }, _) => println!("{html}"),
    }
    println!("-- {}", view.footer);
}
