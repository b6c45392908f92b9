use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use serde_json::Value;

use search_assistant::options::{OptionsForm, OptionsPage, StatusKind};

use crate::args::SettingsCommand;
use crate::host::Host;

pub async fn run_settings(host: &Host, action: SettingsCommand) -> anyhow::Result<()> {
    let mut page = OptionsPage::open(host.settings.clone()).await;
    if page.banner_visible {
        println!("Welcome! Set your Fireworks API key with `settings set apiKey <key>`.");
    }

    let ok = match action {
        SettingsCommand::Show => {
            show(&page.form);
            true
        }
        SettingsCommand::Set { field, value } => {
            set_field(&mut page.form, &field, &value)?;
            page.submit().await
        }
        SettingsCommand::Reset { yes } => {
            if !yes {
                println!("Pass --yes to reset all settings to their defaults.");
            }
            page.reset(yes).await
        }
        SettingsCommand::Test => {
            let testing = page.testing_handle();
            let notice = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(300)).await;
                if testing.load(Ordering::SeqCst) {
                    eprintln!("Testing...");
                }
            });
            let ok = page.test_api(host.relay.as_ref()).await;
            notice.abort();
            ok
        }
        SettingsCommand::Dismiss => {
            page.dismiss_banner().await;
            true
        }
    };

    if let Some(status) = page.visible_status(Instant::now()) {
        match status.kind {
            StatusKind::Success => println!("{}", status.text),
            StatusKind::Error => eprintln!("{}", status.text),
        }
    }
    if !ok {
        anyhow::bail!("settings command did not complete");
    }
    Ok(())
}

fn show(form: &OptionsForm) {
    let chars: Vec<char> = form.api_key.chars().collect();
    let masked = match chars.len() {
        0 => "(not set)".to_string(),
        n if n <= 4 => "****".to_string(),
        n => format!("****{}", chars[n - 4..].iter().collect::<String>()),
    };
    println!("apiKey       {masked}");
    println!("theme        {}", label(&form.theme));
    println!("position     {}", label(&form.position));
    println!("autoShow     {}", label(&form.auto_show));
    println!("opacity      {} ({})", form.opacity, form.opacity_label());
    println!("fontSize     {}", label(&form.font_size));
    println!("animations   {}", form.animations);
    println!("soundEffects {}", form.sound_effects);
    println!("maxTokens    {}", form.max_tokens);
    println!("cacheResults {}", form.cache_results);
}

fn label<T: serde::Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(Value::String(text)) => text,
        Ok(other) => other.to_string(),
        Err(_) => String::new(),
    }
}

fn set_field(form: &mut OptionsForm, field: &str, value: &str) -> anyhow::Result<()> {
    let text = || Value::String(value.to_string());
    match field {
        "apiKey" => form.api_key = value.to_string(),
        "theme" => form.theme = serde_json::from_value(text())?,
        "position" => form.position = serde_json::from_value(text())?,
        "autoShow" => form.auto_show = serde_json::from_value(text())?,
        "fontSize" => form.font_size = serde_json::from_value(text())?,
        "opacity" => form.opacity = value.to_string(),
        "maxTokens" => form.max_tokens = value.to_string(),
        "animations" => form.animations = value.parse()?,
        "soundEffects" => form.sound_effects = value.parse()?,
        "cacheResults" => form.cache_results = value.parse()?,
        other => anyhow::bail!("unknown setting: {other}"),
    }
    Ok(())
}
