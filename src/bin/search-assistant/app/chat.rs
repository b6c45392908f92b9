use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use search_assistant::history::Sender;
use search_assistant::popup::{ChatController, SendOutcome, TranscriptEntry};

use crate::host::Host;

pub async fn run_chat(
    host: &Host,
    message: Option<String>,
    prefers_dark: bool,
) -> anyhow::Result<()> {
    let chat = ChatController::open(
        &host.settings,
        host.history.clone(),
        host.relay.clone(),
        host.client.timeout(),
        prefers_dark,
    )
    .await;

    if let Some(message) = message {
        let shown = chat.state().transcript.len();
        let outcome = chat.send_message(&message).await;
        print_from(&chat, shown);
        chat.close();
        return match outcome {
            SendOutcome::Failed | SendOutcome::MissingKey => {
                anyhow::bail!("no answer ({outcome:?})")
            }
            _ => Ok(()),
        };
    }

    print_from(&chat, 0);
    println!("(/clear to wipe history, /settings, /quit)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" | "/exit" => break,
            "/settings" => host.perform(chat.open_settings()),
            "/clear" => clear(&chat, &mut lines).await?,
            _ => {
                let shown = chat.state().transcript.len();
                chat.set_input(line.as_str());
                if chat.submit_input().await == SendOutcome::Busy {
                    println!("Still waiting for the previous answer.");
                }
                print_replies(&chat, shown);
            }
        }
    }
    chat.close();
    Ok(())
}

async fn clear(chat: &ChatController, lines: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<()> {
    chat.request_clear();
    println!("Clear all chat history? [y/N]");
    let answer = lines.next_line().await?.unwrap_or_default();
    if answer.trim().eq_ignore_ascii_case("y") {
        chat.confirm_clear().await;
        print_from(chat, 0);
    } else {
        chat.cancel_clear();
    }
    Ok(())
}

fn print_from(chat: &ChatController, start: usize) {
    let state = chat.state();
    for entry in state.transcript.iter().skip(start) {
        print_entry(entry);
    }
}

/// Skips the user's own lines, which are already on screen.
fn print_replies(chat: &ChatController, start: usize) {
    let state = chat.state();
    for entry in state.transcript.iter().skip(start) {
        if entry.message.sender != Sender::User {
            print_entry(entry);
        }
    }
}

fn print_entry(entry: &TranscriptEntry) {
    let who = match entry.message.sender {
        Sender::User => "you",
        Sender::Assistant => "dobby",
    };
    println!("{who}> {}", entry.message.content);
}
