//! Text-to-markup helpers for answer and chat rendering.
//!
//! Model and user text is always escaped before any markup is added.

use std::sync::OnceLock;

use regex::Regex;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn bold_pattern() -> &'static Regex {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    BOLD.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold pattern"))
}

fn italic_pattern() -> &'static Regex {
    static ITALIC: OnceLock<Regex> = OnceLock::new();
    ITALIC.get_or_init(|| Regex::new(r"\*(.*?)\*").expect("valid italic pattern"))
}

/// Escapes `content`, then turns newlines into `<br>`, `**x**` into
/// `<strong>x</strong>` and `*x*` into `<em>x</em>`.
pub fn format_message(content: &str) -> String {
    let escaped = escape_html(content).replace('\n', "<br>");
    let bold = bold_pattern().replace_all(&escaped, "<strong>$1</strong>");
    italic_pattern()
        .replace_all(&bold, "<em>$1</em>")
        .into_owned()
}
