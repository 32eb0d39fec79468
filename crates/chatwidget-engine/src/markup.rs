//! HTML templating for log entries.
//!
//! Every piece of user or endpoint text goes through [`escape_html`] before it
//! is interpolated. Bot replies then get their newlines turned into `<br>`.

use std::borrow::Cow;
use std::fmt::Write;

use crate::turn::{LogEntry, QuickAction, Turn, PENDING_TEXT};

/// Escape text for use inside HTML element content or a quoted attribute.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

/// Escape text and convert newlines into line breaks.
fn multiline(text: &str) -> String {
    escape_html(text).replace('\n', "<br>")
}

/// Render one log entry as a message bubble or control.
pub fn render_entry(entry: &LogEntry) -> String {
    match entry {
        LogEntry::Turn(Turn::User(text)) => {
            format!(r#"<div class="message user-message">{}</div>"#, escape_html(text))
        }
        LogEntry::Turn(Turn::Pending(id)) => format!(
            r#"<div class="message bot-message loading" id="{}">{PENDING_TEXT}</div>"#,
            escape_html(id.as_str())
        ),
        LogEntry::Turn(Turn::Bot(text) | Turn::Greeting(text)) => {
            format!(r#"<div class="message bot-message">{}</div>"#, multiline(text))
        }
        LogEntry::Turn(Turn::Error(message)) => format!(
            r#"<div class="message bot-message error-message">{}</div>"#,
            escape_html(message)
        ),
        LogEntry::QuickAction(action) => render_quick_action(action),
    }
}

fn render_quick_action(action: &QuickAction) -> String {
    format!(
        r#"<button class="quick-action" data-prompt="{}">{}</button>"#,
        escape_html(action.prompt),
        escape_html(action.label)
    )
}

/// Render a whole log, one entry per line, inside the message container.
pub fn render_log(entries: &[LogEntry]) -> String {
    let mut html = String::from("<div class=\"chat-messages\">\n");
    for entry in entries {
        let _ = writeln!(html, "  {}", render_entry(entry));
    }
    html.push_str("</div>\n");
    html
}
