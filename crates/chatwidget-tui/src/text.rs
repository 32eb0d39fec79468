//! Text wrapping for message bubbles.

/// Wrap text to the given width, keeping explicit line breaks.
///
/// Every `\n` starts a new line; empty lines are kept so replies with
/// paragraph breaks keep their shape.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return text.split('\n').map(str::to_string).collect();
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        lines.extend(
            textwrap::wrap(paragraph, width)
                .into_iter()
                .map(std::borrow::Cow::into_owned),
        );
    }
    lines
}
