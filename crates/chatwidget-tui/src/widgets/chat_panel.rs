//! Chat panel widget.
//!
//! Combines the message log (scrollable history) with the input field and a
//! key hint line at the bottom.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    symbols::line,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use chatwidget_engine::turn::{LogEntry, Turn, PENDING_TEXT};

use crate::text::wrap_text;
use crate::theme::Theme;
use crate::view::TuiView;

/// Height of the input line.
const INPUT_HEIGHT: u16 = 1;

/// Height for the divider line.
const DIVIDER_HEIGHT: u16 = 1;

/// Height of the key hint line.
const HINT_HEIGHT: u16 = 1;

/// Indentation of message text under its speaker label.
const INDENT: &str = "  ";

const PROMPT: &str = "> ";
const PLACEHOLDER: &str = "Escribe tu pregunta...";
const HINTS: &str = "Enter enviar · Alt+1/2 atajos · Ctrl+R reiniciar · Ctrl+E exportar · Esc cerrar";

/// The open chat panel.
///
/// ```text
/// ┌─ Asistente de denuncias ────────────┐
/// │ Asistente                           │
/// │   ¡Hola! Soy el asistente de ...    │
/// │  [Alt+1] Resumen de riesgos         │
/// │  [Alt+2] Predicción 2026            │
/// │                                     │
/// │ Tú                                  │
/// │   Resumen de riesgos                │
/// ├─────────────────────────────────────┤
/// │ > Escribe tu pregunta...            │
/// │ Enter enviar · Alt+1/2 atajos · ... │
/// └─────────────────────────────────────┘
/// ```
pub struct ChatPanel<'a> {
    view: &'a TuiView,
    theme: &'a Theme,
}

impl<'a> ChatPanel<'a> {
    /// Create a new chat panel.
    pub fn new(view: &'a TuiView, theme: &'a Theme) -> Self {
        Self { view, theme }
    }

    /// Build the styled lines for every log entry at the given width.
    pub fn log_lines(&self, width: usize) -> Vec<Line<'static>> {
        let text_width = width.saturating_sub(INDENT.len());
        let mut lines = Vec::new();
        let mut action_number = 0;

        for entry in self.view.entries() {
            match entry {
                LogEntry::Turn(turn) => {
                    if !lines.is_empty() {
                        lines.push(Line::default());
                    }
                    self.push_turn(&mut lines, turn, text_width);
                }
                LogEntry::QuickAction(action) => {
                    action_number += 1;
                    lines.push(Line::from(vec![
                        Span::raw(" "),
                        Span::styled(
                            format!(" [Alt+{action_number}] {} ", action.label),
                            Style::default().fg(self.theme.base).bg(self.theme.info),
                        ),
                    ]));
                }
            }
        }
        lines
    }

    fn push_turn(&self, lines: &mut Vec<Line<'static>>, turn: &Turn, width: usize) {
        let (label, label_color, body, body_style) = match turn {
            Turn::User(text) => (
                "Tú",
                self.theme.user,
                text.as_str(),
                Style::default().fg(self.theme.text),
            ),
            Turn::Bot(text) | Turn::Greeting(text) => (
                "Asistente",
                self.theme.bot,
                text.as_str(),
                Style::default().fg(self.theme.text),
            ),
            Turn::Pending(_) => (
                "Asistente",
                self.theme.bot,
                PENDING_TEXT,
                Style::default()
                    .fg(self.theme.muted)
                    .add_modifier(Modifier::ITALIC),
            ),
            Turn::Error(message) => (
                "Error",
                self.theme.error,
                message.as_str(),
                Style::default().fg(self.theme.error),
            ),
        };

        lines.push(Line::from(Span::styled(
            format!(" {label}"),
            Style::default()
                .fg(label_color)
                .add_modifier(Modifier::BOLD),
        )));
        for text_line in wrap_text(body, width) {
            lines.push(Line::from(vec![
                Span::raw(INDENT),
                Span::styled(text_line, body_style),
            ]));
        }
    }

    /// Render the visible window of the log.
    fn render_log(&self, area: Rect, buf: &mut Buffer) {
        let lines = self.log_lines(area.width as usize);
        let visible = area.height as usize;
        let max_offset = lines.len().saturating_sub(visible);
        let offset = self.view.fit_scroll(max_offset);
        let start = max_offset - offset;

        let window: Vec<Line<'static>> = lines.into_iter().skip(start).take(visible).collect();
        Paragraph::new(window).render(area, buf);
    }

    /// Render the input line, scrolled so the cursor stays visible.
    #[allow(clippy::cast_possible_truncation)]
    fn render_input(&self, area: Rect, buf: &mut Buffer) {
        let prompt = Span::styled(PROMPT, Style::default().fg(self.theme.primary));
        let cursor = Span::styled("█", Style::default().fg(self.theme.text));

        let (line, cursor_column) = if self.view.input.is_empty() {
            let line = Line::from(vec![
                prompt,
                cursor,
                Span::styled(PLACEHOLDER, Style::default().fg(self.theme.muted)),
            ]);
            (line, PROMPT.len())
        } else {
            let (before, after) = self.view.input.split_at_cursor();
            let column = PROMPT.len() + before.width();
            let line = Line::from(vec![
                prompt,
                Span::styled(before.to_string(), Style::default().fg(self.theme.text)),
                cursor,
                Span::styled(after.to_string(), Style::default().fg(self.theme.text)),
            ]);
            (line, column)
        };

        let scroll_x = (cursor_column + 1).saturating_sub(area.width as usize);
        Paragraph::new(line)
            .scroll((0, scroll_x as u16))
            .render(area, buf);
    }

    /// Render a horizontal divider line.
    fn render_divider(&self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 {
            return;
        }

        let divider_str = line::HORIZONTAL.repeat(area.width as usize);
        let line = Line::from(Span::styled(
            divider_str,
            Style::default().fg(self.theme.border),
        ));
        Paragraph::new(vec![line]).render(area, buf);
    }
}

impl Widget for ChatPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Asistente de denuncias ")
            .title_style(Style::default().fg(self.theme.text))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_focused))
            .style(Style::default().bg(self.theme.surface));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < INPUT_HEIGHT + DIVIDER_HEIGHT + HINT_HEIGHT + 1 {
            // Not enough space - just show input
            self.render_input(inner, buf);
            return;
        }

        let log_height = inner
            .height
            .saturating_sub(INPUT_HEIGHT + DIVIDER_HEIGHT + HINT_HEIGHT);
        let divider_y = inner.y + log_height;
        let input_y = divider_y + DIVIDER_HEIGHT;
        let hint_y = input_y + INPUT_HEIGHT;

        self.render_log(Rect::new(inner.x, inner.y, inner.width, log_height), buf);
        self.render_divider(Rect::new(inner.x, divider_y, inner.width, DIVIDER_HEIGHT), buf);
        self.render_input(Rect::new(inner.x, input_y, inner.width, INPUT_HEIGHT), buf);

        Paragraph::new(Line::from(Span::styled(
            HINTS,
            Style::default().fg(self.theme.muted),
        )))
        .render(Rect::new(inner.x, hint_y, inner.width, HINT_HEIGHT), buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{buffer_to_string, create_test_terminal_sized};
    use chatwidget_engine::turn::{PendingIdGenerator, CONNECTION_ERROR, GREETING, QUICK_ACTIONS};
    use chatwidget_engine::ChatView;

    fn reset_view() -> TuiView {
        let mut view = TuiView::new();
        view.append(Turn::Greeting(GREETING.into()).into());
        for action in QUICK_ACTIONS {
            view.append(action.into());
        }
        view
    }

    fn render(view: &TuiView, width: u16, height: u16) -> String {
        let theme = Theme::default();
        let mut terminal = create_test_terminal_sized(width, height);
        terminal
            .draw(|frame| {
                frame.render_widget(ChatPanel::new(view, &theme), frame.area());
            })
            .unwrap();
        buffer_to_string(terminal.backend().buffer())
    }

    #[test]
    fn test_panel_renders_greeting_and_quick_actions() {
        let content = render(&reset_view(), 70, 16);
        assert!(content.contains("Asistente de denuncias"));
        assert!(content.contains("¡Hola!"));
        assert!(content.contains("[Alt+1] Resumen de riesgos"));
        assert!(content.contains("[Alt+2] Predicción 2026"));
        assert!(content.contains(PLACEHOLDER));
    }

    #[test]
    fn test_panel_shows_pending_and_error_turns() {
        let mut view = reset_view();
        view.append(Turn::User("hola".into()).into());
        view.append(Turn::Error(CONNECTION_ERROR.into()).into());
        let content = render(&view, 70, 24);
        assert!(content.contains("Tú"));
        assert!(content.contains(CONNECTION_ERROR));
    }

    #[test]
    fn test_log_lines_split_bot_newlines() {
        let mut view = TuiView::new();
        view.append(Turn::Bot("Lima: 120\nCusco: 45".into()).into());
        let theme = Theme::default();
        let lines = ChatPanel::new(&view, &theme).log_lines(40);
        let text: Vec<String> = lines.iter().map(ToString::to_string).collect();
        assert_eq!(text, vec![" Asistente", "  Lima: 120", "  Cusco: 45"]);
    }

    #[test]
    fn test_log_follows_the_end() {
        let mut view = TuiView::new();
        for i in 0..20 {
            view.append(Turn::User(format!("mensaje {i}")).into());
        }
        let content = render(&view, 40, 10);
        assert!(content.contains("mensaje 19"));
        assert!(!content.contains("mensaje 0\n"));

        view.scroll_up();
        view.scroll_up();
        view.scroll_up();
        let scrolled = render(&view, 40, 10);
        assert!(!scrolled.contains("mensaje 19"));
    }

    #[test]
    fn test_scroll_down_after_overshooting_top() {
        let mut view = TuiView::new();
        for i in 0..10 {
            view.append(Turn::User(format!("mensaje {i}")).into());
        }
        render(&view, 40, 10);

        for _ in 0..20 {
            view.scroll_up();
        }
        let top = render(&view, 40, 10);
        assert!(top.contains("mensaje 0"));

        view.scroll_down();
        let moved = render(&view, 40, 10);
        assert_ne!(top, moved);
    }

    #[test]
    fn test_input_shows_typed_text() {
        let mut view = TuiView::new();
        view.set_input_value("Predicción 2026");
        let content = render(&view, 50, 8);
        assert!(content.contains("> Predicción 2026█"));
    }

    #[test]
    fn test_minimum_size_does_not_panic() {
        let mut view = reset_view();
        view.append(Turn::Pending(PendingIdGenerator::new().next_id()).into());
        render(&view, 12, 3);
        render(&view, 2, 2);
    }
}
