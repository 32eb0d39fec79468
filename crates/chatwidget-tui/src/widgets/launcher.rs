//! Toggle target drawn in the bottom-right corner.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::theme::Theme;

/// Height of the launcher box.
pub const LAUNCHER_HEIGHT: u16 = 3;

/// The button that opens and closes the chat panel.
pub struct Launcher<'a> {
    open: bool,
    theme: &'a Theme,
}

impl<'a> Launcher<'a> {
    /// Create a launcher showing the open or closed label.
    pub fn new(open: bool, theme: &'a Theme) -> Self {
        Self { open, theme }
    }

    fn label(&self) -> &'static str {
        if self.open {
            " Cerrar chat (Ctrl+T) "
        } else {
            " Chat IA (Ctrl+T) "
        }
    }

    /// Where the launcher sits inside `screen`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn area(&self, screen: Rect) -> Rect {
        let width = (self.label().width() as u16 + 2).min(screen.width);
        let height = LAUNCHER_HEIGHT.min(screen.height);
        Rect::new(
            screen.right().saturating_sub(width),
            screen.bottom().saturating_sub(height),
            width,
            height,
        )
    }
}

impl Widget for Launcher<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.primary))
            .style(Style::default().bg(self.theme.surface));

        let style = if self.open {
            Style::default().fg(self.theme.subtext)
        } else {
            Style::default()
                .fg(self.theme.primary)
                .add_modifier(Modifier::BOLD)
        };

        Paragraph::new(Line::from(Span::styled(self.label(), style)))
            .block(block)
            .render(area, buf);
    }
}
